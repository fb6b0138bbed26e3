mod bootstrap;
mod cluster;
mod config;
mod context;
mod error;
mod host;
mod metrics;
mod observability;
mod options;
mod protocol;
mod server;
mod transport;

use std::process::ExitCode;

use crate::context::Context;

#[tokio::main]
async fn main() -> ExitCode {
    observability::init_tracing();
    metrics::init_metrics();

    let mut context = Context::new();
    match bootstrap::run(&mut context).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(
                locator = %context.listening_description(),
                error = %err,
                "fatal error in server"
            );
            ExitCode::FAILURE
        }
    }
}
