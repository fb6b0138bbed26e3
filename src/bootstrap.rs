use crate::config::ServerConfig;
use crate::context::Context;
use crate::error::FatalError;
use crate::host;
use crate::options::ServerOptions;
use crate::server;
use crate::transport;

/// Drive the startup sequence: bind options, resolve the service set, size
/// master memory, bind the transport, then hand off to the server loop. Runs
/// straight through exactly once; every failure funnels out as `FatalError`
/// and the caller owns logging and the process exit.
pub async fn run(context: &mut Context) -> Result<(), FatalError> {
    let options = ServerOptions::from_args()?;

    let command_line = std::env::args().collect::<Vec<_>>().join(" ");
    tracing::info!(command_line = %command_line, "starting");

    let mut config = ServerConfig::from_options(&options)?;

    if config.has_master_role() {
        tracing::info!(replicas = config.master.num_replicas, "using backups");
        let total_memory = host::total_system_memory().map_err(FatalError::HostProbe)?;
        config.set_log_and_hash_table_size(
            &options.total_master_memory,
            &options.hash_table_memory,
            total_memory,
        )?;
    }

    let transport = transport::bind(&options.local, options.timeout).await?;
    // The transport may end up on a different endpoint than requested (port 0,
    // resolved hostnames). Replace the configured locator with the effective
    // one before anything downstream reads it.
    config.local_locator = transport.listening_locator().to_string();
    context.set_listening_locator(config.local_locator.clone());

    tracing::info!(services = %config.services, locator = %config.local_locator, "listening");

    server::run(context, config, transport).await?;
    Ok(())
}
