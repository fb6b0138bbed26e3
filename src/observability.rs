use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt};

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// filter, which keeps this crate at debug and everything else at info.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,segstore=debug"));

    let subscriber = Registry::default()
        .with(env_filter)
        .with(fmt::layer().with_target(true));

    tracing::subscriber::set_global_default(subscriber)
        .expect("failed to install tracing subscriber");
}
