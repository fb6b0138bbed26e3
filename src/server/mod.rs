use std::io;
use std::sync::Arc;
use std::time::Instant;

use metrics::counter;
use tokio::sync::Semaphore;

use crate::config::{ServerConfig, ServiceKind};
use crate::context::Context;
use crate::server::connection::handle_session;
use crate::transport::Transport;

pub mod connection;

/// Upper bound on simultaneous diagnostic sessions.
pub const MAX_SESSIONS: usize = 256;

/// Read-only snapshot shared with every session handler.
#[derive(Debug, Clone)]
pub struct ServerStatus {
    pub config: Arc<ServerConfig>,
    pub started_at: Instant,
}

/// Run the server against a bound transport. Never returns except on an
/// accept failure, which is fatal upstream.
pub async fn run(
    context: &Context,
    config: ServerConfig,
    transport: Box<dyn Transport>,
) -> io::Result<()> {
    if config.services.contains(ServiceKind::Backup) {
        tracing::info!(
            file = %config.backup.file.display(),
            in_memory = config.backup.in_memory,
            segment_frames = config.backup.segment_frames,
            strategy = %config.backup.strategy,
            "backup service starting"
        );
        // Replica reuse is gated on the cluster-name matching rule, so the
        // sentinel name discards everything ever stored.
        if config.cluster_name.matches(&config.cluster_name) {
            tracing::info!(
                cluster = %config.cluster_name,
                "stored replicas with a matching cluster name will be reused"
            );
        } else {
            tracing::info!(
                cluster = %config.cluster_name,
                "cluster name matches nothing, all stored replicas will be discarded"
            );
        }
    }
    if config.has_master_role() {
        tracing::info!(
            log_bytes = config.master.log_bytes,
            hash_table_bytes = config.master.hash_table_bytes,
            replicas = config.master.num_replicas,
            log_cleaner = !config.master.disable_log_cleaner,
            "master service starting"
        );
    }

    let limiter = Arc::new(Semaphore::new(MAX_SESSIONS));
    let status = ServerStatus {
        config: Arc::new(config),
        started_at: context.started_at(),
    };

    loop {
        let inbound = transport.accept().await?;
        tracing::debug!(peer = %inbound.peer, "accepted session");
        counter!("segstore.sessions.accepted").increment(1);

        let permit = limiter
            .clone()
            .acquire_owned()
            .await
            .expect("semaphore closed");
        let status = status.clone();
        let idle_timeout = transport.session_timeout();

        tokio::spawn(async move {
            let _permit = permit;
            if let Err(err) = handle_session(inbound, status, idle_timeout).await {
                tracing::warn!(error = %err, "session handler exited with error");
            }
        });
    }
}
