use metrics::describe_counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install a global Prometheus recorder and describe the counters this
/// process emits. Scrape serving can be added later.
pub fn init_metrics() {
    if let Err(err) = PrometheusBuilder::new().install_recorder() {
        tracing::warn!(error = %err, "failed to install prometheus metrics recorder");
        return;
    }
    describe_counter!(
        "segstore.sessions.accepted",
        "Sessions accepted by the transport"
    );
    describe_counter!(
        "segstore.diag.commands",
        "Diagnostic commands served, labeled by command"
    );
}
