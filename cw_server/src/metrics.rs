//! Prometheus metrics for monitoring wallet service health.
//!
//! Metrics are exposed in Prometheus text format on a dedicated listener,
//! enabled by setting `METRICS_BIND`.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))
}

/// Record a ledger operation and its outcome.
///
/// `operation` is the API operation (`create_transaction`, `bet_win`,
/// `get_balance`, `list_transactions`); `outcome` is `committed`, `rejected`,
/// or `error`.
pub fn ledger_operations_total(operation: &str, outcome: &str) {
    metrics::counter!("ledger_operations_total",
        "operation" => operation.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record an HTTP request.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}
