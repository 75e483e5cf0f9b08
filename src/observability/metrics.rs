//! Metrics collection and exposition.
//!
//! # Metrics
//! - `annoying_requests_attempted_total` (counter): slots by selection branch
//! - `annoying_requests_total` (counter): outcomes by result and status
//! - `annoying_reconfigurations_total` (counter): accepted config merges
//!
//! Counters mirror `RequestStats`; without an installed recorder every call
//! is a no-op.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::traffic::selector::SelectionKind;
use crate::traffic::stats::TRANSPORT_ERROR_KEY;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_attempt(kind: SelectionKind) {
    metrics::counter!("annoying_requests_attempted_total", "selection" => kind.as_str())
        .increment(1);
}

pub fn record_outcome(success: bool, status: Option<u16>) {
    let outcome = if success { "success" } else { "fail" };
    let status = status
        .map(|s| s.to_string())
        .unwrap_or_else(|| TRANSPORT_ERROR_KEY.to_string());

    metrics::counter!("annoying_requests_total", "outcome" => outcome, "status" => status)
        .increment(1);
}

pub fn record_reconfiguration() {
    metrics::counter!("annoying_reconfigurations_total").increment(1);
}
