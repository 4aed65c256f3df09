//! Metrics collection and exposition.
//!
//! # Metrics
//! - `edge_requests_total` (counter): routed requests by outcome and rule
//! - `edge_upstream_requests_total` (counter): forwarded requests by status
//! - `edge_upstream_duration_seconds` (histogram): upstream latency
//!
//! Recording is a no-op until a recorder is installed, so tests and the
//! CLI never need the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::routing::{Outcome, RuleKind};

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

/// Count one routed request.
pub fn record_outcome(outcome: &Outcome) {
    let (kind, rule) = match outcome {
        Outcome::Redirect { rule, .. } => ("redirect", rule.as_str()),
        Outcome::Continue { .. } => ("continue", "none"),
    };
    counter!("edge_requests_total", "outcome" => kind, "rule" => rule).increment(1);
}

/// Count a request that bypassed the router.
pub fn record_out_of_scope() {
    counter!("edge_requests_total", "outcome" => "out_of_scope", "rule" => "none").increment(1);
}

/// Count a redirect the HTTP layer could not encode.
pub fn record_unencodable_redirect(rule: RuleKind) {
    counter!("edge_redirect_errors_total", "rule" => rule.as_str()).increment(1);
}

/// Record one forwarded request.
pub fn record_upstream(status: u16, start: Instant) {
    counter!("edge_upstream_requests_total", "status" => status.to_string()).increment(1);
    histogram!("edge_upstream_duration_seconds").record(start.elapsed().as_secs_f64());
}
