//! Metrics collection and exposition.
//!
//! # Metrics
//! - `api_requests_total` (counter): requests by method, status, api version
//! - `api_request_duration_seconds` (histogram): latency by method, api version
//! - `api_routes_registered` (gauge): size of the route table
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Prometheus exporter serves its own listener

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record a completed request. `version` is `"none"` for unversioned routes.
pub fn record_request(method: &str, status: u16, version: &str, start: Instant) {
    counter!(
        "api_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "version" => version.to_string()
    )
    .increment(1);

    histogram!(
        "api_request_duration_seconds",
        "method" => method.to_string(),
        "version" => version.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_routes_registered(count: usize) {
    gauge!("api_routes_registered").set(count as f64);
}
