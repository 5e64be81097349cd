//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Record per-request counters and latency
//! - Expose a Prometheus-compatible endpoint when an address is configured
//!
//! # Metrics
//! - `nightframe_requests_total` (counter): requests by method, status
//! - `nightframe_request_duration_seconds` (histogram): latency by method
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - The exporter is process-global; installing it twice is an error

use std::net::SocketAddr;
use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its HTTP listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one served request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let duration = start.elapsed().as_secs_f64();

    ::metrics::counter!(
        "nightframe_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    ::metrics::histogram!(
        "nightframe_request_duration_seconds",
        "method" => method.to_string()
    )
    .record(duration);
}

/// Middleware recording every request that passes through the server.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let response = next.run(request).await;
    record_request(&method, response.status().as_u16(), start);
    response
}
