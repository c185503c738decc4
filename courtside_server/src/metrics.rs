//! Prometheus metrics for the booking and tournament server.
//!
//! Metrics are recorded through the [`metrics`] facade and exported in
//! Prometheus text format once [`init_metrics`] has installed the exporter.
//! Without an installed recorder every call here is a no-op.
//!
//! # Metrics Categories
//!
//! - **HTTP Metrics**: request counts and durations per route and status
//! - **Auth Metrics**: login attempts
//! - **Domain Metrics**: bookings, generated matches, reported results
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use courtside_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("POST", "/api/auth/signin", 200);
//! metrics::bookings_total();
//! ```

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

#[derive(Debug, thiserror::Error)]
#[error("Failed to install Prometheus exporter: {0}")]
pub struct MetricsError(#[from] metrics_exporter_prometheus::BuildError);

/// Install the Prometheus exporter.
///
/// Metrics will be served at `http://<addr>/metrics`. Must be called from
/// within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    Ok(())
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
///
/// Increments the total HTTP request counter with method, path, and status labels.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

/// Middleware recording [`http_requests_total`] and
/// [`http_request_duration_ms`] for every request.
///
/// The route template (`/api/fields/{id}`) is used as the path label so ids
/// do not explode label cardinality; unmatched requests share one label.
pub async fn track_http(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().as_str().to_owned();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_owned(), |p| p.as_str().to_owned());

    let response = next.run(request).await;

    let elapsed = start.elapsed();
    http_requests_total(&method, &path, response.status().as_u16());
    http_request_duration_ms(&method, &path, elapsed.as_secs_f64() * 1000.0);
    crate::logging::log_performance(&path, elapsed.as_millis() as u64, Some(&method));

    response
}

// ============================================================================
// Auth Metrics
// ============================================================================

/// Increment login attempts counter.
pub fn login_attempts_total(success: bool) {
    metrics::counter!("login_attempts_total",
        "success" => success.to_string()
    )
    .increment(1);
}

// ============================================================================
// Domain Metrics
// ============================================================================

/// Increment the successful bookings counter.
pub fn bookings_total() {
    metrics::counter!("bookings_total").increment(1);
}

/// Count matches created by a generation run.
pub fn matches_generated_total(count: usize) {
    metrics::counter!("matches_generated_total").increment(count as u64);
    metrics::counter!("match_generations_total").increment(1);
}

/// Increment the reported results counter.
pub fn results_reported_total() {
    metrics::counter!("results_reported_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_exporter_is_noop() {
        http_requests_total("GET", "/health", 200);
        http_request_duration_ms("GET", "/health", 1.5);
        login_attempts_total(false);
        bookings_total();
        matches_generated_total(6);
        results_reported_total();
    }
}
