//! Structured logging setup and event helpers.
//!
//! The server logs through `tracing`; the `courtside` library logs through
//! the `log` facade, which `tracing-subscriber` bridges into the same output.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Milliseconds above which an operation is reported as slow
const SLOW_OPERATION_MS: u64 = 1000;

/// Initialize structured logging.
///
/// Log levels come from `RUST_LOG`; the default keeps `sqlx` and `hyper`
/// quiet.
///
/// # Example
///
/// ```no_run
/// use courtside_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,hyper=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log security event with structured data
///
/// # Arguments
///
/// * `event_type` - Type of security event
/// * `user_id` - Optional user ID
/// * `request_id` - Optional correlation id of the request
/// * `message` - Event message
///
/// # Example
///
/// ```
/// use courtside_server::logging::log_security_event;
///
/// log_security_event(
///     "failed_login",
///     None,
///     Some("4f1c2a"),
///     "Invalid password attempt"
/// );
/// ```
pub fn log_security_event(
    event_type: &str,
    user_id: Option<i64>,
    request_id: Option<&str>,
    message: &str,
) {
    tracing::warn!(
        event_type = event_type,
        user_id = user_id,
        request_id = request_id,
        "SECURITY: {}",
        message
    );
}

/// Log how long an operation took; slow ones are raised to `warn`.
pub fn log_performance(operation: &str, duration_ms: u64, metadata: Option<&str>) {
    if duration_ms > SLOW_OPERATION_MS {
        tracing::warn!(
            operation = operation,
            duration_ms = duration_ms,
            metadata = metadata,
            "PERFORMANCE: Slow operation"
        );
    } else {
        tracing::debug!(
            operation = operation,
            duration_ms = duration_ms,
            metadata = metadata,
            "Performance metric"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_security_event() {
        log_security_event("invalid_token", Some(1), Some("abc"), "Test message");
        log_security_event("missing_token", None, None, "Test message");
    }

    #[test]
    fn test_log_performance() {
        log_performance("/api/fields", 12, Some("GET"));
        log_performance("/api/tournaments/{id}/matches/generate", 2000, None);
    }
}
