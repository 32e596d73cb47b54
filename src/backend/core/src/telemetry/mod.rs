//! Telemetry: Structured Logging and Metrics Descriptions.
//!
//! - **Logging**: JSON/pretty/compact `tracing` output with env-driven filtering
//! - **Metrics**: Descriptions for the counters emitted through the `metrics` facade
//!
//! # Example
//!
//! ```rust,no_run
//! use punchclock_core::telemetry::{init_telemetry, LoggingConfig};
//!
//! init_telemetry(&LoggingConfig::default()).expect("Failed to initialize telemetry");
//! ```

pub mod logging;

pub use logging::{build_filter, init_logging, LogFormat, LoggingConfig, SpanEventConfig};

use metrics::describe_counter;

/// Register descriptions for every counter the crate emits.
///
/// Without an installed recorder this is a no-op.
pub fn describe_metrics() {
    describe_counter!(
        "punchclock_operations_total",
        "Total number of applied clock operations by kind"
    );
    describe_counter!("punchclock_errors_total", "Total number of errors by code");
    describe_counter!("punchclock_rpc_requests_total", "Total number of JSON-RPC requests by method");
}

/// Initialize logging and describe metrics. Call once at startup.
pub fn init_telemetry(config: &LoggingConfig) -> anyhow::Result<()> {
    init_logging(config)?;
    describe_metrics();
    ::tracing::debug!(format = %config.format, level = %config.level, "Telemetry initialized");
    Ok(())
}
