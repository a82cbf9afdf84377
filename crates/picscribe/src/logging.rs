//! Logging initialization.
//!
//! Wires the `tracing` subscriber with an env-filter and bridges the
//! `log` macros used throughout the crate into it.

use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the global tracing subscriber and the `log` bridge.
///
/// Filter defaults to `info` and can be overridden via `RUST_LOG`.
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    let _ = tracing_log::LogTracer::init();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
