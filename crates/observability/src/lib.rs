//! Tracing and logging setup shared by processes embedding the ordering domain.

pub mod config;
pub mod logging;

pub use config::{LogFormat, ObservabilityConfig};

/// Initialize process-wide logging from the environment.
///
/// Falls back to the default configuration if the environment is invalid.
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    let config = ObservabilityConfig::from_env().unwrap_or_else(|err| {
        eprintln!("observability: {err:#}; using defaults");
        ObservabilityConfig::default()
    });

    if let Err(err) = logging::init(&config) {
        eprintln!("observability: {err:#}; using defaults");
        let _ = logging::init(&ObservabilityConfig::default());
    }
}
