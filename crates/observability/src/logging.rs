//! Subscriber installation.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, ObservabilityConfig};

/// Install the global subscriber described by `config`.
///
/// Fails only on an invalid filter. If a subscriber is already installed this
/// is a no-op.
pub fn init(config: &ObservabilityConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&config.filter)
        .with_context(|| format!("invalid log filter '{}'", config.filter))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = match config.format {
        LogFormat::Json => builder
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };

    if installed.is_ok() {
        tracing::debug!(filter = %config.filter, format = ?config.format, "logging initialised");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_filter_is_reported() {
        let config = ObservabilityConfig {
            filter: "orderflow=notalevel".to_string(),
            format: LogFormat::Compact,
        };
        assert!(init(&config).is_err());
    }

    #[test]
    fn repeated_init_is_a_noop() {
        let config = ObservabilityConfig {
            filter: "off".to_string(),
            format: LogFormat::Compact,
        };
        assert!(init(&config).is_ok());
        assert!(init(&config).is_ok());
        crate::init();
    }
}
