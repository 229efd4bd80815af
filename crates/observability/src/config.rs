//! Observability configuration, read from environment variables.

use core::str::FromStr;

use anyhow::Context;

/// Output format of the log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    Pretty,
    Compact,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            other => anyhow::bail!("unknown log format '{other}' (expected json, pretty or compact)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// `EnvFilter` directives, e.g. `info,orderflow_ordering=debug`.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl ObservabilityConfig {
    pub const FILTER_VAR: &'static str = "RUST_LOG";
    pub const FORMAT_VAR: &'static str = "ORDERFLOW_LOG_FORMAT";

    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset or blank keys take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let filter = lookup(Self::FILTER_VAR)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(defaults.filter);

        let format = match lookup(Self::FORMAT_VAR).filter(|value| !value.trim().is_empty()) {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("invalid {}", Self::FORMAT_VAR))?,
            None => defaults.format,
        };

        Ok(Self { filter, format })
    }
}
