//! Structured logging setup.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt as tfmt, prelude::*, EnvFilter};

/// Default filter when neither a level nor `RUST_LOG` is given.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Output format for logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format (for development).
    #[default]
    Human,
    /// JSON format (for production/log aggregation).
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Human => write!(f, "human"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" | "compact" | "text" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(LoggingError::UnknownFormat(other.to_string())),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter directive (e.g. `info` or `heat_server=debug`). Falls back to
    /// `RUST_LOG`, then to `info`.
    #[serde(default)]
    pub level: Option<String>,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl LogConfig {
    /// Create a config with the given filter directive.
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: Some(level.into()),
            format: LogFormat::default(),
        }
    }

    /// Build the filter this config describes.
    pub fn filter(&self) -> Result<EnvFilter, LoggingError> {
        match self.level.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            Some(level) => EnvFilter::try_new(level)
                .map_err(|e| LoggingError::InvalidFilter(format!("{level}: {e}"))),
            None => Ok(EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))),
        }
    }
}

/// Errors from logging setup.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("unknown log format: {0} (expected `human` or `json`)")]
    UnknownFormat(String),

    #[error("invalid log filter {0}")]
    InvalidFilter(String),

    #[error("global subscriber already installed")]
    AlreadyInitialized,
}

/// Install the global tracing subscriber.
pub fn init_logging(config: &LogConfig) -> Result<(), LoggingError> {
    let filter = config.filter()?;
    let subscriber = tracing_subscriber::registry().with(filter);

    let installed = match config.format {
        LogFormat::Json => subscriber
            .with(
                tfmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(false),
            )
            .try_init(),
        LogFormat::Human => subscriber
            .with(tfmt::layer().with_target(true).compact())
            .try_init(),
    };

    installed.map_err(|_| LoggingError::AlreadyInitialized)?;
    tracing::debug!(format = %config.format, "Logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("HUMAN".parse::<LogFormat>().unwrap(), LogFormat::Human);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_log_format_default_is_human() {
        assert_eq!(LogConfig::default().format, LogFormat::Human);
    }

    #[test]
    fn test_filter_accepts_directives() {
        assert!(LogConfig::new("debug").filter().is_ok());
        assert!(LogConfig::new("heat_server=trace,info").filter().is_ok());
    }

    #[test]
    fn test_filter_blank_level_uses_default() {
        assert!(LogConfig::new("   ").filter().is_ok());
    }

    #[test]
    fn test_init_twice_fails() {
        let config = LogConfig::new("warn");
        // The first call may race with other tests; only the second is asserted.
        let _ = init_logging(&config);

        assert!(matches!(
            init_logging(&config),
            Err(LoggingError::AlreadyInitialized)
        ));
    }
}
