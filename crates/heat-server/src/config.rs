//! Server configuration.
//!
//! Layers, lowest precedence first: built-in defaults, an optional TOML or
//! JSON file, then environment variables and command-line flags.

use std::fmt;
use std::str::FromStr;

use clap::Args;
use heat_observability::{LogConfig, LogFormat};
use serde::{Deserialize, Serialize};

use crate::ServerError;

/// Where workloads run relative to the connection task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Run on the connection task. On a current-thread runtime one busy
    /// workload stalls every other request.
    #[default]
    Inline,
    /// Run on the blocking pool so other requests are still served.
    Offload,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline => write!(f, "inline"),
            Self::Offload => write!(f, "offload"),
        }
    }
}

impl FromStr for ExecutionMode {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" => Ok(Self::Inline),
            "offload" => Ok(Self::Offload),
            other => Err(ServerError::Config(format!(
                "unknown execution mode `{other}` (expected `inline` or `offload`)"
            ))),
        }
    }
}

/// Configuration for the heat server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to listen on.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on. `0` picks an ephemeral port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Where workloads run.
    #[serde(default)]
    pub execution: ExecutionMode,

    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            execution: ExecutionMode::default(),
            log: LogConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load config from a file. `.json` files are parsed as JSON, anything
    /// else as TOML.
    pub fn load(path: &str) -> Result<Self, ServerError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("failed to read {path}: {e}")))?;

        Self::parse(path, &content)
    }

    fn parse(path: &str, content: &str) -> Result<Self, ServerError> {
        if path.ends_with(".json") {
            serde_json::from_str(content)
                .map_err(|e| ServerError::Config(format!("failed to parse JSON {path}: {e}")))
        } else {
            toml::from_str(content)
                .map_err(|e| ServerError::Config(format!("failed to parse TOML {path}: {e}")))
        }
    }

    /// Resolve the effective configuration from an optional file and
    /// overrides.
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self, ServerError> {
        let base = match overrides.config.as_deref() {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        let config = base.with_overrides(overrides)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides on top of this config.
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Result<Self, ServerError> {
        if let Some(host) = &overrides.host {
            self.host = host.clone();
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(mode) = &overrides.execution {
            self.execution = mode.parse()?;
        }
        if let Some(level) = &overrides.log_level {
            self.log.level = Some(level.clone());
        }
        if let Some(format) = &overrides.log_format {
            self.log.format = format
                .parse::<LogFormat>()
                .map_err(|e| ServerError::Config(e.to_string()))?;
        }
        Ok(self)
    }

    /// Set the listen port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the listen host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the execution mode.
    pub fn with_execution(mut self, mode: ExecutionMode) -> Self {
        self.execution = mode;
        self
    }

    /// `host:port` string to bind.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.host.trim().is_empty() {
            return Err(ServerError::Config("host cannot be empty".to_string()));
        }
        self.log
            .filter()
            .map_err(|e| ServerError::Config(e.to_string()))?;
        Ok(())
    }
}

/// Command-line and environment overrides.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigOverrides {
    /// Config file path (TOML or JSON)
    #[arg(short, long, env = "HEAT_CONFIG")]
    pub config: Option<String>,

    /// Interface to listen on
    #[arg(long, env = "HEAT_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Where workloads run: `inline` or `offload`
    #[arg(long, env = "HEAT_EXECUTION")]
    pub execution: Option<String>,

    /// Log filter directive (e.g. `info`, `heat_server=debug`)
    #[arg(long, env = "HEAT_LOG")]
    pub log_level: Option<String>,

    /// Log format: `human` or `json`
    #[arg(long, env = "HEAT_LOG_FORMAT")]
    pub log_format: Option<String>,
}

/// Generate a default heat.toml config file.
pub fn generate_default_config() -> String {
    r#"# heat server configuration

host = "0.0.0.0"
port = 3000

# "inline" runs workloads on the connection task (one busy request stalls the
# service); "offload" runs them on the blocking pool.
execution = "inline"

[log]
level = "info"
format = "human"
"#
    .to_string()
}
