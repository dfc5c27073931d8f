//! Agent process configuration, read from the environment.

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("missing required environment variable {0}")]
  Missing(&'static str),
  #[error("invalid value for {name}: {value}")]
  Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
  Fatal,
  Error,
  Warn,
  Info,
  Debug,
  Trace,
}

impl LogLevel {
  fn parse(value: &str) -> Option<Self> {
    match value {
      "fatal" => Some(Self::Fatal),
      "error" => Some(Self::Error),
      "warn" => Some(Self::Warn),
      "info" => Some(Self::Info),
      "debug" => Some(Self::Debug),
      "trace" => Some(Self::Trace),
      _ => None,
    }
  }

  /// Maps to a `tracing` filter directive; `fatal` has no direct tracing
  /// equivalent so it's treated as `error`.
  pub fn as_tracing_filter(self) -> &'static str {
    match self {
      LogLevel::Fatal | LogLevel::Error => "error",
      LogLevel::Warn => "warn",
      LogLevel::Info => "info",
      LogLevel::Debug => "debug",
      LogLevel::Trace => "trace",
    }
  }
}

/// Everything the scan agent binary needs at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
  pub server_base_url: String,
  pub auth_token: String,
  pub log_level: LogLevel,
}

impl AgentConfig {
  pub fn from_env() -> anyhow::Result<Self> {
    let server_base_url = std::env::var("CARTOGRAPH_SERVER_URL")
      .map_err(|_| ConfigError::Missing("CARTOGRAPH_SERVER_URL"))?;
    let auth_token =
      std::env::var("AUTH_TOKEN").map_err(|_| ConfigError::Missing("AUTH_TOKEN"))?;
    let log_level = match std::env::var("LOG_LEVEL") {
      Ok(value) => LogLevel::parse(&value)
        .ok_or_else(|| ConfigError::Invalid { name: "LOG_LEVEL", value })?,
      Err(_) => LogLevel::Info,
    };
    Ok(Self { server_base_url, auth_token, log_level })
  }
}
