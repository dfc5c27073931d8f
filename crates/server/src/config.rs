//! Server process configuration, read from the environment.

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("missing required environment variable {0}")]
  Missing(&'static str),
  #[error("invalid value for {name}: {value}")]
  Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host: String,
  pub port: u16,
  pub auth_token: String,
  pub data_dir: std::path::PathBuf,
  pub log_filter: String,
}

impl ServerConfig {
  pub fn from_env() -> anyhow::Result<Self> {
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = match std::env::var("PORT") {
      Ok(value) => value
        .parse()
        .map_err(|_| ConfigError::Invalid { name: "PORT", value })?,
      Err(_) => 8080,
    };
    let auth_token = std::env::var("AUTH_TOKEN").map_err(|_| ConfigError::Missing("AUTH_TOKEN"))?;
    let data_dir = std::env::var("DATA_DIR").map(std::path::PathBuf::from).unwrap_or_else(|_| std::path::PathBuf::from("./data"));
    let log_filter = match std::env::var("LOG_LEVEL") {
      Ok(value) => match value.as_str() {
        "fatal" | "error" => "error",
        "warn" => "warn",
        "info" => "info",
        "debug" => "debug",
        "trace" => "trace",
        _ => return Err(ConfigError::Invalid { name: "LOG_LEVEL", value }.into()),
      },
      Err(_) => "info",
    }
    .to_string();

    Ok(Self { host, port, auth_token, data_dir, log_filter })
  }

  pub fn socket_addr(&self) -> Result<std::net::SocketAddr, std::net::AddrParseError> {
    format!("{}:{}", self.host, self.port).parse()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn socket_addr_combines_host_and_port() {
    let config = ServerConfig {
      host: "127.0.0.1".into(),
      port: 9090,
      auth_token: "secret".into(),
      data_dir: "./data".into(),
      log_filter: "info".into(),
    };
    assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:9090");
  }
}
