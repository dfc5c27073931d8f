//! Tile server entry point.

use std::sync::Arc;

use anyhow::Context;
use cartograph_server::{build_router, AppState, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let config = ServerConfig::from_env().context("loading server configuration")?;

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::new(config.log_filter.clone()))
    .init();

  let addr = config.socket_addr().context("parsing HOST/PORT into a socket address")?;
  tracing::info!(%addr, data_dir = %config.data_dir.display(), "cartograph server starting");

  let state = Arc::new(AppState::new(config));
  let app = build_router(state);

  let listener = tokio::net::TcpListener::bind(addr)
    .await
    .with_context(|| format!("binding listener on {addr}"))?;
  axum::serve(listener, app).await.context("server loop exited")?;
  Ok(())
}
