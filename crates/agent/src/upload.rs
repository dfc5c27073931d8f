//! HTTP uploader: batches scanned payloads to the tile server.

use cartograph_protocol::{
  BlockChangeBatchRequest, ChunkBatchRequest, EntityBatchRequest, PlayerBatchRequest,
  QueueStatusPayload, StructureBatchRequest, AUTH_HEADER,
};

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
  #[error("request to {path} failed: {source}")]
  Http {
    path: String,
    #[source]
    source: reqwest::Error,
  },
  #[error("server rejected {path} with status {status}")]
  Rejected { path: String, status: reqwest::StatusCode },
}

/// Thin wrapper over [`reqwest::Client`] carrying the server base URL and
/// shared-secret token. One instance is shared across the processor's
/// lifetime; failures are logged and swallowed at the call site — the
/// processor does not retry the batch, and the queue does not block on it.
pub struct Uploader {
  client: reqwest::Client,
  base_url: String,
  auth_token: String,
}

impl Uploader {
  pub fn new(base_url: impl Into<String>, auth_token: impl Into<String>) -> Self {
    Self {
      client: reqwest::Client::new(),
      base_url: base_url.into(),
      auth_token: auth_token.into(),
    }
  }

  async fn post_json<T: serde::Serialize>(&self, path: &str, body: &T) -> Result<(), UploadError> {
    let url = format!("{}{}", self.base_url, path);
    let response = self
      .client
      .post(&url)
      .header(AUTH_HEADER, &self.auth_token)
      .json(body)
      .send()
      .await
      .map_err(|source| UploadError::Http { path: path.to_string(), source })?;

    if response.status().is_success() {
      Ok(())
    } else {
      Err(UploadError::Rejected { path: path.to_string(), status: response.status() })
    }
  }

  pub async fn upload_chunks(&self, batch: &ChunkBatchRequest) -> Result<(), UploadError> {
    self.post_json("/api/v1/world/chunks", batch).await
  }

  pub async fn upload_block_changes(&self, batch: &BlockChangeBatchRequest) -> Result<(), UploadError> {
    self.post_json("/api/v1/world/blocks", batch).await
  }

  pub async fn upload_players(&self, batch: &PlayerBatchRequest) -> Result<(), UploadError> {
    self.post_json("/api/v1/world/players", batch).await
  }

  pub async fn upload_entities(&self, batch: &EntityBatchRequest) -> Result<(), UploadError> {
    self.post_json("/api/v1/world/entities", batch).await
  }

  pub async fn upload_structures(&self, batch: &StructureBatchRequest) -> Result<(), UploadError> {
    self.post_json("/api/v1/world/structures", batch).await
  }

  pub async fn upload_queue_status(&self, payload: &QueueStatusPayload) -> Result<(), UploadError> {
    self.post_json("/api/v1/world/queue/status", payload).await
  }

  pub async fn chunk_exists(&self, dimension: cartograph_protocol::Dimension, chunk_x: i32, chunk_z: i32) -> Result<bool, UploadError> {
    let url = format!("{}/api/v1/world/chunk/exists", self.base_url);
    let response = self
      .client
      .get(&url)
      .header(AUTH_HEADER, &self.auth_token)
      .query(&[
        ("dimension", dimension.tag().to_string()),
        ("chunkX", chunk_x.to_string()),
        ("chunkZ", chunk_z.to_string()),
      ])
      .send()
      .await
      .map_err(|source| UploadError::Http { path: "/api/v1/world/chunk/exists".to_string(), source })?;

    Ok(response.status().is_success())
  }
}
