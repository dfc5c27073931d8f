//! End-to-end scenarios exercising the router directly via `tower::Service`
//! (no real TCP listener needed to drive these).

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use cartograph_protocol::AUTH_HEADER;
use cartograph_server::{build_router, AppState, ServerConfig};
use tempfile::TempDir;
use tower::ServiceExt;

fn test_config(dir: &TempDir) -> ServerConfig {
  ServerConfig {
    host: "127.0.0.1".into(),
    port: 0,
    auth_token: "test-token".into(),
    data_dir: dir.path().to_path_buf(),
    log_filter: "info".into(),
  }
}

async fn post(router: axum::Router, path: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
  let request = Request::builder()
    .method("POST")
    .uri(path)
    .header("content-type", "application/json")
    .header(AUTH_HEADER, "test-token")
    .body(Body::from(body.to_string()))
    .unwrap();
  let response = router.oneshot(request).await.unwrap();
  let status = response.status();
  let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
  let json = if bytes.is_empty() { serde_json::Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, json)
}

#[tokio::test]
async fn health_requires_no_token() {
  let dir = TempDir::new().unwrap();
  let state = Arc::new(AppState::new(test_config(&dir)));
  let router = build_router(state);
  let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
  let response = router.oneshot(request).await.unwrap();
  assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_token_is_rejected() {
  let dir = TempDir::new().unwrap();
  let state = Arc::new(AppState::new(test_config(&dir)));
  let router = build_router(state);
  let request = Request::builder().uri("/api/v1/world/chunk/exists?dimension=overworld&chunk_x=0&chunk_z=0").body(Body::empty()).unwrap();
  let response = router.oneshot(request).await.unwrap();
  assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn s3_tile_paint_via_http() {
  let dir = TempDir::new().unwrap();
  let state = Arc::new(AppState::new(test_config(&dir)));
  let router = build_router(state);

  let body = serde_json::json!({
    "chunks": [{
      "dimension": "overworld",
      "chunkX": 0,
      "chunkZ": 0,
      "blocks": [
        {"x": 0, "y": 64, "z": 0, "type": "stone", "mapColor": {"r": 125, "g": 125, "b": 125, "a": 255}},
        {"x": 0, "y": 70, "z": 1, "type": "stone", "mapColor": {"r": 125, "g": 125, "b": 125, "a": 255}}
      ]
    }]
  });
  let (status, _) = post(router.clone(), "/api/v1/world/chunks", body).await;
  assert_eq!(status, StatusCode::OK);

  let request = Request::builder()
    .uri("/tiles/overworld/block/0/0/0.png")
    .header(AUTH_HEADER, "test-token")
    .body(Body::empty())
    .unwrap();
  let response = router.oneshot(request).await.unwrap();
  assert_eq!(response.status(), StatusCode::OK);
  let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
  let image = image::load_from_memory(&bytes).unwrap().to_rgba8();
  assert_eq!(image.get_pixel(0, 0).0, [107, 107, 107, 255]);
  assert_eq!(image.get_pixel(0, 1).0, [125, 125, 125, 255]);
}

#[tokio::test]
async fn s6_structure_merge_via_http() {
  let dir = TempDir::new().unwrap();
  let state = Arc::new(AppState::new(test_config(&dir)));
  let router = build_router(state);

  let first = serde_json::json!({
    "structures": [{
      "structureType": "village",
      "x": 7, "y": 64, "z": 7,
      "dimension": "overworld",
      "extents": {"minX": 0, "maxX": 15, "minZ": 0, "maxZ": 15},
      "discoveredAt": 1000
    }]
  });
  let (status, _) = post(router.clone(), "/api/v1/world/structures", first).await;
  assert_eq!(status, StatusCode::OK);

  let second = serde_json::json!({
    "structures": [{
      "structureType": "village",
      "x": 23, "y": 64, "z": 7,
      "dimension": "overworld",
      "extents": {"minX": 16, "maxX": 31, "minZ": 0, "maxZ": 15},
      "discoveredAt": 2000
    }]
  });
  let (status, _) = post(router, "/api/v1/world/structures", second).await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn delete_tiles_wipes_and_recreates_tree() {
  let dir = TempDir::new().unwrap();
  let state = Arc::new(AppState::new(test_config(&dir)));
  let router = build_router(state);

  let body = serde_json::json!({
    "chunks": [{
      "dimension": "overworld", "chunkX": 0, "chunkZ": 0,
      "blocks": [{"x": 0, "y": 64, "z": 0, "type": "stone", "mapColor": {"r": 1, "g": 1, "b": 1, "a": 255}}]
    }]
  });
  post(router.clone(), "/api/v1/world/chunks", body).await;

  let request = Request::builder().method("DELETE").uri("/tiles").header(AUTH_HEADER, "test-token").body(Body::empty()).unwrap();
  let response = router.clone().oneshot(request).await.unwrap();
  assert_eq!(response.status(), StatusCode::NO_CONTENT);

  let request = Request::builder().uri("/tiles/overworld/block/0/0/0.png").header(AUTH_HEADER, "test-token").body(Body::empty()).unwrap();
  let response = router.oneshot(request).await.unwrap();
  assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
