//! `GET /tiles/{..}.png` and `DELETE /tiles`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use cartograph_protocol::{validate_zoom, Dimension, MapType, TileCoord};

use crate::state::AppState;

fn parse_dimension(raw: &str) -> Option<Dimension> {
  match raw {
    "overworld" => Some(Dimension::Overworld),
    "nether" => Some(Dimension::Nether),
    "the_end" => Some(Dimension::TheEnd),
    _ => None,
  }
}

fn parse_map_type(raw: &str) -> Option<MapType> {
  match raw {
    "block" => Some(MapType::Block),
    "height" => Some(MapType::Height),
    "density" => Some(MapType::Density),
    _ => None,
  }
}

pub async fn get_tile(
  State(state): State<Arc<AppState>>,
  Path((dimension, map_type, zoom, x, z_png)): Path<(String, String, u8, i32, String)>,
) -> Response {
  let Some(dimension) = parse_dimension(&dimension) else {
    return StatusCode::NOT_FOUND.into_response();
  };
  let Some(map_type) = parse_map_type(&map_type) else {
    return StatusCode::NOT_FOUND.into_response();
  };
  if validate_zoom(zoom).is_err() {
    return StatusCode::NOT_FOUND.into_response();
  }
  let Some(z_str) = z_png.strip_suffix(".png") else {
    return StatusCode::NOT_FOUND.into_response();
  };
  let Ok(z) = z_str.parse::<i32>() else {
    return StatusCode::NOT_FOUND.into_response();
  };
  let coord = TileCoord::new(dimension, map_type, zoom, x, z);
  match state.tile_store.read(coord).await {
    Ok(Some(bytes)) => (
      [(header::CONTENT_TYPE, "image/png"), (header::CACHE_CONTROL, "public, max-age=60")],
      bytes,
    )
      .into_response(),
    Ok(None) => StatusCode::NOT_FOUND.into_response(),
    Err(error) => {
      tracing::error!(%error, "tile read failed");
      StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
  }
}

pub async fn delete_tiles(State(state): State<Arc<AppState>>) -> Response {
  match state.tile_store.clear_all().await {
    Ok(()) => StatusCode::NO_CONTENT.into_response(),
    Err(error) => {
      tracing::error!(%error, "clearing tile tree failed");
      StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
  }
}
