//! Handlers forwarding to the managed analysis backend.

use std::sync::Arc;

use axum::extract::Extension;
use axum::Json;
use serde_json::Value;

use crate::analysis::{DownloadUrl, MapLayer};
use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::{optional_dates, optional_scale, require_bbox};

/// POST /ndvi/view - median NDVI composite as a map layer.
///
/// Dates default to the trailing year when omitted.
pub async fn ndvi_view_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<MapLayer>, ApiError> {
    let bbox = require_bbox(&body)?;
    let range = optional_dates(&body)?;
    let layer = state.analysis.ndvi_view(&bbox, &range).await?;
    Ok(Json(layer))
}

/// POST /landcover - land-cover clip export URL.
pub async fn landcover_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<DownloadUrl>, ApiError> {
    let bbox = require_bbox(&body)?;
    let scale = optional_scale(&body)?;
    let url = state.analysis.landcover_url(&bbox, scale).await?;
    Ok(Json(url))
}

/// POST /landcover/view - land-cover clip as a map layer.
pub async fn landcover_view_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<MapLayer>, ApiError> {
    let bbox = require_bbox(&body)?;
    let layer = state.analysis.landcover_view(&bbox).await?;
    Ok(Json(layer))
}
