//! NDVI product handlers: PNG preview and GeoTIFF download.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::Extension;
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::Json;
use serde_json::Value;

use geo_common::ProductError;
use raster_io::encode_geotiff;
use renderer::render_preview;

use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::parse_product_request;

/// POST /ndvi - NDVI preview image for a bbox and date range.
pub async fn ndvi_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let request = parse_product_request(&body)?;
    let raster = state
        .imagery
        .ndvi_raster(request.bbox, request.range)
        .await?;

    // Rendering compresses a full preview buffer; like the GeoTIFF path,
    // it stays off the async workers.
    let png = tokio::task::spawn_blocking(move || render_preview(&raster))
        .await
        .map_err(|e| ProductError::Render(format!("render worker failed: {}", e)))??;

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "image/png")
        .body(Body::from(png))
        .unwrap())
}

/// POST /ndvi/download - NDVI GeoTIFF for a bbox and date range.
pub async fn ndvi_download_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let request = parse_product_request(&body)?;
    let raster = state
        .imagery
        .ndvi_raster(request.bbox, request.range)
        .await?;

    // GeoTIFF encoding goes through GDAL; keep it off the async workers.
    let bytes = tokio::task::spawn_blocking(move || encode_geotiff(&raster))
        .await
        .map_err(|e| ProductError::Encode(format!("encode worker failed: {}", e)))??;

    let filename = format!("NDVI_{}_{}.tif", request.range.start, request.range.end);

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "image/tiff")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )
        .body(Body::from(bytes))
        .unwrap())
}
