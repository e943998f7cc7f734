//! HTTP error mapping for `ProductError`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use geo_common::ProductError;

/// Wrapper turning a `ProductError` into a JSON error response.
///
/// Status codes come from `ProductError::http_status_code`; handler code
/// never picks statuses itself. Server faults are logged here so every
/// 5xx leaves a trace.
pub struct ApiError(pub ProductError);

impl From<ProductError> for ApiError {
    fn from(err: ProductError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.0.is_server_fault() {
            tracing::error!("request failed: {}", self.0);
        } else {
            tracing::debug!("request rejected: {}", self.0);
        }

        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
