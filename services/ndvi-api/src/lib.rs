//! NDVI API service library.
//!
//! Exposes the router builder so integration tests can drive the full HTTP
//! surface with injected imagery and analysis back ends.

pub mod analysis;
pub mod config;
pub mod error;
pub mod handlers;
pub mod imagery;
pub mod state;
pub mod validation;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // STAC/COG pipeline
        .route("/ndvi", post(handlers::ndvi::ndvi_handler))
        .route("/ndvi/download", post(handlers::ndvi::ndvi_download_handler))
        // Managed analysis backend
        .route("/ndvi/view", post(handlers::landcover::ndvi_view_handler))
        .route("/landcover", post(handlers::landcover::landcover_handler))
        .route(
            "/landcover/view",
            post(handlers::landcover::landcover_view_handler),
        )
        // Health
        .route("/health", get(handlers::health::health_handler))
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
