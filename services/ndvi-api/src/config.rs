//! Service configuration from environment variables.

/// Runtime configuration for the NDVI API.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// STAC API root URL.
    pub stac_root: String,

    /// STAC collection id to search.
    pub stac_collection: String,

    /// Base URL of the managed analysis backend.
    pub analysis_root: String,
}

impl ServiceConfig {
    /// Load configuration, falling back to public defaults.
    pub fn from_env() -> Self {
        let stac_root = std::env::var("STAC_API_URL")
            .unwrap_or_else(|_| "https://earth-search.aws.element84.com/v1".to_string());
        let stac_collection =
            std::env::var("STAC_COLLECTION").unwrap_or_else(|_| "sentinel-2-l2a".to_string());
        let analysis_root = std::env::var("ANALYSIS_API_URL")
            .unwrap_or_else(|_| "http://localhost:5001".to_string());

        Self {
            stac_root,
            stac_collection,
            analysis_root,
        }
    }
}
