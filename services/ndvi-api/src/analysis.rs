//! The managed analysis backend seam.
//!
//! The backend computes median composites and land-cover visualizations
//! server-side and answers with either a download URL or a tile-layer
//! handle. It is a black box behind this trait; credential handling lives
//! on its side of the wire.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument};

use geo_common::{BoundingBox, DateRange, ProductError, ProductResult};

/// A tile-layer handle for map clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapLayer {
    #[serde(rename = "mapId")]
    pub map_id: String,
    pub token: String,
}

/// A one-shot download link for an exported raster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadUrl {
    pub url: String,
}

/// Remote analysis operations over bbox/date-range parameters.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Median NDVI composite as a map layer.
    async fn ndvi_view(&self, bbox: &BoundingBox, range: &DateRange) -> ProductResult<MapLayer>;

    /// Land-cover clip export at the given resolution (meters).
    async fn landcover_url(&self, bbox: &BoundingBox, scale: u32) -> ProductResult<DownloadUrl>;

    /// Land-cover clip as a map layer.
    async fn landcover_view(&self, bbox: &BoundingBox) -> ProductResult<MapLayer>;
}

/// reqwest implementation forwarding to the analysis service's HTTP API.
pub struct HttpAnalysisBackend {
    client: Client,
    root: String,
}

impl HttpAnalysisBackend {
    pub fn new(root: impl Into<String>) -> ProductResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| ProductError::RemoteIo(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            root: root.into().trim_end_matches('/').to_string(),
        })
    }

    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> ProductResult<T> {
        let url = format!("{}{}", self.root, endpoint);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProductError::RemoteIo(format!("analysis backend unreachable: {}", e)))?;

        let status = response.status();
        if status.is_client_error() {
            // The backend validated the parameters and said no.
            let message = response.text().await.unwrap_or_default();
            return Err(ProductError::InvalidRequest(format!(
                "analysis backend rejected request: {}",
                message
            )));
        }
        if !status.is_success() {
            return Err(ProductError::RemoteIo(format!(
                "analysis backend returned {} from {}",
                status, url
            )));
        }

        debug!(endpoint, "analysis backend call complete");
        response
            .json()
            .await
            .map_err(|e| ProductError::RemoteIo(format!("malformed analysis response: {}", e)))
    }
}

#[async_trait]
impl AnalysisBackend for HttpAnalysisBackend {
    #[instrument(skip(self))]
    async fn ndvi_view(&self, bbox: &BoundingBox, range: &DateRange) -> ProductResult<MapLayer> {
        let body = json!({
            "bbox": {
                "west": bbox.west, "south": bbox.south,
                "east": bbox.east, "north": bbox.north,
            },
            "startDate": range.start.to_string(),
            "endDate": range.end.to_string(),
        });
        self.post("/ndvi/view", body).await
    }

    #[instrument(skip(self))]
    async fn landcover_url(&self, bbox: &BoundingBox, scale: u32) -> ProductResult<DownloadUrl> {
        let body = json!({
            "bbox": {
                "west": bbox.west, "south": bbox.south,
                "east": bbox.east, "north": bbox.north,
            },
            "scale": scale,
        });
        self.post("/landcover", body).await
    }

    #[instrument(skip(self))]
    async fn landcover_view(&self, bbox: &BoundingBox) -> ProductResult<MapLayer> {
        let body = json!({
            "bbox": {
                "west": bbox.west, "south": bbox.south,
                "east": bbox.east, "north": bbox.north,
            },
        });
        self.post("/landcover/view", body).await
    }
}
