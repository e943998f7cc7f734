//! The imagery seam: bbox + dates in, computed index raster out.
//!
//! The production implementation runs the STAC pipeline (search, windowed
//! band read, NDVI compute); tests substitute a fake to exercise the HTTP
//! surface without the network.

use async_trait::async_trait;
use tracing::info;

use geo_common::{BoundingBox, DateRange, ProductError, ProductResult};
use raster_core::{compute_ndvi, IndexRaster};
use raster_io::read_index_bands;
use stac_client::{search_best_scene, SceneCatalog, StacApi, PRIMARY_CLOUD_THRESHOLD};

/// Produces an NDVI raster for a bbox and date range.
#[async_trait]
pub trait ImageryService: Send + Sync {
    async fn ndvi_raster(&self, bbox: BoundingBox, range: DateRange)
        -> ProductResult<IndexRaster>;
}

/// STAC-backed imagery pipeline.
pub struct StacImagery {
    catalog: Box<dyn SceneCatalog>,
}

impl StacImagery {
    /// Build against a STAC API root and collection.
    pub fn new(stac_root: &str, collection: &str) -> ProductResult<Self> {
        let catalog = StacApi::new(stac_root, collection)?;
        Ok(Self {
            catalog: Box::new(catalog),
        })
    }
}

#[async_trait]
impl ImageryService for StacImagery {
    async fn ndvi_raster(
        &self,
        bbox: BoundingBox,
        range: DateRange,
    ) -> ProductResult<IndexRaster> {
        let scene =
            search_best_scene(self.catalog.as_ref(), &bbox, &range, PRIMARY_CLOUD_THRESHOLD)
                .await?
                .ok_or(ProductError::NoImageryFound)?;

        info!(scene = %scene.id, cloud = scene.cloud_cover, "computing NDVI");

        // GDAL reads are blocking; keep them off the async workers.
        let raster = tokio::task::spawn_blocking(move || -> ProductResult<IndexRaster> {
            let (red, nir) = read_index_bands(&scene, &bbox)?;
            compute_ndvi(&red, &nir)
        })
        .await
        .map_err(|e| ProductError::DataIntegrity(format!("imagery worker failed: {}", e)))??;

        Ok(raster)
    }
}
