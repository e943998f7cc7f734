//! Windowed raster grids with validity masks.

use ndarray::Array2;

use geo_common::{GeoTransform, ProductError};

/// Declared no-data sentinel for index rasters.
///
/// This value is substituted for invalid samples and declared in the
/// GeoTIFF metadata. A bare NaN never crosses the encoding boundary.
pub const NODATA: f32 = -9999.0;

/// A windowed single-band raster read from a source asset.
///
/// `grid` and `mask` always have the same shape; `mask[i] == true` marks a
/// valid sample. `transform` and `crs_wkt` together georeference every
/// sample of the window.
#[derive(Debug, Clone)]
pub struct RasterWindow {
    pub grid: Array2<f32>,
    pub mask: Array2<bool>,
    pub transform: GeoTransform,
    pub crs_wkt: String,
}

impl RasterWindow {
    /// Build a window, checking that grid and mask shapes agree.
    pub fn new(
        grid: Array2<f32>,
        mask: Array2<bool>,
        transform: GeoTransform,
        crs_wkt: String,
    ) -> Result<Self, ProductError> {
        if grid.dim() != mask.dim() {
            return Err(ProductError::DataIntegrity(format!(
                "grid shape {:?} does not match mask shape {:?}",
                grid.dim(),
                mask.dim()
            )));
        }
        Ok(Self {
            grid,
            mask,
            transform,
            crs_wkt,
        })
    }

    /// (rows, cols) of the window.
    pub fn shape(&self) -> (usize, usize) {
        self.grid.dim()
    }

    /// Divide every valid sample in place (reflectance scaling).
    pub fn scale(&mut self, divisor: f32) {
        self.grid.mapv_inplace(|v| v / divisor);
    }
}

/// A computed index raster.
///
/// Sample values are either valid ratios (nominally in [-1, 1], not
/// clamped) or the [`NODATA`] sentinel; `mask` mirrors that distinction.
#[derive(Debug, Clone)]
pub struct IndexRaster {
    pub grid: Array2<f32>,
    pub mask: Array2<bool>,
    pub transform: GeoTransform,
    pub crs_wkt: String,
}

impl IndexRaster {
    /// (rows, cols) of the raster.
    pub fn shape(&self) -> (usize, usize) {
        self.grid.dim()
    }

    /// Number of valid samples.
    pub fn valid_count(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }
}
