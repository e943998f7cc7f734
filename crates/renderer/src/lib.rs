//! Preview rendering for index rasters.
//!
//! Maps index values through a fixed diverging color gradient and encodes
//! the result as an RGBA PNG. Previews are lossy visualizations; the
//! quantitative product is the GeoTIFF.

pub mod gradient;
pub mod png;

use geo_common::{ProductError, ProductResult};
use raster_core::IndexRaster;

use gradient::render_index_grid;
use png::create_png;

/// Side length of the square preview image in pixels.
pub const PREVIEW_SIZE: usize = 384;

/// Render an index raster to a square PNG preview.
pub fn render_preview(raster: &IndexRaster) -> ProductResult<Vec<u8>> {
    let (rows, cols) = raster.shape();
    if rows == 0 || cols == 0 {
        return Err(ProductError::Render(
            "cannot render an empty raster".to_string(),
        ));
    }

    let pixels = render_index_grid(raster, PREVIEW_SIZE, PREVIEW_SIZE);
    create_png(&pixels, PREVIEW_SIZE, PREVIEW_SIZE)
}
