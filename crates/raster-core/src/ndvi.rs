//! Normalized difference vegetation index computation.

use ndarray::Array2;

use geo_common::ProductError;

use crate::window::{IndexRaster, RasterWindow, NODATA};

/// Compute NDVI = (nir - red) / (nir + red) elementwise.
///
/// Input windows must have equal shapes (the reader guarantees this for
/// co-registered bands; a mismatch here is a data-integrity fault, not
/// something to broadcast over). For each sample:
/// - both inputs valid and denominator non-zero: the ratio, unclamped;
/// - denominator exactly zero: no-data;
/// - either input masked: no-data.
///
/// The result carries the red band's transform and CRS, which the reader
/// has already verified against the NIR band.
pub fn compute_ndvi(red: &RasterWindow, nir: &RasterWindow) -> Result<IndexRaster, ProductError> {
    if red.shape() != nir.shape() {
        return Err(ProductError::DataIntegrity(format!(
            "band shape mismatch: red {:?} vs nir {:?}",
            red.shape(),
            nir.shape()
        )));
    }

    let (rows, cols) = red.shape();
    let mut grid = Array2::<f32>::from_elem((rows, cols), NODATA);
    let mut mask = Array2::<bool>::from_elem((rows, cols), false);

    for row in 0..rows {
        for col in 0..cols {
            if !red.mask[[row, col]] || !nir.mask[[row, col]] {
                continue;
            }
            let r = red.grid[[row, col]];
            let n = nir.grid[[row, col]];
            let denom = n + r;
            if denom == 0.0 {
                continue;
            }
            grid[[row, col]] = (n - r) / denom;
            mask[[row, col]] = true;
        }
    }

    Ok(IndexRaster {
        grid,
        mask,
        transform: red.transform,
        crs_wkt: red.crs_wkt.clone(),
    })
}
