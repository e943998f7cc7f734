//! In-memory raster types and the NDVI computation.
//!
//! Everything in this crate is pure and synchronous: no I/O, no GDAL. The
//! windowed band reader in `raster-io` produces [`RasterWindow`]s, and the
//! encoder/renderer consume the [`IndexRaster`] built here.

pub mod ndvi;
pub mod window;

pub use ndvi::compute_ndvi;
pub use window::{IndexRaster, RasterWindow, NODATA};
