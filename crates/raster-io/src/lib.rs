//! Raster I/O against GDAL: windowed COG band reads and in-memory GeoTIFF
//! encoding.
//!
//! Remote assets are opened through the `/vsicurl/` virtual filesystem, so
//! only the requested pixel window is fetched; encoding goes through
//! `/vsimem/` so a response body never touches disk. Everything here is
//! synchronous GDAL work and is expected to run on a blocking thread.

pub mod geotiff;
pub mod reader;

pub use geotiff::encode_geotiff;
pub use reader::{read_index_bands, REFLECTANCE_SCALE};
