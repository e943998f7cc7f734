//! In-memory GeoTIFF encoding through GDAL's `/vsimem/` filesystem.

use gdal::raster::{Buffer, RasterCreationOptions};
use gdal::vsi::{get_vsi_mem_file_bytes_owned, unlink_mem_file};
use gdal::DriverManager;
use tracing::debug;
use uuid::Uuid;

use geo_common::{ProductError, ProductResult};
use raster_core::{IndexRaster, NODATA};

/// Encode an index raster as a single-band, DEFLATE-compressed GeoTIFF.
///
/// The nodata sentinel is declared in the band metadata, and the raster's
/// transform and CRS are carried into the file, so the output opens
/// georeferenced in any GIS. The bytes are assembled under a unique
/// `/vsimem/` path that is consumed (and removed) on return.
pub fn encode_geotiff(raster: &IndexRaster) -> ProductResult<Vec<u8>> {
    let (rows, cols) = raster.shape();
    if rows == 0 || cols == 0 {
        return Err(ProductError::Encode("cannot encode an empty raster".to_string()));
    }
    let path = format!("/vsimem/{}.tif", Uuid::new_v4());
    // The in-memory file outlives GDAL errors; without the guard every
    // failed encode would leak its raster for the life of the process.
    let mut cleanup = MemFileCleanup {
        path: &path,
        armed: true,
    };

    let driver = DriverManager::get_driver_by_name("GTiff").map_err(encode_err)?;
    let options = RasterCreationOptions::from_iter(["COMPRESS=DEFLATE"]);
    let mut dataset = driver
        .create_with_band_type_with_options::<f32, _>(&path, cols, rows, 1, &options)
        .map_err(encode_err)?;

    dataset
        .set_geo_transform(&raster.transform.to_gdal())
        .map_err(encode_err)?;
    if !raster.crs_wkt.is_empty() {
        dataset.set_projection(&raster.crs_wkt).map_err(encode_err)?;
    }

    {
        let mut band = dataset.rasterband(1).map_err(encode_err)?;
        band.set_no_data_value(Some(f64::from(NODATA)))
            .map_err(encode_err)?;
        let data: Vec<f32> = raster.grid.iter().copied().collect();
        let mut buffer = Buffer::new((cols, rows), data);
        band.write((0, 0), (cols, rows), &mut buffer)
            .map_err(encode_err)?;
    }

    dataset.flush_cache().map_err(encode_err)?;
    // The dataset must be closed before the file bytes are final.
    drop(dataset);

    let bytes = get_vsi_mem_file_bytes_owned(&path)
        .map_err(|e| ProductError::Encode(format!("failed to read encoded GeoTIFF: {}", e)))?;
    // Taking the bytes removed the file; the guard only covers failures.
    cleanup.armed = false;
    debug!(bytes = bytes.len(), rows, cols, "GeoTIFF encoded");
    Ok(bytes)
}

fn encode_err(e: gdal::errors::GdalError) -> ProductError {
    ProductError::Encode(e.to_string())
}

/// Unlinks the backing `/vsimem/` file on drop unless disarmed.
struct MemFileCleanup<'a> {
    path: &'a str,
    armed: bool,
}

impl Drop for MemFileCleanup<'_> {
    fn drop(&mut self) {
        if self.armed {
            // Nothing to do about an unlink failure at this point.
            let _ = unlink_mem_file(self.path);
        }
    }
}
