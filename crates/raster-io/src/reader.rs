//! Windowed band reads from remote (or local) COG assets.

use gdal::spatial_ref::{AxisMappingStrategy, CoordTransform, SpatialRef};
use gdal::Dataset;
use ndarray::Array2;
use tracing::{debug, instrument};

use geo_common::{BoundingBox, GeoTransform, PixelWindow, ProductError, ProductResult};
use raster_core::RasterWindow;
use stac_client::{SceneReference, BAND_NIR, BAND_RED};

/// Sentinel-2 L2A digital numbers divide by this to give surface
/// reflectance.
pub const REFLECTANCE_SCALE: f32 = 10000.0;

/// Tolerance when comparing the two bands' geotransforms.
const TRANSFORM_EPSILON: f64 = 1e-6;

/// Read the red and NIR bands of `scene` over `bbox`, scaled to
/// reflectance.
///
/// The pixel window is derived once from the red band and applied to both
/// reads, after checking that the two assets share grid geometry. The
/// returned windows therefore always have identical shape, transform and
/// CRS.
#[instrument(skip(scene), fields(scene = %scene.id))]
pub fn read_index_bands(
    scene: &SceneReference,
    bbox: &BoundingBox,
) -> ProductResult<(RasterWindow, RasterWindow)> {
    let red_href = band_href(scene, BAND_RED)?;
    let nir_href = band_href(scene, BAND_NIR)?;

    let red_ds = open_dataset(red_href)?;
    let nir_ds = open_dataset(nir_href)?;
    check_co_registered(&red_ds, &nir_ds)?;

    let window = window_for_bbox(&red_ds, bbox)?;
    debug!(
        col_off = window.col_off,
        row_off = window.row_off,
        width = window.width,
        height = window.height,
        "reading band window"
    );

    let mut red = read_window(&red_ds, &window)?;
    let mut nir = read_window(&nir_ds, &window)?;
    red.scale(REFLECTANCE_SCALE);
    nir.scale(REFLECTANCE_SCALE);

    Ok((red, nir))
}

fn band_href<'a>(scene: &'a SceneReference, band: &str) -> ProductResult<&'a str> {
    scene.band_href(band).ok_or_else(|| {
        ProductError::DataIntegrity(format!("scene {} has no {} asset", scene.id, band))
    })
}

/// Prefix HTTP hrefs for GDAL's range-request virtual filesystem; local
/// paths pass through for tests.
fn vsi_path(href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        format!("/vsicurl/{}", href)
    } else {
        href.to_string()
    }
}

fn open_dataset(href: &str) -> ProductResult<Dataset> {
    let path = vsi_path(href);
    Dataset::open(&path)
        .map_err(|e| ProductError::RemoteIo(format!("failed to open {}: {}", path, e)))
}

/// Both band assets must live on the same pixel grid for the per-pixel
/// ratio to be meaningful.
fn check_co_registered(red: &Dataset, nir: &Dataset) -> ProductResult<()> {
    if red.raster_size() != nir.raster_size() {
        return Err(ProductError::DataIntegrity(format!(
            "band rasters differ in size: {:?} vs {:?}",
            red.raster_size(),
            nir.raster_size()
        )));
    }

    let red_gt = geo_transform(red)?;
    let nir_gt = geo_transform(nir)?;
    let aligned = red_gt
        .to_gdal()
        .iter()
        .zip(nir_gt.to_gdal().iter())
        .all(|(a, b)| (a - b).abs() <= TRANSFORM_EPSILON);
    if !aligned {
        return Err(ProductError::DataIntegrity(
            "band rasters are not co-registered".to_string(),
        ));
    }

    if red.projection() != nir.projection() {
        return Err(ProductError::DataIntegrity(
            "band rasters use different coordinate systems".to_string(),
        ));
    }

    Ok(())
}

fn geo_transform(dataset: &Dataset) -> ProductResult<GeoTransform> {
    let gt = dataset
        .geo_transform()
        .map_err(|e| ProductError::DataIntegrity(format!("asset has no geotransform: {}", e)))?;
    Ok(GeoTransform::from_gdal(gt))
}

/// Map the geographic bbox into the dataset's CRS and derive the covering
/// pixel window.
///
/// All four corners are transformed; in a projected CRS the box edges
/// curve, so opposite corners alone can under-cover the request.
fn window_for_bbox(dataset: &Dataset, bbox: &BoundingBox) -> ProductResult<PixelWindow> {
    let transform = geo_transform(dataset)?;
    let (raster_width, raster_height) = dataset.raster_size();

    let mut target = dataset
        .spatial_ref()
        .map_err(|e| ProductError::DataIntegrity(format!("asset has no CRS: {}", e)))?;
    let mut wgs84 = SpatialRef::from_epsg(4326)
        .map_err(|e| ProductError::DataIntegrity(format!("EPSG:4326 unavailable: {}", e)))?;
    // x before y on both sides regardless of the authority's declared axis
    // order; the geotransform is always x-first.
    wgs84.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
    target.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);

    let ct = CoordTransform::new(&wgs84, &target).map_err(|e| {
        ProductError::DataIntegrity(format!("cannot transform into scene CRS: {}", e))
    })?;

    let corners = bbox.corners();
    let mut xs: Vec<f64> = corners.iter().map(|&(lon, _)| lon).collect();
    let mut ys: Vec<f64> = corners.iter().map(|&(_, lat)| lat).collect();
    ct.transform_coords(&mut xs, &mut ys, &mut [])
        .map_err(|e| ProductError::DataIntegrity(format!("bbox reprojection failed: {}", e)))?;

    let min_x = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let max_x = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min_y = ys.iter().copied().fold(f64::INFINITY, f64::min);
    let max_y = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    PixelWindow::from_bounds(
        &transform,
        min_x,
        min_y,
        max_x,
        max_y,
        raster_width,
        raster_height,
    )
}

fn read_window(dataset: &Dataset, window: &PixelWindow) -> ProductResult<RasterWindow> {
    let transform = geo_transform(dataset)?;
    let band = dataset
        .rasterband(1)
        .map_err(|e| ProductError::RemoteIo(format!("failed to open band 1: {}", e)))?;
    let nodata = band.no_data_value();

    let buffer = band
        .read_as::<f32>(
            (window.col_off as isize, window.row_off as isize),
            (window.width, window.height),
            (window.width, window.height),
            None,
        )
        .map_err(|e| ProductError::RemoteIo(format!("band window read failed: {}", e)))?;
    let (_, data) = buffer.into_shape_and_vec();

    let grid = Array2::from_shape_vec((window.height, window.width), data)
        .map_err(|e| ProductError::DataIntegrity(format!("band buffer shape mismatch: {}", e)))?;
    let mask = grid.mapv(|v| {
        if !v.is_finite() {
            return false;
        }
        match nodata {
            Some(nd) => f64::from(v) != nd,
            None => true,
        }
    });

    RasterWindow::new(
        grid,
        mask,
        transform.for_window(window.col_off, window.row_off),
        dataset.projection(),
    )
}
