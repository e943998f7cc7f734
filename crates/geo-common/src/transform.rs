//! Affine geotransform and pixel window math.
//!
//! A geotransform maps pixel (column, row) coordinates to coordinates in the
//! raster's CRS. The six parameters follow the GDAL convention:
//! `x = origin_x + col * pixel_width + row * row_rotation` and
//! `y = origin_y + col * col_rotation + row * pixel_height`
//! (`pixel_height` is negative for north-up rasters).

use serde::{Deserialize, Serialize};

use crate::error::ProductError;

/// Six-parameter affine transform from pixel space to CRS coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub pixel_width: f64,
    pub row_rotation: f64,
    pub origin_y: f64,
    pub col_rotation: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Build from a GDAL-ordered array
    /// `[origin_x, pixel_width, row_rotation, origin_y, col_rotation, pixel_height]`.
    pub fn from_gdal(gt: [f64; 6]) -> Self {
        Self {
            origin_x: gt[0],
            pixel_width: gt[1],
            row_rotation: gt[2],
            origin_y: gt[3],
            col_rotation: gt[4],
            pixel_height: gt[5],
        }
    }

    /// Convert back to the GDAL array order.
    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.origin_x,
            self.pixel_width,
            self.row_rotation,
            self.origin_y,
            self.col_rotation,
            self.pixel_height,
        ]
    }

    /// Map fractional pixel (col, row) to CRS (x, y).
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        let x = self.origin_x + col * self.pixel_width + row * self.row_rotation;
        let y = self.origin_y + col * self.col_rotation + row * self.pixel_height;
        (x, y)
    }

    /// Derive the transform for a window read at (col_off, row_off).
    ///
    /// The translation is composed in pixel space before the pixel-to-CRS
    /// mapping, so pixel (0, 0) of the windowed grid maps to exactly the
    /// same point as pixel (col_off, row_off) of the source grid. Rotation
    /// and scale terms carry through unchanged.
    pub fn for_window(&self, col_off: usize, row_off: usize) -> Self {
        let (origin_x, origin_y) = self.apply(col_off as f64, row_off as f64);
        Self {
            origin_x,
            origin_y,
            ..*self
        }
    }

    /// True when the transform has no rotation terms (axis-aligned grid).
    pub fn is_rectilinear(&self) -> bool {
        self.row_rotation == 0.0 && self.col_rotation == 0.0
    }
}

/// An integer pixel window into a source raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelWindow {
    pub col_off: usize,
    pub row_off: usize,
    pub width: usize,
    pub height: usize,
}

impl PixelWindow {
    /// Compute the minimal pixel window covering a CRS-space bounding box,
    /// clamped to the raster extent.
    ///
    /// Fractional edge pixels are included (floor on the near edge, ceil on
    /// the far edge). A box falling entirely outside the raster yields a
    /// `DataIntegrity` error; callers treat that as "requested area not
    /// covered by the scene". Rotated rasters are not supported.
    pub fn from_bounds(
        transform: &GeoTransform,
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
        raster_width: usize,
        raster_height: usize,
    ) -> Result<Self, ProductError> {
        if !transform.is_rectilinear() {
            return Err(ProductError::DataIntegrity(
                "rotated geotransforms are not supported".to_string(),
            ));
        }
        if transform.pixel_width == 0.0 || transform.pixel_height == 0.0 {
            return Err(ProductError::DataIntegrity(
                "degenerate geotransform with zero pixel size".to_string(),
            ));
        }

        // Fractional pixel coordinates of the box edges. pixel_height is
        // negative for north-up rasters, so min/max per axis are taken after
        // the division rather than assumed from the input ordering.
        let col_a = snap_to_grid((min_x - transform.origin_x) / transform.pixel_width);
        let col_b = snap_to_grid((max_x - transform.origin_x) / transform.pixel_width);
        let row_a = snap_to_grid((min_y - transform.origin_y) / transform.pixel_height);
        let row_b = snap_to_grid((max_y - transform.origin_y) / transform.pixel_height);

        let col_start = col_a.min(col_b).floor();
        let col_stop = col_a.max(col_b).ceil();
        let row_start = row_a.min(row_b).floor();
        let row_stop = row_a.max(row_b).ceil();

        // Clamp to the raster extent.
        let col_start = col_start.max(0.0) as usize;
        let row_start = row_start.max(0.0) as usize;
        let col_stop = (col_stop.max(0.0) as usize).min(raster_width);
        let row_stop = (row_stop.max(0.0) as usize).min(raster_height);

        if col_start >= col_stop || row_start >= row_stop {
            return Err(ProductError::DataIntegrity(
                "requested window falls outside the scene coverage".to_string(),
            ));
        }

        Ok(Self {
            col_off: col_start,
            row_off: row_start,
            width: col_stop - col_start,
            height: row_stop - row_start,
        })
    }
}

/// Snap a fractional pixel coordinate sitting within rounding error of a
/// pixel boundary onto that boundary.
///
/// Degree-valued bounds rarely divide exactly; without this, a coordinate
/// like 10.000000000000014 ceils to 11 and the window grows by a row.
fn snap_to_grid(v: f64) -> f64 {
    let rounded = v.round();
    if (v - rounded).abs() < 1e-6 {
        rounded
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utm_transform() -> GeoTransform {
        // 10 m Sentinel-2 style grid, north-up.
        GeoTransform::from_gdal([500000.0, 10.0, 0.0, 4100000.0, 0.0, -10.0])
    }

    #[test]
    fn test_apply_origin() {
        let t = utm_transform();
        assert_eq!(t.apply(0.0, 0.0), (500000.0, 4100000.0));
        assert_eq!(t.apply(2.0, 3.0), (500020.0, 4099970.0));
    }

    #[test]
    fn test_gdal_roundtrip() {
        let gt = [500000.0, 10.0, 0.0, 4100000.0, 0.0, -10.0];
        assert_eq!(GeoTransform::from_gdal(gt).to_gdal(), gt);
    }

    #[test]
    fn test_window_transform_matches_source_offset() {
        // Output transform at pixel (0,0) must equal the source transform at
        // pixel (col_off, row_off).
        let t = utm_transform();
        let (col_off, row_off) = (17usize, 42usize);
        let windowed = t.for_window(col_off, row_off);
        assert_eq!(
            windowed.apply(0.0, 0.0),
            t.apply(col_off as f64, row_off as f64)
        );
        assert_eq!(windowed.pixel_width, t.pixel_width);
        assert_eq!(windowed.pixel_height, t.pixel_height);
    }

    #[test]
    fn test_window_from_bounds_exact_pixels() {
        let t = utm_transform();
        // A box covering pixels cols 10..20, rows 5..15 exactly.
        let window =
            PixelWindow::from_bounds(&t, 500100.0, 4099850.0, 500200.0, 4099950.0, 1000, 1000)
                .unwrap();
        assert_eq!(window.col_off, 10);
        assert_eq!(window.row_off, 5);
        assert_eq!(window.width, 10);
        assert_eq!(window.height, 10);
    }

    #[test]
    fn test_window_includes_fractional_edges() {
        let t = utm_transform();
        // Box edges falling mid-pixel must still be covered.
        let window =
            PixelWindow::from_bounds(&t, 500105.0, 4099855.0, 500195.0, 4099945.0, 1000, 1000)
                .unwrap();
        assert_eq!(window.col_off, 10);
        assert_eq!(window.row_off, 5);
        assert_eq!(window.width, 10);
        assert_eq!(window.height, 10);
    }

    #[test]
    fn test_window_tolerates_inexact_degree_bounds() {
        // 0.01-degree pixels do not divide decimal bounds exactly; the
        // window must still cover exactly the intended pixels.
        let t = GeoTransform::from_gdal([10.0, 0.01, 0.0, 50.0, 0.0, -0.01]);
        let window = PixelWindow::from_bounds(&t, 10.05, 49.90, 10.10, 49.95, 20, 20).unwrap();
        assert_eq!(window.col_off, 5);
        assert_eq!(window.row_off, 5);
        assert_eq!(window.width, 5);
        assert_eq!(window.height, 5);
    }

    #[test]
    fn test_window_clamped_to_raster() {
        let t = utm_transform();
        let window =
            PixelWindow::from_bounds(&t, 499900.0, 4099990.0, 500050.0, 4100100.0, 1000, 1000)
                .unwrap();
        assert_eq!(window.col_off, 0);
        assert_eq!(window.row_off, 0);
        assert_eq!(window.width, 5);
        assert_eq!(window.height, 1);
    }

    #[test]
    fn test_window_outside_coverage_errors() {
        let t = utm_transform();
        let err =
            PixelWindow::from_bounds(&t, 600000.0, 4099850.0, 600100.0, 4099950.0, 1000, 1000)
                .unwrap_err();
        assert!(matches!(err, ProductError::DataIntegrity(_)));
    }

    #[test]
    fn test_rotated_transform_rejected() {
        let mut t = utm_transform();
        t.row_rotation = 0.5;
        assert!(
            PixelWindow::from_bounds(&t, 500100.0, 4099850.0, 500200.0, 4099950.0, 1000, 1000)
                .is_err()
        );
    }
}
