//! Diverging color gradient for vegetation-index previews.

use raster_core::IndexRaster;

/// Display range the index is clamped to before coloring.
pub const DISPLAY_MIN: f32 = -0.2;
pub const DISPLAY_MAX: f32 = 0.8;

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Fill color for no-data samples (light gray, opaque).
pub const NODATA_COLOR: Color = Color {
    r: 220,
    g: 220,
    b: 220,
    a: 255,
};

/// Red-to-green diverging ramp: bare soil and water toward red, dense
/// vegetation toward green.
const RAMP: [Color; 8] = [
    Color { r: 215, g: 48, b: 39, a: 255 },   // #d73027
    Color { r: 244, g: 109, b: 67, a: 255 },  // #f46d43
    Color { r: 253, g: 174, b: 97, a: 255 },  // #fdae61
    Color { r: 254, g: 224, b: 139, a: 255 }, // #fee08b
    Color { r: 217, g: 239, b: 139, a: 255 }, // #d9ef8b
    Color { r: 166, g: 217, b: 106, a: 255 }, // #a6d96a
    Color { r: 102, g: 189, b: 99, a: 255 },  // #66bd63
    Color { r: 26, g: 152, b: 80, a: 255 },   // #1a9850
];

/// Map an index value onto the display ramp.
///
/// Values are clamped to `[DISPLAY_MIN, DISPLAY_MAX]`, linearly rescaled
/// to [0, 1], and interpolated between adjacent ramp stops.
pub fn index_color(value: f32) -> Color {
    let clamped = value.max(DISPLAY_MIN).min(DISPLAY_MAX);
    let normalized = (clamped - DISPLAY_MIN) / (DISPLAY_MAX - DISPLAY_MIN);

    let segments = (RAMP.len() - 1) as f32;
    let position = normalized * segments;
    let lower = (position.floor() as usize).min(RAMP.len() - 2);
    let t = position - lower as f32;

    interpolate_color(RAMP[lower], RAMP[lower + 1], t)
}

/// Linear color interpolation
fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.max(0.0).min(1.0);
    let t_inv = 1.0 - t;

    Color::new(
        ((color1.r as f32 * t_inv) + (color2.r as f32 * t)) as u8,
        ((color1.g as f32 * t_inv) + (color2.g as f32 * t)) as u8,
        ((color1.b as f32 * t_inv) + (color2.b as f32 * t)) as u8,
        ((color1.a as f32 * t_inv) + (color2.a as f32 * t)) as u8,
    )
}

/// Rasterize an index raster to an RGBA pixel buffer of the requested
/// size, nearest-neighbor sampled.
///
/// No-data samples are filled with [`NODATA_COLOR`]; the preview carries
/// no axes or borders.
pub fn render_index_grid(raster: &IndexRaster, width: usize, height: usize) -> Vec<u8> {
    let (rows, cols) = raster.shape();
    let mut pixels = vec![0u8; width * height * 4];

    for y in 0..height {
        let src_row = (y * rows / height).min(rows - 1);
        for x in 0..width {
            let src_col = (x * cols / width).min(cols - 1);

            let color = if raster.mask[[src_row, src_col]] {
                index_color(raster.grid[[src_row, src_col]])
            } else {
                NODATA_COLOR
            };

            let pixel_idx = (y * width + x) * 4;
            pixels[pixel_idx] = color.r;
            pixels[pixel_idx + 1] = color.g;
            pixels[pixel_idx + 2] = color.b;
            pixels[pixel_idx + 3] = color.a;
        }
    }

    pixels
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_common::GeoTransform;
    use ndarray::arr2;

    #[test]
    fn test_extremes_hit_ramp_ends() {
        assert_eq!(index_color(DISPLAY_MIN), RAMP[0]);
        assert_eq!(index_color(DISPLAY_MAX), RAMP[7]);
    }

    #[test]
    fn test_out_of_range_clamped() {
        assert_eq!(index_color(-1.0), index_color(DISPLAY_MIN));
        assert_eq!(index_color(1.0), index_color(DISPLAY_MAX));
    }

    #[test]
    fn test_midrange_between_stops() {
        // 0.3 sits exactly at normalized 0.5, between stops 3 and 4.
        let c = index_color(0.3);
        assert!(c.r < RAMP[3].r && c.r >= RAMP[4].r);
        assert_eq!(c.a, 255);
    }

    #[test]
    fn test_render_fills_nodata_pixels() {
        let grid = arr2(&[[0.5_f32, -9999.0], [0.2, 0.7]]);
        let mask = arr2(&[[true, false], [true, true]]);
        let raster = IndexRaster {
            grid,
            mask,
            transform: GeoTransform::from_gdal([0.0, 1.0, 0.0, 0.0, 0.0, -1.0]),
            crs_wkt: String::new(),
        };

        let pixels = render_index_grid(&raster, 4, 4);
        assert_eq!(pixels.len(), 4 * 4 * 4);

        // Top-right quadrant maps to the masked sample.
        let idx = 3 * 4;
        assert_eq!(
            (pixels[idx], pixels[idx + 1], pixels[idx + 2]),
            (NODATA_COLOR.r, NODATA_COLOR.g, NODATA_COLOR.b)
        );

        // Top-left quadrant is valid and opaque.
        assert_eq!(pixels[3], 255);
        assert_ne!((pixels[0], pixels[1], pixels[2]), (220, 220, 220));
    }

    #[test]
    fn test_render_upsamples_to_requested_size() {
        let grid = arr2(&[[0.1_f32]]);
        let mask = arr2(&[[true]]);
        let raster = IndexRaster {
            grid,
            mask,
            transform: GeoTransform::from_gdal([0.0, 1.0, 0.0, 0.0, 0.0, -1.0]),
            crs_wkt: String::new(),
        };

        let pixels = render_index_grid(&raster, 16, 16);
        assert_eq!(pixels.len(), 16 * 16 * 4);
        // A single-sample raster renders a uniform image.
        let first = &pixels[0..4];
        assert!(pixels.chunks_exact(4).all(|p| p == first));
    }
}
