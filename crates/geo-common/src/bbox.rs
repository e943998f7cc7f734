//! Geographic bounding box type and validation.

use serde::{Deserialize, Serialize};

use crate::error::ProductError;

/// A geographic bounding box in EPSG:4326 (longitude/latitude degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    /// Create a validated bounding box.
    ///
    /// Requires west < east, south < north, and all coordinates finite and
    /// within geographic range.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Result<Self, ProductError> {
        let bbox = Self {
            west,
            south,
            east,
            north,
        };
        bbox.validate()?;
        Ok(bbox)
    }

    /// Check the bbox invariants, returning an `InvalidRequest` naming the
    /// problem when violated.
    pub fn validate(&self) -> Result<(), ProductError> {
        for (name, v) in [
            ("west", self.west),
            ("south", self.south),
            ("east", self.east),
            ("north", self.north),
        ] {
            if !v.is_finite() {
                return Err(ProductError::InvalidRequest(format!(
                    "bbox.{} is not a finite number",
                    name
                )));
            }
        }

        if self.west >= self.east {
            return Err(ProductError::InvalidRequest(format!(
                "bbox west ({}) must be less than east ({})",
                self.west, self.east
            )));
        }
        if self.south >= self.north {
            return Err(ProductError::InvalidRequest(format!(
                "bbox south ({}) must be less than north ({})",
                self.south, self.north
            )));
        }

        if self.west < -180.0 || self.east > 180.0 {
            return Err(ProductError::InvalidRequest(
                "bbox longitudes must be within [-180, 180]".to_string(),
            ));
        }
        if self.south < -90.0 || self.north > 90.0 {
            return Err(ProductError::InvalidRequest(
                "bbox latitudes must be within [-90, 90]".to_string(),
            ));
        }

        Ok(())
    }

    /// Width of the bounding box in degrees.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Height of the bounding box in degrees.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// The four corners as (lon, lat) pairs: SW, SE, NW, NE.
    ///
    /// Reprojection to a projected CRS must transform all four corners;
    /// opposite corners alone under-cover the box when edges curve.
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.west, self.south),
            (self.east, self.south),
            (self.west, self.north),
            (self.east, self.north),
        ]
    }

    /// STAC search array form: [west, south, east, north].
    pub fn to_array(&self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_bbox() {
        let bbox = BoundingBox::new(38.7, 9.0, 38.8, 9.1).unwrap();
        assert_eq!(bbox.west, 38.7);
        assert_eq!(bbox.north, 9.1);
        assert!((bbox.width() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_inverted_axes_rejected() {
        assert!(BoundingBox::new(38.8, 9.0, 38.7, 9.1).is_err());
        assert!(BoundingBox::new(38.7, 9.1, 38.8, 9.0).is_err());
    }

    #[test]
    fn test_non_finite_rejected() {
        let err = BoundingBox::new(f64::NAN, 9.0, 38.8, 9.1).unwrap_err();
        assert!(err.to_string().contains("west"));
        assert!(BoundingBox::new(38.7, 9.0, f64::INFINITY, 9.1).is_err());
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(BoundingBox::new(-181.0, 9.0, 38.8, 9.1).is_err());
        assert!(BoundingBox::new(38.7, 9.0, 38.8, 91.0).is_err());
    }

    #[test]
    fn test_corners_cover_box() {
        let bbox = BoundingBox::new(-10.0, -5.0, 10.0, 5.0).unwrap();
        let corners = bbox.corners();
        assert_eq!(corners.len(), 4);
        assert!(corners.iter().any(|&(x, y)| x == -10.0 && y == -5.0));
        assert!(corners.iter().any(|&(x, y)| x == 10.0 && y == 5.0));
    }
}
