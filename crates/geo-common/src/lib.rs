//! Shared geospatial types for the NDVI product services.
//!
//! This crate holds the request-level primitives (bounding boxes, date
//! ranges), the affine transform / pixel window math used by the raster
//! pipeline, and the service-wide error type.

pub mod bbox;
pub mod daterange;
pub mod error;
pub mod transform;

pub use bbox::BoundingBox;
pub use daterange::DateRange;
pub use error::{ProductError, ProductResult};
pub use transform::{GeoTransform, PixelWindow};
