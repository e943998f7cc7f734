//! Strict request-body validation.
//!
//! Bodies are inspected field by field before any remote I/O, so a
//! malformed request never costs a catalog query or an asset open.
//! Failures name the offending field.

use serde_json::Value;

use geo_common::{BoundingBox, DateRange, ProductError, ProductResult};

/// Default spatial resolution (meters) for land-cover exports.
pub const DEFAULT_LANDCOVER_SCALE: u32 = 100;

/// A validated NDVI product request.
#[derive(Debug, Clone)]
pub struct ProductRequest {
    pub bbox: BoundingBox,
    pub range: DateRange,
}

/// Validate a `/ndvi` or `/ndvi/download` body: bbox plus explicit dates.
pub fn parse_product_request(body: &Value) -> ProductResult<ProductRequest> {
    let bbox = require_bbox(body)?;
    let range = require_dates(body)?;
    Ok(ProductRequest { bbox, range })
}

/// Extract and validate the `bbox` object.
pub fn require_bbox(body: &Value) -> ProductResult<BoundingBox> {
    let bbox = body
        .get("bbox")
        .ok_or_else(|| ProductError::InvalidRequest("missing required field: bbox".to_string()))?;
    if !bbox.is_object() {
        return Err(ProductError::InvalidRequest(
            "bbox must be an object with west, south, east, north".to_string(),
        ));
    }

    let west = require_number(bbox, "bbox.west")?;
    let south = require_number(bbox, "bbox.south")?;
    let east = require_number(bbox, "bbox.east")?;
    let north = require_number(bbox, "bbox.north")?;

    BoundingBox::new(west, south, east, north)
}

/// Extract `startDate`/`endDate`; both are required.
pub fn require_dates(body: &Value) -> ProductResult<DateRange> {
    let start = require_string(body, "startDate")?;
    let end = require_string(body, "endDate")?;
    DateRange::parse(start, end)
}

/// Extract `startDate`/`endDate`, defaulting to the trailing year when
/// both are absent. Supplying only one of the two is an error.
pub fn optional_dates(body: &Value) -> ProductResult<DateRange> {
    match (body.get("startDate"), body.get("endDate")) {
        (None, None) => Ok(DateRange::trailing_year()),
        (Some(_), None) | (None, Some(_)) => Err(ProductError::InvalidRequest(
            "startDate and endDate must be supplied together".to_string(),
        )),
        (Some(_), Some(_)) => require_dates(body),
    }
}

/// Extract the optional `scale` field (meters per pixel, positive integer).
pub fn optional_scale(body: &Value) -> ProductResult<u32> {
    match body.get("scale") {
        None => Ok(DEFAULT_LANDCOVER_SCALE),
        Some(v) => {
            let scale = v.as_u64().ok_or_else(|| {
                ProductError::InvalidRequest("scale must be a positive integer".to_string())
            })?;
            if scale == 0 || scale > u64::from(u32::MAX) {
                return Err(ProductError::InvalidRequest(
                    "scale must be a positive integer".to_string(),
                ));
            }
            Ok(scale as u32)
        }
    }
}

fn require_number(obj: &Value, field: &str) -> ProductResult<f64> {
    let key = field.rsplit('.').next().unwrap_or(field);
    obj.get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| ProductError::InvalidRequest(format!("{} must be a number", field)))
}

fn require_string<'a>(obj: &'a Value, field: &str) -> ProductResult<&'a str> {
    obj.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ProductError::InvalidRequest(format!("{} must be a string", field)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_body() -> Value {
        json!({
            "bbox": {"west": 38.7, "south": 9.0, "east": 38.8, "north": 9.1},
            "startDate": "2024-01-01",
            "endDate": "2024-03-01"
        })
    }

    #[test]
    fn test_valid_request_parses() {
        let request = parse_product_request(&valid_body()).unwrap();
        assert_eq!(request.bbox.west, 38.7);
        assert_eq!(request.range.to_interval(), "2024-01-01/2024-03-01");
    }

    #[test]
    fn test_missing_bbox_field_named() {
        let mut body = valid_body();
        body["bbox"].as_object_mut().unwrap().remove("north");
        let err = parse_product_request(&body).unwrap_err();
        assert!(err.to_string().contains("bbox.north"));
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_non_numeric_bbox_rejected() {
        let mut body = valid_body();
        body["bbox"]["west"] = json!("38.7");
        assert!(parse_product_request(&body).is_err());
    }

    #[test]
    fn test_bbox_must_be_object() {
        let body = json!({
            "bbox": [38.7, 9.0, 38.8, 9.1],
            "startDate": "2024-01-01",
            "endDate": "2024-03-01"
        });
        let err = parse_product_request(&body).unwrap_err();
        assert!(err.to_string().contains("bbox"));
    }

    #[test]
    fn test_missing_dates_rejected() {
        let mut body = valid_body();
        body.as_object_mut().unwrap().remove("endDate");
        let err = parse_product_request(&body).unwrap_err();
        assert!(err.to_string().contains("endDate"));
    }

    #[test]
    fn test_optional_dates_default_to_trailing_year() {
        let body = json!({"bbox": {"west": 0.0, "south": 0.0, "east": 1.0, "north": 1.0}});
        let range = optional_dates(&body).unwrap();
        assert!(range.start < range.end);
    }

    #[test]
    fn test_optional_dates_reject_half_range() {
        let body = json!({"startDate": "2024-01-01"});
        assert!(optional_dates(&body).is_err());
    }

    #[test]
    fn test_scale_default_and_bounds() {
        assert_eq!(optional_scale(&json!({})).unwrap(), 100);
        assert_eq!(optional_scale(&json!({"scale": 30})).unwrap(), 30);
        assert!(optional_scale(&json!({"scale": 0})).is_err());
        assert!(optional_scale(&json!({"scale": -10})).is_err());
        assert!(optional_scale(&json!({"scale": "100"})).is_err());
    }
}
