//! Date range handling for imagery queries.

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProductError;

/// An inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a validated range. Requires start <= end.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ProductError> {
        if start > end {
            return Err(ProductError::InvalidRequest(format!(
                "startDate ({}) must not be after endDate ({})",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse from a pair of `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, ProductError> {
        let start = parse_date("startDate", start)?;
        let end = parse_date("endDate", end)?;
        Self::new(start, end)
    }

    /// The trailing 365 days ending today (UTC).
    ///
    /// Used by the analysis-backend endpoints when the request omits dates.
    pub fn trailing_year() -> Self {
        let today = Utc::now().date_naive();
        Self {
            start: today - Duration::days(365),
            end: today,
        }
    }

    /// STAC datetime interval form: `start/end`.
    pub fn to_interval(&self) -> String {
        format!("{}/{}", self.start, self.end)
    }
}

fn parse_date(field: &str, s: &str) -> Result<NaiveDate, ProductError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        ProductError::InvalidRequest(format!(
            "{} must be a YYYY-MM-DD date, got '{}'",
            field, s
        ))
    })
}
