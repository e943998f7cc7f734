//! Error types for the NDVI product services.

use thiserror::Error;

/// Result type alias using ProductError.
pub type ProductResult<T> = Result<T, ProductError>;

/// Primary error type for raster product operations.
///
/// Every core operation fails fast with one of these kinds; the HTTP
/// boundary layer owns the mapping to status codes and never inspects
/// message text.
#[derive(Debug, Error)]
pub enum ProductError {
    // === Request Errors ===
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // === Catalog Errors ===
    #[error("No imagery found for the requested time/area")]
    NoImageryFound,

    // === Remote I/O Errors ===
    #[error("Remote read failed: {0}")]
    RemoteIo(String),

    // === Data Errors ===
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    // === Output Errors ===
    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Raster encoding failed: {0}")]
    Encode(String),
}

impl ProductError {
    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            ProductError::InvalidRequest(_) => 400,
            ProductError::NoImageryFound => 404,
            ProductError::RemoteIo(_) => 502,
            ProductError::DataIntegrity(_) | ProductError::Render(_) | ProductError::Encode(_) => {
                500
            }
        }
    }

    /// True for faults the server should log at error level.
    pub fn is_server_fault(&self) -> bool {
        self.http_status_code() >= 500
    }
}

impl From<std::io::Error> for ProductError {
    fn from(err: std::io::Error) -> Self {
        ProductError::RemoteIo(err.to_string())
    }
}

impl From<serde_json::Error> for ProductError {
    fn from(err: serde_json::Error) -> Self {
        ProductError::InvalidRequest(format!("JSON error: {}", err))
    }
}
