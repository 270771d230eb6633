//! Error types for the cache engine and its HTTP front-end
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the crate.
///
/// Engine operations never fail; only construction (`Configuration`) and the
/// HTTP layer produce errors.
#[derive(Error, Debug)]
pub enum CacheError {
    /// A configuration field was rejected at construction time
    #[error("invalid configuration for `{field}`: {reason}")]
    Configuration { field: &'static str, reason: String },

    /// Key not found (absent or expired)
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Memoization key derivation failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    /// Builds a `Configuration` error for `field`.
    pub fn configuration(field: &'static str, reason: impl Into<String>) -> Self {
        CacheError::Configuration {
            field,
            reason: reason.into(),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Configuration { .. } | CacheError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, CacheError>;
