//! Errors raised while talking to the video platform or its OAuth endpoints.

use catalog::CatalogError;
use thiserror::Error;

/// Errors that can occur when interacting with the platform
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Transport-level failure (DNS, TLS, connection reset, ...)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform answered with a non-success status
    #[error("{operation} failed with status {status}: {body}")]
    Api {
        operation: String,
        status: u16,
        body: String,
    },

    /// A response arrived but could not be interpreted
    #[error("Invalid response from platform: {0}")]
    InvalidResponse(String),

    /// A value inside an otherwise valid response was malformed
    #[error("Invalid value in platform response: {0}")]
    Catalog(#[from] CatalogError),

    /// A resource the run depends on does not exist
    #[error("{resource} '{id}' not found")]
    NotFound { resource: String, id: String },

    /// Client secret or token missing, unreadable, or rejected
    #[error("Credential error: {0}")]
    Credentials(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PlatformError {
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, PlatformError>;
