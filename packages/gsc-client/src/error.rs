//! Error types for the Search Console client.

use thiserror::Error;

/// Result type for Search Console client operations.
pub type Result<T> = std::result::Result<T, GscError>;

/// Search Console client errors.
#[derive(Debug, Error)]
pub enum GscError {
    /// Configuration error (missing token, invalid settings)
    #[error("configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, timeout, body decode)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The authenticated principal lacks rights on a property
    #[error("insufficient permission for site: {site}")]
    PermissionDenied { site: String },

    /// Non-2xx API response
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}
