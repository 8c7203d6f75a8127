//! Typed errors for the extraction engine.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to keep fault
//! classification explicit for callers.

use thiserror::Error;

/// Failures a reporting backend can signal for a single query.
///
/// Permission denial stays a distinct variant because it is recoverable at
/// the session level: a driver extracting several properties can skip the
/// denied one and continue with the rest.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The authenticated principal cannot query this site.
    #[error("insufficient permission for site: {site}")]
    PermissionDenied { site: String },

    /// Network, quota, or protocol failure.
    #[error("query failed: {0}")]
    Request(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Failures surfaced by a fetch session.
///
/// Every variant is scoped to one session; rows accumulated before the
/// failing page are still handed back in the [`FetchOutcome`].
///
/// [`FetchOutcome`]: crate::fetcher::FetchOutcome
#[derive(Debug, Error)]
pub enum FetchError {
    /// The site was queried without sufficient rights.
    #[error("insufficient permission for site: {site}")]
    PermissionDenied { site: String },

    /// A page request failed (network, quota, malformed response).
    #[error("page request failed: {0}")]
    Request(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A response row carried the wrong number of dimension keys.
    #[error("row has {got} keys, expected {expected}")]
    RowShape { expected: usize, got: usize },

    /// The caller's cancellation token fired.
    #[error("extraction cancelled")]
    Cancelled,
}

impl From<ReportError> for FetchError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::PermissionDenied { site } => FetchError::PermissionDenied { site },
            ReportError::Request(source) => FetchError::Request(source),
        }
    }
}

impl FetchError {
    /// Whether a driver can reasonably skip this session and continue
    /// with others.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FetchError::PermissionDenied { .. })
    }
}

/// Result type alias for reporting-backend operations.
pub type ReportResult<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_error_maps_onto_fetch_error() {
        let err: FetchError = ReportError::PermissionDenied {
            site: "sc-domain:example.com".to_string(),
        }
        .into();
        assert!(matches!(err, FetchError::PermissionDenied { ref site } if site == "sc-domain:example.com"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn transient_errors_are_not_recoverable() {
        let err: FetchError = ReportError::Request("quota exceeded".into()).into();
        assert!(!err.is_recoverable());
    }
}
