//! Errors returned by BaaS operations.

use thiserror::Error;

/// Errors that can occur when talking to the BaaS.
#[derive(Debug, Error)]
pub enum BaasError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The BaaS answered with a non-success status.
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    /// A row could not be decoded into the expected type.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// No row matched.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Credentials were rejected or the identity call failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The realtime socket failed.
    #[error("Realtime error: {0}")]
    Realtime(String),

    /// The backend refused the operation.
    #[error("{0}")]
    Unavailable(String),

    /// A configured URL could not be parsed or joined.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl BaasError {
    /// Whether the failure was "no such row".
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_)) || matches!(self, Self::Api { status: 404, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_carries_message() {
        let err = BaasError::Api {
            status: 409,
            message: "duplicate key value".to_string(),
        };
        assert_eq!(err.to_string(), "duplicate key value (HTTP 409)");
    }

    #[test]
    fn test_not_found() {
        assert!(BaasError::NotFound("orders/1".into()).is_not_found());
        assert!(
            BaasError::Api {
                status: 404,
                message: String::new()
            }
            .is_not_found()
        );
        assert!(!BaasError::Unavailable("down".into()).is_not_found());
    }
}
