//! TPG client error types

use thiserror::Error;

use crate::models::ApiError;
use crate::transport::TransportError;

/// Maximum number of characters of a response body kept in errors
pub const MAX_ERROR_BODY_CHARS: usize = 1024;

/// HTTP statuses on which the API sends an [`ApiError`] envelope
pub const API_ERROR_STATUSES: [u16; 5] = [400, 403, 404, 410, 503];

/// Errors that can occur during TPG API calls
#[derive(Debug, Error)]
pub enum TpgError {
    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network-level failure, the request may not have reached the API
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A 200 response whose body is not the expected JSON
    #[error("Failed to decode response: {source}")]
    Decode {
        /// The JSON error
        #[source]
        source: serde_json::Error,
        /// The raw body
        body: String,
    },

    /// The API reported an error
    #[error("{error} (HTTP {status})")]
    Api {
        /// HTTP status of the response
        status: u16,
        /// The decoded error envelope
        #[source]
        error: ApiError,
    },

    /// Any other non-200 response
    #[error("Unknown response {status}: {body}")]
    UnknownResponse {
        /// HTTP status of the response
        status: u16,
        /// Best-effort body text
        body: String,
    },
}

impl TpgError {
    /// Returns true if repeating the call may succeed
    ///
    /// The client never retries on its own.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(TransportError::Initialisation(_)) => false,
            Self::Transport(_) => true,
            Self::Api { status, .. } => *status == 503,
            Self::UnknownResponse { status, .. } => *status >= 500,
            Self::Configuration(_) | Self::Decode { .. } => false,
        }
    }

    /// The API error envelope, if the server sent one
    #[must_use]
    pub const fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api { error, .. } => Some(error),
            _ => None,
        }
    }

    /// HTTP status of the response that caused this error, if any
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::UnknownResponse { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Cut `body` to [`MAX_ERROR_BODY_CHARS`] characters
pub(crate) fn truncate_body(mut body: String) -> String {
    if let Some((idx, _)) = body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        body.truncate(idx);
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::Timestamp;

    fn api_error() -> ApiError {
        ApiError {
            timestamp: Timestamp::parse("2018-12-14T08:34:36+0100").unwrap(),
            error_code: 503,
            error_message: "Maintenance".to_string(),
        }
    }

    #[test]
    fn test_retryable_errors() {
        assert!(TpgError::Transport(TransportError::Timeout { timeout_secs: 30 }).is_retryable());
        assert!(
            TpgError::Transport(TransportError::ConnectionFailed("reset".to_string()))
                .is_retryable()
        );
        assert!(
            TpgError::Api {
                status: 503,
                error: api_error()
            }
            .is_retryable()
        );
        assert!(
            TpgError::UnknownResponse {
                status: 502,
                body: String::new()
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_non_retryable_errors() {
        assert!(!TpgError::Configuration("test".to_string()).is_retryable());
        assert!(
            !TpgError::Transport(TransportError::Initialisation("tls".to_string())).is_retryable()
        );
        assert!(
            !TpgError::Api {
                status: 404,
                error: api_error()
            }
            .is_retryable()
        );
        assert!(
            !TpgError::UnknownResponse {
                status: 418,
                body: String::new()
            }
            .is_retryable()
        );
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(
            !TpgError::Decode {
                source,
                body: "{".to_string()
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_error_display() {
        let err = TpgError::Api {
            status: 503,
            error: api_error(),
        };
        let text = err.to_string();
        assert!(text.contains("Maintenance"));
        assert!(text.contains("503"));

        let err = TpgError::UnknownResponse {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown response 500: boom");
    }

    #[test]
    fn test_accessors() {
        let err = TpgError::Api {
            status: 404,
            error: api_error(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.api_error().unwrap().error_message, "Maintenance");

        let err = TpgError::Configuration("x".to_string());
        assert_eq!(err.status(), None);
        assert!(err.api_error().is_none());
    }

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("short".to_string()), "short");

        let long = "é".repeat(MAX_ERROR_BODY_CHARS + 10);
        let truncated = truncate_body(long);
        assert_eq!(truncated.chars().count(), MAX_ERROR_BODY_CHARS);
    }
}
