//! HTTP transport seam
//!
//! [`HttpTransport`] is the only thing the client needs from an HTTP stack:
//! perform a GET, hand back the status and the body, enforce a timeout.
//! [`ReqwestTransport`] is the default implementation.

use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// `User-Agent` sent with every request
pub const USER_AGENT: &str = concat!("tpg_client/", env!("CARGO_PKG_VERSION"));

/// Default overall request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Network-level failures
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP client could not be built
    #[error("HTTP client initialisation failed: {0}")]
    Initialisation(String),

    /// Connection to the API failed (DNS, TLS, refused, reset)
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The request did not complete in time
    #[error("Request timed out after {timeout_secs} seconds")]
    Timeout {
        /// The timeout duration in seconds
        timeout_secs: u64,
    },

    /// The response body could not be read
    #[error("Failed to read response body: {0}")]
    Body(String),
}

/// Status and body of one HTTP response
#[derive(Debug)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Body text, or the reason it could not be read
    pub body: Result<String, TransportError>,
}

impl HttpResponse {
    /// A response whose body was read successfully
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: Ok(body.into()),
        }
    }
}

/// Performs HTTP GET requests for the client
///
/// Implementations must enforce their own timeout. Sharing one transport
/// between concurrent callers is only as safe as the implementation.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// GET `url` and return the response
    async fn get(&self, url: Url) -> Result<HttpResponse, TransportError>;
}

/// [`HttpTransport`] backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout_secs: u64,
}

impl ReqwestTransport {
    /// Create a transport with the given timeout and the crate's user agent
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(timeout_secs: u64) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError::Initialisation(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs,
        })
    }

    /// Wrap a caller-configured `reqwest` client
    ///
    /// The client's own timeout policy applies; `timeout_secs` is only used
    /// to report timeouts.
    #[must_use]
    pub const fn from_client(client: Client, timeout_secs: u64) -> Self {
        Self {
            client,
            timeout_secs,
        }
    }

    fn map_send_error(&self, e: &reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            TransportError::ConnectionFailed(e.to_string())
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: Url) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| self.map_send_error(&e))?;

        let status = response.status();
        debug!(%status, "Response received");

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout {
                    timeout_secs: self.timeout_secs,
                }
            } else {
                TransportError::Body(e.to_string())
            }
        });

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_has_version() {
        assert!(USER_AGENT.starts_with("tpg_client/"));
        assert!(USER_AGENT.len() > "tpg_client/".len());
    }

    #[test]
    fn test_new_transport() {
        let transport = ReqwestTransport::new(DEFAULT_TIMEOUT_SECS).unwrap();
        assert_eq!(transport.timeout_secs, 30);
    }

    #[test]
    fn test_from_client_keeps_reported_timeout() {
        let transport = ReqwestTransport::from_client(Client::new(), 12);
        assert_eq!(transport.timeout_secs, 12);
    }

    #[test]
    fn test_response_constructor() {
        let response = HttpResponse::new(StatusCode::OK, "{}");
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body.unwrap(), "{}");
    }

    #[test]
    fn test_error_display() {
        let err = TransportError::Timeout { timeout_secs: 30 };
        assert!(err.to_string().contains("30"));

        let err = TransportError::ConnectionFailed("dns".to_string());
        assert!(err.to_string().contains("dns"));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_connection_failure() {
        let transport = ReqwestTransport::new(2).unwrap();
        let url = Url::parse("http://127.0.0.1:1/GetStops.json").unwrap();
        let err = transport.get(url).await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::ConnectionFailed(_) | TransportError::Timeout { .. }
        ));
    }
}
