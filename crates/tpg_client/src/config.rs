//! TPG client configuration

use serde::{Deserialize, Serialize};
use url::Url;

use crate::request::DEFAULT_BASE_URL;
use crate::transport::DEFAULT_TIMEOUT_SECS;

/// Configuration for the TPG open-data API client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TpgConfig {
    /// API key issued by TPG, sent as the `key` query parameter
    #[serde(default)]
    pub api_key: String,

    /// Base URL of the API, including the version prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Overall request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for TpgConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl TpgConfig {
    /// Production configuration for the given API key
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            api_key: "test-key".to_string(),
            timeout_secs: 5,
            ..Default::default()
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.trim().is_empty() {
            return Err("api_key must not be empty".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }

        self.parsed_base_url().map(|_| ())
    }

    /// Parse `base_url`
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is malformed or not HTTP(S).
    pub fn parsed_base_url(&self) -> Result<Url, String> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| format!("base_url {:?} is invalid: {e}", self.base_url))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!("base_url must be http or https, got {}", url.scheme()));
        }

        Ok(url)
    }
}
