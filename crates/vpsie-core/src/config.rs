//! Configuration for VPSie clients.
//!
//! A [`VpsieConfig`] is built once by the embedding application and handed to
//! the client builder. Nothing in this crate reads global state or environment
//! variables.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use validator::Validate;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.vpsie.com";

/// Header that carries the API token.
pub const DEFAULT_AUTH_HEADER: &str = "Vpsie-Auth";

/// Connection settings for the VPSie API.
///
/// The token is omitted from both serialized and `Debug` output.
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct VpsieConfig {
    /// API base URL; resource paths are appended to it
    #[validate(url)]
    pub base_url: String,

    /// API token sent with every request
    #[serde(default, skip_serializing)]
    pub api_token: Option<String>,

    /// Name of the header carrying the token
    #[validate(length(min = 1))]
    #[serde(default = "default_auth_header")]
    pub auth_header: String,

    /// Per-attempt request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Total attempts per call, including the first
    #[validate(range(min = 1, max = 10))]
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_auth_header() -> String {
    DEFAULT_AUTH_HEADER.to_string()
}

const fn default_request_timeout_secs() -> u64 {
    30
}

const fn default_max_attempts() -> u32 {
    3
}

impl VpsieConfig {
    /// Create a configuration for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or validation fails.
    pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
        let config = Self {
            base_url: base_url.into(),
            ..Self::default()
        };

        config
            .validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;

        Ok(config)
    }

    /// Set the API token.
    #[must_use]
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Override the authentication header name.
    #[must_use]
    pub fn with_auth_header(mut self, header: impl Into<String>) -> Self {
        self.auth_header = header.into();
        self
    }

    /// Set the request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Set the total number of attempts per call.
    #[must_use]
    pub const fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl fmt::Debug for VpsieConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VpsieConfig")
            .field("base_url", &self.base_url)
            .field("has_token", &self.api_token.is_some())
            .field("auth_header", &self.auth_header)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

impl Default for VpsieConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_token: None,
            auth_header: default_auth_header(),
            request_timeout_secs: default_request_timeout_secs(),
            max_attempts: default_max_attempts(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new() {
        let config = VpsieConfig::new("https://api.example.com").unwrap();
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.auth_header, DEFAULT_AUTH_HEADER);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.max_attempts, 3);
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_config_invalid_url() {
        let result = VpsieConfig::new("not-a-url");
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_config_builder() {
        let config = VpsieConfig::new("https://api.example.com")
            .unwrap()
            .with_api_token("secret")
            .with_auth_header("Authorization")
            .with_timeout(60)
            .with_max_attempts(5);

        assert_eq!(config.api_token.as_deref(), Some("secret"));
        assert_eq!(config.auth_header, "Authorization");
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.max_attempts, 5);
    }

    #[test]
    fn test_config_default() {
        let config = VpsieConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_token_is_never_serialized() {
        let config = VpsieConfig::default().with_api_token("top-secret");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("top-secret"));

        let back: VpsieConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.base_url, config.base_url);
        assert!(back.api_token.is_none());
    }

    #[test]
    fn config_debug_hides_token() {
        let config = VpsieConfig::default().with_api_token("top-secret-token");
        let debug = format!("{config:?}");
        assert!(!debug.contains("top-secret-token"));
        assert!(debug.contains("has_token: true"));
        assert!(debug.contains("api.vpsie.com"));

        let debug = format!("{:?}", VpsieConfig::default());
        assert!(debug.contains("has_token: false"));
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let config: VpsieConfig = serde_json::from_str(
            r#"{"base_url": "https://api.vpsie.com", "api_token": "abc"}"#,
        )
        .unwrap();
        assert_eq!(config.api_token.as_deref(), Some("abc"));
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_config_validation_ranges() {
        let mut config = VpsieConfig::default();
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.request_timeout_secs = 30;
        config.max_attempts = 0;
        assert!(config.validate().is_err());

        config.max_attempts = 11;
        assert!(config.validate().is_err());

        config.max_attempts = 3;
        assert!(config.validate().is_ok());
    }
}
