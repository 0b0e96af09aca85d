//! Error types for VPSie API calls.
//!
//! Every call through the request pipeline produces either typed data or exactly
//! one [`Error`]. The variants map onto a small taxonomy exposed by [`ErrorKind`]
//! so callers can branch on the failure class without matching every field.

use serde::Serialize;
use thiserror::Error;

/// Main error type for VPSie operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A request body could not be serialized, or a response body could not be
    /// parsed as JSON or into the requested shape.
    #[error("Decode error: {message}")]
    Decode {
        /// What failed to (de)serialize
        message: String,
        /// HTTP status of the response being decoded, if any
        status: Option<u16>,
        /// Raw response body, if any
        body: Option<String>,
    },

    /// Network-level failure after exhausting retries, or an expired deadline.
    #[error("Transport error after {attempts} attempt(s): {message}")]
    Transport {
        /// Description of the last underlying failure
        message: String,
        /// Number of attempts made
        attempts: u32,
        /// Whether the failure was a timeout
        timed_out: bool,
        /// Status of the last response when the last failure was a 5xx
        status: Option<u16>,
        /// Body of the last response when the last failure was a 5xx
        body: Option<String>,
    },

    /// Non-2xx response whose body is not a VPSie envelope.
    #[error("HTTP error {status}: {body}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The API reported a business-level failure (`"error": true`).
    #[error("API error (status {status}): {message}")]
    Envelope {
        /// HTTP status code
        status: u16,
        /// Best-effort message extracted from the body
        message: String,
        /// Raw response body
        body: String,
    },

    /// The caller cancelled the call.
    #[error("Request cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The request could not be built from the given arguments.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`Error::Decode`]
    Decode,
    /// See [`Error::Transport`]
    Transport,
    /// See [`Error::HttpStatus`]
    HttpStatus,
    /// See [`Error::Envelope`]
    Envelope,
    /// See [`Error::Cancelled`]
    Cancelled,
    /// See [`Error::ConfigError`]
    Config,
    /// See [`Error::InvalidRequest`]
    InvalidRequest,
}

/// Specialized result type for VPSie operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build a decode error that carries the offending response.
    pub fn decode(message: impl Into<String>, status: Option<u16>, body: Option<String>) -> Self {
        Self::Decode {
            message: message.into(),
            status,
            body,
        }
    }

    /// Returns the failure class of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::HttpStatus { .. } => ErrorKind::HttpStatus,
            Self::Envelope { .. } => ErrorKind::Envelope,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::ConfigError(_) => ErrorKind::Config,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }

    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Decode { .. } => "DECODE_ERROR",
            Self::Transport {
                timed_out: true, ..
            } => "TIMEOUT",
            Self::Transport { .. } => "TRANSPORT_ERROR",
            Self::HttpStatus { .. } => "HTTP_ERROR",
            Self::Envelope { .. } => "API_ERROR",
            Self::Cancelled => "CANCELLED",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
        }
    }

    /// HTTP status of the response that caused this error, if one was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } | Self::Envelope { status, .. } => Some(*status),
            Self::Decode { status, .. } | Self::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Raw response body attached to this error, for diagnostics.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::HttpStatus { body, .. } | Self::Envelope { body, .. } => Some(body),
            Self::Decode { body, .. } | Self::Transport { body, .. } => body.as_deref(),
            _ => None,
        }
    }

    /// Returns true for transport failures, which a caller may choose to retry
    /// at a higher level once the built-in attempts are exhausted.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::decode(err.to_string(), None, None)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::ConfigError(format!("Invalid URL: {err}"))
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(timed_out: bool) -> Error {
        Error::Transport {
            message: "connection reset".to_string(),
            attempts: 3,
            timed_out,
            status: None,
            body: None,
        }
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::decode("x", None, None).kind(), ErrorKind::Decode);
        assert_eq!(transport(false).kind(), ErrorKind::Transport);
        assert_eq!(
            Error::HttpStatus {
                status: 404,
                body: "nope".into()
            }
            .kind(),
            ErrorKind::HttpStatus
        );
        assert_eq!(
            Error::Envelope {
                status: 200,
                message: "denied".into(),
                body: "{}".into()
            }
            .kind(),
            ErrorKind::Envelope
        );
        assert_eq!(Error::Cancelled.kind(), ErrorKind::Cancelled);
        assert_eq!(Error::ConfigError("x".into()).kind(), ErrorKind::Config);
        assert_eq!(
            Error::InvalidRequest("x".into()).kind(),
            ErrorKind::InvalidRequest
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(transport(true).error_code(), "TIMEOUT");
        assert_eq!(transport(false).error_code(), "TRANSPORT_ERROR");
        assert_eq!(Error::Cancelled.error_code(), "CANCELLED");
        assert_eq!(
            Error::decode("bad", None, None).error_code(),
            "DECODE_ERROR"
        );
    }

    #[test]
    fn test_error_display() {
        let err = Error::Envelope {
            status: 200,
            message: "Backup not found".to_string(),
            body: r#"{"error":true}"#.to_string(),
        };
        assert_eq!(err.to_string(), "API error (status 200): Backup not found");
        assert_eq!(
            transport(false).to_string(),
            "Transport error after 3 attempt(s): connection reset"
        );
    }

    #[test]
    fn test_status_and_body_accessors() {
        let err = Error::HttpStatus {
            status: 502,
            body: "<html>bad gateway</html>".to_string(),
        };
        assert_eq!(err.status(), Some(502));
        assert_eq!(err.body(), Some("<html>bad gateway</html>"));

        assert_eq!(Error::Cancelled.status(), None);
        assert_eq!(Error::Cancelled.body(), None);
        assert!(transport(false).is_retryable());
        assert!(!Error::Cancelled.is_retryable());
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let vpsie_err: Error = err.into();
        assert_eq!(vpsie_err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_from_url_parse_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        let vpsie_err: Error = err.into();
        assert!(matches!(vpsie_err, Error::ConfigError(_)));
    }
}
