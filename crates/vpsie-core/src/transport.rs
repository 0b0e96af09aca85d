//! The HTTP boundary.
//!
//! [`HttpTransport`] performs exactly one send with no retry and no status-code
//! interpretation. The retry loop in [`crate::client`] sits on top of it, which
//! lets tests drive that loop with a mock transport.

use crate::request::RequestDescriptor;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use std::fmt;

/// Status, body and content type of a received response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: Bytes,
    /// `Content-Type` header, if present
    pub content_type: Option<String>,
}

impl RawResponse {
    /// Build a response with a JSON content type.
    #[must_use]
    pub fn json(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
            content_type: Some(crate::request::JSON_CONTENT_TYPE.to_string()),
        }
    }

    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns true for 5xx statuses.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status < 600
    }

    /// Body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// A send that produced no HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// The attempt timed out.
    Timeout(String),
    /// The connection could not be established or was dropped.
    Network(String),
    /// Anything else; not worth retrying.
    Other(String),
}

impl TransportFailure {
    /// Whether another attempt may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Network(_))
    }

    /// Whether the failure was a timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout(msg) => write!(f, "timed out: {msg}"),
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Other(msg) => f.write_str(msg),
        }
    }
}

impl From<reqwest::Error> for TransportFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() || err.is_request() || err.is_body() {
            Self::Network(err.to_string())
        } else {
            Self::Other(err.to_string())
        }
    }
}

/// Single-shot HTTP send.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send `request` once and return whatever response arrives.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportFailure`] when no response was received.
    async fn send(&self, request: &RequestDescriptor) -> Result<RawResponse, TransportFailure>;
}

/// [`HttpTransport`] backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Wrap an existing client.
    #[must_use]
    pub const fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &RequestDescriptor) -> Result<RawResponse, TransportFailure> {
        let mut builder = self
            .http
            .request(request.method().into(), request.url().clone())
            .headers(request.headers().clone());

        if let Some(body) = request.body() {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;

        Ok(RawResponse {
            status,
            body,
            content_type,
        })
    }
}
