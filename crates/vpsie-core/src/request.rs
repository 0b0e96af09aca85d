//! Request construction.
//!
//! A [`RequestDescriptor`] is everything the transport needs to send one call:
//! verb, absolute URL with query string, headers and an already-serialized JSON
//! body. It is immutable once built.

use crate::error::{Error, Result};
use crate::pagination::ListOptions;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use std::fmt;
use url::Url;

/// MIME type of every request and response body.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// HTTP verbs used by the VPSie API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl HttpMethod {
    /// Upper-case verb.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::GET,
            HttpMethod::Post => Self::POST,
            HttpMethod::Put => Self::PUT,
            HttpMethod::Delete => Self::DELETE,
        }
    }
}

/// A fully assembled outgoing request.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: HttpMethod,
    url: Url,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl RequestDescriptor {
    /// Assemble a request against `base_url`.
    ///
    /// `path` is appended to the base URL and may carry its own query string;
    /// `options` are appended as further query parameters. `auth_headers` are
    /// copied onto the request next to the JSON content headers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] for an empty path and [`Error::Decode`]
    /// when the body cannot be serialized. Nothing is sent either way.
    pub fn build<B>(
        base_url: &Url,
        auth_headers: &HeaderMap,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        options: Option<&ListOptions>,
    ) -> Result<Self>
    where
        B: Serialize + ?Sized,
    {
        let path = path.trim();
        if path.is_empty() {
            return Err(Error::InvalidRequest("request path must not be empty".into()));
        }

        let body = body
            .map(|payload| {
                serde_json::to_vec(payload).map(Bytes::from).map_err(|err| {
                    Error::decode(
                        format!("Failed to serialize {method} {path} request body: {err}"),
                        None,
                        None,
                    )
                })
            })
            .transpose()?;

        let separator = if path.starts_with('/') { "" } else { "/" };
        let joined = format!(
            "{}{separator}{path}",
            base_url.as_str().trim_end_matches('/')
        );
        let mut url = Url::parse(&joined).map_err(|err| {
            Error::InvalidRequest(format!("Invalid request path `{path}`: {err}"))
        })?;

        if let Some(options) = options {
            let pairs = options.to_pairs();
            if !pairs.is_empty() {
                url.query_pairs_mut().extend_pairs(pairs);
            }
        }

        let mut headers = auth_headers.clone();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));

        Ok(Self {
            method,
            url,
            headers,
            body,
        })
    }

    /// HTTP verb.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Absolute URL including the query string.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// URL path without host or query, for logging.
    #[must_use]
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Serialized JSON body, if any.
    #[must_use]
    pub const fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }
}
