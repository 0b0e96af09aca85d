//! Response envelope decoding.
//!
//! Every VPSie endpoint wraps its payload as
//!
//! ```json
//! { "error": false, "data": { ... }, "total": 3 }
//! ```
//!
//! A transport-level success can still carry `"error": true`, so the HTTP status
//! alone never decides the outcome. List endpoints put either an array or a
//! `{ "rows": [...], "count": N }` object under `data`.

use crate::error::{Error, Result};
use crate::pagination::Page;
use crate::transport::RawResponse;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

/// Keys checked, in order, for a human-readable failure message.
const MESSAGE_KEYS: [&str; 5] = ["message", "msg", "errorMessage", "error_message", "reason"];

const FALLBACK_MESSAGE: &str = "request rejected by the VPSie API";

/// The generic response wrapper.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope {
    /// True when the API rejected the request
    #[serde(default)]
    pub error: bool,
    /// Endpoint-specific payload
    #[serde(default)]
    pub data: Option<Value>,
    /// Total items for list endpoints
    #[serde(default, alias = "total ")]
    pub total: Option<u64>,
    /// Item count some list endpoints report at the top level
    #[serde(default)]
    pub count: Option<u64>,
    /// Every other top-level key
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Envelope {
    /// Best-effort failure message; the key varies between endpoints.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        let from_map = |map: &Map<String, Value>| {
            MESSAGE_KEYS
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str))
                .map(str::to_string)
        };

        from_map(&self.extra).or_else(|| match &self.data {
            Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
            Some(Value::Object(map)) => from_map(map),
            _ => None,
        })
    }
}

/// List payload shapes found under `data`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListData<T> {
    Rows {
        rows: Vec<T>,
        #[serde(default)]
        count: Option<u64>,
    },
    Items(Vec<T>),
}

/// Decode a single-object response into `T`.
///
/// An absent or `null` `data` is handed to `T` as JSON `null`, so `Option<_>`
/// and `()` targets accept it.
///
/// # Errors
///
/// Returns an envelope, http-status or decode error as described in the module
/// docs.
pub fn decode<T>(raw: &RawResponse) -> Result<T>
where
    T: DeserializeOwned,
{
    let envelope = open(raw)?;
    let data = envelope.data.unwrap_or(Value::Null);
    serde_json::from_value(data).map_err(|err| shape_error(raw, &err))
}

/// Decode a list response into a [`Page`].
///
/// # Errors
///
/// Same as [`decode`].
pub fn decode_page<T>(raw: &RawResponse) -> Result<Page<T>>
where
    T: DeserializeOwned,
{
    let envelope = open(raw)?;

    let (items, rows_count) = match envelope.data {
        None | Some(Value::Null) => (Vec::new(), None),
        Some(data) => match serde_json::from_value::<ListData<T>>(data) {
            Ok(ListData::Rows { rows, count }) => (rows, count),
            Ok(ListData::Items(items)) => (items, None),
            Err(err) => return Err(shape_error(raw, &err)),
        },
    };

    Ok(Page {
        items,
        total: envelope.total.or(rows_count).or(envelope.count),
    })
}

/// Decode a response that carries no payload.
///
/// An empty body on a 2xx status counts as success.
///
/// # Errors
///
/// Same as [`decode`], minus shape errors.
pub fn decode_empty(raw: &RawResponse) -> Result<()> {
    if raw.is_success() && raw.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(());
    }
    open(raw).map(|_| ())
}

/// Parse the envelope and turn every failure signal into an [`Error`].
fn open(raw: &RawResponse) -> Result<Envelope> {
    let failed_status = raw.status >= 400;

    let value: Value = match serde_json::from_slice(&raw.body) {
        Ok(value) => value,
        Err(err) if failed_status => {
            debug!(status = raw.status, %err, "non-JSON error response");
            return Err(http_status_error(raw));
        }
        Err(err) => {
            return Err(Error::decode(
                format!("Response body is not valid JSON: {err}"),
                Some(raw.status),
                Some(raw.text()),
            ));
        }
    };

    if failed_status && !value.get("error").is_some_and(Value::is_boolean) {
        return Err(http_status_error(raw));
    }

    let envelope: Envelope = serde_json::from_value(value).map_err(|err| {
        Error::decode(
            format!("Response is not a VPSie envelope: {err}"),
            Some(raw.status),
            Some(raw.text()),
        )
    })?;

    if envelope.error {
        let message = envelope
            .message()
            .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());
        debug!(status = raw.status, %message, "API reported failure");
        return Err(Error::Envelope {
            status: raw.status,
            message,
            body: raw.text(),
        });
    }

    if failed_status {
        return Err(http_status_error(raw));
    }

    Ok(envelope)
}

fn http_status_error(raw: &RawResponse) -> Error {
    Error::HttpStatus {
        status: raw.status,
        body: raw.text(),
    }
}

fn shape_error(raw: &RawResponse, err: &serde_json::Error) -> Error {
    Error::decode(
        format!("Unexpected response data: {err}"),
        Some(raw.status),
        Some(raw.text()),
    )
}
