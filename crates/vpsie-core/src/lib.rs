//! # vpsie-core
//!
//! Core request pipeline for the VPSie infrastructure API.
//!
//! Every call goes through the same stages: a [`request::RequestDescriptor`] is
//! built from a verb, path, optional body and optional list options; the
//! [`ServiceClient`] sends it with retries and honours the caller's
//! [`RequestContext`]; the [`envelope`] decoder turns the response into typed
//! data or a single [`Error`].
//!
//! ## Modules
//!
//! - [`client`] - Client builder, HTTP configuration and the retrying executor
//! - [`config`] - Serializable connection settings
//! - [`context`] - Per-call cancellation and deadlines
//! - [`envelope`] - `{error, data, total}` response decoding
//! - [`error`] - Error taxonomy
//! - [`ids`] - Strongly-typed resource identifiers
//! - [`pagination`] - List options and page bookkeeping
//! - [`query`] - Query parameter builder
//! - [`request`] - Request construction
//! - [`retry`] - Retry policy and per-call retry state
//! - [`transport`] - The single-send HTTP boundary

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod context;
pub mod envelope;
pub mod error;
pub mod ids;
pub mod pagination;
pub mod query;
pub mod request;
pub mod retry;
pub mod transport;

// Re-export commonly used types
pub use client::{ClientConfig, ServiceClient, ServiceClientBuilder};
pub use config::VpsieConfig;
pub use context::{CancellationToken, RequestContext};
pub use error::{Error, ErrorKind, Result};
pub use pagination::{ListOptions, Page};
pub use request::HttpMethod;
pub use retry::RetryPolicy;
