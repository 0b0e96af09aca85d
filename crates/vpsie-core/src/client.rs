//! HTTP client configuration and the request pipeline.
//!
//! [`ServiceClient`] ties the stages together: it builds a
//! [`RequestDescriptor`], executes it with retries and cancellation, and decodes
//! the envelope. Resource crates wrap one `ServiceClient` each and only describe
//! paths and payload shapes.

use crate::config::{VpsieConfig, DEFAULT_AUTH_HEADER, DEFAULT_BASE_URL};
use crate::context::RequestContext;
use crate::envelope;
use crate::error::{Error, Result};
use crate::pagination::{ListOptions, Page};
use crate::request::{HttpMethod, RequestDescriptor};
use crate::retry::{RetryDecision, RetryPolicy, RetryState};
use crate::transport::{HttpTransport, RawResponse, ReqwestTransport, TransportFailure};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;
use validator::Validate;

const USER_AGENT: &str = concat!("vpsie-core/", env!("CARGO_PKG_VERSION"));

/// Default per-attempt request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default connect timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default idle timeout for connection pools
pub const DEFAULT_POOL_IDLE_TIMEOUT: u64 = 90;

/// Default maximum idle connections per host
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

/// HTTP client configuration.
///
/// Configures timeouts, retries and connection pooling of the underlying
/// `reqwest` client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Per-attempt request timeout
    pub timeout: Duration,

    /// Connect timeout
    pub connect_timeout: Duration,

    /// Retry policy
    pub retry_policy: RetryPolicy,

    /// Connection pool idle timeout
    pub pool_idle_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Enable response compression
    pub enable_compression: bool,
}

impl ClientConfig {
    /// Create a new client configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            retry_policy: RetryPolicy::new(),
            pool_idle_timeout: Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            enable_compression: true,
        }
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set retry policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Disable retries.
    #[must_use]
    pub const fn without_retries(mut self) -> Self {
        self.retry_policy = RetryPolicy::no_retry();
        self
    }

    /// Set connection pool idle timeout.
    #[must_use]
    pub const fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    /// Set maximum idle connections per host.
    #[must_use]
    pub const fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Enable or disable compression.
    #[must_use]
    pub const fn with_compression(mut self, enabled: bool) -> Self {
        self.enable_compression = enabled;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`ServiceClient`].
pub struct ServiceClientBuilder {
    base_url: Url,
    token: Option<SecretString>,
    auth_header: String,
    user_agent: String,
    http_config: ClientConfig,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl ServiceClientBuilder {
    /// Create a builder for the specified base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())
            .map_err(|e| Error::ConfigError(format!("Invalid base URL: {e}")))?;

        Ok(Self {
            base_url,
            token: None,
            auth_header: DEFAULT_AUTH_HEADER.to_string(),
            user_agent: USER_AGENT.to_string(),
            http_config: ClientConfig::new(),
            transport: None,
        })
    }

    /// Create a builder from a [`VpsieConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn from_config(config: &VpsieConfig) -> Result<Self> {
        config.validate()?;

        let retry_policy = RetryPolicy::new().with_max_attempts(config.max_attempts);
        let mut builder = Self::new(&config.base_url)?
            .with_auth_header(config.auth_header.clone())
            .with_http_config(
                ClientConfig::new()
                    .with_timeout(config.timeout())
                    .with_retry_policy(retry_policy),
            );

        if let Some(token) = &config.api_token {
            builder = builder.with_token(token.clone());
        }

        Ok(builder)
    }

    /// Set the API token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    /// Override the header carrying the token.
    #[must_use]
    pub fn with_auth_header(mut self, header: impl Into<String>) -> Self {
        self.auth_header = header.into();
        self
    }

    /// Override the `User-Agent`.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.http_config.retry_policy = retry;
        self
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Send through `transport` instead of a `reqwest` client.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no token was given, the header name
    /// or token is not a valid header, or the HTTP client cannot be created.
    pub fn build(self) -> Result<ServiceClient> {
        let token = self
            .token
            .ok_or_else(|| Error::ConfigError("An API token is required".to_string()))?;

        let name = HeaderName::from_bytes(self.auth_header.as_bytes()).map_err(|err| {
            Error::ConfigError(format!("Invalid auth header `{}`: {err}", self.auth_header))
        })?;
        let mut value = HeaderValue::from_str(token.expose_secret())
            .map_err(|_| Error::ConfigError("API token is not a valid header value".into()))?;
        value.set_sensitive(true);

        let mut auth_headers = HeaderMap::new();
        auth_headers.insert(name, value);

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let http = reqwest::Client::builder()
                    .user_agent(self.user_agent)
                    .timeout(self.http_config.timeout)
                    .connect_timeout(self.http_config.connect_timeout)
                    .pool_idle_timeout(self.http_config.pool_idle_timeout)
                    .pool_max_idle_per_host(self.http_config.pool_max_idle_per_host)
                    .gzip(self.http_config.enable_compression)
                    .build()
                    .map_err(|err| {
                        Error::ConfigError(format!("Failed to build HTTP client: {err}"))
                    })?;
                Arc::new(ReqwestTransport::new(http))
            }
        };

        Ok(ServiceClient {
            base_url: self.base_url,
            auth_headers: Arc::new(auth_headers),
            transport,
            retry_policy: self.http_config.retry_policy,
        })
    }
}

impl fmt::Debug for ServiceClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceClientBuilder")
            .field("base_url", &self.base_url.as_str())
            .field("auth_header", &self.auth_header)
            .field("has_token", &self.token.is_some())
            .field("user_agent", &self.user_agent)
            .field("http_config", &self.http_config)
            .finish_non_exhaustive()
    }
}

/// Shared request pipeline for all VPSie resource clients.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone)]
pub struct ServiceClient {
    base_url: Url,
    auth_headers: Arc<HeaderMap>,
    transport: Arc<dyn HttpTransport>,
    retry_policy: RetryPolicy,
}

/// The last transient failure seen by the retry loop.
enum TransientFailure {
    Status(RawResponse),
    Transport(TransportFailure),
}

impl ServiceClient {
    /// Start a builder for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn builder(base_url: impl AsRef<str>) -> Result<ServiceClientBuilder> {
        ServiceClientBuilder::new(base_url)
    }

    /// Construct a client from a [`VpsieConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or lacks a token.
    pub fn from_config(config: &VpsieConfig) -> Result<Self> {
        ServiceClientBuilder::from_config(config)?.build()
    }

    /// Construct a client for the public API endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value.
    pub fn with_token(token: impl Into<String>) -> Result<Self> {
        ServiceClientBuilder::new(DEFAULT_BASE_URL)?
            .with_token(token)
            .build()
    }

    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Return the retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Assemble a request for `path` without sending it.
    ///
    /// # Errors
    ///
    /// See [`RequestDescriptor::build`].
    pub fn build_request<B>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        options: Option<&ListOptions>,
    ) -> Result<RequestDescriptor>
    where
        B: Serialize + ?Sized,
    {
        RequestDescriptor::build(&self.base_url, &self.auth_headers, method, path, body, options)
    }

    /// Send `request`, retrying transient failures.
    ///
    /// Connection failures, timeouts and 5xx responses are retried up to the
    /// policy's attempt budget. Any other response is returned as-is, whatever
    /// its status; the envelope decoder interprets it.
    ///
    /// # Errors
    ///
    /// [`Error::Cancelled`] when `ctx` is cancelled, or [`Error::Transport`]
    /// when the attempts run out, the deadline passes or the failure is not
    /// retryable.
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        request: &RequestDescriptor,
    ) -> Result<RawResponse> {
        let mut state = RetryState::new(self.retry_policy);

        loop {
            let attempt = state.start_attempt();
            if ctx.is_cancelled() {
                return Err(Error::Cancelled);
            }

            info!(
                method = %request.method(),
                path = request.path(),
                attempt,
                "Sending VPSie request"
            );

            let outcome = tokio::select! {
                biased;
                () = ctx.cancelled() => return Err(Error::Cancelled),
                () = ctx.expired() => return Err(deadline_exceeded(attempt)),
                outcome = self.transport.send(request) => outcome,
            };

            let failure = match outcome {
                Ok(response) if response.is_server_error() => TransientFailure::Status(response),
                Ok(response) => {
                    debug!(
                        method = %request.method(),
                        path = request.path(),
                        status = response.status,
                        attempt,
                        "Received VPSie response"
                    );
                    return Ok(response);
                }
                Err(failure) if failure.is_transient() => TransientFailure::Transport(failure),
                Err(failure) => return Err(transport_error(&failure, attempt)),
            };

            match state.on_transient_failure() {
                RetryDecision::GiveUp => return Err(exhausted(failure, attempt)),
                RetryDecision::Retry { delay } => {
                    warn!(
                        method = %request.method(),
                        path = request.path(),
                        attempt,
                        reason = %failure.describe(),
                        ?delay,
                        "Retrying VPSie request"
                    );
                    tokio::select! {
                        biased;
                        () = ctx.cancelled() => return Err(Error::Cancelled),
                        () = ctx.expired() => return Err(deadline_exceeded(attempt)),
                        () = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }

    /// Build, execute and decode a call returning a single object.
    ///
    /// # Errors
    ///
    /// Any error from the three stages.
    pub async fn send<B, T>(
        &self,
        ctx: &RequestContext,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.build_request(method, path, body, None)?;
        let response = self.execute(ctx, &request).await?;
        envelope::decode(&response)
    }

    /// Build, execute and decode a paged list call.
    ///
    /// # Errors
    ///
    /// Any error from the three stages.
    pub async fn send_page<T>(
        &self,
        ctx: &RequestContext,
        path: &str,
        options: Option<&ListOptions>,
    ) -> Result<Page<T>>
    where
        T: DeserializeOwned,
    {
        let request = self.build_request::<()>(HttpMethod::Get, path, None, options)?;
        let response = self.execute(ctx, &request).await?;
        envelope::decode_page(&response)
    }

    /// Build, execute and decode a call that returns no payload.
    ///
    /// # Errors
    ///
    /// Any error from the three stages.
    pub async fn send_empty<B>(
        &self,
        ctx: &RequestContext,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
    ) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let request = self.build_request(method, path, body, None)?;
        let response = self.execute(ctx, &request).await?;
        envelope::decode_empty(&response)
    }
}

impl fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceClient")
            .field("base_url", &self.base_url.as_str())
            .field("retry_policy", &self.retry_policy)
            .finish_non_exhaustive()
    }
}

impl TransientFailure {
    fn describe(&self) -> String {
        match self {
            Self::Status(response) => format!("server error {}", response.status),
            Self::Transport(failure) => failure.to_string(),
        }
    }
}

fn exhausted(failure: TransientFailure, attempts: u32) -> Error {
    match failure {
        TransientFailure::Status(response) => Error::Transport {
            message: format!("server error {}", response.status),
            attempts,
            timed_out: false,
            status: Some(response.status),
            body: Some(response.text()),
        },
        TransientFailure::Transport(failure) => transport_error(&failure, attempts),
    }
}

fn transport_error(failure: &TransportFailure, attempts: u32) -> Error {
    Error::Transport {
        message: failure.to_string(),
        attempts,
        timed_out: failure.is_timeout(),
        status: None,
        body: None,
    }
}

fn deadline_exceeded(attempts: u32) -> Error {
    Error::Transport {
        message: "deadline exceeded".to_string(),
        attempts,
        timed_out: true,
        status: None,
        body: None,
    }
}
