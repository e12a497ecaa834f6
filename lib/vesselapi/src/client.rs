//! The Vessel API client.
//!
//! [`VesselClient`] owns the decorated pipeline (retry, optional logging, auth, transport)
//! and hands out the resource services that build typed requests on top of it.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tower::{Layer, ServiceExt};
use tower::util::BoxCloneService;
use tower_service::Service;
use url::Url;
use vesselapi_core::{ApiError, HttpClient, error_from_status, from_json, to_query_string};

use crate::{
    Error, Method, Request, Response, Result,
    config::{ClientConfig, ClientConfigBuilder},
    middleware::{AuthLayer, LoggingLayer, RetryLayer},
    services::{
        EmissionsService, LocationService, NavtexService, PortEventsService, PortsService,
        SearchService, VesselsService,
    },
    transport::HyperTransport,
};

// ============================================================================
// Type-Erased Service
// ============================================================================

/// Type-erased service for middleware composition.
pub type BoxedService = BoxCloneService<Request<Bytes>, Response<Bytes>, Error>;

/// Future type for the Tower `Service` implementation.
pub type ServiceFuture = Pin<Box<dyn Future<Output = Result<Response<Bytes>>> + Send + 'static>>;

/// Makes a `BoxedService` shareable between threads.
#[derive(Clone)]
struct SyncService {
    inner: Arc<Mutex<BoxedService>>,
}

impl SyncService {
    fn new(service: BoxedService) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    fn call(&self, request: Request<Bytes>) -> ServiceFuture {
        // Lock, clone the service, and release the lock immediately
        let service = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();

        Box::pin(service.oneshot(request))
    }
}

// ============================================================================
// Public Client
// ============================================================================

struct Inner {
    service: SyncService,
    config: ClientConfig,
    base_url: Url,
}

/// Cancellation and deadline attached to every request a client sends.
#[derive(Debug, Clone, Default)]
struct Scope {
    cancellation: Option<CancellationToken>,
    deadline: Option<Instant>,
}

/// Client for the Vessel API.
///
/// Cloning is cheap: clones share the connection pool and the middleware stack.
///
/// # Example
///
/// ```ignore
/// use vesselapi::prelude::*;
///
/// let client = VesselClient::new("my-api-key")?;
/// let vessel = client.vessels().get("9321483", &VesselQuery::default()).await?;
/// ```
#[derive(Clone)]
pub struct VesselClient {
    inner: Arc<Inner>,
    scope: Scope,
}

impl std::fmt::Debug for VesselClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VesselClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("config", &self.inner.config)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl VesselClient {
    /// Create a client with the default configuration.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder(api_key).build()
    }

    /// Create a client builder.
    #[must_use]
    pub fn builder(api_key: impl Into<String>) -> VesselClientBuilder {
        VesselClientBuilder::new(api_key)
    }

    /// Get the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Parsed API base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// A client whose requests are aborted with [`Error::Cancelled`] once `token` fires.
    ///
    /// Cancellation also interrupts a pending retry wait.
    #[must_use]
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        let mut client = self.clone();
        client.scope.cancellation = Some(token);
        client
    }

    /// A client whose calls fail with [`Error::DeadlineExceeded`] after `deadline`.
    ///
    /// The deadline bounds the whole logical call, retries included.
    #[must_use]
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let mut client = self.clone();
        client.scope.deadline = Some(deadline);
        client
    }

    /// Shorthand for [`with_deadline`](Self::with_deadline) starting now.
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Vessel endpoints.
    #[must_use]
    pub fn vessels(&self) -> VesselsService<'_> {
        VesselsService::new(self)
    }

    /// Port endpoints.
    #[must_use]
    pub fn ports(&self) -> PortsService<'_> {
        PortsService::new(self)
    }

    /// Port event endpoints.
    #[must_use]
    pub fn port_events(&self) -> PortEventsService<'_> {
        PortEventsService::new(self)
    }

    /// Fleet-wide emissions endpoints.
    #[must_use]
    pub fn emissions(&self) -> EmissionsService<'_> {
        EmissionsService::new(self)
    }

    /// Search endpoints.
    #[must_use]
    pub fn search(&self) -> SearchService<'_> {
        SearchService::new(self)
    }

    /// Geographic (bounding box and radius) endpoints.
    #[must_use]
    pub fn location(&self) -> LocationService<'_> {
        LocationService::new(self)
    }

    /// NAVTEX endpoints.
    #[must_use]
    pub fn navtex(&self) -> NavtexService<'_> {
        NavtexService::new(self)
    }

    /// Base URL with `segments` appended, each one percent-encoded.
    pub(crate) fn endpoint<S: AsRef<str>>(&self, segments: &[S]) -> Result<Url> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::invalid_config("base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET `segments` with `query`, check the status and decode the JSON payload.
    pub(crate) async fn get_json<Q, T, S>(&self, segments: &[S], query: &Q) -> Result<T>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
        S: AsRef<str>,
    {
        let url = self.endpoint(segments)?;
        let query = to_query_string(query)?;
        let request = Request::builder(Method::Get, url)
            .raw_query(&query)
            .header("Accept", "application/json")
            .maybe_cancellation(self.scope.cancellation.clone())
            .maybe_deadline(self.scope.deadline)
            .build();

        let response = self.inner.service.call(request).await?;
        let (status, _, body) = response.into_parts();

        if let Some(err) = error_from_status(status, &body) {
            return Err(err.into());
        }
        if is_empty_payload(&body) {
            return Err(ApiError::empty_response(status, body).into());
        }
        from_json(&body)
    }
}

fn is_empty_payload(body: &[u8]) -> bool {
    let body = body.trim_ascii();
    body.is_empty() || body == b"null"
}

impl HttpClient for VesselClient {
    async fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        self.inner.service.call(request).await
    }
}

// ============================================================================
// Tower Service Implementation
// ============================================================================

impl Service<Request<Bytes>> for VesselClient {
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        // The boxed stack is polled when called.
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        self.inner.service.call(request)
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`VesselClient`].
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use vesselapi::VesselClient;
///
/// let client = VesselClient::builder("my-api-key")
///     .max_retries(5)
///     .timeout(Duration::from_secs(10))
///     .with_logging()
///     .build()?;
/// ```
pub struct VesselClientBuilder {
    api_key: String,
    config: ClientConfigBuilder,
    transport: Option<BoxedService>,
    logging: Option<LoggingLayer>,
}

impl std::fmt::Debug for VesselClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VesselClientBuilder")
            .field("config", &self.config)
            .field("custom_transport", &self.transport.is_some())
            .field("logging", &self.logging)
            .finish_non_exhaustive()
    }
}

impl VesselClientBuilder {
    fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            config: ClientConfig::builder(),
            transport: None,
            logging: None,
        }
    }

    /// Set the API base URL.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config = self.config.base_url(base_url);
        self
    }

    /// Set the `User-Agent` header value.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config = self.config.user_agent(user_agent);
        self
    }

    /// Set the number of retries after the first attempt. Negative values disable retries.
    #[must_use]
    pub fn max_retries(mut self, max_retries: i64) -> Self {
        self.config = self.config.max_retries(max_retries);
        self
    }

    /// Set the per-attempt timeout of the default transport.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Set the connection timeout of the default transport.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.connect_timeout(timeout);
        self
    }

    /// Set the maximum idle connections per host.
    #[must_use]
    pub fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.config = self.config.pool_idle_per_host(count);
        self
    }

    /// Set the idle connection timeout.
    #[must_use]
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.pool_idle_timeout(timeout);
        self
    }

    /// Replace the raw transport.
    ///
    /// Auth and retry are still layered on top of `service`, which only has to turn a
    /// request into a buffered response.
    #[must_use]
    pub fn transport<S>(mut self, service: S) -> Self
    where
        S: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error>
            + Clone
            + Send
            + 'static,
        S::Future: Send + 'static,
    {
        self.transport = Some(BoxCloneService::new(service));
        self
    }

    /// Log every attempt at info level.
    #[must_use]
    pub fn with_logging(mut self) -> Self {
        self.logging = Some(LoggingLayer::new());
        self
    }

    /// Log every attempt at debug level, headers included (credentials excepted).
    #[must_use]
    pub fn with_debug_logging(mut self) -> Self {
        self.logging = Some(LoggingLayer::debug());
        self
    }

    /// Build the client.
    ///
    /// Fails with [`Error::InvalidConfig`] for an empty API key or a base URL that cannot
    /// carry a path, and with [`Error::InvalidUrl`] for an unparseable base URL.
    pub fn build(self) -> Result<VesselClient> {
        if self.api_key.trim().is_empty() {
            return Err(Error::invalid_config("API key must not be empty"));
        }

        let config = self.config.build();
        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::invalid_config(format!(
                "base URL cannot carry a path: {base_url}"
            )));
        }

        let transport = self
            .transport
            .unwrap_or_else(|| BoxCloneService::new(HyperTransport::new(&config)));

        // Innermost first: auth, then logging, then retry around everything.
        let mut service: BoxedService = BoxCloneService::new(
            AuthLayer::new(&self.api_key, config.user_agent.clone()).layer(transport),
        );
        if let Some(logging) = self.logging {
            service = BoxCloneService::new(logging.layer(service));
        }
        service = BoxCloneService::new(RetryLayer::new(config.max_retries).layer(service));

        Ok(VesselClient {
            inner: Arc::new(Inner {
                service: SyncService::new(service),
                config,
                base_url,
            }),
            scope: Scope::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_applies_config() {
        let client = VesselClient::builder("key")
            .base_url("http://localhost:8080/v1/")
            .timeout(Duration::from_secs(60))
            .max_retries(-4)
            .pool_idle_per_host(16)
            .build()
            .expect("client");

        assert_eq!(client.config().timeout, Duration::from_secs(60));
        assert_eq!(client.config().max_retries, 0);
        assert_eq!(client.config().pool_idle_per_host, 16);
        assert_eq!(client.base_url().as_str(), "http://localhost:8080/v1/");
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let err = VesselClient::new("  ").expect_err("empty key");
        assert!(matches!(err, Error::InvalidConfig(_)), "unexpected error: {err}");
    }

    #[test]
    fn bad_base_urls_are_rejected() {
        let err = VesselClient::builder("key")
            .base_url("not a url")
            .build()
            .expect_err("unparseable");
        assert!(matches!(err, Error::InvalidUrl(_)), "unexpected error: {err}");

        let err = VesselClient::builder("key")
            .base_url("mailto:ops@example.com")
            .build()
            .expect_err("cannot be a base");
        assert!(matches!(err, Error::InvalidConfig(_)), "unexpected error: {err}");
    }

    #[test]
    fn endpoint_encodes_segments() {
        let client = VesselClient::builder("key")
            .base_url("https://api.vesselapi.com/v1/")
            .build()
            .expect("client");

        let url = client
            .endpoint(&["vessel", "93/21 483", "inspections", "a?b"])
            .expect("url");

        assert_eq!(
            url.as_str(),
            "https://api.vesselapi.com/v1/vessel/93%2F21%20483/inspections/a%3Fb"
        );
    }

    #[test]
    fn scoping_does_not_touch_the_original() {
        let client = VesselClient::new("key").expect("client");
        let token = CancellationToken::new();

        let scoped = client
            .with_cancellation(token)
            .with_timeout(Duration::from_secs(5));

        assert!(scoped.scope.cancellation.is_some());
        assert!(scoped.scope.deadline.is_some());
        assert!(client.scope.cancellation.is_none());
        assert!(client.scope.deadline.is_none());
    }

    #[test]
    fn empty_payloads() {
        assert!(is_empty_payload(b""));
        assert!(is_empty_payload(b"null"));
        assert!(is_empty_payload(b" null\n"));
        assert!(!is_empty_payload(b"{}"));
        assert!(!is_empty_payload(b"[]"));
    }

    #[test]
    fn debug_output_hides_the_key() {
        let client = VesselClient::new("secret-key").expect("client");
        let debug = format!("{client:?}");
        assert!(debug.contains("VesselClient"));
        assert!(!debug.contains("secret-key"));
    }
}
