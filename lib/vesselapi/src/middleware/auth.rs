//! Authentication middleware.
//!
//! Sets `Authorization: Bearer <api key>` and the client `User-Agent` on every outgoing
//! request, replacing any value the caller may have put there.

use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use tower::{Layer, Service};

use crate::{Error, Request, Response, Result};

/// Layer that authenticates and identifies requests.
///
/// # Example
///
/// ```ignore
/// use vesselapi::middleware::AuthLayer;
/// use tower::ServiceBuilder;
///
/// let service = ServiceBuilder::new()
///     .layer(AuthLayer::new("my-api-key", "fleet-monitor/1.0"))
///     .service(transport);
/// ```
#[derive(Clone)]
pub struct AuthLayer {
    authorization: Arc<str>,
    user_agent: Arc<str>,
}

impl std::fmt::Debug for AuthLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthLayer")
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl AuthLayer {
    /// Create a layer sending `api_key` as a bearer token and `user_agent` as `User-Agent`.
    pub fn new(api_key: impl AsRef<str>, user_agent: impl Into<String>) -> Self {
        Self {
            authorization: Arc::from(format!("Bearer {}", api_key.as_ref())),
            user_agent: Arc::from(user_agent.into()),
        }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = Auth<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Auth {
            inner,
            authorization: Arc::clone(&self.authorization),
            user_agent: Arc::clone(&self.user_agent),
        }
    }
}

/// Service that authenticates and identifies requests.
#[derive(Clone)]
pub struct Auth<S> {
    inner: S,
    authorization: Arc<str>,
    user_agent: Arc<str>,
}

impl<S: std::fmt::Debug> std::fmt::Debug for Auth<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth")
            .field("inner", &self.inner)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl<S> Service<Request<Bytes>> for Auth<S>
where
    S: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error>,
{
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Bytes>) -> Self::Future {
        // The request is owned by this attempt; the caller's copy is never touched.
        request.set_header("Authorization", &*self.authorization);
        request.set_header("User-Agent", &*self.user_agent);
        self.inner.call(request)
    }
}
