//! Per-attempt logging middleware.
//!
//! Sits between the retry and auth layers, so every attempt gets its own `http_request`
//! span and the credentials added further down never reach the log.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use bytes::Bytes;
use tower::{Layer, Service};
use tracing::{Instrument, Level, debug, info, span, warn};

use crate::{Error, Request, Response, Result};

/// Layer that logs each attempt with `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLayer {
    level: LogLevel,
}

/// Verbosity of the logging middleware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Also log request headers and response sizes, at debug level.
    Debug,
    /// Method, path, status and elapsed time only.
    #[default]
    Info,
}

impl LoggingLayer {
    /// Create a logging layer at info level.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a logging layer at debug level.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            level: LogLevel::Debug,
        }
    }

    /// Configured verbosity.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = Logging<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Logging {
            inner,
            level: self.level,
        }
    }
}

/// Service that logs each attempt.
#[derive(Debug, Clone)]
pub struct Logging<S> {
    inner: S,
    level: LogLevel,
}

impl<S> Service<Request<Bytes>> for Logging<S>
where
    S: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error>,
    S::Future: Send + 'static,
{
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let method = request.method();
        let path = request.url().path().to_string();
        let level = self.level;

        let span = span!(Level::INFO, "http_request", %method, %path);

        if level == LogLevel::Debug {
            debug!(
                parent: &span,
                query = request.url().query().unwrap_or_default(),
                headers = ?request.headers(),
                "sending request"
            );
        } else {
            info!(parent: &span, "sending request");
        }

        let future = self.inner.call(request);
        Box::pin(
            async move {
                let start = Instant::now();
                let result = future.await;
                let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

                match &result {
                    Ok(response) if response.is_success() => {
                        if level == LogLevel::Debug {
                            debug!(
                                status = response.status(),
                                elapsed_ms,
                                bytes = response.body().len(),
                                "request completed"
                            );
                        } else {
                            info!(status = response.status(), elapsed_ms, "request completed");
                        }
                    }
                    Ok(response) => {
                        warn!(status = response.status(), elapsed_ms, "request failed with HTTP error");
                    }
                    Err(err) => {
                        warn!(error = %err, elapsed_ms, "request failed");
                    }
                }

                result
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tower::ServiceExt;

    use super::*;
    use crate::Method;

    #[test]
    fn logging_layer_levels() {
        assert_eq!(LoggingLayer::new().level(), LogLevel::Info);
        assert_eq!(LoggingLayer::debug().level(), LogLevel::Debug);
    }

    #[tokio::test]
    async fn passes_results_through() {
        let inner = tower::service_fn(|request: Request<Bytes>| async move {
            if request.url().path() == "/v1/port/NLRTM" {
                Ok(Response::new(200, HashMap::new(), Bytes::from_static(b"{}")))
            } else {
                Err(Error::connection("connection refused"))
            }
        });
        let service = LoggingLayer::debug().layer(inner);

        let ok = url::Url::parse("https://api.vesselapi.com/v1/port/NLRTM").expect("url");
        let response = service
            .clone()
            .oneshot(Request::builder(Method::Get, ok).build())
            .await
            .expect("response");
        assert_eq!(response.body().as_ref(), b"{}");

        let failing = url::Url::parse("https://api.vesselapi.com/v1/port/XXXXX").expect("url");
        let err = service
            .oneshot(Request::builder(Method::Get, failing).build())
            .await
            .expect_err("error");
        assert!(err.is_connection());
    }
}
