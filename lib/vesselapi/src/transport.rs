//! Raw HTTP transport built on hyper-util.
//!
//! [`HyperTransport`] sends one request and buffers the response. It knows nothing about
//! credentials or retries; those are layered on top by the client.
//!
//! Bodies of rate-limited and server-error responses, which the retry layer may throw
//! away, are read up to [`MAX_RETRYABLE_BODY`] and the rest is left unread.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use tower_service::Service;

use crate::{BoxError, ClientConfig, Error, Request, Response, Result, connector::https_connector};

/// Most bytes buffered from the body of a response that may be retried (429 or 5xx).
pub const MAX_RETRYABLE_BODY: usize = 1 << 20;

/// Pooled hyper-util client with rustls.
#[derive(Clone)]
pub struct HyperTransport {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    timeout: Duration,
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl HyperTransport {
    /// Create a transport from the pool and timeout settings of `config`.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        let inner = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_idle_per_host)
            .build(https_connector(config.connect_timeout));

        Self {
            inner,
            timeout: config.timeout,
        }
    }

    fn build_hyper_request(request: Request<Bytes>) -> Result<http::Request<Full<Bytes>>> {
        let (method, url, headers, body) = request.into_parts();

        let mut builder = http::Request::builder()
            .method(http::Method::from(method))
            .uri(url.as_str());

        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder
            .body(body.map_or_else(Full::default, Full::new))
            .map_err(|e| Error::invalid_request(e.to_string()))
    }

    fn extract_headers(headers: &http::HeaderMap) -> HashMap<String, String> {
        headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect()
    }

    async fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        let hyper_request = Self::build_hyper_request(request)?;

        let exchange = async {
            let response = self
                .inner
                .request(hyper_request)
                .await
                .map_err(map_hyper_error)?;

            let status = response.status().as_u16();
            let headers = Self::extract_headers(response.headers());
            let body = response.into_body();
            let body = if may_be_retried(status) {
                collect_bounded(body, MAX_RETRYABLE_BODY).await?
            } else {
                body.collect().await.map_err(Error::connection)?.to_bytes()
            };

            Ok(Response::new(status, headers, body))
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| Error::Timeout)?
    }
}

impl Service<Request<Bytes>> for HyperTransport {
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send + 'static>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let transport = self.clone();
        Box::pin(async move { transport.execute(request).await })
    }
}

const fn may_be_retried(status: u16) -> bool {
    status == 429 || status >= 500
}

/// Buffer at most `limit` bytes of `body`.
///
/// The remainder is never read; dropping the body closes the connection instead of
/// returning it to the pool.
async fn collect_bounded<B>(mut body: B, limit: usize) -> Result<Bytes>
where
    B: http_body::Body<Data = Bytes> + Unpin,
    B::Error: Into<BoxError>,
{
    let mut buffer = BytesMut::new();
    while let Some(frame) = body.frame().await {
        let Ok(data) = frame.map_err(Error::connection)?.into_data() else {
            continue;
        };
        let room = limit - buffer.len();
        if data.len() >= room {
            buffer.extend_from_slice(&data.slice(..room));
            break;
        }
        buffer.extend_from_slice(&data);
    }
    Ok(buffer.freeze())
}

fn map_hyper_error(err: hyper_util::client::legacy::Error) -> Error {
    // Certificate failures surface as connect errors, so look at the whole chain first.
    if is_tls_failure(&err) {
        return Error::tls(err);
    }
    Error::connection(err)
}

/// Whether a `rustls` error sits anywhere in the source chain of `err`.
fn is_tls_failure(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(err) = current {
        if err.is::<rustls::Error>() {
            return true;
        }
        // `io::Error` skips its payload in `source()`, so look inside it explicitly.
        if let Some(io) = err.downcast_ref::<std::io::Error>()
            && io.get_ref().is_some_and(|inner| inner.is::<rustls::Error>())
        {
            return true;
        }
        current = err.source();
    }
    false
}
