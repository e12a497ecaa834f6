//! Retry middleware with backoff.
//!
//! [`RetryLayer`] makes a logical call resilient to rate limiting, server errors and
//! transient network failures while never repeating a call that may already have been
//! applied:
//!
//! - transient transport errors are retried for idempotent methods only
//!   (GET, HEAD, OPTIONS, PUT, DELETE);
//! - `429 Too Many Requests` is retried for every method;
//! - `5xx` is retried for idempotent methods only;
//! - everything else, and the last attempt, is returned to the caller unchanged.
//!
//! The wait before a retry honours `Retry-After` (delta seconds or HTTP date) and falls back
//! to exponential backoff with jitter, never exceeding [`MAX_BACKOFF`]. Every attempt and every
//! wait is raced against the request's cancellation token and deadline.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, SystemTime};

use bytes::Bytes;
use rand::Rng;
use tokio_util::sync::CancellationToken;
use tower::{Layer, Service, ServiceExt};
use tracing::{debug, warn};

use crate::{Error, Method, Request, Response, Result};

/// Upper bound for any wait between two attempts.
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);

const BACKOFF_UNIT: Duration = Duration::from_millis(500);

/// Layer that retries failed calls.
///
/// # Example
///
/// ```ignore
/// use vesselapi::middleware::RetryLayer;
/// use tower::ServiceBuilder;
///
/// let service = ServiceBuilder::new()
///     .layer(RetryLayer::new(3))
///     .service(transport);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RetryLayer {
    max_retries: u32,
}

impl RetryLayer {
    /// Create a layer allowing `max_retries` retries after the first attempt.
    #[must_use]
    pub const fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }
}

impl<S> Layer<S> for RetryLayer {
    type Service = Retry<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Retry {
            inner,
            max_retries: self.max_retries,
        }
    }
}

/// Service that retries failed calls.
#[derive(Debug, Clone)]
pub struct Retry<S> {
    inner: S,
    max_retries: u32,
}

impl<S> Retry<S> {
    /// Wrap `inner`, allowing `max_retries` retries after the first attempt.
    pub const fn new(inner: S, max_retries: u32) -> Self {
        Self { inner, max_retries }
    }
}

impl<S> Service<Request<Bytes>> for Retry<S>
where
    S: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        // Take the instance that was polled ready and leave a fresh clone behind.
        let clone = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, clone);
        Box::pin(run(inner, request, self.max_retries))
    }
}

async fn run<S>(mut inner: S, request: Request<Bytes>, max_retries: u32) -> Result<Response<Bytes>>
where
    S: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error>,
{
    let scope = CallScope::of(&request);
    let method = request.method();
    let url = request.url().clone();

    let mut attempt: u32 = 0;
    loop {
        // Each attempt owns a full copy; `Bytes` makes the body cheap to resend.
        let outcome = scope.run(send(&mut inner, request.clone())).await;

        let wait = match outcome {
            Err(err) if err.is_cancellation() => return Err(aborted(err, method, attempt)),
            Err(err) => {
                if !err.is_transient() || attempt >= max_retries || !method.is_idempotent() {
                    return Err(err);
                }
                let wait = exponential_backoff(attempt);
                debug!(
                    retry = attempt + 1,
                    max_retries,
                    %method,
                    %url,
                    error = %err,
                    backoff_ms = wait.as_millis(),
                    "retrying after transport error"
                );
                wait
            }
            Ok(response) => {
                if !should_retry(method, &response) || attempt >= max_retries {
                    return Ok(response);
                }
                let wait = backoff_for(attempt, &response);
                debug!(
                    retry = attempt + 1,
                    max_retries,
                    %method,
                    %url,
                    status = response.status(),
                    backoff_ms = wait.as_millis(),
                    "retrying after status"
                );
                // The transport read at most `MAX_RETRYABLE_BODY` bytes of this body and
                // already released the connection.
                drop(response);
                wait
            }
        };

        scope
            .sleep(wait)
            .await
            .map_err(|err| aborted(err, method, attempt))?;
        attempt += 1;
    }
}

async fn send<S>(inner: &mut S, request: Request<Bytes>) -> Result<Response<Bytes>>
where
    S: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error>,
{
    inner.ready().await?.call(request).await
}

fn aborted(err: Error, method: Method, attempt: u32) -> Error {
    warn!(%method, attempt, error = %err, "call aborted");
    err
}

/// Whether a finished response may be retried for `method`.
///
/// A rate-limited call was not processed by the server, so it is safe to repeat for any
/// method. A server error may have applied side effects, so only idempotent methods retry.
#[must_use]
pub fn should_retry(method: Method, response: &Response<Bytes>) -> bool {
    response.is_rate_limited() || (response.is_server_error() && method.is_idempotent())
}

/// Exponential backoff with jitter for a zero-based attempt index.
///
/// Computes `(2^attempt + jitter) * 500ms` with `jitter` uniform in `[0, 2^attempt)`, capped at
/// [`MAX_BACKOFF`].
#[must_use]
pub fn exponential_backoff(attempt: u32) -> Duration {
    let base = 2f64.powi(i32::try_from(attempt).unwrap_or(i32::MAX));
    let jitter = rand::rng().random::<f64>() * base;
    let seconds = (base + jitter) * BACKOFF_UNIT.as_secs_f64();

    if seconds.is_finite() && seconds < MAX_BACKOFF.as_secs_f64() {
        Duration::from_secs_f64(seconds)
    } else {
        MAX_BACKOFF
    }
}

/// Wait requested by the `Retry-After` header of `response`, relative to `now`.
///
/// Accepts delta seconds or an HTTP date. Negative values and past dates give zero, long
/// waits are capped at [`MAX_BACKOFF`]. Returns `None` when the header is absent or
/// unparseable.
#[must_use]
pub fn retry_after(response: &Response<Bytes>, now: SystemTime) -> Option<Duration> {
    let value = response.header("Retry-After")?.trim();

    if let Ok(seconds) = value.parse::<i64>() {
        let wait = Duration::from_secs(seconds.max(0).unsigned_abs());
        return Some(wait.min(MAX_BACKOFF));
    }

    let at = httpdate::parse_http_date(value).ok()?;
    let wait = at.duration_since(now).unwrap_or(Duration::ZERO);
    Some(wait.min(MAX_BACKOFF))
}

/// Wait before retrying after `response`: `Retry-After` if usable, exponential backoff otherwise.
#[must_use]
pub fn backoff_for(attempt: u32, response: &Response<Bytes>) -> Duration {
    retry_after(response, SystemTime::now()).unwrap_or_else(|| exponential_backoff(attempt))
}

/// Caller-side bounds of one logical call.
struct CallScope {
    cancellation: Option<CancellationToken>,
    deadline: Option<tokio::time::Instant>,
}

impl CallScope {
    fn of<B>(request: &Request<B>) -> Self {
        Self {
            cancellation: request.cancellation().cloned(),
            deadline: request.deadline().map(tokio::time::Instant::from_std),
        }
    }

    /// Drive `work` unless the call is cancelled or its deadline passes first.
    async fn run<T>(&self, work: impl Future<Output = Result<T>>) -> Result<T> {
        let cancelled = async {
            match &self.cancellation {
                Some(token) => token.cancelled().await,
                None => std::future::pending().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            () = cancelled => Err(Error::Cancelled),
            () = expired => Err(Error::DeadlineExceeded),
            result = work => result,
        }
    }

    async fn sleep(&self, wait: Duration) -> Result<()> {
        self.run(async {
            tokio::time::sleep(wait).await;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use assert2::check;
    use tokio::time::Instant;

    use super::*;

    type Script = Arc<dyn Fn(usize) -> Result<Response<Bytes>> + Send + Sync>;

    /// Inner service answering from a script indexed by call number.
    #[derive(Clone)]
    struct Stub {
        script: Script,
        calls: Arc<AtomicUsize>,
        times: Arc<Mutex<Vec<Instant>>>,
        bodies: Arc<Mutex<Vec<Option<Bytes>>>>,
    }

    impl Stub {
        fn new(script: impl Fn(usize) -> Result<Response<Bytes>> + Send + Sync + 'static) -> Self {
            Self {
                script: Arc::new(script),
                calls: Arc::default(),
                times: Arc::default(),
                bodies: Arc::default(),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn gaps(&self) -> Vec<Duration> {
            let times = self.times.lock().expect("lock");
            times.windows(2).map(|w| w[1] - w[0]).collect()
        }
    }

    impl Service<Request<Bytes>> for Stub {
        type Response = Response<Bytes>;
        type Error = Error;
        type Future = std::future::Ready<Result<Response<Bytes>>>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, request: Request<Bytes>) -> Self::Future {
            self.times.lock().expect("lock").push(Instant::now());
            self.bodies.lock().expect("lock").push(request.body().cloned());
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready((self.script)(call))
        }
    }

    fn status(code: u16) -> Response<Bytes> {
        Response::new(code, HashMap::new(), Bytes::new())
    }

    fn status_with_retry_after(code: u16, value: &str) -> Response<Bytes> {
        let mut headers = HashMap::new();
        headers.insert("retry-after".to_string(), value.to_string());
        Response::new(code, headers, Bytes::new())
    }

    fn navtex(method: Method) -> Request<Bytes> {
        let url = url::Url::parse("https://api.vesselapi.com/v1/navtex").expect("url");
        Request::builder(method, url).build()
    }

    async fn call(stub: &Stub, max_retries: u32, request: Request<Bytes>) -> Result<Response<Bytes>> {
        RetryLayer::new(max_retries)
            .layer(stub.clone())
            .oneshot(request)
            .await
    }

    // ---------------------------------------------------------------------
    // Backoff computation
    // ---------------------------------------------------------------------

    #[test]
    fn exponential_backoff_stays_in_its_window() {
        for _ in 0..200 {
            let first = exponential_backoff(0);
            check!(first >= Duration::from_millis(500));
            check!(first < Duration::from_millis(1000));

            let third = exponential_backoff(2);
            check!(third >= Duration::from_secs(2));
            check!(third < Duration::from_secs(4));
        }
    }

    #[test]
    fn exponential_backoff_is_capped() {
        for attempt in [6, 10, 31, 64, 1_000, u32::MAX] {
            check!(exponential_backoff(attempt) == MAX_BACKOFF);
        }
        for attempt in 0..100 {
            check!(exponential_backoff(attempt) <= MAX_BACKOFF);
        }
    }

    #[test]
    fn retry_after_seconds() {
        let now = SystemTime::now();
        check!(retry_after(&status_with_retry_after(429, "5"), now) == Some(Duration::from_secs(5)));
        check!(retry_after(&status_with_retry_after(429, " 0 "), now) == Some(Duration::ZERO));
        check!(retry_after(&status_with_retry_after(429, "+2"), now) == Some(Duration::from_secs(2)));
        check!(retry_after(&status_with_retry_after(429, "-3"), now) == Some(Duration::ZERO));
        check!(retry_after(&status_with_retry_after(429, "120"), now) == Some(MAX_BACKOFF));
    }

    #[test]
    fn retry_after_http_date() {
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);

        let future = httpdate::fmt_http_date(now + Duration::from_secs(10));
        check!(retry_after(&status_with_retry_after(503, &future), now) == Some(Duration::from_secs(10)));

        let past = httpdate::fmt_http_date(now - Duration::from_secs(3600));
        check!(retry_after(&status_with_retry_after(503, &past), now) == Some(Duration::ZERO));

        let far = httpdate::fmt_http_date(now + Duration::from_secs(3600));
        check!(retry_after(&status_with_retry_after(503, &far), now) == Some(MAX_BACKOFF));
    }

    #[test]
    fn retry_after_absent_or_garbage() {
        let now = SystemTime::now();
        check!(retry_after(&status(429), now).is_none());
        check!(retry_after(&status_with_retry_after(429, ""), now).is_none());
        check!(retry_after(&status_with_retry_after(429, "soon"), now).is_none());
        check!(retry_after(&status_with_retry_after(429, "1.5"), now).is_none());
    }

    #[test]
    fn backoff_prefers_retry_after() {
        check!(backoff_for(4, &status_with_retry_after(429, "1")) == Duration::from_secs(1));

        let fallback = backoff_for(0, &status_with_retry_after(429, "later"));
        check!(fallback >= Duration::from_millis(500));
        check!(fallback < Duration::from_secs(1));
    }

    #[test]
    fn retryable_statuses_by_method() {
        check!(should_retry(Method::Get, &status(503)));
        check!(should_retry(Method::Delete, &status(500)));
        check!(should_retry(Method::Post, &status(429)));
        check!(should_retry(Method::Patch, &status(429)));
        check!(!should_retry(Method::Post, &status(503)));
        check!(!should_retry(Method::Patch, &status(500)));
        check!(!should_retry(Method::Get, &status(404)));
        check!(!should_retry(Method::Get, &status(200)));
    }

    // ---------------------------------------------------------------------
    // Retry loop
    // ---------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn server_error_then_success() {
        let stub = Stub::new(|call| Ok(if call == 0 { status(503) } else { status(200) }));

        let response = call(&stub, 3, navtex(Method::Get)).await.expect("response");

        check!(response.status() == 200);
        check!(stub.calls() == 2);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_return_last_response() {
        let stub = Stub::new(|_| Ok(status(500)));

        let response = call(&stub, 2, navtex(Method::Get)).await.expect("response");

        check!(response.status() == 500);
        check!(stub.calls() == 3);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_retries_means_one_attempt() {
        let stub = Stub::new(|_| Ok(status(429)));

        let response = call(&stub, 0, navtex(Method::Get)).await.expect("response");

        check!(response.status() == 429);
        check!(stub.calls() == 1);
    }

    #[tokio::test(start_paused = true)]
    async fn post_is_not_retried_on_server_error() {
        let stub = Stub::new(|_| Ok(status(502)));

        let response = call(&stub, 3, navtex(Method::Post)).await.expect("response");

        check!(response.status() == 502);
        check!(stub.calls() == 1);
    }

    #[tokio::test(start_paused = true)]
    async fn post_is_retried_when_rate_limited() {
        let stub = Stub::new(|call| Ok(if call == 0 { status(429) } else { status(201) }));

        let response = call(&stub, 3, navtex(Method::Post)).await.expect("response");

        check!(response.status() == 201);
        check!(stub.calls() == 2);
    }

    #[tokio::test(start_paused = true)]
    async fn every_attempt_resends_the_full_body() {
        let stub = Stub::new(|call| Ok(if call == 0 { status(429) } else { status(200) }));
        let payload = Bytes::from_static(br#"{"imo":9321483,"note":"resend me"}"#);
        let url = url::Url::parse("https://api.vesselapi.com/v1/reports").expect("url");
        let request = Request::builder(Method::Post, url)
            .body(payload.clone())
            .build();

        let response = call(&stub, 3, request).await.expect("response");

        check!(response.status() == 200);
        let bodies = stub.bodies.lock().expect("lock").clone();
        check!(bodies == [Some(payload.clone()), Some(payload)]);
    }

    #[tokio::test(start_paused = true)]
    async fn client_errors_are_returned_immediately() {
        let stub = Stub::new(|_| Ok(status(404)));

        let response = call(&stub, 3, navtex(Method::Get)).await.expect("response");

        check!(response.status() == 404);
        check!(stub.calls() == 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_retry_for_idempotent_methods() {
        let stub = Stub::new(|_| Err(Error::connection("connection reset by peer")));

        let err = call(&stub, 2, navtex(Method::Put)).await.expect_err("keeps failing");

        check!(err.is_connection());
        check!(stub.calls() == 3);
    }

    #[tokio::test(start_paused = true)]
    async fn timeouts_are_transient() {
        let stub = Stub::new(|call| {
            if call == 0 {
                Err(Error::Timeout)
            } else {
                Ok(status(200))
            }
        });

        let response = call(&stub, 1, navtex(Method::Get)).await.expect("response");

        check!(response.status() == 200);
        check!(stub.calls() == 2);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_do_not_retry_post() {
        let stub = Stub::new(|_| Err(Error::connection("connection reset by peer")));

        let err = call(&stub, 3, navtex(Method::Post)).await.expect_err("fails");

        check!(err.is_connection());
        check!(stub.calls() == 1);
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_errors_are_not_retried() {
        let stub = Stub::new(|_| Err(Error::tls("invalid peer certificate: UnknownIssuer")));

        let err = call(&stub, 3, navtex(Method::Get)).await.expect_err("fails");

        check!(matches!(err, Error::Tls(_)));
        check!(stub.calls() == 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_after_seconds_is_honoured() {
        let stub = Stub::new(|call| {
            Ok(if call == 0 {
                status_with_retry_after(429, "5")
            } else {
                status(200)
            })
        });

        call(&stub, 3, navtex(Method::Get)).await.expect("response");

        let gaps = stub.gaps();
        check!(gaps.len() == 1);
        check!(gaps[0] >= Duration::from_secs(5));
        check!(gaps[0] <= MAX_BACKOFF);
    }

    #[tokio::test(start_paused = true)]
    async fn network_backoff_grows() {
        let stub = Stub::new(|call| {
            if call < 3 {
                Err(Error::connection("connection refused"))
            } else {
                Ok(status(200))
            }
        });

        call(&stub, 3, navtex(Method::Get)).await.expect("response");

        let gaps = stub.gaps();
        check!(gaps.len() == 3);
        check!(gaps[0] >= Duration::from_millis(500));
        check!(gaps[1] >= Duration::from_secs(1));
        check!(gaps[2] >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_the_wait() {
        let stub = Stub::new(|_| Ok(status_with_retry_after(503, "30")));
        let token = CancellationToken::new();
        let request = Request::builder(Method::Get, navtex(Method::Get).url().clone())
            .cancellation(token.clone())
            .build();

        let canceller = tokio::spawn({
            let token = token.clone();
            async move {
                tokio::time::sleep(Duration::from_secs(1)).await;
                token.cancel();
            }
        });

        let started = Instant::now();
        let err = call(&stub, 3, request).await.expect_err("cancelled");
        canceller.await.expect("canceller");

        check!(matches!(err, Error::Cancelled));
        check!(started.elapsed() < Duration::from_secs(30));
        check!(stub.calls() == 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_before_start_sends_nothing() {
        let stub = Stub::new(|_| Ok(status(200)));
        let token = CancellationToken::new();
        token.cancel();
        let request = Request::builder(Method::Get, navtex(Method::Get).url().clone())
            .cancellation(token)
            .build();

        let err = call(&stub, 3, request).await.expect_err("cancelled");

        check!(err.is_cancellation());
        check!(stub.calls() == 0);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_interrupts_the_wait() {
        let stub = Stub::new(|_| Ok(status_with_retry_after(503, "20")));
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        let request = Request::builder(Method::Get, navtex(Method::Get).url().clone())
            .deadline(deadline)
            .build();

        let err = call(&stub, 3, request).await.expect_err("deadline");

        check!(matches!(err, Error::DeadlineExceeded));
        check!(!err.is_transient());
        check!(stub.calls() == 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_from_inner_is_not_retried() {
        let stub = Stub::new(|_| Err(Error::Cancelled));

        let err = call(&stub, 3, navtex(Method::Get)).await.expect_err("cancelled");

        check!(matches!(err, Error::Cancelled));
        check!(stub.calls() == 1);
    }
}
