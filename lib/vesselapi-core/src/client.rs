//! HTTP client trait.
//!
//! [`HttpClient`] is the request executor contract shared by the raw transport and the
//! decorated client: a request goes in, a buffered response or an error comes out.
//! Implement it directly to stub the API in tests.

use std::future::Future;

use bytes::Bytes;

use crate::{Request, Response, Result};

/// Core HTTP client trait.
///
/// Implementations return `Ok` for every HTTP status; turning non-2xx statuses into errors
/// is left to [`crate::error_from_status`].
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request and return the response.
    ///
    /// # Errors
    ///
    /// Returns an error if no response was obtained:
    /// - Network errors
    /// - TLS errors
    /// - Timeouts
    /// - Cancellation by the caller
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send;
}
