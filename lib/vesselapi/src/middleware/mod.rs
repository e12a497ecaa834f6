//! Tower middleware layers used by the Vessel API client.
//!
//! [`VesselClient`](crate::VesselClient) composes them around the transport in this order,
//! outermost first:
//!
//! - [`RetryLayer`] - backoff, `Retry-After`, idempotency rules and cancellation
//! - [`LoggingLayer`] - one `tracing` span per attempt (optional)
//! - [`AuthLayer`] - `Authorization: Bearer <key>` and `User-Agent`
//!
//! The layers are public so a custom stack can be assembled with [`ServiceBuilder`]
//! around any transport that speaks [`Request`](crate::Request) and
//! [`Response`](crate::Response).
//!
//! ```ignore
//! use vesselapi::middleware::{AuthLayer, RetryLayer, ServiceBuilder};
//!
//! let service = ServiceBuilder::new()
//!     .layer(RetryLayer::new(3))
//!     .layer(AuthLayer::new("my-api-key", "fleet-monitor/1.0"))
//!     .service(transport);
//! ```

mod auth;
mod logging;
mod retry;

pub use auth::{Auth, AuthLayer};
pub use logging::{LogLevel, Logging, LoggingLayer};
pub use retry::{
    MAX_BACKOFF, Retry, RetryLayer, backoff_for, exponential_backoff, retry_after, should_retry,
};
pub use tower::{Layer, ServiceBuilder};
