//! Typed async client for the Vessel API.
//!
//! Every call goes through a resilient pipeline:
//! - [`AuthLayer`](middleware::AuthLayer) sets the bearer token and `User-Agent`;
//! - [`RetryLayer`](middleware::RetryLayer) retries rate limiting, server errors and
//!   transient network failures with backoff, honouring `Retry-After` and never repeating a
//!   non-idempotent call after a server error;
//! - non-2xx responses become [`ApiError`]s through [`error_from_status`];
//! - listings are walked page by page with [`Pager`].
//!
//! # Example
//!
//! ```ignore
//! use vesselapi::prelude::*;
//!
//! let client = VesselClient::new(std::env::var("VESSELAPI_API_KEY")?)?;
//!
//! let vessel = client.vessels().get("9321483", &VesselQuery::default()).await?;
//!
//! let mut events = client
//!     .port_events()
//!     .all_by_port("NLRTM", &PortEventsQuery::default().limit(50));
//! while events.advance().await {
//!     println!("{:?}", events.current());
//! }
//! if let Some(err) = events.error() {
//!     eprintln!("listing failed: {err}");
//! }
//! ```

mod client;
mod config;
mod connector;
pub mod middleware;
pub mod models;
pub mod params;
pub mod prelude;
mod services;
mod transport;

// Re-export client types
pub use client::{BoxedService, ServiceFuture, VesselClient, VesselClientBuilder};
pub use config::{
    ClientConfig, ClientConfigBuilder, DEFAULT_BASE_URL, DEFAULT_MAX_RETRIES, DEFAULT_USER_AGENT,
};
pub use services::{
    EmissionsService, LocationService, NavtexService, PortEventsService, PortsService,
    SearchService, VesselsService,
};
pub use transport::{HyperTransport, MAX_RETRYABLE_BODY};

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use vesselapi_core::{
    ApiError, BoxError, CancellationToken, EMPTY_RESPONSE_MESSAGE, Error, HttpClient, Method,
    Page, PageFuture, Pager, Request, RequestBuilder, Response, Result, error_from_status,
    from_json, to_json, to_query_string,
};

// Re-export http types for status codes and headers
pub use vesselapi_core::{StatusCode, header};
