//! Core types for the Vessel API client.
//!
//! This crate provides the transport-neutral building blocks used by `vesselapi`:
//! - [`Method`] - HTTP method enum with the retry-safety classification
//! - [`Request`] and [`RequestBuilder`] - outbound requests with a re-readable body
//! - [`Response`] - buffered HTTP response
//! - [`Error`], [`ApiError`] and [`Result`] - error handling
//! - [`error_from_status`] - turns a finished response into a structured error
//! - [`HttpClient`] - the request executor contract
//! - [`Pager`] and [`Page`] - lazy iteration over cursor-paginated endpoints
//! - [`StatusCode`] - HTTP status codes (re-exported from `http` crate)

mod body;
mod client;
mod error;
mod method;
mod pagination;
pub mod prelude;
mod request;
mod response;

pub use body::{from_json, to_json, to_query_string};
pub use client::HttpClient;
pub use error::{ApiError, BoxError, EMPTY_RESPONSE_MESSAGE, Error, Result, error_from_status};
pub use method::Method;
pub use pagination::{Page, PageFuture, Pager};
pub use request::{Request, RequestBuilder};
pub use response::Response;

// Re-export http crate types for status codes and headers
pub use http::{StatusCode, header};

// Re-export the cancellation primitive carried by requests
pub use tokio_util::sync::CancellationToken;
