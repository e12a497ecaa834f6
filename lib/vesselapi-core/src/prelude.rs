//! Commonly used core types.

pub use crate::{
    ApiError, CancellationToken, Error, HttpClient, Method, Page, Pager, Request, RequestBuilder,
    Response, Result, StatusCode, error_from_status,
};
