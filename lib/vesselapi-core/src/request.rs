//! HTTP request building.
//!
//! Use [`Request::builder`] to construct requests with headers, query parameters, a body,
//! and optionally a cancellation token or deadline that bounds the whole logical call.
//!
//! The body is stored as [`Bytes`], so cloning a request yields an independent copy whose
//! body can be sent again in full. Retrying layers rely on this.
//!
//! # Example
//!
//! ```
//! use vesselapi_core::{Request, Method};
//! use bytes::Bytes;
//!
//! let request = Request::<Bytes>::builder(Method::Get, "https://api.vesselapi.com/v1/navtex".parse().unwrap())
//!     .header("Accept", "application/json")
//!     .query("pagination.limit", "10")
//!     .build();
//! ```

use std::collections::HashMap;
use std::time::Instant;

use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::Method;

/// An HTTP request with method, URL, headers, and optional body.
#[derive(Debug, Clone)]
pub struct Request<B = Bytes> {
    method: Method,
    url: url::Url,
    headers: HashMap<String, String>,
    body: Option<B>,
    cancellation: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl<B> Request<B> {
    /// Creates a new [`RequestBuilder`].
    #[must_use]
    pub fn builder(method: Method, url: url::Url) -> RequestBuilder<B> {
        RequestBuilder::new(method, url)
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Request URL.
    #[must_use]
    pub fn url(&self) -> &url::Url {
        &self.url
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value by name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Sets a header, replacing any existing value under the same name regardless of case.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|key, _| !key.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value.into());
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&B> {
        self.body.as_ref()
    }

    /// Token that aborts the call when cancelled.
    #[must_use]
    pub const fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }

    /// Point in time after which the call is abandoned.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Consume into (method, url, headers, body).
    ///
    /// The cancellation token and deadline are dropped: they only concern the caller side.
    #[must_use]
    pub fn into_parts(self) -> (Method, url::Url, HashMap<String, String>, Option<B>) {
        (self.method, self.url, self.headers, self.body)
    }
}

/// Builder for constructing [`Request`] instances.
#[derive(Debug, Clone)]
pub struct RequestBuilder<B = Bytes> {
    method: Method,
    url: url::Url,
    headers: HashMap<String, String>,
    body: Option<B>,
    cancellation: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl<B> RequestBuilder<B> {
    /// Creates a new builder.
    #[must_use]
    pub fn new(method: Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            headers: HashMap::new(),
            body: None,
            cancellation: None,
            deadline: None,
        }
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Appends a query parameter to the URL.
    #[must_use]
    pub fn query(mut self, name: &str, value: &str) -> Self {
        self.url.query_pairs_mut().append_pair(name, value);
        self
    }

    /// Replaces the URL query with an already encoded query string.
    ///
    /// An empty string removes the query entirely.
    #[must_use]
    pub fn raw_query(mut self, query: &str) -> Self {
        if query.is_empty() {
            self.url.set_query(None);
        } else {
            self.url.set_query(Some(query));
        }
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: B) -> Self {
        self.body = Some(body);
        self
    }

    /// Ties the request to a cancellation token.
    #[must_use]
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Sets an optional cancellation token.
    #[must_use]
    pub fn maybe_cancellation(mut self, token: Option<CancellationToken>) -> Self {
        self.cancellation = token;
        self
    }

    /// Sets the deadline for the whole logical call, retries included.
    #[must_use]
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets an optional deadline.
    #[must_use]
    pub fn maybe_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Builds the [`Request`].
    #[must_use]
    pub fn build(self) -> Request<B> {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
            cancellation: self.cancellation,
            deadline: self.deadline,
        }
    }
}

impl RequestBuilder<Bytes> {
    /// Set a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn json<T: serde::Serialize>(self, value: &T) -> crate::Result<Self> {
        let body = crate::to_json(value)?;
        Ok(self.header("Content-Type", "application/json").body(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(raw: &str) -> url::Url {
        url::Url::parse(raw).expect("valid URL")
    }

    #[test]
    fn request_builder_basic() {
        let request = Request::<Bytes>::builder(Method::Get, url("https://api.example.com/port/NLRTM"))
            .header("Accept", "application/json")
            .build();

        assert_eq!(request.method(), Method::Get);
        assert_eq!(request.url().as_str(), "https://api.example.com/port/NLRTM");
        assert_eq!(request.header("accept"), Some("application/json"));
        assert!(request.body().is_none());
        assert!(request.cancellation().is_none());
        assert!(request.deadline().is_none());
    }

    #[test]
    fn request_builder_with_query() {
        let request = Request::<Bytes>::builder(Method::Get, url("https://api.example.com/navtex"))
            .query("pagination.limit", "10")
            .query("pagination.nextToken", "abc")
            .build();

        assert_eq!(
            request.url().as_str(),
            "https://api.example.com/navtex?pagination.limit=10&pagination.nextToken=abc"
        );
    }

    #[test]
    fn request_builder_raw_query() {
        let request = Request::<Bytes>::builder(Method::Get, url("https://api.example.com/search?x=1"))
            .raw_query("filter.name=Ever+Given")
            .build();
        assert_eq!(request.url().query(), Some("filter.name=Ever+Given"));

        let request = Request::<Bytes>::builder(Method::Get, url("https://api.example.com/search?x=1"))
            .raw_query("")
            .build();
        assert_eq!(request.url().query(), None);
    }

    #[test]
    fn set_header_replaces_case_insensitively() {
        let mut request = Request::<Bytes>::builder(Method::Get, url("https://api.example.com"))
            .header("user-agent", "custom/1.0")
            .build();

        request.set_header("User-Agent", "vesselapi-rust/0.1.0");

        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.header("USER-AGENT"), Some("vesselapi-rust/0.1.0"));
    }

    #[test]
    fn clone_keeps_body_and_scope() {
        let token = CancellationToken::new();
        let deadline = Instant::now();
        let request = Request::builder(Method::Post, url("https://api.example.com/search"))
            .json(&serde_json::json!({"query": "test"}))
            .expect("json")
            .cancellation(token.clone())
            .deadline(deadline)
            .build();

        let copy = request.clone();
        token.cancel();

        assert_eq!(copy.body(), request.body());
        assert_eq!(copy.header("Content-Type"), Some("application/json"));
        assert!(copy.cancellation().is_some_and(CancellationToken::is_cancelled));
        assert_eq!(copy.deadline(), Some(deadline));
    }
}
