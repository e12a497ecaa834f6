//! Error types for the Vessel API client.
//!
//! Three families of failure reach callers:
//! - transport errors ([`Error::Connection`], [`Error::Tls`], [`Error::Timeout`]), raised
//!   before any HTTP response was obtained;
//! - cancellation ([`Error::Cancelled`], [`Error::DeadlineExceeded`]), driven by the caller;
//! - structured API errors ([`Error::Api`] wrapping [`ApiError`]) for finished responses
//!   outside the 2xx range or without a usable payload.

use bytes::Bytes;
use derive_more::{Display, Error, From};
use http::StatusCode;
use serde::Deserialize;

/// Message used when a successful response carries no payload.
pub const EMPTY_RESPONSE_MESSAGE: &str = "unexpected empty response";

// ============================================================================
// Structured API Error
// ============================================================================

/// An error response returned by the Vessel API.
///
/// The raw body is always kept, so callers can decode shapes the client does not know about
/// with [`ApiError::decode_body`].
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("vesselapi: {message} (status {status})")]
pub struct ApiError {
    status: u16,
    message: String,
    #[error(not(source))]
    body: Bytes,
}

impl ApiError {
    /// Create an API error from its parts.
    #[must_use]
    pub fn new(status: u16, message: impl Into<String>, body: Bytes) -> Self {
        Self {
            status,
            message: message.into(),
            body,
        }
    }

    /// Error for a 2xx response whose payload is missing.
    #[must_use]
    pub fn empty_response(status: u16, body: Bytes) -> Self {
        Self::new(status, EMPTY_RESPONSE_MESSAGE, body)
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Raw response body.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns `true` for 404 Not Found.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Returns `true` for 429 Too Many Requests.
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        self.status == 429
    }

    /// Returns `true` for 401 Unauthorized.
    #[must_use]
    pub const fn is_auth_error(&self) -> bool {
        self.status == 401
    }

    /// Decode the raw body as JSON into a caller-defined shape.
    ///
    /// # Example
    ///
    /// ```
    /// use bytes::Bytes;
    /// use serde::Deserialize;
    /// use vesselapi_core::error_from_status;
    ///
    /// #[derive(Deserialize)]
    /// struct Envelope { error: Detail }
    /// #[derive(Deserialize)]
    /// struct Detail { r#type: String }
    ///
    /// let body = Bytes::from(r#"{"error":{"message":"invalid api key","type":"authentication_error"}}"#);
    /// let err = error_from_status(401, &body).expect("401 is an error");
    /// let envelope: Envelope = err.decode_body().expect("decodes");
    /// assert_eq!(envelope.error.r#type, "authentication_error");
    /// ```
    pub fn decode_body<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        crate::from_json(&self.body)
    }
}

#[derive(Deserialize)]
struct NestedErrorBody {
    error: Option<MessageBody>,
}

#[derive(Deserialize)]
struct MessageBody {
    message: Option<String>,
}

/// Extracts a message from `{"error":{"message":...}}` or `{"message":...}`, in that order.
fn message_from_body(body: &[u8]) -> Option<String> {
    let nested = serde_json::from_slice::<NestedErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .and_then(|error| error.message)
        .filter(|message| !message.is_empty());

    nested.or_else(|| {
        serde_json::from_slice::<MessageBody>(body)
            .ok()
            .and_then(|parsed| parsed.message)
            .filter(|message| !message.is_empty())
    })
}

/// Classify a finished response.
///
/// Returns `None` for 2xx statuses. Otherwise builds an [`ApiError`] whose message is taken
/// from the body when it matches a known JSON error shape, falling back to the canonical
/// reason phrase of the status. The raw body is kept verbatim either way.
#[must_use]
pub fn error_from_status(status: u16, body: &Bytes) -> Option<ApiError> {
    if (200..300).contains(&status) {
        return None;
    }

    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or_default();

    let message = if body.is_empty() {
        None
    } else {
        message_from_body(body)
    };

    Some(ApiError::new(
        status,
        message.unwrap_or_else(|| reason.to_string()),
        body.clone(),
    ))
}

// ============================================================================
// Error Type
// ============================================================================

/// Main error type for Vessel API operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// The API answered with a non-2xx status or an unusable payload.
    #[display("{_0}")]
    #[from]
    Api(ApiError),

    /// Network/connection errors. These are transient.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(source)] BoxError),

    /// TLS/SSL errors. These are never retried.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(source)] BoxError),

    /// A single attempt took longer than the configured transport timeout.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// The caller cancelled the call.
    #[display("request cancelled")]
    #[from(skip)]
    Cancelled,

    /// The caller's deadline passed before the call completed.
    #[display("deadline exceeded")]
    #[from(skip)]
    DeadlineExceeded,

    /// Invalid request configuration.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// Invalid client configuration.
    #[display("invalid configuration: {_0}")]
    #[from(skip)]
    InvalidConfig(#[error(not(source))] String),

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g., "vessels[0].imo").
        path: String,
        /// Error message.
        message: String,
    },

    /// Query string serialization error.
    #[display("query serialization error: {_0}")]
    #[from]
    QuerySerialization(serde_html_form::ser::Error),

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),
}

/// Boxed cause of a transport failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a connection error from its cause or a plain message.
    #[must_use]
    pub fn connection(source: impl Into<BoxError>) -> Self {
        Self::Connection(source.into())
    }

    /// Create a TLS error from its cause or a plain message.
    #[must_use]
    pub fn tls(source: impl Into<BoxError>) -> Self {
        Self::Tls(source.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns `true` for transport failures worth another attempt.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout)
    }

    /// Returns `true` if the caller cancelled the call or its deadline passed.
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// The structured API error, if this is one.
    #[must_use]
    pub const fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the HTTP status code if this is an API error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api(err) => Some(err.status),
            _ => None,
        }
    }

    /// Returns `true` if this is a 404 Not Found API error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_not_found)
    }

    /// Returns `true` if this is a 429 Too Many Requests API error.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_rate_limited)
    }

    /// Returns `true` if this is a 401 Unauthorized API error.
    #[must_use]
    pub fn is_auth_error(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_auth_error)
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};

    use super::*;

    #[test]
    fn nested_error_message_wins() {
        let body = Bytes::from(r#"{"error":{"message":"bad request"}}"#);
        let err = error_from_status(400, &body).expect("400 is an error");

        check!(err.status() == 400);
        check!(err.message() == "bad request");
        check!(err.body() == &body);
    }

    #[test]
    fn flat_error_message() {
        let body = Bytes::from(r#"{"message":"rate limit exceeded"}"#);
        let err = error_from_status(429, &body).expect("429 is an error");

        check!(err.message() == "rate limit exceeded");
        check!(err.is_rate_limited());
    }

    #[test]
    fn nested_shape_without_message_falls_through_to_flat() {
        let body = Bytes::from(r#"{"error":{"code":"E1"},"message":"flat wins"}"#);
        let err = error_from_status(422, &body).expect("422 is an error");
        check!(err.message() == "flat wins");
    }

    #[test]
    fn non_json_body_keeps_reason_phrase() {
        let body = Bytes::from("<html>Bad Gateway</html>");
        let err = error_from_status(500, &body).expect("500 is an error");

        check!(err.message() == "Internal Server Error");
        check!(err.body().as_ref() == b"<html>Bad Gateway</html>");
    }

    #[test]
    fn empty_messages_keep_reason_phrase() {
        let body = Bytes::from(r#"{"error":{"message":""},"message":""}"#);
        let err = error_from_status(404, &body).expect("404 is an error");
        check!(err.message() == "Not Found");

        let err = error_from_status(401, &Bytes::new()).expect("401 is an error");
        check!(err.message() == "Unauthorized");
        check!(err.body().is_empty());
    }

    #[test]
    fn unknown_status_has_empty_reason() {
        let err = error_from_status(599, &Bytes::new()).expect("599 is an error");
        check!(err.message() == "");
    }

    #[test]
    fn success_statuses_are_not_errors() {
        for status in [200, 201, 204, 299] {
            check!(error_from_status(status, &Bytes::from("{}")).is_none());
        }
        check!(error_from_status(199, &Bytes::new()).is_some());
        check!(error_from_status(300, &Bytes::new()).is_some());
    }

    #[test]
    fn empty_response_error() {
        let err = ApiError::empty_response(204, Bytes::new());
        check!(err.status() == 204);
        check!(err.message() == EMPTY_RESPONSE_MESSAGE);
    }

    #[test]
    fn api_error_predicates() {
        let not_found = ApiError::new(404, "Not Found", Bytes::new());
        check!(not_found.is_not_found());
        check!(!not_found.is_rate_limited());
        check!(!not_found.is_auth_error());

        let auth = Error::from(ApiError::new(401, "invalid api key", Bytes::new()));
        check!(auth.is_auth_error());
        check!(auth.status() == Some(401));
        check!(!auth.is_transient());
    }

    #[test]
    fn error_display() {
        let err = Error::from(ApiError::new(404, "vessel not found", Bytes::new()));
        assert_eq!(err.to_string(), "vesselapi: vessel not found (status 404)");

        assert_eq!(Error::Timeout.to_string(), "request timeout");
        assert_eq!(Error::Cancelled.to_string(), "request cancelled");
        assert_eq!(
            Error::connection("connection refused").to_string(),
            "connection error: connection refused"
        );
        assert_eq!(
            Error::json_deserialization("vessels[0].imo", "invalid type").to_string(),
            "JSON deserialization error at 'vessels[0].imo': invalid type"
        );
    }

    #[test]
    fn error_classification() {
        check!(Error::connection("reset").is_transient());
        check!(Error::Timeout.is_transient());
        check!(!Error::tls("unknown issuer").is_transient());
        check!(!Error::Cancelled.is_transient());
        check!(!Error::DeadlineExceeded.is_transient());

        check!(Error::Cancelled.is_cancellation());
        check!(Error::DeadlineExceeded.is_cancellation());
        check!(!Error::connection("reset").is_cancellation());
        check!(!Error::Timeout.is_cancellation());
    }

    #[test]
    fn transport_errors_keep_their_cause() {
        let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = Error::connection(refused);

        let_assert!(Some(source) = std::error::Error::source(&err));
        let_assert!(Some(io) = source.downcast_ref::<std::io::Error>());
        check!(io.kind() == std::io::ErrorKind::ConnectionRefused);
        check!(err.to_string() == "connection error: refused");

        check!(std::error::Error::source(&Error::Timeout).is_none());
    }
}
