//! Body and query serialization utilities.

use bytes::Bytes;

use crate::Result;

/// Serialize a value to JSON bytes.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
///
/// # Example
///
/// ```
/// use vesselapi_core::to_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Search { query: String }
///
/// let bytes = to_json(&Search { query: "test".to_string() }).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"query":"test"}"#);
/// ```
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Into::into)
}

/// Serialize a value to a query string.
///
/// Uses `serde_html_form` which supports `Vec<T>` for repeated query parameters
/// (e.g., `?filter.ids=1&filter.ids=2`).
///
/// # Errors
///
/// Returns an error if query serialization fails.
///
/// # Example
///
/// ```
/// use vesselapi_core::to_query_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Search {
///     #[serde(rename = "filter.name")]
///     name: String,
///     #[serde(rename = "pagination.limit", skip_serializing_if = "Option::is_none")]
///     limit: Option<u32>,
/// }
///
/// let search = Search { name: "Maersk".to_string(), limit: Some(5) };
/// let query = to_query_string(&search).expect("serialize");
/// assert_eq!(query, "filter.name=Maersk&pagination.limit=5");
/// ```
pub fn to_query_string<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_html_form::to_string(value).map_err(Into::into)
}

/// Deserialize JSON bytes to a value with path-aware error messages.
///
/// Uses `serde_path_to_error` so the error names the exact field that failed
/// (e.g., `vessels[3].imo`).
///
/// # Errors
///
/// Returns an error if JSON deserialization fails.
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}
