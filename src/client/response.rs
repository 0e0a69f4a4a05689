//! Response envelope for one completed HTTP exchange.
//!
//! The envelope never treats a non-2xx status as an error on its own; use the
//! status predicates or [`Response::error_for_status`] to decide. JSON
//! decoding happens on first access to [`Response::json`] and is memoized.

use std::borrow::Cow;
use std::sync::OnceLock;

use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::transport::HttpResponse;
use crate::error::{Error, Result};

/// Immutable wrapper around a status, headers and raw body.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: HeaderMap,
    body: Vec<u8>,
    json: OnceLock<Value>,
}

impl Response {
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
            json: OnceLock::new(),
        }
    }

    /// HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Canonical reason phrase for the status, or `"Unknown"`.
    pub fn status_text(&self) -> &'static str {
        StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown")
    }

    /// Response headers; lookups are case-insensitive.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of header `name`, if present and valid text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Raw body bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Raw body as text, replacing invalid UTF-8 sequences.
    pub fn raw(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Body decoded as JSON.
    ///
    /// Fails with [`Error::Format`] when the declared content type is not JSON
    /// or the payload does not parse. A response without a declared content
    /// type is parsed optimistically.
    pub fn json(&self) -> Result<&Value> {
        if let Some(value) = self.json.get() {
            return Ok(value);
        }

        if let Some(content_type) = self.content_type() {
            if !is_json_content_type(content_type) {
                return Err(Error::format(format!(
                    "expected a JSON response, got `{}`",
                    content_type
                )));
            }
        }

        let value: Value = serde_json::from_slice(&self.body)
            .map_err(|e| Error::format(format!("invalid JSON body: {}", e)))?;

        Ok(self.json.get_or_init(|| value))
    }

    /// Body decoded into `T`.
    pub fn json_as<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(self.json()?)
            .map_err(|e| Error::format(format!("unexpected JSON shape: {}", e)))
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    pub fn is_client_error(&self) -> bool {
        (400..=499).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        (500..=599).contains(&self.status)
    }

    pub fn is_error(&self) -> bool {
        self.is_client_error() || self.is_server_error()
    }

    /// Turn a non-2xx envelope into [`Error::Api`] carrying the raw body.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::api(self.status, self.status_text(), self.raw()))
        }
    }
}

impl From<HttpResponse> for Response {
    fn from(raw: HttpResponse) -> Self {
        Self::new(raw.status, raw.headers, raw.body)
    }
}

/// `application/json` or any `+json` structured syntax suffix.
pub fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde_json::json;

    fn response(status: u16, content_type: Option<&'static str>, body: &str) -> Response {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(ct));
        }
        Response::new(status, headers, body.as_bytes().to_vec())
    }

    #[test]
    fn test_created_json_response() {
        let res = response(201, Some("application/json"), r#"{"id":"abc"}"#);
        assert!(res.is_success());
        assert!(!res.is_error());
        assert_eq!(res.status(), 201);
        assert_eq!(res.status_text(), "Created");
        assert_eq!(res.json().unwrap(), &json!({"id": "abc"}));
    }

    #[test]
    fn test_not_found_predicates() {
        let res = response(404, Some("application/json"), r#"{"message":"not found"}"#);
        assert!(res.is_client_error());
        assert!(!res.is_server_error());
        assert!(res.is_error());
        assert!(!res.is_success());
        assert_eq!(res.json().unwrap()["message"], "not found");
    }

    #[test]
    fn test_server_error_predicates() {
        let res = response(503, None, "");
        assert!(res.is_server_error());
        assert!(res.is_error());
        assert!(!res.is_client_error());
    }

    #[test]
    fn test_csv_response_is_not_json() {
        let csv = "timestamp,temperature\n2024-01-01T00:00:00Z,21.5\n";
        let res = response(200, Some("text/csv"), csv);

        let err = res.json().unwrap_err();
        assert!(matches!(err, Error::Format(_)));
        assert!(err.to_string().contains("text/csv"));
        assert_eq!(res.raw(), csv);
        assert_eq!(res.bytes(), csv.as_bytes());
    }

    #[test]
    fn test_malformed_json_fails_lazily() {
        let res = response(200, Some("application/json"), "{not json");
        assert!(res.is_success());
        assert!(matches!(res.json(), Err(Error::Format(_))));
        assert_eq!(res.raw(), "{not json");
    }

    #[test]
    fn test_json_without_content_type_is_parsed() {
        let res = response(200, None, "[1,2,3]");
        assert_eq!(res.json().unwrap(), &json!([1, 2, 3]));
        // Memoized: the same value is returned on subsequent access.
        assert!(std::ptr::eq(res.json().unwrap(), res.json().unwrap()));
    }

    #[test]
    fn test_json_as_typed() {
        #[derive(serde::Deserialize)]
        struct Created {
            id: String,
        }
        let res = response(201, Some("application/json; charset=utf-8"), r#"{"id":"abc"}"#);
        let created: Created = res.json_as().unwrap();
        assert_eq!(created.id, "abc");
        assert!(res.json_as::<Vec<u32>>().is_err());
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("42"));
        let res = Response::new(200, headers, Vec::new());
        assert_eq!(res.header("X-RateLimit-Remaining"), Some("42"));
        assert_eq!(res.header("X-RATELIMIT-REMAINING"), Some("42"));
        assert_eq!(res.header("missing"), None);
    }

    #[test]
    fn test_error_for_status() {
        let ok = response(204, None, "");
        assert!(ok.error_for_status().is_ok());

        let err = response(422, Some("application/json"), r#"{"message":"Validation Failed"}"#)
            .error_for_status()
            .unwrap_err();
        assert_eq!(err.status(), Some(422));
        assert!(err.to_string().contains("Validation Failed"));
    }

    #[test]
    fn test_json_content_type_detection() {
        assert!(is_json_content_type("application/json"));
        assert!(is_json_content_type("Application/JSON; charset=utf-8"));
        assert!(is_json_content_type("application/problem+json"));
        assert!(!is_json_content_type("text/csv"));
        assert!(!is_json_content_type("text/plain"));
    }
}
