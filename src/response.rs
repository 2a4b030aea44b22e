//! Response value returned from dispatch.
//!
//! Handlers may return a [`Response`] directly or any type implementing
//! [`IntoResponse`]; the dispatcher normalizes raw return values through that
//! trait so simple handlers can return a `serde_json::Value` or a string.

use crate::request::HeaderVec;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Response data produced by a handler.
///
/// Uses `SmallVec` for headers to avoid heap allocation in the common case.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: u16,
    /// HTTP response headers (stack-allocated for ≤16 headers)
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// Response body as JSON
    pub body: Value,
}

impl Response {
    /// Create a new response with the given status, headers, and body
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create a JSON response with a `content-type: application/json` header
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create an error response with an `{ "error": message }` body
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    /// Get a header by name (case-insensitive)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or update a header, replacing any existing value (case-insensitive)
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

/// Conversion from a handler's raw return value into a [`Response`].
///
/// Implemented for the shapes handlers commonly return:
///
/// - `Response`: passed through unchanged
/// - `serde_json::Value`: `200` with a JSON body
/// - `String` / `&str`: `200` with a `text/plain` body
/// - `(u16, Value)`: explicit status with a JSON body
/// - `()`: `204 No Content`
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response {
        self
    }
}

impl IntoResponse for Value {
    fn into_response(self) -> Response {
        Response::json(200, self)
    }
}

impl IntoResponse for String {
    fn into_response(self) -> Response {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "text/plain".to_string()));
        Response::new(200, headers, Value::String(self))
    }
}

impl IntoResponse for &str {
    fn into_response(self) -> Response {
        self.to_string().into_response()
    }
}

impl IntoResponse for (u16, Value) {
    fn into_response(self) -> Response {
        Response::json(self.0, self.1)
    }
}

impl IntoResponse for () {
    fn into_response(self) -> Response {
        Response::new(204, HeaderVec::new(), Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_sets_content_type() {
        let res = Response::json(201, json!({ "id": 7 }));
        assert_eq!(res.status, 201);
        assert_eq!(res.get_header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn test_set_header_replaces_existing() {
        let mut res = Response::json(200, Value::Null);
        res.set_header("X-Test", "one".to_string());
        res.set_header("x-test", "two".to_string());
        assert_eq!(res.get_header("X-TEST"), Some("two"));
        assert_eq!(
            res.headers
                .iter()
                .filter(|(k, _)| k.eq_ignore_ascii_case("x-test"))
                .count(),
            1
        );
    }

    #[test]
    fn test_into_response_conversions() {
        let res = json!({ "ok": true }).into_response();
        assert_eq!(res.status, 200);
        assert_eq!(res.get_header("content-type"), Some("application/json"));

        let res = "hello".into_response();
        assert_eq!(res.status, 200);
        assert_eq!(res.get_header("content-type"), Some("text/plain"));
        assert_eq!(res.body, Value::String("hello".to_string()));

        let res = (418u16, json!({ "teapot": true })).into_response();
        assert_eq!(res.status, 418);

        let res = ().into_response();
        assert_eq!(res.status, 204);
        assert_eq!(res.body, Value::Null);
    }

    #[test]
    fn test_error_body_shape() {
        let res = Response::error(404, "no such pet");
        assert_eq!(res.status, 404);
        assert_eq!(res.body, json!({ "error": "no such pet" }));
    }
}
