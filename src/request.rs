//! Request value threaded through dispatch.
//!
//! A [`Request`] is plain data at the crate boundary: the embedding server
//! layer builds one from whatever transport it speaks, hands it to the
//! dispatcher, and receives a [`crate::response::Response`] or a typed error
//! back. Query fields, JSON body fields, and (after matching) decoded path
//! captures are merged into one input map; later sources win, so path
//! captures override body fields, which override query fields.

use crate::ids::RequestId;
use crate::router::RouteInfo;
use http::Method;
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::net::IpAddr;
use std::sync::Arc;

/// Maximum inline headers before heap allocation.
/// Most requests have ≤16 headers.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage for the hot path.
///
/// Header names use `Arc<str>` instead of `String` because names repeat
/// across requests (content-type, authorization, ...) and `Arc::clone()` is
/// an O(1) atomic increment. Values remain `String` as per-request data.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// An incoming request, decoupled from any transport.
#[derive(Debug, Clone)]
pub struct Request {
    /// Unique request ID for tracing and correlation
    pub id: RequestId,
    /// HTTP method as received (see [`Request::effective_method`] for the
    /// override-aware view)
    pub method: Method,
    /// Request path, without the query string
    pub path: String,
    /// HTTP headers (case-insensitive lookup via [`Request::header`])
    pub headers: HeaderVec,
    /// Combined input map: query fields, then JSON body fields, then decoded
    /// path captures, later sources overriding earlier ones
    pub input: Map<String, Value>,
    /// Raw JSON body, if one was attached
    pub body: Option<Value>,
    /// Client address used for per-client rate budgets
    pub client_addr: Option<IpAddr>,
    route: Option<RouteInfo>,
}

impl Request {
    /// Build a request for the given method and target.
    ///
    /// A query string in `target` is split off and merged into the input map,
    /// so `Request::new(Method::GET, "/users?sort=asc")` and
    /// `Request::new(Method::GET, "/users").with_query("sort=asc")` are
    /// equivalent.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (target, None),
        };
        let mut req = Request {
            id: RequestId::new(),
            method,
            path: path.to_string(),
            headers: HeaderVec::new(),
            input: Map::new(),
            body: None,
            client_addr: None,
            route: None,
        };
        if let Some(query) = query {
            req.merge_query(query);
        }
        req
    }

    /// Merge an `application/x-www-form-urlencoded` query string into the
    /// input map. Values are percent-decoded; repeated names keep the last
    /// occurrence.
    pub fn with_query(mut self, query: &str) -> Self {
        self.merge_query(query);
        self
    }

    /// Attach a JSON body. Top-level object fields are merged into the input
    /// map, overriding query fields of the same name; non-object bodies are
    /// kept on [`Request::body`] only.
    pub fn with_json_body(mut self, body: Value) -> Self {
        if let Some(fields) = body.as_object() {
            for (name, value) in fields {
                self.input.insert(name.clone(), value.clone());
            }
        }
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((Arc::from(name), value.to_string()));
        self
    }

    pub fn with_client_addr(mut self, addr: IpAddr) -> Self {
        self.client_addr = Some(addr);
        self
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get an input field by name
    #[inline]
    #[must_use]
    pub fn input(&self, name: &str) -> Option<&Value> {
        self.input.get(name)
    }

    /// Get an input field as a string slice, if it is a JSON string
    #[inline]
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.input.get(name).and_then(Value::as_str)
    }

    /// Insert or overwrite an input field. Middleware can use this to make
    /// derived values visible to code running later in the pipeline.
    pub fn set_input(&mut self, name: &str, value: Value) {
        self.input.insert(name.to_string(), value);
    }

    /// The method routing decisions are made on.
    ///
    /// A POST carrying an `_method` input field whose uppercased value names
    /// one of GET, POST, PUT, PATCH, or DELETE is routed as that method;
    /// anything else leaves the raw method in force.
    pub fn effective_method(&self) -> Method {
        if self.method == Method::POST {
            if let Some(requested) = self.input.get("_method").and_then(Value::as_str) {
                match requested.to_ascii_uppercase().as_str() {
                    "GET" => return Method::GET,
                    "POST" => return Method::POST,
                    "PUT" => return Method::PUT,
                    "PATCH" => return Method::PATCH,
                    "DELETE" => return Method::DELETE,
                    _ => {}
                }
            }
        }
        self.method.clone()
    }

    /// Summary of the route this request was dispatched to. `None` until the
    /// dispatcher has selected one.
    #[must_use]
    pub fn route(&self) -> Option<&RouteInfo> {
        self.route.as_ref()
    }

    pub(crate) fn set_route(&mut self, info: RouteInfo) {
        self.route = Some(info);
    }

    fn merge_query(&mut self, query: &str) {
        for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
            self.input
                .insert(name.into_owned(), Value::String(value.into_owned()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_string_is_merged_into_input() {
        let req = Request::new(Method::GET, "/users?sort=asc&page=2");
        assert_eq!(req.path, "/users");
        assert_eq!(req.text("sort"), Some("asc"));
        assert_eq!(req.text("page"), Some("2"));
    }

    #[test]
    fn test_query_values_are_percent_decoded() {
        let req = Request::new(Method::GET, "/search?q=a%20b");
        assert_eq!(req.text("q"), Some("a b"));
    }

    #[test]
    fn test_body_fields_override_query_fields() {
        let req = Request::new(Method::POST, "/users?name=query")
            .with_json_body(json!({ "name": "body" }));
        assert_eq!(req.text("name"), Some("body"));
        assert!(req.body.is_some());
    }

    #[test]
    fn test_non_object_body_is_kept_but_not_merged() {
        let req = Request::new(Method::POST, "/echo").with_json_body(json!([1, 2, 3]));
        assert!(req.input.is_empty());
        assert_eq!(req.body, Some(json!([1, 2, 3])));
    }

    #[test]
    fn test_method_override_applies_to_post_only() {
        let req = Request::new(Method::POST, "/users/5")
            .with_json_body(json!({ "_method": "delete" }));
        assert_eq!(req.effective_method(), Method::DELETE);
        assert_eq!(req.method, Method::POST);

        let req = Request::new(Method::GET, "/users/5?_method=DELETE");
        assert_eq!(req.effective_method(), Method::GET);
    }

    #[test]
    fn test_method_override_ignores_unknown_verbs() {
        let req = Request::new(Method::POST, "/users/5")
            .with_json_body(json!({ "_method": "TRACE" }));
        assert_eq!(req.effective_method(), Method::POST);
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let req = Request::new(Method::GET, "/").with_header("Content-Type", "application/json");
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("CONTENT-TYPE"), Some("application/json"));
        assert_eq!(req.header("accept"), None);
    }
}
