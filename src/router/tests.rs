use super::{PathPattern, Route, Router};
use crate::binding::Action;
use crate::error::{DispatchError, RegisterError, UrlError};
use crate::response::Response;
use http::Method;
use serde_json::json;

fn noop() -> Action {
    Action::new(Vec::new(), |_req, _args| Response::json(200, json!({})))
}

fn route(method: Method, template: &str) -> Route {
    let pattern = PathPattern::compile(template).expect("template compiles");
    Route::new(method, pattern, noop())
}

#[test]
fn test_root_path() {
    let pattern = PathPattern::compile("/").unwrap();
    assert!(pattern.capture("/").is_some());
    assert!(pattern.capture("/x").is_none());
    assert!(pattern.param_names().is_empty());
}

#[test]
fn test_parameterized_path() {
    let pattern = PathPattern::compile("/items/{id}").unwrap();
    let params = pattern.capture("/items/123").unwrap();
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].0.as_ref(), "id");
    assert_eq!(params[0].1, "123");
}

#[test]
fn test_nested_path() {
    let pattern = PathPattern::compile("/a/{b}/c").unwrap();
    let params = pattern.capture("/a/1/c").unwrap();
    assert_eq!(params[0].1, "1");
    assert!(pattern.capture("/a/1/d").is_none());
}

#[test]
fn test_param_spans_one_segment() {
    let pattern = PathPattern::compile("/items/{id}").unwrap();
    assert!(pattern.capture("/items/1/2").is_none());
    assert!(pattern.capture("/items/").is_none());
    assert!(pattern.capture("/items/123/extra").is_none());
}

#[test]
fn test_capture_keeps_encoding() {
    let pattern = PathPattern::compile("/files/{name}").unwrap();
    let params = pattern.capture("/files/a%20b").unwrap();
    assert_eq!(params[0].1, "a%20b");
}

#[test]
fn test_literal_segments_are_escaped() {
    let pattern = PathPattern::compile("/v1.0/ping").unwrap();
    assert!(pattern.capture("/v1.0/ping").is_some());
    assert!(pattern.capture("/v1x0/ping").is_none());
}

#[test]
fn test_compile_rejects_duplicate_param() {
    let err = PathPattern::compile("/a/{id}/b/{id}").unwrap_err();
    assert!(matches!(err, RegisterError::DuplicateParam { ref param, .. } if param == "id"));
}

#[test]
fn test_compile_rejects_bad_identifier() {
    assert!(PathPattern::compile("/a/{1bad}").is_err());
    assert!(PathPattern::compile("/a/{}").is_err());
    assert!(PathPattern::compile("/a/{has space}").is_err());
}

#[test]
fn test_compile_rejects_partial_braces() {
    assert!(PathPattern::compile("/a/{id").is_err());
    assert!(PathPattern::compile("/a/x{id}").is_err());
    assert!(PathPattern::compile("/a/id}").is_err());
}

#[test]
fn test_compile_rejects_relative_template() {
    assert!(PathPattern::compile("items/{id}").is_err());
}

#[test]
fn test_fill_substitutes_and_encodes() {
    let pattern = PathPattern::compile("/files/{name}").unwrap();
    let url = pattern.fill(&[("name", "a b")]).unwrap();
    assert_eq!(url, "/files/a%20b");
}

#[test]
fn test_fill_missing_param() {
    let pattern = PathPattern::compile("/files/{name}").unwrap();
    let err = pattern.fill(&[]).unwrap_err();
    assert!(matches!(err, UrlError::MissingParam { ref param, .. } if param == "name"));
}

#[test]
fn test_first_registered_route_wins() {
    let mut router = Router::new();
    router.push(route(Method::GET, "/users/me"));
    router.push(route(Method::GET, "/users/{id}"));

    let hit = router.match_route(&Method::GET, "/users/me").unwrap();
    assert_eq!(hit.route.pattern().template(), "/users/me");

    // Registration order decides; with the template first, it shadows.
    let mut router = Router::new();
    router.push(route(Method::GET, "/users/{id}"));
    router.push(route(Method::GET, "/users/me"));

    let hit = router.match_route(&Method::GET, "/users/me").unwrap();
    assert_eq!(hit.route.pattern().template(), "/users/{id}");
    assert_eq!(hit.param("id"), Some("me"));
}

#[test]
fn test_method_mismatch_collects_allowed() {
    let mut router = Router::new();
    router.push(route(Method::GET, "/things/{id}"));
    router.push(route(Method::PUT, "/things/{id}"));
    router.push(route(Method::GET, "/things/{slug}"));

    let err = router.match_route(&Method::DELETE, "/things/9").unwrap_err();
    match err {
        DispatchError::MethodNotAllowed { allowed } => {
            assert_eq!(allowed, vec![Method::GET, Method::PUT]);
        }
        other => panic!("expected MethodNotAllowed, got {other:?}"),
    }
}

#[test]
fn test_no_route_matched() {
    let mut router = Router::new();
    router.push(route(Method::GET, "/things/{id}"));

    let err = router.match_route(&Method::GET, "/nothing").unwrap_err();
    assert!(matches!(err, DispatchError::RouteNotFound { .. }));
}

#[test]
fn test_find_url_appends_leftover_query() {
    let mut router = Router::new();
    let mut named = route(Method::GET, "/users/{id}/posts");
    named.name = Some("user_posts".into());
    router.push(named);

    let url = router
        .find_url("user_posts", &[("id", "7"), ("page", "2"), ("q", "a b")])
        .unwrap();
    assert_eq!(url, "/users/7/posts?page=2&q=a+b");

    let err = router.find_url("missing", &[]).unwrap_err();
    assert!(matches!(err, UrlError::UnknownRoute { .. }));
}
