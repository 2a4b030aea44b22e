//! Tests for the onion middleware pipeline
//!
//! # Test Coverage
//!
//! - Attachment order inbound, reverse order outbound (global and per-route)
//! - Short-circuiting without reaching the handler
//! - Request mutation visible to later stages
//! - Global middleware observing and replacing matching failures
//! - `MetricsMiddleware` counters and `TraceMiddleware` logging

use http::Method;
use serde_json::json;
use std::sync::{Arc, Mutex};
use switchboard::binding::Handler;
use switchboard::middleware::{
    from_fn, MetricsMiddleware, Middleware, Next, PipelineResult, TraceMiddleware,
};
use switchboard::{DispatchError, Dispatcher, Request, Response};

mod tracing_util;
use tracing_util::TestTracing;

#[derive(Clone, Default)]
struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

struct Tag {
    name: &'static str,
    log: CallLog,
}

impl Middleware for Tag {
    fn handle(&self, req: &mut Request, next: Next<'_>) -> PipelineResult {
        self.log.push(format!("{}:in", self.name));
        let res = next.run(req);
        self.log.push(format!("{}:out", self.name));
        res
    }
}

fn logged_app(log: &CallLog) -> Dispatcher {
    let mut app = Dispatcher::new();
    let handler_log = log.clone();
    app.get(
        "/ping",
        Handler::func(Vec::new(), move |_req, _args| {
            handler_log.push("handler");
            json!("pong")
        }),
    )
    .unwrap();
    app
}

#[test]
fn test_global_middleware_runs_onion_order() {
    let log = CallLog::default();
    let mut app = logged_app(&log);
    app.add_middleware(Arc::new(Tag {
        name: "a",
        log: log.clone(),
    }));
    app.add_middleware(Arc::new(Tag {
        name: "b",
        log: log.clone(),
    }));

    app.dispatch(Request::new(Method::GET, "/ping")).unwrap();
    assert_eq!(log.entries(), ["a:in", "b:in", "handler", "b:out", "a:out"]);
}

#[test]
fn test_route_middleware_wraps_only_its_route() {
    let log = CallLog::default();
    let mut app = Dispatcher::new();

    let handler_log = log.clone();
    app.get(
        "/guarded",
        Handler::func(Vec::new(), move |_req, _args| {
            handler_log.push("guarded-handler");
            json!("ok")
        }),
    )
    .unwrap()
    .middleware(Arc::new(Tag {
        name: "route",
        log: log.clone(),
    }));

    let other_log = log.clone();
    app.get(
        "/open",
        Handler::func(Vec::new(), move |_req, _args| {
            other_log.push("open-handler");
            json!("ok")
        }),
    )
    .unwrap();

    app.dispatch(Request::new(Method::GET, "/guarded")).unwrap();
    app.dispatch(Request::new(Method::GET, "/open")).unwrap();
    assert_eq!(
        log.entries(),
        ["route:in", "guarded-handler", "route:out", "open-handler"]
    );
}

#[test]
fn test_middleware_can_short_circuit() {
    let log = CallLog::default();
    let mut app = logged_app(&log);
    app.add_middleware(from_fn(|req, _next| {
        if req.header("authorization").is_none() {
            return Ok(Response::error(401, "missing credentials"));
        }
        unreachable!("all requests in this test lack the header")
    }));

    let res = app.dispatch(Request::new(Method::GET, "/ping")).unwrap();
    assert_eq!(res.status, 401);
    // The handler never ran.
    assert!(log.entries().is_empty());
}

#[test]
fn test_middleware_mutations_reach_the_handler() {
    let mut app = Dispatcher::new();
    app.get(
        "/whoami",
        Handler::func(Vec::new(), |req, _args| {
            json!({ "user": req.text("user") })
        }),
    )
    .unwrap()
    .middleware(from_fn(|req, next| {
        req.set_input("user", json!("alice"));
        next.run(req)
    }));

    let res = app.dispatch(Request::new(Method::GET, "/whoami")).unwrap();
    assert_eq!(res.body["user"], "alice");
}

#[test]
fn test_global_middleware_sees_matching_failures() {
    let mut app = Dispatcher::new();
    app.get(
        "/exists",
        Handler::func(Vec::new(), |_req, _args| json!("ok")),
    )
    .unwrap();
    // Convert any dispatch failure into its default rendering.
    app.add_middleware(from_fn(|req, next| match next.run(req) {
        Ok(res) => Ok(res),
        Err(err) => Ok(err.to_response()),
    }));

    let res = app
        .dispatch(Request::new(Method::GET, "/does-not-exist"))
        .unwrap();
    assert_eq!(res.status, 404);
    assert_eq!(res.body["error"], json!("no route matches GET /does-not-exist"));
}

#[test]
fn test_route_middleware_never_sees_matching_failures() {
    let log = CallLog::default();
    let mut app = Dispatcher::new();
    app.get(
        "/a",
        Handler::func(Vec::new(), |_req, _args| json!("ok")),
    )
    .unwrap()
    .middleware(Arc::new(Tag {
        name: "route",
        log: log.clone(),
    }));

    let err = app
        .dispatch(Request::new(Method::GET, "/missing"))
        .unwrap_err();
    assert!(matches!(err, DispatchError::RouteNotFound { .. }));
    assert!(log.entries().is_empty());
}

#[test]
fn test_metrics_middleware_counts() {
    let _trace = TestTracing::init();
    let metrics = Arc::new(MetricsMiddleware::new());

    let mut app = Dispatcher::new();
    app.add_middleware(Arc::clone(&metrics) as Arc<dyn Middleware>);
    app.get(
        "/pets",
        Handler::func(Vec::new(), |_req, _args| json!([])),
    )
    .unwrap();

    app.dispatch(Request::new(Method::GET, "/pets")).unwrap();
    app.dispatch(Request::new(Method::GET, "/pets")).unwrap();
    let _ = app.dispatch(Request::new(Method::GET, "/missing"));

    assert_eq!(metrics.request_count(), 3);
    assert_eq!(metrics.error_count(), 1);
    assert!(metrics.average_latency().as_nanos() > 0);
}

#[test]
fn test_trace_middleware_logs_success_and_failure() {
    let _trace = TestTracing::init();
    let mut app = Dispatcher::new();
    app.add_middleware(Arc::new(TraceMiddleware));
    app.get(
        "/pets",
        Handler::func(Vec::new(), |_req, _args| json!([])),
    )
    .unwrap();

    let res = app.dispatch(Request::new(Method::GET, "/pets")).unwrap();
    assert_eq!(res.status, 200);

    let err = app
        .dispatch(Request::new(Method::GET, "/missing"))
        .unwrap_err();
    assert_eq!(err.status(), 404);
}
