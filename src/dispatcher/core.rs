//! Dispatcher core module - registration wiring and the dispatch hot path.

use http::Method;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::binding::{self, Action, Handler, HandlerKind};
use crate::cache::{CacheStore, MemoryCache};
use crate::container::Container;
use crate::error::{DispatchError, RegisterError, UrlError};
use crate::limiter::RateLimiter;
use crate::middleware::{Middleware, Next};
use crate::request::Request;
use crate::response::Response;
use crate::router::{PathPattern, RateLimit, Route, RouteMatch, Router};
use crate::runtime_config::RuntimeConfig;

/// Request-dispatch façade.
///
/// Owns the route table, the service container, the rate limiter, and the
/// global middleware pipeline. Registration takes `&mut self`; dispatch takes
/// `&self`, so the borrow checker pins the table read-only while serving.
pub struct Dispatcher {
    router: Router,
    container: Container,
    middleware: Vec<Arc<dyn Middleware>>,
    limiter: RateLimiter,
    config: RuntimeConfig,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Empty dispatcher over an in-memory cache store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_services(Container::new(), Arc::new(MemoryCache::new()))
    }

    /// Dispatcher over a pre-wired container and a caller-chosen cache store
    /// (the store backs the rate counters).
    #[must_use]
    pub fn with_services(container: Container, store: Arc<dyn CacheStore>) -> Self {
        Dispatcher {
            router: Router::new(),
            container,
            middleware: Vec::new(),
            limiter: RateLimiter::new(store),
            config: RuntimeConfig::default(),
        }
    }

    pub fn set_config(&mut self, config: RuntimeConfig) {
        self.config = config;
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    #[must_use]
    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut Container {
        &mut self.container
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Append global middleware. Runs around every dispatch, including ones
    /// that fail to match, in attachment order inbound.
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        self.middleware.push(mw);
    }

    /// Register a route. Template compilation and handler resolution happen
    /// here, so a bad template or a dangling component reference fails now,
    /// not mid-request.
    pub fn register(
        &mut self,
        method: Method,
        template: &str,
        handler: impl Into<Handler>,
    ) -> Result<RouteHandle<'_>, RegisterError> {
        let supported = [
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ];
        if !supported.contains(&method) {
            return Err(RegisterError::UnsupportedMethod { method });
        }

        let pattern = PathPattern::compile(template)?;
        let action = self.resolve_handler(handler.into())?;

        info!(method = %method, template = %template, "Route registered");
        let index = self.router.push(Route::new(method, pattern, action));
        Ok(RouteHandle {
            router: &mut self.router,
            index,
        })
    }

    pub fn get(
        &mut self,
        template: &str,
        handler: impl Into<Handler>,
    ) -> Result<RouteHandle<'_>, RegisterError> {
        self.register(Method::GET, template, handler)
    }

    pub fn post(
        &mut self,
        template: &str,
        handler: impl Into<Handler>,
    ) -> Result<RouteHandle<'_>, RegisterError> {
        self.register(Method::POST, template, handler)
    }

    pub fn put(
        &mut self,
        template: &str,
        handler: impl Into<Handler>,
    ) -> Result<RouteHandle<'_>, RegisterError> {
        self.register(Method::PUT, template, handler)
    }

    pub fn patch(
        &mut self,
        template: &str,
        handler: impl Into<Handler>,
    ) -> Result<RouteHandle<'_>, RegisterError> {
        self.register(Method::PATCH, template, handler)
    }

    pub fn delete(
        &mut self,
        template: &str,
        handler: impl Into<Handler>,
    ) -> Result<RouteHandle<'_>, RegisterError> {
        self.register(Method::DELETE, template, handler)
    }

    /// Build a URL for a named route; see [`Router::find_url`].
    pub fn find_url(&self, name: &str, params: &[(&str, &str)]) -> Result<String, UrlError> {
        self.router.find_url(name, params)
    }

    /// Dispatch a request.
    ///
    /// The global middleware pipeline wraps the whole routing step, so global
    /// middleware observes matching failures (404/405) as `Err` on the way
    /// out and may replace them.
    pub fn dispatch(&self, mut req: Request) -> Result<Response, DispatchError> {
        let terminal = |req: &mut Request| self.dispatch_route(req);
        Next::new(&self.middleware, &terminal).run(&mut req)
    }

    fn dispatch_route(&self, req: &mut Request) -> Result<Response, DispatchError> {
        let started = Instant::now();
        let path = normalize_path(&self.config.base_path, &req.path);
        let method = req.effective_method();

        let RouteMatch { route, params } = self.router.match_route(&method, &path)?;

        // Breach aborts before any route middleware or handler code runs.
        let quota = match route.limit() {
            Some(limit) if limit.max > 0 => {
                Some(self.limiter.hit(route.rate_key(), req.client_addr, limit)?)
            }
            _ => None,
        };

        // Decoded captures win over body and query fields of the same name.
        for (name, raw) in &params {
            let value = match urlencoding::decode(raw) {
                Ok(decoded) => decoded.into_owned(),
                Err(_) => raw.clone(),
            };
            req.set_input(name, Value::String(value));
        }
        req.set_route(route.info());

        let args = binding::bind(req, route.action().params(), &self.container, route.rate_key())?;

        let action = route.action();
        let handler = |req: &mut Request| action.invoke(req, &args);
        let mut res = Next::new(route.middleware(), &handler).run(req)?;

        if let Some(quota) = quota {
            quota.apply(&mut res);
        }

        info!(
            request_id = %req.id,
            method = %method,
            path = %path,
            route_pattern = %route.pattern().template(),
            status = res.status,
            duration_us = started.elapsed().as_micros(),
            "Request dispatched"
        );
        Ok(res)
    }

    fn resolve_handler(&self, handler: Handler) -> Result<Action, RegisterError> {
        match handler.kind {
            HandlerKind::Func(action) => Ok(action),
            HandlerKind::Component {
                id,
                type_name,
                method,
            } => {
                let component = self.container.component_by_id(&id).ok_or(
                    RegisterError::UnknownComponent {
                        component: type_name,
                    },
                )?;
                match component.action(&method) {
                    Some(action) => {
                        debug!(component = type_name, action = %method, "Component handler resolved");
                        Ok(action)
                    }
                    None => Err(RegisterError::HandlerNotFound {
                        component: type_name,
                        method,
                    }),
                }
            }
        }
    }
}

/// Fluent configurator returned by registration.
///
/// Holds the router `&mut`, so a route is fully configured before the next
/// registration or the first dispatch.
pub struct RouteHandle<'d> {
    router: &'d mut Router,
    index: usize,
}

impl RouteHandle<'_> {
    /// Name the route for reverse URL generation. Names are unique across
    /// the table.
    pub fn name(self, name: &str) -> Result<Self, RegisterError> {
        if self.router.has_name(name) {
            return Err(RegisterError::DuplicateName {
                name: name.to_string(),
            });
        }
        self.router.route_mut(self.index).name = Some(Arc::from(name));
        Ok(self)
    }

    /// Attach route middleware; runs around the handler in attachment order
    /// inbound, reverse order outbound.
    pub fn middleware(self, mw: Arc<dyn Middleware>) -> Self {
        self.router.route_mut(self.index).middleware.push(mw);
        self
    }

    /// Cap the route at `max` requests per `window_secs`-second fixed window.
    /// A `max` of zero leaves the route unlimited.
    pub fn rate_limit(self, max: u32, window_secs: u64) -> Self {
        self.router.route_mut(self.index).limit = Some(RateLimit::new(max, window_secs));
        self
    }
}

impl std::fmt::Debug for RouteHandle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let route = &self.router.routes()[self.index];
        f.debug_struct("RouteHandle")
            .field("method", route.method())
            .field("pattern", &route.pattern().template())
            .finish()
    }
}

/// Normalize a request path for matching: strip the configured base path
/// (only at a segment boundary), then strip a single trailing `/` unless the
/// path is exactly `/`.
fn normalize_path(base_path: &str, path: &str) -> String {
    let mut rest = path;
    if !base_path.is_empty() {
        if let Some(stripped) = rest.strip_prefix(base_path) {
            // "/apix" is not under the base path "/api".
            if stripped.is_empty() || stripped.starts_with('/') {
                rest = stripped;
            }
        }
    }
    if rest.len() > 1 {
        if let Some(stripped) = rest.strip_suffix('/') {
            rest = stripped;
        }
    }
    if rest.is_empty() {
        "/".to_string()
    } else {
        rest.to_string()
    }
}
