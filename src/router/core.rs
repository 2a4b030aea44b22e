//! Router core module - hot path for request matching.

use http::Method;
use smallvec::SmallVec;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::error::{DispatchError, UrlError};

use super::Route;

/// Maximum number of path parameters before heap allocation.
/// Even deeply nested REST paths (e.g., /users/{id}/posts/{postId}) stay ≤8.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the hot path.
/// Uses SmallVec to avoid heap allocation for routes with ≤8 params.
///
/// Param names use `Arc<str>` instead of `String` because:
/// - Names come from the compiled route table (known at registration)
/// - `Arc::clone()` is O(1) atomic increment vs O(n) string copy
/// - Values remain `String` as they're per-request data from the URL
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Result of successfully matching a request path to a route.
pub struct RouteMatch<'r> {
    /// The matched route, borrowed from the table.
    pub route: &'r Route,
    /// Path parameters captured from the URL, in template order.
    /// Values are still percent-encoded at this stage.
    pub params: ParamVec,
}

impl RouteMatch<'_> {
    /// Get a captured path parameter by name.
    ///
    /// Names are unique within a template, so the first hit is the only one.
    #[inline]
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

impl std::fmt::Debug for RouteMatch<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteMatch")
            .field("pattern", &self.route.pattern().template())
            .field("params", &self.params)
            .finish()
    }
}

/// Ordered route table.
///
/// Matching is a linear scan in registration order, so the first route whose
/// pattern and method both fit always wins. Routes are pushed while the
/// dispatcher is being wired and only read afterwards; the `&mut`/`&` split
/// in the API enforces that lifecycle.
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub(crate) fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Append a route, returning its table index.
    pub(crate) fn push(&mut self, route: Route) -> usize {
        self.routes.push(route);
        self.routes.len() - 1
    }

    pub(crate) fn route_mut(&mut self, index: usize) -> &mut Route {
        &mut self.routes[index]
    }

    pub(crate) fn has_name(&self, name: &str) -> bool {
        self.routes.iter().any(|r| r.name() == Some(name))
    }

    /// All registered routes, in registration order.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Match a normalized request path against the table.
    ///
    /// Scans in registration order and returns the first route whose pattern
    /// and method both match. Routes whose pattern matches under a different
    /// method are remembered; if the scan ends with only those, the result is
    /// `MethodNotAllowed` carrying the deduplicated method set, otherwise
    /// `RouteNotFound`.
    pub fn match_route(
        &self,
        method: &Method,
        path: &str,
    ) -> Result<RouteMatch<'_>, DispatchError> {
        debug!(method = %method, path = %path, "Route match attempt");
        let match_start = Instant::now();

        let mut allowed: Vec<Method> = Vec::new();
        for route in &self.routes {
            let Some(params) = route.pattern().capture(path) else {
                continue;
            };
            if route.method == *method {
                let match_duration = match_start.elapsed();
                if match_duration > Duration::from_millis(1) {
                    warn!(
                        method = %method,
                        path = %path,
                        route_pattern = %route.pattern().template(),
                        params = ?params,
                        duration_us = match_duration.as_micros(),
                        "Slow route matching detected"
                    );
                } else {
                    debug!(
                        method = %method,
                        path = %path,
                        route_pattern = %route.pattern().template(),
                        params = ?params,
                        duration_us = match_duration.as_micros(),
                        "Route matched"
                    );
                }
                return Ok(RouteMatch { route, params });
            }
            if !allowed.contains(&route.method) {
                allowed.push(route.method.clone());
            }
        }

        let match_duration = match_start.elapsed();
        if allowed.is_empty() {
            warn!(
                method = %method,
                path = %path,
                duration_us = match_duration.as_micros(),
                "No route matched"
            );
            Err(DispatchError::RouteNotFound {
                method: method.clone(),
                path: path.to_string(),
            })
        } else {
            warn!(
                method = %method,
                path = %path,
                allowed = ?allowed,
                duration_us = match_duration.as_micros(),
                "Path matched under a different method"
            );
            Err(DispatchError::MethodNotAllowed { allowed })
        }
    }

    /// Build a URL for a named route.
    ///
    /// Template parameters are substituted (percent-encoded); params the
    /// template does not consume are appended as a query string.
    pub fn find_url(&self, name: &str, params: &[(&str, &str)]) -> Result<String, UrlError> {
        let route = self
            .routes
            .iter()
            .find(|r| r.name() == Some(name))
            .ok_or_else(|| UrlError::UnknownRoute {
                name: name.to_string(),
            })?;

        let mut url = route.pattern().fill(params)?;

        let consumed = route.pattern().param_names();
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        let mut has_query = false;
        for (key, value) in params {
            if consumed.iter().any(|p| p.as_ref() == *key) {
                continue;
            }
            query.append_pair(key, value);
            has_query = true;
        }
        if has_query {
            url.push('?');
            url.push_str(&query.finish());
        }
        Ok(url)
    }

    /// Print all registered routes to stdout.
    ///
    /// Useful for debugging and verifying that routes are loaded correctly.
    pub fn dump_routes(&self) {
        println!("[routes] count={}", self.routes.len());
        for route in &self.routes {
            println!(
                "[route] {} {} name={}",
                route.method,
                route.pattern().template(),
                route.name().unwrap_or("-")
            );
        }
    }
}
