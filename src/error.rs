//! Error taxonomy for registration, dispatch, and URL generation.
//!
//! Dispatch failures are split into a closed set of variants the caller can
//! match on plus one open-ended channel ([`DispatchError::Handler`]) for
//! failures raised by application code. Programmer errors made while wiring
//! routes surface at registration time as [`RegisterError`], never during a
//! request.

use crate::response::Response;
use http::Method;
use std::fmt;

/// Request-time dispatch failure.
///
/// Every variant maps to a canonical HTTP status via [`DispatchError::status`];
/// [`DispatchError::to_response`] builds the matching JSON error response for
/// callers that want the default rendering.
#[derive(Debug)]
pub enum DispatchError {
    /// No registered route matched the method and path.
    RouteNotFound { method: Method, path: String },
    /// The path matched at least one route, but none with this method.
    MethodNotAllowed {
        /// Methods that do serve this path, in registration order, deduplicated.
        allowed: Vec<Method>,
    },
    /// The route's fixed-window request budget is spent.
    RateLimitExceeded {
        /// Maximum requests permitted per window.
        limit: u32,
        /// Seconds until the current window expires (rounded up, at least 1).
        retry_after: u64,
    },
    /// A handler parameter could not be bound by any resolution strategy.
    UnresolvableDependency { handler: String, parameter: String },
    /// Failure raised by a handler or middleware. Passed through untouched.
    Handler(anyhow::Error),
}

impl DispatchError {
    /// Canonical HTTP status for this error.
    pub fn status(&self) -> u16 {
        match self {
            DispatchError::RouteNotFound { .. } => 404,
            DispatchError::MethodNotAllowed { .. } => 405,
            DispatchError::RateLimitExceeded { .. } => 429,
            DispatchError::UnresolvableDependency { .. } => 500,
            DispatchError::Handler(_) => 500,
        }
    }

    /// Default JSON rendering of this error, with the protocol headers the
    /// variant calls for (`Allow` on 405, rate-limit headers on 429).
    pub fn to_response(&self) -> Response {
        let mut res = Response::error(self.status(), &self.to_string());
        match self {
            DispatchError::MethodNotAllowed { allowed } => {
                let list = allowed
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                res.set_header("allow", list);
            }
            DispatchError::RateLimitExceeded { limit, retry_after } => {
                res.set_header("x-ratelimit-limit", limit.to_string());
                res.set_header("x-ratelimit-remaining", "0".to_string());
                res.set_header("retry-after", retry_after.to_string());
            }
            _ => {}
        }
        res
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::RouteNotFound { method, path } => {
                write!(f, "no route matches {method} {path}")
            }
            DispatchError::MethodNotAllowed { allowed } => {
                let list = allowed
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "method not allowed; allowed: {list}")
            }
            DispatchError::RateLimitExceeded { limit, retry_after } => {
                write!(
                    f,
                    "rate limit of {limit} requests per window exceeded; retry after {retry_after}s"
                )
            }
            DispatchError::UnresolvableDependency { handler, parameter } => {
                write!(
                    f,
                    "handler '{handler}' has no binding for parameter '{parameter}'"
                )
            }
            DispatchError::Handler(err) => write!(f, "handler error: {err}"),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::Handler(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for DispatchError {
    fn from(err: anyhow::Error) -> Self {
        DispatchError::Handler(err)
    }
}

/// Registration-time programmer error.
///
/// Returned while the route table is being built; a dispatcher that
/// registered all routes without one of these will never produce a
/// registration failure at request time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterError {
    /// Method is outside the supported set (GET, POST, PUT, PATCH, DELETE).
    UnsupportedMethod { method: Method },
    /// Path template is malformed (bad segment, unclosed brace, bad identifier).
    InvalidTemplate { template: String, reason: String },
    /// The same `{param}` name appears twice in one template.
    DuplicateParam { template: String, param: String },
    /// Another route already carries this name.
    DuplicateName { name: String },
    /// Component handler references a type the container does not hold.
    UnknownComponent { component: &'static str },
    /// Component is registered but exposes no action with this name.
    HandlerNotFound {
        component: &'static str,
        method: String,
    },
}

impl fmt::Display for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterError::UnsupportedMethod { method } => {
                write!(f, "unsupported HTTP method '{method}'")
            }
            RegisterError::InvalidTemplate { template, reason } => {
                write!(f, "invalid path template '{template}': {reason}")
            }
            RegisterError::DuplicateParam { template, param } => {
                write!(
                    f,
                    "duplicate parameter '{{{param}}}' in path template '{template}'"
                )
            }
            RegisterError::DuplicateName { name } => {
                write!(f, "route name '{name}' is already registered")
            }
            RegisterError::UnknownComponent { component } => {
                write!(f, "component '{component}' is not registered in the container")
            }
            RegisterError::HandlerNotFound { component, method } => {
                write!(f, "component '{component}' has no action named '{method}'")
            }
        }
    }
}

impl std::error::Error for RegisterError {}

/// Reverse URL generation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlError {
    /// No route is registered under this name.
    UnknownRoute { name: String },
    /// The template requires a parameter the caller did not supply.
    MissingParam { route: String, param: String },
}

impl fmt::Display for UrlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlError::UnknownRoute { name } => {
                write!(f, "no route named '{name}'")
            }
            UrlError::MissingParam { route, param } => {
                write!(f, "route '{route}' requires parameter '{param}'")
            }
        }
    }
}

impl std::error::Error for UrlError {}
