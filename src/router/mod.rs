//! # Router Module
//!
//! Path matching and route resolution. Templates such as `/users/{id}` are
//! compiled to anchored regexes at registration time and matched against
//! normalized request paths at dispatch time.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Compiling path templates into [`PathPattern`] matchers
//! - Matching incoming requests to registered routes in registration order
//! - Extracting path parameters from matched routes
//! - Reverse URL generation for named routes
//!
//! ## Matching rules
//!
//! Routes are scanned in the order they were registered; the first route
//! whose pattern and method both match wins, so more specific templates
//! should be registered before overlapping `{param}` templates. A path that
//! matches only under other methods produces a `405` carrying the allowed
//! set rather than a `404`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use http::Method;
//!
//! let hit = router.match_route(&Method::GET, "/users/42")?;
//! println!("route: {}", hit.route.pattern().template());
//! println!("id: {:?}", hit.param("id"));
//! ```

mod core;
mod route;
#[cfg(test)]
mod tests;

pub use core::{ParamVec, RouteMatch, Router, MAX_INLINE_PARAMS};
pub use route::{PathPattern, RateLimit, Route, RouteInfo};
