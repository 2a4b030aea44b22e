//! # Switchboard
//!
//! **Switchboard** is a request-dispatch core for server-side web frameworks:
//! ordered routing, fixed-window rate limiting, onion middleware, and
//! priority-based argument resolution, with no opinion about the transport
//! that feeds it.
//!
//! ## Overview
//!
//! The embedding server layer builds a [`request::Request`] from whatever
//! protocol it speaks and hands it to a [`dispatcher::Dispatcher`]. The
//! dispatcher normalizes the path, applies the `_method` override, matches
//! the route table in registration order, enforces the route's rate budget,
//! binds handler arguments from declared descriptors, and runs the middleware
//! pipeline around the handler. Out comes a [`response::Response`] or a typed
//! [`error::DispatchError`] the boundary layer renders.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - **[`dispatcher`]** - The façade: registration, normalization, dispatch
//! - **[`router`]** - Path template compilation and ordered route matching
//! - **[`binding`]** - Handler parameter descriptors and argument resolution
//! - **[`middleware`]** - Onion-style middleware with a `Next` continuation
//! - **[`limiter`]** - Cache-backed fixed-window rate counters
//! - **[`cache`]** - The `CacheStore` trait and the dashmap-backed default
//! - **[`container`]** - Typemap service registry and component handlers
//! - **[`request`]** / **[`response`]** - Transport-neutral request/response values
//! - **[`error`]** - Registration, dispatch, and URL-generation taxonomies
//! - **[`ids`]** - ULID-backed request ids
//! - **[`runtime_config`]** - Environment-driven runtime settings
//!
//! ## Key Architectural Patterns
//!
//! 1. **Registration-time resolution**: templates compile, names deduplicate,
//!    and component handlers resolve while the table is built, so those
//!    failures never reach a live request
//! 2. **`&mut`-build / `&`-serve**: dispatch borrows the table immutably, so
//!    the borrow checker enforces the read-only-while-serving lifecycle
//! 3. **First registered wins**: overlapping templates are tried in
//!    registration order, making precedence explicit and predictable
//! 4. **Fail before the pipeline**: rate-limit breaches and unresolvable
//!    arguments abort before any route middleware or handler code runs
//!
//! ## Quick Start
//!
//! ```
//! use http::Method;
//! use serde_json::json;
//! use switchboard::binding::{Handler, ParamSpec};
//! use switchboard::dispatcher::Dispatcher;
//! use switchboard::request::Request;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut app = Dispatcher::new();
//! app.get(
//!     "/pets/{id}",
//!     Handler::func(vec![ParamSpec::input("id")], |_req, args| {
//!         json!({ "id": args.text("id") })
//!     }),
//! )?
//! .name("show_pet")?
//! .rate_limit(60, 60);
//!
//! let res = app.dispatch(Request::new(Method::GET, "/pets/42"))?;
//! assert_eq!(res.status, 200);
//! assert_eq!(res.body["id"], "42");
//!
//! // Reverse URL generation for named routes
//! assert_eq!(app.find_url("show_pet", &[("id", "7")])?, "/pets/7");
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Transport-neutral**: plain request in, plain response out; embed it
//!   under any HTTP server, test harness, or message bus
//! - **`{param}` path templates**: compiled to anchored matchers once, at
//!   registration
//! - **Method override**: HTML-form-friendly `_method` field on POST
//! - **Rate limiting**: per-route, per-client fixed windows over a pluggable
//!   [`cache::CacheStore`], with `X-RateLimit-*` headers stamped on success
//! - **Onion middleware**: global (sees matching failures) and per-route
//!   (wraps the handler), both with short-circuit support
//! - **Declared bindings**: arguments resolve from input fields, the request
//!   itself, container services, defaults, or null, in strict priority order
//! - **Component handlers**: route straight to named actions on container
//!   types, resolved at registration

pub mod binding;
pub mod cache;
pub mod container;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod limiter;
pub mod middleware;
pub mod request;
pub mod response;
pub mod router;
pub mod runtime_config;

pub use binding::{Action, Args, BoundArg, Handler, ParamSpec};
pub use cache::{CacheStore, Counter, MemoryCache};
pub use container::{Component, Container};
pub use dispatcher::{Dispatcher, RouteHandle};
pub use error::{DispatchError, RegisterError, UrlError};
pub use ids::RequestId;
pub use limiter::{Quota, RateLimiter};
pub use middleware::{from_fn, Middleware, Next, PipelineResult};
pub use request::Request;
pub use response::{IntoResponse, Response};
pub use router::{PathPattern, RateLimit, RouteInfo, RouteMatch, Router};
pub use runtime_config::RuntimeConfig;
