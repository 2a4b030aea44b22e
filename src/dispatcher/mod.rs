//! # Dispatcher Module
//!
//! The dispatcher is the façade the embedding server layer talks to. It owns
//! the route table, the service container, the rate limiter, and the global
//! middleware pipeline, and turns a [`crate::request::Request`] into a
//! [`crate::response::Response`] or a typed [`crate::error::DispatchError`].
//!
//! ## Request Flow
//!
//! 1. Global middleware wraps everything below, so it also sees matching
//!    failures (404/405) as `Err` values on the way out
//! 2. Path normalization: configured base path stripped, one trailing `/`
//!    removed (except for `/` itself)
//! 3. Method override: POST + `_method` input field selects the effective verb
//! 4. Route matching in registration order
//! 5. Rate-counter check, before any route middleware or handler code runs
//! 6. Path captures decoded and merged into the input map, current route
//!    threaded onto the request
//! 7. Argument binding against the handler's parameter descriptors; an
//!    unresolvable parameter aborts here
//! 8. Route middleware runs around the handler, onion style
//! 9. Rate-limit headers stamped on the successful response
//!
//! ## Registration
//!
//! Routes are registered against `&mut Dispatcher` at startup and served via
//! `&self` afterwards:
//!
//! ```rust,ignore
//! let mut app = Dispatcher::new();
//! app.get("/pets/{id}", Handler::func(vec![ParamSpec::input("id")], |_req, args| {
//!     serde_json::json!({ "id": args.text("id") })
//! }))?
//! .name("show_pet")?
//! .rate_limit(60, 60);
//!
//! let res = app.dispatch(Request::new(Method::GET, "/pets/42"))?;
//! ```

mod core;

pub use core::{Dispatcher, RouteHandle};
