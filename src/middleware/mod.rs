//! # Middleware Module
//!
//! Onion-model interceptors wrapped around dispatch.
//!
//! ## Overview
//!
//! A middleware receives the request and a [`Next`] continuation. It may
//! mutate the request and delegate, skip delegation entirely to
//! short-circuit, or post-process the result on the way back out:
//!
//! ```rust,ignore
//! struct RequireJson;
//!
//! impl Middleware for RequireJson {
//!     fn handle(&self, req: &mut Request, next: Next<'_>) -> PipelineResult {
//!         if req.header("content-type") != Some("application/json") {
//!             return Ok(Response::error(415, "json only"));
//!         }
//!         let result = next.run(req);
//!         // inspect or replace the result here
//!         result
//!     }
//! }
//! ```
//!
//! Middleware attached to a route runs around the handler in attachment
//! order inbound and reverse order outbound. Middleware added to the
//! dispatcher itself (`add_middleware`) wraps the entire dispatch, including
//! matching failures, so it can observe and translate every error.
//!
//! [`from_fn`] adapts a closure, [`TraceMiddleware`] logs one line per
//! request, and [`MetricsMiddleware`] keeps atomic request counters.

mod core;
mod metrics;
mod trace;

pub use core::{from_fn, Middleware, Next, PipelineResult};
pub use metrics::MetricsMiddleware;
pub use trace::TraceMiddleware;
