//! # Rate Limiter Module
//!
//! Fixed-window request counting backed by the cache store.
//!
//! ## Overview
//!
//! Limited routes carry a `RateLimit { max, window_secs }`. Each admitted
//! request performs one atomic increment-and-get against the cache under a
//! key of the route identifier and the client address, so budgets are
//! per-route *and* per-client. The window is anchored at the first hit and
//! decays via the cache entry's TTL; there is no sliding behavior.
//!
//! - Under the limit: the caller receives a [`Quota`] and stamps
//!   `X-RateLimit-Limit` / `X-RateLimit-Remaining` on the response.
//! - Over the limit: `DispatchError::RateLimitExceeded` carries the limit
//!   and a `Retry-After` value derived from the window's remaining TTL.
//! - `max == 0` means unlimited; the counter is never touched and no
//!   headers are stamped.
//!
//! The check runs after route selection and before any route middleware or
//! argument binding, so a rate-limited request does no further work.

mod core;

pub use core::{Quota, RateLimiter};
