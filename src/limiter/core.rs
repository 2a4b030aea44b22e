use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::CacheStore;
use crate::error::DispatchError;
use crate::response::Response;
use crate::router::RateLimit;

/// Remaining budget for a request that passed the rate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    /// Maximum requests permitted per window.
    pub limit: u32,
    /// Requests left in the current window after this one.
    pub remaining: u32,
}

impl Quota {
    /// Stamp the standard rate-limit headers onto a response.
    pub fn apply(&self, res: &mut Response) {
        res.set_header("x-ratelimit-limit", self.limit.to_string());
        res.set_header("x-ratelimit-remaining", self.remaining.to_string());
    }
}

/// Cache-backed fixed-window request counter.
pub struct RateLimiter {
    store: Arc<dyn CacheStore>,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Count one request against `route`'s budget for `client`.
    ///
    /// Returns the remaining [`Quota`] or `RateLimitExceeded` once the
    /// window's budget is spent. A `max` of zero never consults the store
    /// and always admits.
    pub fn hit(
        &self,
        route: &str,
        client: Option<IpAddr>,
        limit: RateLimit,
    ) -> Result<Quota, DispatchError> {
        if limit.max == 0 {
            return Ok(Quota {
                limit: 0,
                remaining: 0,
            });
        }

        let key = rate_key(route, client);
        let counter = self
            .store
            .incr(&key, Duration::from_secs(limit.window_secs));

        if counter.count > u64::from(limit.max) {
            let retry_after = retry_after_secs(counter.ttl_remaining);
            warn!(
                route = %route,
                key = %key,
                count = counter.count,
                limit = limit.max,
                retry_after = retry_after,
                "Rate limit exceeded"
            );
            return Err(DispatchError::RateLimitExceeded {
                limit: limit.max,
                retry_after,
            });
        }

        let remaining = limit.max.saturating_sub(counter.count as u32);
        debug!(key = %key, count = counter.count, remaining = remaining, "Rate counter hit");
        Ok(Quota {
            limit: limit.max,
            remaining,
        })
    }
}

// '|' separates the parts because IPv6 addresses contain ':'.
fn rate_key(route: &str, client: Option<IpAddr>) -> String {
    match client {
        Some(addr) => format!("rate:{route}|{addr}"),
        None => format!("rate:{route}|unknown"),
    }
}

fn retry_after_secs(ttl_remaining: Duration) -> u64 {
    let mut secs = ttl_remaining.as_secs();
    if ttl_remaining.subsec_nanos() > 0 {
        secs += 1;
    }
    secs.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_key_shapes() {
        let v4: IpAddr = "10.0.0.1".parse().unwrap();
        let v6: IpAddr = "::1".parse().unwrap();
        assert_eq!(rate_key("pets.show", Some(v4)), "rate:pets.show|10.0.0.1");
        assert_eq!(rate_key("/pets/{id}", Some(v6)), "rate:/pets/{id}|::1");
        assert_eq!(rate_key("pets.show", None), "rate:pets.show|unknown");
    }

    #[test]
    fn test_retry_after_rounds_up_and_floors_at_one() {
        assert_eq!(retry_after_secs(Duration::from_secs(30)), 30);
        assert_eq!(retry_after_secs(Duration::from_millis(1500)), 2);
        assert_eq!(retry_after_secs(Duration::from_millis(1)), 1);
        assert_eq!(retry_after_secs(Duration::ZERO), 1);
    }
}
