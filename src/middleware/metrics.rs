use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use super::{Middleware, Next, PipelineResult};
use crate::request::Request;

/// Middleware for collecting request metrics.
///
/// Tracks request count, error count, and average latency. All counters use
/// atomic operations for thread-safe updates without locks; the middleware
/// is passive and never blocks or rewrites a request.
pub struct MetricsMiddleware {
    request_count: AtomicUsize,
    error_count: AtomicUsize,
    total_latency_ns: AtomicU64,
}

impl Default for MetricsMiddleware {
    fn default() -> Self {
        Self {
            request_count: AtomicUsize::new(0),
            error_count: AtomicUsize::new(0),
            total_latency_ns: AtomicU64::new(0),
        }
    }
}

impl MetricsMiddleware {
    /// Create a metrics middleware with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of requests seen.
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Number of requests that ended in a dispatch error.
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Mean processing time across all requests.
    ///
    /// Returns zero duration if no requests have been processed yet.
    pub fn average_latency(&self) -> Duration {
        let count = self.request_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }
}

impl Middleware for MetricsMiddleware {
    fn handle(&self, req: &mut Request, next: Next<'_>) -> PipelineResult {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        let started = Instant::now();

        let result = next.run(req);

        self.total_latency_ns
            .fetch_add(started.elapsed().as_nanos() as u64, Ordering::Relaxed);
        if result.is_err() {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }
        result
    }
}
