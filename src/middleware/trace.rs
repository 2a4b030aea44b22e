use std::time::Instant;

use tracing::{info, warn};

use super::{Middleware, Next, PipelineResult};
use crate::request::Request;

/// Middleware that logs one structured line per request.
///
/// Logs at `info` for responses and at `warn` for dispatch errors, with the
/// request id, method, path, resulting status, and latency. Attach it to the
/// dispatcher so it also sees requests that never match a route.
pub struct TraceMiddleware;

impl Middleware for TraceMiddleware {
    fn handle(&self, req: &mut Request, next: Next<'_>) -> PipelineResult {
        let started = Instant::now();
        let request_id = req.id;
        let method = req.method.clone();
        let path = req.path.clone();

        let result = next.run(req);

        let latency_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(res) => info!(
                request_id = %request_id,
                method = %method,
                path = %path,
                status = res.status,
                latency_ms = latency_ms,
                "Request completed"
            ),
            Err(err) => warn!(
                request_id = %request_id,
                method = %method,
                path = %path,
                status = err.status(),
                latency_ms = latency_ms,
                error = %err,
                "Request failed"
            ),
        }
        result
    }
}
