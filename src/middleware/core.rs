use std::sync::Arc;

use crate::error::DispatchError;
use crate::request::Request;
use crate::response::Response;

/// Result of running a pipeline stage.
pub type PipelineResult = Result<Response, DispatchError>;

/// An interceptor in the dispatch pipeline.
///
/// `handle` owns the whole round trip: whatever it does before calling
/// [`Next::run`] happens on the way in, whatever it does after happens on
/// the way out. Not calling `next.run(req)` short-circuits the rest of the
/// pipeline, handler included.
pub trait Middleware: Send + Sync {
    fn handle(&self, req: &mut Request, next: Next<'_>) -> PipelineResult;
}

/// Continuation for the remainder of a pipeline.
///
/// Borrowed from the dispatcher for the duration of one request; `Copy` so a
/// middleware can hold it across a retry decision without ceremony.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    chain: &'a [Arc<dyn Middleware>],
    terminal: &'a dyn Fn(&mut Request) -> PipelineResult,
}

impl<'a> Next<'a> {
    pub(crate) fn new(
        chain: &'a [Arc<dyn Middleware>],
        terminal: &'a dyn Fn(&mut Request) -> PipelineResult,
    ) -> Self {
        Self { chain, terminal }
    }

    /// Run the rest of the pipeline: the next middleware if one remains,
    /// otherwise the terminal stage.
    pub fn run(self, req: &mut Request) -> PipelineResult {
        match self.chain.split_first() {
            Some((mw, rest)) => mw.handle(
                req,
                Next {
                    chain: rest,
                    terminal: self.terminal,
                },
            ),
            None => (self.terminal)(req),
        }
    }
}

struct FnMiddleware<F>(F);

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(&mut Request, Next<'_>) -> PipelineResult + Send + Sync,
{
    fn handle(&self, req: &mut Request, next: Next<'_>) -> PipelineResult {
        (self.0)(req, next)
    }
}

/// Adapt a closure into a middleware.
///
/// ```rust,ignore
/// app.add_middleware(from_fn(|req, next| {
///     req.set_input("trace", json!(true));
///     next.run(req)
/// }));
/// ```
pub fn from_fn<F>(func: F) -> Arc<dyn Middleware>
where
    F: Fn(&mut Request, Next<'_>) -> PipelineResult + Send + Sync + 'static,
{
    Arc::new(FnMiddleware(func))
}
