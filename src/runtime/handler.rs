use crate::http::{request::Request, response::Response};

/// A route handler.
///
/// Receives the parsed request, with path parameters already bound, and the response to fill
/// in. Any `Fn(&mut Request, &mut Response)` closure that is `Send + Sync` is a handler.
/// Handlers run on the blocking thread pool, so blocking I/O inside one is fine.
pub trait Handler: Send + Sync {
    /// Determines what happens to a given request.
    fn call(&self, req: &mut Request, res: &mut Response);
}

impl<F> Handler for F
where
    F: Fn(&mut Request, &mut Response) + Send + Sync,
{
    fn call(&self, req: &mut Request, res: &mut Response) {
        self(req, res);
    }
}
