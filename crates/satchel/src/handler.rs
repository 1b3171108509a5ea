//! The handler contract the middleware wraps.

use std::future::Future;

use http::{Request, Response};

/// A request handler that may decline a request.
///
/// Returning `None` means "not mine" (no route matched, say). The
/// middleware passes that through untouched and skips all session
/// persistence for the request.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` → one handler serves many concurrent
///   requests from different tasks.
/// - The returned future is `Send` so the whole request can move between
///   runtime worker threads.
///
/// Most handlers are closures; wrap them with [`handler_fn`].
pub trait Handler<ReqBody>: Send + Sync + 'static {
    /// Body type of the responses this handler produces.
    type ResBody;

    /// Handles one request.
    fn call(
        &self,
        request: Request<ReqBody>,
    ) -> impl Future<Output = Option<Response<Self::ResBody>>> + Send;
}

/// A [`Handler`] built from an async closure. See [`handler_fn`].
#[derive(Debug, Clone, Copy)]
pub struct HandlerFn<F> {
    f: F,
}

/// Turns an async function or closure into a [`Handler`].
///
/// ```rust
/// use http::{Request, Response};
/// use satchel::handler_fn;
///
/// let hello = handler_fn(|_req: Request<()>| async {
///     Some(Response::new("hello"))
/// });
/// # let _ = hello;
/// ```
pub fn handler_fn<F>(f: F) -> HandlerFn<F> {
    HandlerFn { f }
}

impl<F, Fut, ReqBody, ResBody> Handler<ReqBody> for HandlerFn<F>
where
    F: Fn(Request<ReqBody>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Option<Response<ResBody>>> + Send,
{
    type ResBody = ResBody;

    fn call(
        &self,
        request: Request<ReqBody>,
    ) -> impl Future<Output = Option<Response<ResBody>>> + Send {
        (self.f)(request)
    }
}
