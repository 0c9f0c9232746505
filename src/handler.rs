//! Handler trait and type erasure.
//!
//! The route registry holds handlers of *different* closure and `async fn`
//! types in one `Vec`, so each is boxed behind the object-safe
//! [`ErasedHandler`] interface:
//!
//! ```text
//! async fn home(req: Request, res: Response) { … }   ← user writes this
//!        ↓ server.get("/", home)
//! home.into_boxed_handler()                          ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(home))                          ← stored in the Route
//!        ↓
//! handler.call(req, res)  at request time            ← one vtable dispatch
//! ```
//!
//! A handler returns nothing. It answers through the [`Response`] wrapper it
//! owns, which may also be moved into a spawned task and sent later.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::Response;

// ── Internal types ───────────────────────────────────────────────────────────

/// A heap-allocated, type-erased handler future.
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` because it appears in the return type of the public
/// `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request, res: Response) -> BoxFuture;
}

#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ─────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// Satisfied automatically by any function or closure shaped like:
///
/// ```text
/// async fn name(req: Request, res: Response)
/// ```
///
/// The trait is sealed: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

// Outside crates can name `Handler` but cannot implement it, which keeps
// the erasure methods free to change.
mod private {
    pub trait Sealed {}
}

// ── Blanket implementations ──────────────────────────────────────────────────

impl<F, Fut> private::Sealed for F
where
    F: Fn(Request, Response) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
}

impl<F, Fut> Handler for F
where
    F: Fn(Request, Response) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ─────────────────────────────────────────────────────────

/// Owns the user's function. Boxing the future it returns is what lets
/// handlers with different future types share one `Vec`.
struct FnHandler<F>(F);

impl<F, Fut> ErasedHandler for FnHandler<F>
where
    F: Fn(Request, Response) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn call(&self, req: Request, res: Response) -> BoxFuture {
        Box::pin((self.0)(req, res))
    }
}
