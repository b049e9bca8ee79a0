//! # Handler callables: synchronous and future-producing.
//!
//! [`Handler`] wraps the callable a topic invokes per delivered payload. A
//! handler is built from one of two constructors, which is how the bus knows
//! its calling convention up front:
//!
//! - [`Handler::sync`] — runs inline during delivery, in priority order;
//! - [`Handler::future`] — produces a fresh future per delivery, spawned
//!   fire-and-forget onto the runtime without the delivery loop waiting.
//!
//! The future-producing form wraps a closure `Fn(Payload) -> Future`, so each
//! invocation owns its state; shared state goes through an explicit `Arc`
//! inside the closure.
//!
//! ## Example
//! ```rust
//! use topicbus::{Handler, HandlerError, HandlerRef, Payload};
//!
//! let validate: HandlerRef = Handler::sync("validate", |data: &Payload| {
//!     let months = data.downcast_ref::<Vec<&str>>().ok_or("unexpected payload")?;
//!     if months.is_empty() {
//!         return Err(HandlerError::fail("empty selection"));
//!     }
//!     Ok(())
//! });
//! assert_eq!(validate.name(), "validate");
//! assert!(!validate.is_async());
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::HandlerError;
use crate::messages::Payload;

/// Shared handle to a registered-or-registrable handler.
pub type HandlerRef = Arc<Handler>;

type SyncFn = Box<dyn Fn(&Payload) -> Result<(), HandlerError> + Send + Sync>;
type FutureFn = Box<dyn Fn(Payload) -> BoxFuture<'static, Result<(), HandlerError>> + Send + Sync>;

/// The two calling conventions a topic knows how to dispatch.
pub(crate) enum HandlerExec {
    /// Invoked inline; borrows the payload.
    Sync(SyncFn),
    /// Produces a future per invocation; owns its payload clone.
    Future(FutureFn),
}

/// A named callable that processes delivered payloads.
///
/// Constructed via [`Handler::sync`] or [`Handler::future`]; registered on a
/// topic with [`Topic::register`](crate::Topic::register). The name doubles as
/// the handler's destination identity.
pub struct Handler {
    name: Cow<'static, str>,
    exec: HandlerExec,
}

impl Handler {
    /// Creates a synchronous handler and returns it as a shared handle.
    pub fn sync<F>(name: impl Into<Cow<'static, str>>, f: F) -> HandlerRef
    where
        F: Fn(&Payload) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            name: name.into(),
            exec: HandlerExec::Sync(Box::new(f)),
        })
    }

    /// Creates an asynchronous handler and returns it as a shared handle.
    ///
    /// The closure is called once per delivery and must return a fresh future
    /// each time (`Fn`, not `FnMut`).
    pub fn future<F, Fut>(name: impl Into<Cow<'static, str>>, f: F) -> HandlerRef
    where
        F: Fn(Payload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        Arc::new(Self {
            name: name.into(),
            exec: HandlerExec::Future(Box::new(move |payload| Box::pin(f(payload)))),
        })
    }

    /// The handler's stable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if this handler is dispatched fire-and-forget on the runtime.
    pub fn is_async(&self) -> bool {
        matches!(self.exec, HandlerExec::Future(_))
    }

    pub(crate) fn exec(&self) -> &HandlerExec {
        &self.exec
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name)
            .field("is_async", &self.is_async())
            .finish()
    }
}
