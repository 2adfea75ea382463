//! Ordered response handlers of a client.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use courier_core::pipeline::{SharedTask, Task};

use crate::{Error, ResponseContext, RetryPolicy};

/// A response handler: a pipeline task over [`ResponseContext`]s.
pub type ResponseHandler = SharedTask<ResponseContext, Error>;

/// Append-only list of response handlers.
///
/// Every response of the owning client runs through the handlers in
/// registration order. A run works on a [`snapshot`](Self::snapshot), so
/// handlers registered while a request is in flight only apply to later
/// pipeline runs.
pub struct HandlerRegistry {
    handlers: RwLock<Vec<ResponseHandler>>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.len())
            .finish()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerRegistry {
    /// A registry holding the built-in [`RetryPolicy`] in first position.
    #[must_use]
    pub fn new() -> Self {
        let registry = Self::empty();
        registry.register(RetryPolicy::default());
        registry
    }

    /// A registry without any handler.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
        }
    }

    /// Append a handler.
    pub fn register(&self, handler: impl Task<ResponseContext, Error> + 'static) {
        self.register_shared(Arc::new(handler));
    }

    /// Append an already shared handler.
    pub fn register_shared(&self, handler: ResponseHandler) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handler);
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The handlers for one pipeline run, in registration order.
    #[must_use]
    pub fn snapshot(&self) -> Arc<[ResponseHandler]> {
        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        Arc::from(handlers.as_slice())
    }
}
