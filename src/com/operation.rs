//! # Typed operation with a replaceable handler slot.
//!
//! An [`Operation`] is one named request/response entry of an interface.
//! The provider installs at most one handler; consumers invoke the operation
//! and receive an [`OpFuture`] for the output.
//!
//! ## Rules
//! - Registering a second handler replaces the first; handlers may be cleared.
//! - In-process invocation runs the handler synchronously on the caller's
//!   thread, so the returned future is already resolved.
//! - Invoking with no handler installed yields a future that is immediately
//!   errored (`NotOk`); the caller decides how to react.

use std::sync::{Arc, Mutex};

use crate::com::promise::{op_channel, OpFuture};
use crate::error::Error;

/// Handler slot for one named operation with input `A` and output `O`.
///
/// Multi-parameter operations use a tuple for `A`; operations without an
/// output record use `()` for `O`.
pub struct Operation<A, O> {
    name: String,
    handler: Mutex<Option<Arc<dyn Fn(A) -> O + Send + Sync>>>,
}

impl<A: Send + 'static, O: Send + 'static> Operation<A, O> {
    /// Creates an operation slot with no handler installed.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handler: Mutex::new(None),
        }
    }

    /// Returns the operation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Installs the handler, replacing any previous one.
    pub fn register_handler(&self, f: impl Fn(A) -> O + Send + Sync + 'static) {
        let mut slot = self.handler.lock().expect("operation slot poisoned");
        *slot = Some(Arc::new(f));
    }

    /// Removes the handler; subsequent invocations fail.
    pub fn clear_handler(&self) {
        let mut slot = self.handler.lock().expect("operation slot poisoned");
        *slot = None;
    }

    /// Invokes the operation on the caller's thread.
    ///
    /// The lock is released before the handler runs, so a handler may invoke
    /// other operations on the same interface.
    pub fn invoke(&self, args: A) -> OpFuture<O> {
        let handler = {
            let slot = self.handler.lock().expect("operation slot poisoned");
            slot.clone()
        };

        let (promise, future) = op_channel();
        match handler {
            Some(f) => promise.set_value(f(args)),
            None => promise.set_error(Error::not_ok(format!(
                "no operation handler registered for '{}'",
                self.name
            ))),
        }
        future
    }
}
