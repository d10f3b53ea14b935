//! # Single-assignment future/promise hand-off.
//!
//! [`op_channel`] creates a connected [`OpPromise`]/[`OpFuture`] pair backed
//! by [`tokio::sync::oneshot`]. The promise side is set exactly once — the
//! setters consume the promise, so a second assignment is unrepresentable.
//! The future side supports non-blocking readiness polling, bounded waiting,
//! and an awaiting read.
//!
//! ## Rules
//! - Dropping an unset promise resolves the future to an `Unknown` error.
//! - [`OpFuture::get`] is the convenience accessor: it panics on an
//!   error-valued result. Callers that can handle failure use
//!   [`OpFuture::get_result`].
//! - Futures are move-only and not cloneable.

use std::time::Duration;

use tokio::sync::oneshot;

use crate::error::{Error, Result};

/// Creates a connected promise/future pair.
pub fn op_channel<T>() -> (OpPromise<T>, OpFuture<T>) {
    let (tx, rx) = oneshot::channel();
    (OpPromise { tx }, OpFuture { rx, ready: None })
}

/// Outcome of a bounded wait on an [`OpFuture`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FutureState {
    /// The result is available; `get_result` will not block.
    Ready,
    /// The wait elapsed before the promise was set.
    TimedOut,
}

/// Write side of the hand-off. Set exactly once, by move.
#[derive(Debug)]
pub struct OpPromise<T> {
    tx: oneshot::Sender<Result<T>>,
}

impl<T> OpPromise<T> {
    /// Resolves the future with a value.
    pub fn set_value(self, value: T) {
        let _ = self.tx.send(Ok(value));
    }

    /// Resolves the future with an error.
    pub fn set_error(self, error: Error) {
        let _ = self.tx.send(Err(error));
    }
}

/// Read side of the hand-off. Move-only.
#[derive(Debug)]
pub struct OpFuture<T> {
    rx: oneshot::Receiver<Result<T>>,
    ready: Option<Result<T>>,
}

impl<T> OpFuture<T> {
    /// Non-blocking readiness check.
    pub fn is_ready(&mut self) -> bool {
        if self.ready.is_some() {
            return true;
        }
        match self.rx.try_recv() {
            Ok(result) => {
                self.ready = Some(result);
                true
            }
            Err(oneshot::error::TryRecvError::Empty) => false,
            Err(oneshot::error::TryRecvError::Closed) => {
                self.ready = Some(Err(dropped_promise()));
                true
            }
        }
    }

    /// Waits up to `timeout` for the result.
    ///
    /// A zero timeout reports readiness without suspending.
    pub async fn wait_for(&mut self, timeout: Duration) -> FutureState {
        if self.is_ready() {
            return FutureState::Ready;
        }
        match tokio::time::timeout(timeout, &mut self.rx).await {
            Ok(Ok(result)) => {
                self.ready = Some(result);
                FutureState::Ready
            }
            Ok(Err(_closed)) => {
                self.ready = Some(Err(dropped_promise()));
                FutureState::Ready
            }
            Err(_elapsed) => FutureState::TimedOut,
        }
    }

    /// Waits for the result, consuming the future.
    pub async fn get_result(mut self) -> Result<T> {
        if let Some(result) = self.ready.take() {
            return result;
        }
        match self.rx.await {
            Ok(result) => result,
            Err(_closed) => Err(dropped_promise()),
        }
    }

    /// Waits for the result and unwraps it.
    ///
    /// # Panics
    /// Panics if the future resolved to an error. Check with
    /// [`get_result`](Self::get_result) when failure is expected.
    pub async fn get(self) -> T {
        match self.get_result().await {
            Ok(value) => value,
            Err(e) => panic!("OpFuture::get on an error-valued future: {e}"),
        }
    }
}

fn dropped_promise() -> Error {
    Error::unknown("promise was dropped without being set")
}
