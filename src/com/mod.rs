//! # In-process communication fabric.
//!
//! The typed primitives modules use to exchange data and call operations:
//!
//! - [`DataBuffer`] / [`Sample`] — owned-value handles with move and
//!   shared-read semantics (zero-copy hand-off from provider to consumers)
//! - [`OpPromise`] / [`OpFuture`] — single-assignment async result hand-off
//!   with readiness polling and awaiting reads
//! - [`DataElement`] — one named data element: allocate/set/get/subscribe
//!   with change-notification fan-out and per-subscriber activation gating
//! - [`Operation`] — one named operation: a replaceable handler slot invoked
//!   synchronously on the caller's thread, resolving a future

mod element;
mod handle;
mod operation;
mod promise;

pub use element::{ActiveOwners, DataElement, ElementGate};
pub use handle::{DataBuffer, Sample};
pub use operation::Operation;
pub use promise::{op_channel, FutureState, OpFuture, OpPromise};
