//! # Runtime events: taxonomy and broadcast bus.
//!
//! The scheduler and the executable controller publish [`Event`]s describing
//! module lifecycle transitions, task diagnostics, and shutdown progress.
//! Subscribers receive them through the [`Bus`] without ever blocking the
//! tick loop.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
