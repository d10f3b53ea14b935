//! # Broadcast bus for runtime events.
//!
//! [`Bus`] wraps [`tokio::sync::broadcast`] so the scheduler and controller
//! can publish [`Event`]s to any number of independent receivers.
//!
//! - **Broadcast semantics**: every active receiver gets a clone of each event
//! - **Non-persistent**: events published with no receiver are dropped, which
//!   is fine because the runtime operates identically without observers
//! - **Bounded**: receivers lagging behind more than the capacity skip the
//!   oldest events

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime events.
#[derive(Clone)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given ring-buffer capacity (min 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers; never blocks.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a receiver that observes all events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
