//! # Event subscriber trait.
//!
//! [`Subscribe`] is the extension point for plugging custom diagnostics
//! sinks — loggers, metrics exporters, trace recorders — into the runtime.
//!
//! Each subscriber gets:
//! - a dedicated worker task
//! - a bounded queue (capacity via [`Subscribe::queue_capacity`])
//! - panic isolation (a panicking subscriber is reported on stderr and the
//!   runtime continues)
//!
//! Queue overflow drops the event for that subscriber only; other
//! subscribers and the publisher are unaffected.

use async_trait::async_trait;

use crate::events::Event;

/// Receiver of runtime events, run in isolation from the tick loop.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Runs on the subscriber's worker task, sequentially in queue order.
    /// Implementations handle their own errors; panics are caught.
    async fn on_event(&self, event: &Event);

    /// Short name used in drop/panic notices.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred queue capacity; overflow drops events for this subscriber.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
