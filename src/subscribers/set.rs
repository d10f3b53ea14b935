//! # Non-blocking fan-out over multiple subscribers.
//!
//! [`SubscriberSet`] spawns one worker per subscriber and distributes each
//! event to all of them without awaiting their processing.
//!
//! ```text
//!    emit(&Event)
//!        │                      (Arc-clone per subscriber)
//!        ├──────────► [queue S1] ─► worker S1 ─► on_event()
//!        ├──────────► [queue S2] ─► worker S2 ─► on_event()
//!        └──────────► [queue SN] ─► worker SN ─► on_event()
//! ```
//!
//! ## Guarantees
//! - `emit` returns immediately; per-subscriber FIFO order.
//! - Panics inside subscribers are caught and noted on stderr.
//! - No global ordering across different subscribers; queue overflow drops
//!   the event for the affected subscriber only.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::events::Event;

use super::subscribe::Subscribe;

/// Per-subscriber channel with metadata.
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Send half of the fan-out, cloneable into listener tasks.
#[derive(Clone)]
pub struct SubscriberForwarder {
    channels: Arc<Vec<SubscriberChannel>>,
}

impl SubscriberForwarder {
    /// Fans one event out to all subscribers; never blocks.
    pub fn emit(&self, event: &Event) {
        let ev = Arc::new(event.clone());
        for channel in self.channels.iter() {
            match channel.sender.try_send(Arc::clone(&ev)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    eprintln!(
                        "[chassis] subscriber '{}' dropped event: queue full",
                        channel.name
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    eprintln!(
                        "[chassis] subscriber '{}' dropped event: worker closed",
                        channel.name
                    );
                }
            }
        }
    }
}

/// Composite fan-out with per-subscriber bounded queues and worker tasks.
pub struct SubscriberSet {
    forwarder: SubscriberForwarder,
    workers: Vec<JoinHandle<()>>,
}

impl SubscriberSet {
    /// Creates the set and spawns one worker per subscriber.
    #[must_use]
    pub fn new(subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let mut channels = Vec::with_capacity(subscribers.len());
        let mut workers = Vec::with_capacity(subscribers.len());

        for sub in subscribers {
            let capacity = sub.queue_capacity().max(1);
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(capacity);

            let handle = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = sub.on_event(ev.as_ref());
                    if let Err(panic_err) =
                        std::panic::AssertUnwindSafe(fut).catch_unwind().await
                    {
                        eprintln!(
                            "[chassis] subscriber '{}' panicked: {panic_err:?}",
                            sub.name()
                        );
                    }
                }
            });

            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }

        Self {
            forwarder: SubscriberForwarder {
                channels: Arc::new(channels),
            },
            workers,
        }
    }

    /// Returns a cloneable send half for listener tasks.
    pub fn forwarder(&self) -> SubscriberForwarder {
        self.forwarder.clone()
    }

    /// Fans one event out to all subscribers; never blocks.
    pub fn emit(&self, event: &Event) {
        self.forwarder.emit(event);
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forwarder.channels.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.forwarder.channels.len()
    }

    /// Graceful teardown: close the queues and await worker completion.
    ///
    /// Every outstanding [`SubscriberForwarder`] clone must be dropped by
    /// its listener task for the queues to close; the controller cancels
    /// those listeners before calling this.
    pub async fn shutdown(self) {
        drop(self.forwarder);
        for handle in self.workers {
            let _ = handle.await;
        }
    }
}
