//! # Event subscribers: the observability extension point.
//!
//! Runtime events flow from the [`Bus`](crate::events::Bus) to any number of
//! [`Subscribe`] implementations, each behind its own bounded queue and
//! worker task so a slow or faulty subscriber can never stall the tick loop.

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::{SubscriberForwarder, SubscriberSet};
pub use subscribe::Subscribe;
