//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [initialized] module=brake_sensor
//! [starting] module=brake_sensor
//! [operational] module=brake_sensor
//! [budget-exceeded] module=fusion task=Step elapsed=5.2ms budget=1ms
//! [task-panicked] module=fusion task=Step err="index out of bounds"
//! [module-error] module=fusion err="2: sensor offline"
//! [shutdown-requested]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};

use super::subscribe::Subscribe;

/// Stdout logging subscriber.
///
/// Meant for development and demonstrations; production hosts implement
/// their own [`Subscribe`] against their logging infrastructure.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let module = e.module.as_deref().unwrap_or("?");
        match e.kind {
            EventKind::ModuleInitialized => println!("[initialized] module={module}"),
            EventKind::ModuleStarting => println!("[starting] module={module}"),
            EventKind::ModuleOperational => println!("[operational] module={module}"),
            EventKind::ModuleStopped => println!("[stopped] module={module}"),
            EventKind::ModuleDeinitialized => println!("[deinitialized] module={module}"),
            EventKind::ModuleError => {
                println!("[module-error] module={module} err={:?}", e.error)
            }
            EventKind::StartingStalled => println!("[starting-stalled] module={module}"),
            EventKind::BudgetExceeded => println!(
                "[budget-exceeded] module={module} task={:?} elapsed={:?} budget={:?}",
                e.task, e.elapsed, e.budget
            ),
            EventKind::TaskPanicked => println!(
                "[task-panicked] module={module} task={:?} err={:?}",
                e.task, e.error
            ),
            EventKind::ShutdownRequested => println!("[shutdown-requested]"),
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
