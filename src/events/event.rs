//! # Runtime events emitted by the controller and the scheduler.
//!
//! [`EventKind`] classifies events across three categories:
//! - **Lifecycle events**: module state transitions driven by the controller
//! - **Task diagnostics**: budget overruns and contained task panics
//! - **Shutdown events**: progress of the signal- or error-driven teardown
//!
//! The [`Event`] struct carries metadata such as the module or task name,
//! an error message, and timing information for budget diagnostics.
//!
//! ## Ordering
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically, so subscribers can order events even when they are
//! delivered through independent queues.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Module lifecycle ===
    /// Module completed `init` and entered NotOperational.
    ModuleInitialized,
    /// The controller issued `start`; module entered Starting.
    ModuleStarting,
    /// Module reported operational (or skipped starting); tasks admitted.
    ModuleOperational,
    /// Module was stopped during shutdown; tasks withdrawn.
    ModuleStopped,
    /// Module completed `deinit` and reached its terminal state.
    ModuleDeinitialized,
    /// A module reported an error through the controller.
    ModuleError,
    /// A module exceeded the starting-check limit without progress.
    StartingStalled,

    // === Task diagnostics ===
    /// A task ran longer than its declared budget. Observed, never enforced.
    BudgetExceeded,
    /// A task body panicked; the panic was contained by the scheduler.
    TaskPanicked,

    // === Shutdown ===
    /// Shutdown was requested (OS signal, broker, or critical error).
    ShutdownRequested,
}

/// Runtime event with optional metadata.
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp (may go backwards, use for logging only).
    pub at: SystemTime,
    /// The kind of event.
    pub kind: EventKind,
    /// Name of the module, if applicable.
    pub module: Option<String>,
    /// Name of the task, if applicable.
    pub task: Option<String>,
    /// Error message, if the event represents a failure.
    pub error: Option<String>,
    /// Measured task run time (budget diagnostics).
    pub elapsed: Option<Duration>,
    /// Declared task budget (budget diagnostics).
    pub budget: Option<Duration>,
}

impl Event {
    /// Creates a new event of the given kind with the next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            module: None,
            task: None,
            error: None,
            elapsed: None,
            budget: None,
        }
    }

    /// Attaches a module name.
    pub fn with_module(mut self, name: impl Into<String>) -> Self {
        self.module = Some(name.into());
        self
    }

    /// Attaches a task name.
    pub fn with_task(mut self, name: impl Into<String>) -> Self {
        self.task = Some(name.into());
        self
    }

    /// Attaches an error message.
    pub fn with_error(mut self, msg: impl Into<String>) -> Self {
        self.error = Some(msg.into());
        self
    }

    /// Attaches a measured run time.
    pub fn with_elapsed(mut self, d: Duration) -> Self {
        self.elapsed = Some(d);
        self
    }

    /// Attaches a declared budget.
    pub fn with_budget(mut self, d: Duration) -> Self {
        self.budget = Some(d);
        self
    }
}
