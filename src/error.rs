//! # Error types used by the chassis runtime and modules.
//!
//! Two layers of errors exist:
//!
//! - [`Error`] — the value modules report and communication primitives carry.
//!   It is a coarse `(kind, message)` pair; the runtime never branches on the
//!   kind, richer diagnosis lives in the message.
//! - [`RuntimeError`] — typed errors raised by the executable controller and
//!   the scheduler themselves: configuration mistakes, lifecycle stalls, and
//!   critical aborts. These surface from [`ExecutableController::run`] and map
//!   to a non-zero process exit.
//!
//! [`ExecutableController::run`]: crate::ExecutableController::run

use std::fmt;
use std::time::Duration;

use thiserror::Error as ThisError;

/// Coarse classification of a reported [`Error`].
///
/// Deliberately small: the system does not branch on the kind, so anything
/// finer-grained would go unused. `Ok` exists only because some transports
/// round-trip a "no error" code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No error. Present for transports that encode success as a code.
    Ok = 1,
    /// Generic failure.
    NotOk = 2,
    /// Failure of unknown origin (e.g. a dropped promise).
    Unknown = 3,
}

/// Error value reported by modules and carried by communication primitives.
///
/// Cheap to clone, displayable as `"<code>: <message>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    message: String,
}

impl Error {
    /// Creates an error with an explicit kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Creates a generic failure.
    pub fn not_ok(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotOk, message)
    }

    /// Creates a failure of unknown origin.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }

    /// Returns the coarse error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the human-readable message without the code prefix.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind as u8, self.message)
    }
}

impl std::error::Error for Error {}

impl From<RuntimeError> for Error {
    /// Flattens a runtime error into a reportable module error, e.g. when a
    /// task registration fails inside a module's `init`.
    fn from(e: RuntimeError) -> Self {
        Error::not_ok(e.to_string())
    }
}

/// Convenience alias used across the communication fabric.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the chassis runtime itself.
///
/// Configuration errors are raised while wiring modules and tasks together
/// and are always fatal; `StartingStalled` and `CriticalModuleError` are the
/// runtime's two abort paths.
#[non_exhaustive]
#[derive(ThisError, Debug)]
pub enum RuntimeError {
    /// A module with the same name is already registered.
    #[error("module '{name}' is already registered")]
    DuplicateModule {
        /// The duplicate module name.
        name: String,
    },

    /// A module declares a dependency that resolves to no registered module.
    #[error("module '{module}' depends on unknown module '{dependency}'")]
    UnknownDependency {
        /// The declaring module.
        module: String,
        /// The unresolved dependency name.
        dependency: String,
    },

    /// The module dependency graph contains a cycle.
    #[error("dependency cycle detected involving module '{name}'")]
    DependencyCycle {
        /// A module on the cycle.
        name: String,
    },

    /// A task with the same name already exists within the owner module.
    #[error("task '{name}' already exists in module '{owner}'")]
    DuplicateTask {
        /// The duplicate task name.
        name: String,
        /// The owning module.
        owner: String,
    },

    /// A task period does not reduce to a whole number of scheduler ticks.
    #[error("task '{name}' period {period:?} is not a positive multiple of the tick {tick:?}")]
    PeriodNotTickMultiple {
        /// The offending task.
        name: String,
        /// The requested period.
        period: Duration,
        /// The scheduler tick.
        tick: Duration,
    },

    /// A task start-offset does not fall inside its period.
    #[error("task '{name}' offset {offset} must be smaller than its period of {period_ticks} ticks")]
    OffsetOutsidePeriod {
        /// The offending task.
        name: String,
        /// The requested offset, in ticks.
        offset: u64,
        /// The task period, in ticks.
        period_ticks: u64,
    },

    /// A module remained in the Starting state past the configured threshold.
    #[error("module '{name}' stalled in Starting after {checks} checks")]
    StartingStalled {
        /// The stalled module.
        name: String,
        /// Number of checks performed before giving up.
        checks: u32,
    },

    /// A module reported a critical error; the runtime shut down in response.
    #[error("critical error reported by module '{name}': {error}")]
    CriticalModuleError {
        /// The reporting module.
        name: String,
        /// The reported error.
        error: Error,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::DuplicateModule { .. } => "runtime_duplicate_module",
            RuntimeError::UnknownDependency { .. } => "runtime_unknown_dependency",
            RuntimeError::DependencyCycle { .. } => "runtime_dependency_cycle",
            RuntimeError::DuplicateTask { .. } => "runtime_duplicate_task",
            RuntimeError::PeriodNotTickMultiple { .. } => "runtime_period_not_tick_multiple",
            RuntimeError::OffsetOutsidePeriod { .. } => "runtime_offset_outside_period",
            RuntimeError::StartingStalled { .. } => "runtime_starting_stalled",
            RuntimeError::CriticalModuleError { .. } => "runtime_critical_module_error",
        }
    }

    /// True for errors raised while wiring modules and tasks together.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            RuntimeError::DuplicateModule { .. }
                | RuntimeError::UnknownDependency { .. }
                | RuntimeError::DependencyCycle { .. }
                | RuntimeError::DuplicateTask { .. }
                | RuntimeError::PeriodNotTickMultiple { .. }
                | RuntimeError::OffsetOutsidePeriod { .. }
        )
    }
}
