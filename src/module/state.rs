//! # Module lifecycle states.

use std::fmt;

/// State of a registered module, driven by the executable controller.
///
/// ```text
/// NotInitialized → NotOperational → Starting → Operational → Shutdown
/// ```
///
/// `Shutdown` is terminal; a module passes through the machine at most once
/// per lifetime. `Operational` is the only state in which the module's tasks
/// are admitted and its data handlers are eligible for activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    /// Constructed and registered, `init` not yet run.
    NotInitialized,
    /// `init` succeeded; waiting for dependencies before `start`.
    NotOperational,
    /// `start` was issued; waiting for the module's operational report.
    Starting,
    /// Fully running: tasks admitted, handlers active.
    Operational,
    /// Stopped and deinitialized. Terminal.
    Shutdown,
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModuleState::NotInitialized => "NotInitialized",
            ModuleState::NotOperational => "NotOperational",
            ModuleState::Starting => "Starting",
            ModuleState::Operational => "Operational",
            ModuleState::Shutdown => "Shutdown",
        };
        f.write_str(name)
    }
}
