//! # Module context: identity, reporting surface, task registration.
//!
//! A [`ModuleContext`] is what a module implementation composes instead of
//! inheriting a base class: the executable controller builds it
//! ([`ExecutableController::context`]), the module stores it and uses it to
//! register periodic tasks and to report lifecycle progress.
//!
//! [`ExecutableController::context`]: crate::ExecutableController::context

use crate::core::ControllerHandle;
use crate::error::Error;
use crate::sched::ModuleExecutor;

/// Per-module capability bundle handed out by the controller.
pub struct ModuleContext {
    name: String,
    dependencies: Vec<String>,
    controller: ControllerHandle,
    executor: ModuleExecutor,
}

impl ModuleContext {
    pub(crate) fn new(
        name: &str,
        dependencies: Vec<String>,
        controller: ControllerHandle,
        executor: ModuleExecutor,
    ) -> Self {
        Self {
            name: name.to_string(),
            dependencies,
            controller,
            executor,
        }
    }

    /// The module's unique name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of the modules this one depends on.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Task registration facade bound to this module.
    pub fn executor(&self) -> &ModuleExecutor {
        &self.executor
    }

    /// Clones the reporting surface, e.g. to move into a task closure.
    pub fn handle(&self) -> ControllerHandle {
        self.controller.clone()
    }

    /// Reports the Starting → Operational transition.
    pub fn report_operational(&self) {
        self.controller.report_operational(&self.name);
    }

    /// Becomes Operational without task admission.
    ///
    /// Only allowed for modules that registered no periodic tasks.
    pub fn skip_starting(&self) {
        self.controller.skip_starting(&self.name);
    }

    /// Reports an error attributed to this module.
    ///
    /// A critical report initiates shutdown of the whole executable.
    pub fn report_error(&self, error: Error, critical: bool) {
        self.controller.report_error(&self.name, error, critical);
    }
}
