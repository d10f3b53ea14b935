//! # Per-module scheduler facade.
//!
//! A [`ModuleExecutor`] lets a module register periodic tasks without
//! repeating its identity: every registration carries the module's name as
//! the owner and the module's declared dependencies as the run-after module
//! set, so a task can never overtake the modules its owner depends on.
//!
//! Whether a fresh task starts admitted is decided by the scheduler: a
//! module that is already Operational gets newly registered tasks activated
//! immediately, registrations before that stay dormant until the controller
//! admits the module.

use std::sync::Arc;
use std::time::Duration;

use crate::error::RuntimeError;
use crate::sched::handle::TaskHandle;
use crate::sched::scheduler::{Scheduler, TaskOptions};

/// Task-registration facade bound to one module.
pub struct ModuleExecutor {
    scheduler: Arc<Scheduler>,
    name: String,
    dependencies: Vec<String>,
}

impl ModuleExecutor {
    /// Creates a facade for the module `name` with the given dependencies.
    pub fn new(scheduler: Arc<Scheduler>, name: impl Into<String>, dependencies: Vec<String>) -> Self {
        Self {
            scheduler,
            name: name.into(),
            dependencies,
        }
    }

    /// Name of the module this facade registers tasks for.
    pub fn module_name(&self) -> &str {
        &self.name
    }

    /// The module's declared dependencies, applied as run-after constraints.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Registers a periodic task owned by this module.
    pub fn run_periodic(
        &self,
        name: impl Into<String>,
        period: Duration,
        callable: impl FnMut() + Send + 'static,
        options: TaskOptions,
    ) -> Result<Arc<TaskHandle>, RuntimeError> {
        self.scheduler.add_task(
            name,
            period,
            callable,
            self.name.clone(),
            self.dependencies.clone(),
            options,
        )
    }
}
