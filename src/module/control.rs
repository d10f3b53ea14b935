//! # Module control interface.
//!
//! Every unit of code the executable controller manages implements
//! [`Module`]. The controller drives the lifecycle call-ins in dependency
//! order; modules report back through their [`ModuleContext`]
//! (`report_operational`, `skip_starting`, `report_error`).
//!
//! ## Rules
//! - `start` must eventually lead to `report_operational()` — or call
//!   `skip_starting()` when the module has no tasks. A module that does
//!   neither trips the controller's stall detection.
//! - `stop` and `deinit` are called in reverse dependency order during
//!   shutdown; by the time `stop` runs, the module's tasks are withdrawn.
//! - The event-handler hooks are overridden by channel modules only; for
//!   ordinary application modules the defaults do nothing.
//!
//! [`ModuleContext`]: crate::module::ModuleContext

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Abstract lifecycle exposed by every registered module.
#[async_trait]
pub trait Module: Send + Sync + 'static {
    /// Unique module name.
    fn name(&self) -> &str;

    /// Names of modules that must be Operational before this one starts.
    fn dependencies(&self) -> &[String];

    /// One-time setup. A failure here aborts startup of the executable.
    async fn init(&self) -> Result<()>;

    /// Begins bringing the module up.
    ///
    /// Must lead to `report_operational()` (possibly later, from a task or a
    /// transport callback) or call `skip_starting()` before returning.
    async fn start(&self);

    /// Halts activity; invoked during shutdown after task withdrawal.
    async fn stop(&self);

    /// One-time teardown, the dual of `init`.
    async fn deinit(&self);

    /// Called by the controller when a failure is attributed to this module.
    fn on_error(&self, error: &Error) {
        let _ = error;
    }

    /// Activates change handlers registered under `module`.
    ///
    /// Invoked when a peer module reaches Operational. Only channel modules
    /// maintain handler tables, so the default does nothing.
    fn start_event_handler_for_module(&self, module: &str) {
        let _ = module;
    }

    /// Deactivates change handlers registered under `module`.
    fn stop_event_handler_for_module(&self, module: &str) {
        let _ = module;
    }
}
