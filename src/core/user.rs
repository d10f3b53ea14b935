//! # User-controller hooks.
//!
//! The host of an executable may observe and bracket the lifecycle phases by
//! installing a [`UserController`] on the
//! [`ExecutableController`](crate::ExecutableController). Every hook has a
//! no-op default, so implementations override only what they need.
//!
//! `on_error` is the global error sink: every module error report passes
//! through it, with the reporting module's name and the critical flag.
//! Escalation is the executable controller's job — a critical report
//! initiates shutdown whether or not the hook reacts.

use async_trait::async_trait;

use crate::error::Error;

/// Optional host hooks around the lifecycle phases.
#[async_trait]
pub trait UserController: Send + Sync + 'static {
    /// Runs before any module's `init`.
    async fn pre_initialize(&self) {}

    /// Runs after every module initialized.
    async fn post_initialize(&self) {}

    /// Runs before the start phase begins issuing `start` calls.
    async fn pre_start(&self) {}

    /// Runs once every module reached Operational.
    async fn post_start(&self) {}

    /// Runs when shutdown begins, before any module's `stop`.
    async fn pre_shutdown(&self) {}

    /// Runs after every module was deinitialized.
    async fn post_shutdown(&self) {}

    /// Global sink for module error reports.
    ///
    /// The default writes a line to stderr. Critical reports additionally
    /// shut the executable down; that part is not this hook's concern.
    fn on_error(&self, error: &Error, module: &str, critical: bool) {
        let severity = if critical { "critical" } else { "non-critical" };
        eprintln!("[chassis] {severity} error from module '{module}': {error}");
    }
}

/// Do-nothing hook set used when the host installs nothing.
pub struct DefaultUserController;

#[async_trait]
impl UserController for DefaultUserController {}
