//! # Executable core: controller, registry, signals, user hooks.
//!
//! The [`ExecutableController`] owns the module population and drives it
//! through the lifecycle state machine; the registry keeps the records and
//! the dependency order; the signals helper supplies the OS shutdown
//! trigger; [`UserController`] is the host's hook surface around each phase.

mod controller;
mod registry;
pub(crate) mod signals;
mod user;

pub use controller::{ControllerHandle, ExecutableController};
pub use user::{DefaultUserController, UserController};
