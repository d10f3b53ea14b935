//! # chassis
//!
//! **Chassis** is the runtime core of a vehicle-application framework.
//!
//! It owns a population of *modules* — units of code with a lifecycle and
//! periodic tasks — and drives them through a dependency-ordered state
//! machine while a deterministic, single-loop tick scheduler executes their
//! tasks in declared order. Modules communicate in-process through typed
//! data elements with zero-copy fan-out and through operations backed by a
//! future/promise pair.
//!
//! ## Features
//!
//! | Area               | Description                                                      | Key types / traits                          |
//! |--------------------|------------------------------------------------------------------|---------------------------------------------|
//! | **Lifecycle**      | Dependency-ordered init/start/operate/shutdown orchestration.    | [`ExecutableController`], [`Module`]        |
//! | **Scheduling**     | Tick-driven, budget-monitored periodic tasks with run-after ordering. | [`Scheduler`], [`ModuleExecutor`], [`TaskHandle`] |
//! | **Communication**  | Typed data elements, operations, subscriber gating.              | [`DataElement`], [`Operation`], [`ChannelCore`] |
//! | **Async hand-off** | Single-assignment future/promise with polling and awaiting read. | [`OpFuture`], [`OpPromise`]                 |
//! | **Observability**  | Runtime events fanned out to isolated subscribers.               | [`Event`], [`Subscribe`], [`LogWriter`]     |
//! | **Errors**         | Coarse reportable errors plus typed runtime errors.              | [`Error`], [`RuntimeError`]                 |
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use async_trait::async_trait;
//! use chassis::{Config, ExecutableController, Module, ModuleContext, TaskOptions};
//!
//! struct Heartbeat {
//!     ctx: ModuleContext,
//! }
//!
//! #[async_trait]
//! impl Module for Heartbeat {
//!     fn name(&self) -> &str {
//!         self.ctx.name()
//!     }
//!
//!     fn dependencies(&self) -> &[String] {
//!         self.ctx.dependencies()
//!     }
//!
//!     async fn init(&self) -> chassis::Result<()> {
//!         self.ctx.executor().run_periodic(
//!             "Beat",
//!             Duration::from_millis(100),
//!             || println!("beat"),
//!             TaskOptions::default(),
//!         )?;
//!         Ok(())
//!     }
//!
//!     async fn start(&self) {
//!         self.ctx.report_operational();
//!     }
//!
//!     async fn stop(&self) {}
//!     async fn deinit(&self) {}
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), chassis::RuntimeError> {
//!     let mut controller = ExecutableController::new(Config::default());
//!     let ctx = controller.context("heartbeat", Vec::new());
//!     controller.register_module(Arc::new(Heartbeat { ctx }))?;
//!     controller.run(false).await
//! }
//! ```
//!
//! ---

pub mod com;
mod config;
mod core;
mod error;
pub mod events;
pub mod module;
pub mod sched;
pub mod subscribers;

// ---- Public re-exports ----

pub use com::{
    op_channel, ActiveOwners, DataBuffer, DataElement, FutureState, OpFuture, OpPromise,
    Operation, Sample,
};
pub use config::Config;
pub use crate::core::{
    ControllerHandle, DefaultUserController, ExecutableController, UserController,
};
pub use error::{Error, ErrorKind, Result, RuntimeError};
pub use events::{Bus, Event, EventKind};
pub use module::{ChannelCore, Module, ModuleContext, ModuleState};
pub use sched::{ModuleExecutor, Scheduler, TaskHandle, TaskOptions};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
