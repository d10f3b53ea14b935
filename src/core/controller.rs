//! # Executable controller: lifecycle orchestration.
//!
//! The [`ExecutableController`] owns every runtime component of one
//! executable — the event bus, the scheduler, the module registry, the
//! subscriber workers — and drives the registered modules through the
//! lifecycle state machine.
//!
//! ## Architecture
//! ```text
//! register_module()* ──► ExecutableController::run()
//!                              │
//!                              ├──► validate dependency graph (topo sort)
//!                              ├──► spawn signal listener ──► shutdown token
//!                              ├──► spawn Scheduler tick loop
//!                              │
//!                              ├──► Initialize: init() in dependency order
//!                              ├──► Start: issue start(), poll for
//!                              │    operational reports, detect stalls
//!                              ├──► Operate: wait for shutdown / errors
//!                              └──► Shutdown: stop() + deinit() in reverse
//!                                   dependency order
//! ```
//!
//! ## Rules
//! - Modules report back through the [`ControllerHandle`]; reports are
//!   queued and applied on the controller's loop, never re-entrantly.
//! - A critical error report from any module initiates shutdown; `run`
//!   then returns the error so the process exits non-zero.
//! - Task panics surface on the bus and are forwarded to the owning
//!   module's `on_error` and the user controller as non-critical reports.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::registry::Registry;
use crate::core::signals;
use crate::core::user::{DefaultUserController, UserController};
use crate::error::{Error, RuntimeError};
use crate::events::{Bus, Event, EventKind};
use crate::module::{Module, ModuleContext, ModuleState};
use crate::sched::{ModuleExecutor, Scheduler};
use crate::subscribers::{Subscribe, SubscriberSet};

/// Lifecycle reports queued by modules towards the controller.
#[derive(Debug)]
pub(crate) enum ControlEvent {
    /// A module finished starting and wants its tasks admitted.
    Operational { module: String },
    /// A module without tasks wants to become operational directly.
    SkipStarting { module: String },
    /// A module attributes an error to itself.
    Error {
        module: String,
        error: Error,
        critical: bool,
    },
    /// An external lifecycle broker requests shutdown.
    Shutdown,
}

/// Cloneable reporting surface handed to modules.
///
/// All methods enqueue; they never block and never run lifecycle logic on
/// the caller's thread. Reports sent after the controller ended are dropped.
#[derive(Clone)]
pub struct ControllerHandle {
    tx: mpsc::UnboundedSender<ControlEvent>,
}

impl ControllerHandle {
    /// Enqueues the Starting → Operational transition for `module`.
    pub fn report_operational(&self, module: &str) {
        let _ = self.tx.send(ControlEvent::Operational {
            module: module.to_string(),
        });
    }

    /// Enqueues the skip-starting transition for `module`.
    ///
    /// Only valid for modules without periodic tasks: the module becomes
    /// Operational without scheduler admission.
    pub fn skip_starting(&self, module: &str) {
        let _ = self.tx.send(ControlEvent::SkipStarting {
            module: module.to_string(),
        });
    }

    /// Enqueues an error report attributed to `module`.
    pub fn report_error(&self, module: &str, error: Error, critical: bool) {
        let _ = self.tx.send(ControlEvent::Error {
            module: module.to_string(),
            error,
            critical,
        });
    }

    /// Requests shutdown; the external lifecycle broker surface.
    pub fn request_shutdown(&self) {
        let _ = self.tx.send(ControlEvent::Shutdown);
    }
}

/// Orchestrates module lifecycles for one executable.
pub struct ExecutableController {
    config: Config,
    bus: Bus,
    scheduler: Arc<Scheduler>,
    registry: Registry,
    user: Arc<dyn UserController>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    tx: mpsc::UnboundedSender<ControlEvent>,
    rx: mpsc::UnboundedReceiver<ControlEvent>,
    shutdown: CancellationToken,
}

impl ExecutableController {
    /// Creates a controller; modules are registered afterwards.
    pub fn new(config: Config) -> Self {
        let bus = Bus::new(config.bus_capacity_clamped());
        let scheduler = Arc::new(Scheduler::new(config.tick, bus.clone()));
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            config,
            bus,
            scheduler,
            registry: Registry::new(),
            user: Arc::new(DefaultUserController),
            subscribers: Vec::new(),
            tx,
            rx,
            shutdown: CancellationToken::new(),
        }
    }

    /// Installs the host's lifecycle hooks.
    pub fn with_user_controller(mut self, user: Arc<dyn UserController>) -> Self {
        self.user = user;
        self
    }

    /// Installs event subscribers for observability.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Returns the reporting surface modules are constructed with.
    pub fn handle(&self) -> ControllerHandle {
        ControllerHandle {
            tx: self.tx.clone(),
        }
    }

    /// Returns the event bus, e.g. to attach extra receivers in tests.
    pub fn bus(&self) -> Bus {
        self.bus.clone()
    }

    /// Builds the context a module implementation composes.
    ///
    /// The context carries the module's identity, the reporting surface and
    /// a [`ModuleExecutor`] bound to the controller's scheduler.
    pub fn context(&self, name: &str, dependencies: Vec<String>) -> ModuleContext {
        let executor = ModuleExecutor::new(
            Arc::clone(&self.scheduler),
            name,
            dependencies.clone(),
        );
        ModuleContext::new(name, dependencies, self.handle(), executor)
    }

    /// Registers a module; must happen before [`run`](Self::run).
    pub fn register_module(&mut self, module: Arc<dyn Module>) -> Result<(), RuntimeError> {
        self.registry.insert(module)
    }

    /// Boots the executable and blocks until its lifecycle ends.
    ///
    /// With `external_lifecycle` set, no OS signal listener is installed and
    /// shutdown comes solely through
    /// [`ControllerHandle::request_shutdown`] or a critical error.
    ///
    /// Returns `Ok(())` on a clean shutdown and the fatal [`RuntimeError`]
    /// when a configuration error, a starting stall, or a critical module
    /// error aborted the executable.
    pub async fn run(mut self, external_lifecycle: bool) -> Result<(), RuntimeError> {
        let runtime_token = CancellationToken::new();
        let subscriber_set = SubscriberSet::new(std::mem::take(&mut self.subscribers));
        self.spawn_bus_listener(&subscriber_set, runtime_token.child_token());
        if !external_lifecycle {
            self.spawn_signal_listener();
        }

        let outcome = self.run_phases(&runtime_token).await;

        runtime_token.cancel();
        subscriber_set.shutdown().await;
        outcome
    }

    async fn run_phases(&mut self, runtime_token: &CancellationToken) -> Result<(), RuntimeError> {
        // --- Initialize ---
        self.user.pre_initialize().await;
        if let Err(e) = self.registry.validate_and_sort() {
            self.user
                .on_error(&Error::not_ok(e.to_string()), "ExecutableController", true);
            return Err(e);
        }
        let _tick_loop = Arc::clone(&self.scheduler).spawn(runtime_token.child_token());

        let mut fatal = self.initialize_modules().await.err();

        if fatal.is_none() {
            self.user.post_initialize().await;

            // --- Start ---
            self.user.pre_start().await;
            fatal = self.start_modules().await.err();
            if fatal.is_none() && !self.shutdown.is_cancelled() {
                self.user.post_start().await;

                // --- Operate ---
                fatal = self.operate().await.err();
            }
        }

        // --- Shutdown ---
        self.bus.publish(Event::now(EventKind::ShutdownRequested));
        self.user.pre_shutdown().await;
        self.shutdown_modules().await;
        self.user.post_shutdown().await;

        match fatal {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Calls `init` on every module in dependency order.
    async fn initialize_modules(&mut self) -> Result<(), RuntimeError> {
        for idx in 0..self.registry.len() {
            let module = Arc::clone(&self.registry.record(idx).module);
            match module.init().await {
                Ok(()) => {
                    self.registry.record_mut(idx).state = ModuleState::NotOperational;
                    self.bus.publish(
                        Event::now(EventKind::ModuleInitialized).with_module(module.name()),
                    );
                }
                Err(e) => {
                    module.on_error(&e);
                    return Err(self.report(module.name().to_string(), e, true).expect(
                        "critical report must yield a runtime error",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Start phase: issue `start` as dependencies come up, apply queued
    /// reports, detect stalls. Ends when every module is Operational, on a
    /// fatal error, or when shutdown was requested mid-start.
    async fn start_modules(&mut self) -> Result<(), RuntimeError> {
        let mut bus_rx = self.bus.subscribe();
        loop {
            for idx in 0..self.registry.len() {
                let ready = self.registry.record(idx).state == ModuleState::NotOperational
                    && self.registry.dependencies_operational(idx);
                if ready {
                    let record = self.registry.record_mut(idx);
                    record.state = ModuleState::Starting;
                    record.starting_checks = 0;
                    let module = Arc::clone(&record.module);
                    self.bus
                        .publish(Event::now(EventKind::ModuleStarting).with_module(module.name()));
                    module.start().await;
                }
            }

            if let Some(fatal) = self.drain_reports(&mut bus_rx) {
                return Err(fatal);
            }
            if self.shutdown.is_cancelled() {
                return Ok(());
            }
            if self.registry.all_operational() {
                return Ok(());
            }

            if let Some(fatal) = self.check_starting_stalls() {
                return Err(fatal);
            }

            tokio::time::sleep(self.config.tick).await;
        }
    }

    /// Operate phase: block until shutdown, applying reports as they come.
    async fn operate(&mut self) -> Result<(), RuntimeError> {
        enum Wake {
            Shutdown,
            Report(ControlEvent),
            Diagnostic(Event),
        }

        let shutdown = self.shutdown.clone();
        let mut bus_rx = self.bus.subscribe();
        loop {
            let wake = tokio::select! {
                _ = shutdown.cancelled() => Wake::Shutdown,
                report = self.rx.recv() => match report {
                    Some(report) => Wake::Report(report),
                    None => Wake::Shutdown,
                },
                diag = bus_rx.recv() => match diag {
                    Ok(ev) => Wake::Diagnostic(ev),
                    Err(_) => continue,
                },
            };
            match wake {
                Wake::Shutdown => return Ok(()),
                Wake::Report(report) => {
                    if let Some(fatal) = self.apply_report(report) {
                        return Err(fatal);
                    }
                }
                Wake::Diagnostic(ev) => self.forward_task_panic(&ev),
            }
        }
    }

    /// Shutdown phase: reverse dependency order, `stop` pass then `deinit`
    /// pass; every record ends Terminal.
    async fn shutdown_modules(&mut self) {
        for idx in (0..self.registry.len()).rev() {
            let state = self.registry.record(idx).state;
            if state != ModuleState::Operational && state != ModuleState::Starting {
                continue;
            }
            let module = Arc::clone(&self.registry.record(idx).module);
            let name = module.name().to_string();

            for peer_idx in 0..self.registry.len() {
                let peer = self.registry.record(peer_idx);
                if peer.name() != name && peer.state == ModuleState::Operational {
                    peer.module.stop_event_handler_for_module(&name);
                }
            }
            self.scheduler.set_module_active(&name, false);
            module.stop().await;
            self.registry.record_mut(idx).state = ModuleState::NotOperational;
            self.bus
                .publish(Event::now(EventKind::ModuleStopped).with_module(&name));
        }

        for idx in (0..self.registry.len()).rev() {
            let state = self.registry.record(idx).state;
            if state == ModuleState::NotOperational {
                let module = Arc::clone(&self.registry.record(idx).module);
                module.deinit().await;
                self.bus.publish(
                    Event::now(EventKind::ModuleDeinitialized).with_module(module.name()),
                );
            }
            self.registry.record_mut(idx).state = ModuleState::Shutdown;
        }
    }

    /// Applies all queued control reports and pending bus diagnostics.
    fn drain_reports(
        &mut self,
        bus_rx: &mut tokio::sync::broadcast::Receiver<Event>,
    ) -> Option<RuntimeError> {
        let mut fatal = None;
        while let Ok(report) = self.rx.try_recv() {
            let e = self.apply_report(report);
            fatal = fatal.or(e);
        }
        while let Ok(ev) = bus_rx.try_recv() {
            self.forward_task_panic(&ev);
        }
        fatal
    }

    /// Applies one queued report; returns the fatal error for critical ones.
    fn apply_report(&mut self, report: ControlEvent) -> Option<RuntimeError> {
        match report {
            ControlEvent::Operational { module } => {
                self.to_operational(&module, true);
                None
            }
            ControlEvent::SkipStarting { module } => {
                self.to_operational(&module, false);
                None
            }
            ControlEvent::Error {
                module,
                error,
                critical,
            } => self.report(module, error, critical),
            ControlEvent::Shutdown => {
                self.shutdown.cancel();
                None
            }
        }
    }

    /// Starting → Operational transition for `module`.
    ///
    /// Admits the module's tasks (unless the transition came from
    /// skip-starting) and activates its change handlers in every other
    /// operational module.
    fn to_operational(&mut self, module: &str, admit_tasks: bool) {
        let Some(idx) = self.registry.index_of(module) else {
            return;
        };
        if self.registry.record(idx).state != ModuleState::Starting {
            return;
        }
        self.registry.record_mut(idx).state = ModuleState::Operational;
        if admit_tasks {
            self.scheduler.set_module_active(module, true);
        }
        self.bus
            .publish(Event::now(EventKind::ModuleOperational).with_module(module));

        for peer_idx in 0..self.registry.len() {
            let peer = self.registry.record(peer_idx);
            if peer.name() != module && peer.state == ModuleState::Operational {
                peer.module.start_event_handler_for_module(module);
            }
        }
    }

    /// Routes an error report through the user controller; critical reports
    /// initiate shutdown and produce the fatal runtime error.
    fn report(&mut self, module: String, error: Error, critical: bool) -> Option<RuntimeError> {
        self.bus.publish(
            Event::now(EventKind::ModuleError)
                .with_module(&module)
                .with_error(error.to_string()),
        );
        self.user.on_error(&error, &module, critical);
        if critical {
            self.shutdown.cancel();
            Some(RuntimeError::CriticalModuleError {
                name: module,
                error,
            })
        } else {
            None
        }
    }

    /// Converts a contained task panic into a non-critical module report.
    fn forward_task_panic(&mut self, ev: &Event) {
        if ev.kind != EventKind::TaskPanicked {
            return;
        }
        let Some(owner) = ev.module.clone() else {
            return;
        };
        let message = format!(
            "task '{}' panicked: {}",
            ev.task.as_deref().unwrap_or("<unnamed>"),
            ev.error.as_deref().unwrap_or("<no message>"),
        );
        let error = Error::not_ok(message);
        if let Some(idx) = self.registry.index_of(&owner) {
            self.registry.record(idx).module.on_error(&error);
        }
        self.report(owner, error, false);
    }

    /// Bumps the stall counter of every Starting module.
    fn check_starting_stalls(&mut self) -> Option<RuntimeError> {
        let limit = self.config.starting_check_limit;
        let mut stalled: Option<String> = None;
        for record in self.registry.records_mut() {
            if record.state == ModuleState::Starting {
                record.starting_checks += 1;
                if record.starting_checks > limit && stalled.is_none() {
                    stalled = Some(record.name().to_string());
                }
            }
        }
        let name = stalled?;
        self.bus
            .publish(Event::now(EventKind::StartingStalled).with_module(&name));
        self.user.on_error(
            &Error::not_ok(format!("module '{name}' stalled while starting")),
            &name,
            true,
        );
        self.shutdown.cancel();
        Some(RuntimeError::StartingStalled {
            name,
            checks: limit,
        })
    }

    /// Forwards bus events to the subscriber workers.
    ///
    /// Exits on the runtime token — draining what is already queued — and
    /// drops its forwarder so the worker queues can close.
    fn spawn_bus_listener(&self, set: &SubscriberSet, token: CancellationToken) {
        if set.is_empty() {
            return;
        }
        let mut rx = self.bus.subscribe();
        let set = set.forwarder();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        while let Ok(ev) = rx.try_recv() {
                            set.emit(&ev);
                        }
                        break;
                    }
                    msg = rx.recv() => match msg {
                        Ok(ev) => set.emit(&ev),
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    }
                }
            }
        });
    }

    /// The dedicated signal task: its only action is to flip the shutdown
    /// token.
    fn spawn_signal_listener(&self) {
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            if signals::wait_for_shutdown_signal().await.is_ok() {
                shutdown.cancel();
            }
        });
    }
}
