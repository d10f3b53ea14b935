//! # Tick-driven cooperative scheduler.
//!
//! The scheduler keeps an ordered list of [`TaskHandle`]s and drives them
//! from one loop: every tick it snapshots the list, then invokes each
//! eligible task in list order. Ordering constraints are satisfied
//! *structurally* — insertion places every task at the earliest position
//! that is behind all tasks it must run after, so plain list order is a
//! legal topological order in every tick.
//!
//! ## Eligibility
//! A task runs in tick `T` iff its active flag is set and
//! `T % period == offset`. Paused tasks are skipped silently.
//!
//! ## Diagnostics
//! - A run that exceeds the task's non-zero budget publishes
//!   [`EventKind::BudgetExceeded`]. The task is never killed.
//! - A panic escaping a task body is caught, published as
//!   [`EventKind::TaskPanicked`] with the owner module's name, and the loop
//!   continues. The scheduler never dies from a task fault.
//!
//! ## Shutdown
//! The loop observes a [`CancellationToken`] between ticks: tasks of the
//! current tick complete, then the loop exits at the next boundary.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::sched::handle::TaskHandle;

/// Optional per-task settings for [`Scheduler::add_task`].
#[derive(Debug, Clone, Default)]
pub struct TaskOptions {
    /// Peer tasks within the same owner this task must not overtake.
    pub run_after_tasks: Vec<String>,
    /// Tick (modulo period) of the first run.
    pub offset: u64,
    /// Per-run budget; `Duration::ZERO` disables monitoring.
    pub budget: Duration,
}

struct SchedulerState {
    /// Task list, kept in eligibility order at insertion time.
    tasks: Vec<Arc<TaskHandle>>,
    /// Owners whose tasks are currently admitted. Tasks registered by an
    /// admitted owner activate immediately.
    admitted: Vec<String>,
}

/// Single-loop periodic task scheduler.
pub struct Scheduler {
    tick: Duration,
    bus: Bus,
    state: Mutex<SchedulerState>,
}

impl Scheduler {
    /// Creates a scheduler with the given tick period.
    ///
    /// The tick loop does not run until [`spawn`](Self::spawn) is called;
    /// tasks may be registered before that.
    pub fn new(tick: Duration, bus: Bus) -> Self {
        assert!(!tick.is_zero(), "scheduler tick must be non-zero");
        Self {
            tick,
            bus,
            state: Mutex::new(SchedulerState {
                tasks: Vec::new(),
                admitted: Vec::new(),
            }),
        }
    }

    /// Returns the tick period.
    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Registers a periodic task.
    ///
    /// `period` must be a positive whole multiple of the tick and the offset
    /// must fall inside the period. `(owner, name)` must be unique. The task
    /// is inserted at the earliest position behind every existing task owned
    /// by a `run_after` module and every named peer in
    /// [`TaskOptions::run_after_tasks`]; ties keep insertion order.
    pub fn add_task(
        &self,
        name: impl Into<String>,
        period: Duration,
        callable: impl FnMut() + Send + 'static,
        owner: impl Into<String>,
        run_after: Vec<String>,
        options: TaskOptions,
    ) -> Result<Arc<TaskHandle>, RuntimeError> {
        let name = name.into();
        let owner = owner.into();

        let tick_ns = self.tick.as_nanos();
        let period_ns = period.as_nanos();
        if period_ns == 0 || period_ns % tick_ns != 0 {
            return Err(RuntimeError::PeriodNotTickMultiple {
                name,
                period,
                tick: self.tick,
            });
        }
        let period_ticks = (period_ns / tick_ns) as u64;
        if options.offset >= period_ticks {
            return Err(RuntimeError::OffsetOutsidePeriod {
                name,
                offset: options.offset,
                period_ticks,
            });
        }

        let mut state = self.state.lock().expect("scheduler state poisoned");
        if state
            .tasks
            .iter()
            .any(|t| t.owner() == owner && t.name() == name)
        {
            return Err(RuntimeError::DuplicateTask { name, owner });
        }

        let mut insert_at = 0;
        for (i, task) in state.tasks.iter().enumerate() {
            let behind_module = run_after.iter().any(|m| m == task.owner());
            let behind_peer = task.owner() == owner
                && options.run_after_tasks.iter().any(|n| n == task.name());
            if behind_module || behind_peer {
                insert_at = i + 1;
            }
        }

        let active = state.admitted.iter().any(|m| m == &owner);
        let handle = Arc::new(TaskHandle::new(
            name,
            owner,
            period_ticks,
            options.offset,
            run_after,
            options.run_after_tasks,
            options.budget,
            active,
            Box::new(callable),
        ));
        state.tasks.insert(insert_at, Arc::clone(&handle));
        Ok(handle)
    }

    /// Admits or withdraws every task of `owner`.
    ///
    /// Admission is remembered, so tasks the owner registers later activate
    /// immediately.
    pub fn set_module_active(&self, owner: &str, active: bool) {
        let mut state = self.state.lock().expect("scheduler state poisoned");
        if active {
            if !state.admitted.iter().any(|m| m == owner) {
                state.admitted.push(owner.to_string());
            }
        } else {
            state.admitted.retain(|m| m != owner);
        }
        for task in state.tasks.iter().filter(|t| t.owner() == owner) {
            if active {
                task.start();
            } else {
                task.stop();
            }
        }
    }

    /// Starts the tick loop; it runs until `token` is cancelled.
    pub fn spawn(self: Arc<Self>, token: CancellationToken) -> JoinHandle<()> {
        let scheduler = self;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(scheduler.tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut tick_index: u64 = 0;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {}
                }
                scheduler.run_tick(tick_index);
                tick_index = tick_index.wrapping_add(1);
            }
        })
    }

    /// Executes every task eligible in `tick_index`, in list order.
    fn run_tick(&self, tick_index: u64) {
        let snapshot: Vec<Arc<TaskHandle>> = {
            let state = self.state.lock().expect("scheduler state poisoned");
            state.tasks.clone()
        };
        for task in &snapshot {
            if !task.is_active() {
                continue;
            }
            if tick_index % task.period() != task.offset() {
                continue;
            }
            self.execute(task);
        }
    }

    fn execute(&self, task: &TaskHandle) {
        let started = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| task.execute()));
        let elapsed = started.elapsed();

        if let Err(payload) = outcome {
            self.bus.publish(
                Event::now(EventKind::TaskPanicked)
                    .with_task(task.name())
                    .with_module(task.owner())
                    .with_error(panic_message(&*payload)),
            );
        }

        if !task.budget().is_zero() && elapsed > task.budget() {
            self.bus.publish(
                Event::now(EventKind::BudgetExceeded)
                    .with_task(task.name())
                    .with_module(task.owner())
                    .with_elapsed(elapsed)
                    .with_budget(task.budget()),
            );
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "task panicked with a non-string payload".to_string()
    }
}
