//! # Handle describing one periodic task.
//!
//! A [`TaskHandle`] is created by the scheduler when a task is registered
//! and persists for the scheduler's lifetime. Everything but the active flag
//! and the callable is immutable. The active flag is true only while the
//! owning module is Operational and admitted; the scheduler skips inactive
//! tasks silently.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Periodic task registered with the [`Scheduler`](crate::sched::Scheduler).
pub struct TaskHandle {
    name: String,
    owner: String,
    period: u64,
    offset: u64,
    run_after: Vec<String>,
    run_after_tasks: Vec<String>,
    budget: Duration,
    active: AtomicBool,
    callable: Mutex<Box<dyn FnMut() + Send>>,
}

impl TaskHandle {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: String,
        owner: String,
        period: u64,
        offset: u64,
        run_after: Vec<String>,
        run_after_tasks: Vec<String>,
        budget: Duration,
        active: bool,
        callable: Box<dyn FnMut() + Send>,
    ) -> Self {
        Self {
            name,
            owner,
            period,
            offset,
            run_after,
            run_after_tasks,
            budget,
            active: AtomicBool::new(active),
            callable: Mutex::new(callable),
        }
    }

    /// Task name, unique within the owner module.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the owning module.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Period in ticks (≥ 1).
    pub fn period(&self) -> u64 {
        self.period
    }

    /// Start offset in ticks (< period).
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Module names this task must not overtake within a tick.
    pub fn run_after(&self) -> &[String] {
        &self.run_after
    }

    /// Peer task names within the owner this task must not overtake.
    pub fn run_after_tasks(&self) -> &[String] {
        &self.run_after_tasks
    }

    /// Per-run time budget; `Duration::ZERO` disables monitoring.
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// True while the owning module is admitted.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Admits the task.
    pub fn start(&self) {
        self.active.store(true, Ordering::Release);
    }

    /// Withdraws the task; it is skipped silently from the next tick on.
    pub fn stop(&self) {
        self.active.store(false, Ordering::Release);
    }

    /// Runs the callable once.
    ///
    /// A poisoned lock (an earlier contained panic) is ignored: the task
    /// keeps its slot and keeps running.
    pub(crate) fn execute(&self) {
        let mut callable = match self.callable.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        (callable)();
    }
}

impl std::fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("period", &self.period)
            .field("offset", &self.offset)
            .field("budget", &self.budget)
            .field("active", &self.is_active())
            .finish()
    }
}
