//! Scheduler behavior: ordering, offsets, budgets, panic containment.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use chassis::events::EventKind;
use chassis::{Bus, RuntimeError, Scheduler, TaskOptions};

const TICK: Duration = Duration::from_millis(10);

fn scheduler() -> (Arc<Scheduler>, Bus) {
    let bus = Bus::new(64);
    (Arc::new(Scheduler::new(TICK, bus.clone())), bus)
}

/// Shared execution log: task label per invocation, in order.
type Log = Arc<Mutex<Vec<&'static str>>>;

fn record(log: &Log, label: &'static str) -> impl FnMut() + Send + 'static {
    let log = Arc::clone(log);
    move || log.lock().unwrap().push(label)
}

#[tokio::test(start_paused = true)]
async fn run_after_modules_execute_in_dependency_order() {
    let (sched, _bus) = scheduler();
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    // Register the dependent task first: insertion must still place it
    // behind everything it has to run after.
    sched
        .add_task(
            "Fuse",
            TICK,
            record(&log, "fuse"),
            "fusion",
            vec!["left_radar".into(), "right_radar".into()],
            TaskOptions::default(),
        )
        .unwrap();
    sched
        .add_task(
            "Sample",
            TICK,
            record(&log, "left"),
            "left_radar",
            vec![],
            TaskOptions::default(),
        )
        .unwrap();
    sched
        .add_task(
            "Sample",
            TICK,
            record(&log, "right"),
            "right_radar",
            vec![],
            TaskOptions::default(),
        )
        .unwrap();

    sched.set_module_active("fusion", true);
    sched.set_module_active("left_radar", true);
    sched.set_module_active("right_radar", true);

    let token = CancellationToken::new();
    Arc::clone(&sched).spawn(token.clone());
    tokio::time::sleep(TICK * 100 + TICK / 2).await;
    token.cancel();

    let entries = log.lock().unwrap().clone();
    assert!(entries.len() >= 3 * 100, "expected 100 full ticks");
    // Every tick is a chunk of three; "fuse" is always last in its tick.
    for tick in entries.chunks(3) {
        assert_eq!(tick.len(), 3);
        assert_eq!(tick[2], "fuse", "fusion overtook a radar in {tick:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn offsets_separate_tasks_with_equal_periods() {
    let (sched, _bus) = scheduler();
    let ticks_t1 = Arc::new(Mutex::new(Vec::new()));
    let ticks_t2 = Arc::new(Mutex::new(Vec::new()));
    let counter = Arc::new(AtomicU64::new(0));

    // A tick counter task with period 1 stamps the current tick index.
    sched
        .add_task(
            "Count",
            TICK,
            {
                let counter = Arc::clone(&counter);
                move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            },
            "clock",
            vec![],
            TaskOptions::default(),
        )
        .unwrap();
    for (name, offset, sink) in [("T1", 0, &ticks_t1), ("T2", 1, &ticks_t2)] {
        let sink = Arc::clone(sink);
        let counter = Arc::clone(&counter);
        sched
            .add_task(
                name,
                TICK * 20,
                move || sink.lock().unwrap().push(counter.load(Ordering::SeqCst) - 1),
                "sampler",
                vec!["clock".into()],
                TaskOptions {
                    offset,
                    ..TaskOptions::default()
                },
            )
            .unwrap();
    }

    sched.set_module_active("clock", true);
    sched.set_module_active("sampler", true);

    let token = CancellationToken::new();
    Arc::clone(&sched).spawn(token.clone());
    tokio::time::sleep(TICK * 59 + TICK / 2).await;
    token.cancel();

    assert_eq!(ticks_t1.lock().unwrap().clone(), vec![0, 20, 40]);
    assert_eq!(ticks_t2.lock().unwrap().clone(), vec![1, 21, 41]);
}

#[tokio::test(start_paused = true)]
async fn budget_overrun_is_observed_but_not_enforced() {
    let (sched, bus) = scheduler();
    let mut rx = bus.subscribe();
    let runs = Arc::new(AtomicU64::new(0));

    sched
        .add_task(
            "Slow",
            TICK,
            {
                let runs = Arc::clone(&runs);
                move || {
                    runs.fetch_add(1, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_millis(5));
                }
            },
            "laggard",
            vec![],
            TaskOptions {
                budget: Duration::from_millis(1),
                ..TaskOptions::default()
            },
        )
        .unwrap();
    sched.set_module_active("laggard", true);

    let token = CancellationToken::new();
    Arc::clone(&sched).spawn(token.clone());
    tokio::time::sleep(TICK * 3 + TICK / 2).await;
    token.cancel();

    assert!(runs.load(Ordering::SeqCst) >= 2, "task must keep firing");

    let mut overruns = 0;
    while let Ok(ev) = rx.try_recv() {
        if ev.kind == EventKind::BudgetExceeded {
            assert_eq!(ev.task.as_deref(), Some("Slow"));
            assert_eq!(ev.module.as_deref(), Some("laggard"));
            assert!(ev.elapsed.unwrap() > ev.budget.unwrap());
            overruns += 1;
        }
    }
    assert!(overruns >= 2, "each overrun produces a diagnostic");
}

#[tokio::test(start_paused = true)]
async fn task_panic_is_contained_and_reported() {
    let (sched, bus) = scheduler();
    let mut rx = bus.subscribe();
    let runs = Arc::new(AtomicU64::new(0));

    sched
        .add_task(
            "Faulty",
            TICK,
            {
                let runs = Arc::clone(&runs);
                move || {
                    if runs.fetch_add(1, Ordering::SeqCst) == 0 {
                        panic!("sensor value out of range");
                    }
                }
            },
            "flaky",
            vec![],
            TaskOptions::default(),
        )
        .unwrap();
    sched.set_module_active("flaky", true);

    let token = CancellationToken::new();
    Arc::clone(&sched).spawn(token.clone());
    tokio::time::sleep(TICK * 4 + TICK / 2).await;
    token.cancel();

    assert!(
        runs.load(Ordering::SeqCst) >= 3,
        "scheduler must survive the panic"
    );

    let mut panics = 0;
    while let Ok(ev) = rx.try_recv() {
        if ev.kind == EventKind::TaskPanicked {
            assert_eq!(ev.module.as_deref(), Some("flaky"));
            assert!(ev.error.as_deref().unwrap().contains("out of range"));
            panics += 1;
        }
    }
    assert_eq!(panics, 1);
}

#[tokio::test(start_paused = true)]
async fn paused_modules_are_skipped_silently() {
    let (sched, _bus) = scheduler();
    let runs = Arc::new(AtomicU64::new(0));

    sched
        .add_task(
            "Step",
            TICK,
            {
                let runs = Arc::clone(&runs);
                move || {
                    runs.fetch_add(1, Ordering::SeqCst);
                }
            },
            "worker",
            vec![],
            TaskOptions::default(),
        )
        .unwrap();
    sched.set_module_active("worker", true);

    let token = CancellationToken::new();
    Arc::clone(&sched).spawn(token.clone());
    tokio::time::sleep(TICK * 5).await;
    let after_active = runs.load(Ordering::SeqCst);
    assert!(after_active >= 4);

    sched.set_module_active("worker", false);
    tokio::time::sleep(TICK * 5).await;
    let after_pause = runs.load(Ordering::SeqCst);
    assert!(after_pause <= after_active + 1, "paused task kept running");

    sched.set_module_active("worker", true);
    tokio::time::sleep(TICK * 5).await;
    assert!(runs.load(Ordering::SeqCst) > after_pause, "resume failed");
    token.cancel();
}

#[tokio::test]
async fn late_registration_activates_for_admitted_owner() {
    let (sched, _bus) = scheduler();
    sched.set_module_active("started", true);

    let handle = sched
        .add_task("Late", TICK, || {}, "started", vec![], TaskOptions::default())
        .unwrap();
    assert!(handle.is_active(), "admitted owner's new tasks run at once");

    let dormant = sched
        .add_task("Early", TICK, || {}, "pending", vec![], TaskOptions::default())
        .unwrap();
    assert!(!dormant.is_active());
}

#[tokio::test]
async fn peer_task_ordering_is_honoured_at_insertion() {
    let (sched, _bus) = scheduler();

    let first = sched
        .add_task("Acquire", TICK, || {}, "camera", vec![], TaskOptions::default())
        .unwrap();
    let second = sched
        .add_task(
            "Publish",
            TICK,
            || {},
            "camera",
            vec![],
            TaskOptions {
                run_after_tasks: vec!["Acquire".into()],
                ..TaskOptions::default()
            },
        )
        .unwrap();

    assert_eq!(first.run_after_tasks().len(), 0);
    assert_eq!(second.run_after_tasks(), &["Acquire".to_string()]);
    // An unconstrained third task from another module is inserted in front,
    // never between the ordered peers.
    sched
        .add_task("Misc", TICK, || {}, "other", vec![], TaskOptions::default())
        .unwrap();
}

#[tokio::test]
async fn configuration_errors_are_rejected() {
    let (sched, _bus) = scheduler();

    let err = sched
        .add_task(
            "Odd",
            Duration::from_millis(15),
            || {},
            "m",
            vec![],
            TaskOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err, RuntimeError::PeriodNotTickMultiple { .. }));

    let err = sched
        .add_task(
            "Shifted",
            TICK * 4,
            || {},
            "m",
            vec![],
            TaskOptions {
                offset: 4,
                ..TaskOptions::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, RuntimeError::OffsetOutsidePeriod { .. }));

    sched
        .add_task("Step", TICK, || {}, "m", vec![], TaskOptions::default())
        .unwrap();
    let err = sched
        .add_task("Step", TICK, || {}, "m", vec![], TaskOptions::default())
        .unwrap_err();
    assert!(matches!(err, RuntimeError::DuplicateTask { .. }));
}
