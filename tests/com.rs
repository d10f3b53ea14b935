//! Communication fabric: data elements, operations, futures, gating.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chassis::{
    op_channel, ActiveOwners, ChannelCore, DataBuffer, DataElement, FutureState, Operation,
    Sample,
};

fn element<T: Send + Sync + 'static>() -> DataElement<T> {
    DataElement::new("element", Arc::new(ActiveOwners::new()))
}

#[test]
fn set_then_get_returns_the_value() {
    let el = element::<u64>();
    el.set(&42).unwrap();
    assert_eq!(el.get(), 42);
    el.set(&7).unwrap();
    assert_eq!(el.get(), 7);
}

#[test]
fn get_defaults_until_first_publication() {
    let el = element::<u64>();
    assert_eq!(el.get(), 0);
    assert!(el.get_allocated().is_err(), "no sample yet");
}

#[test]
fn allocate_and_set_allocated_transfer_ownership() {
    let el = element::<Vec<u32>>();
    let mut buffer = el.allocate().unwrap();
    buffer.push(1);
    buffer.push(2);
    el.set_allocated(buffer).unwrap();

    let sample = el.get_allocated().unwrap();
    assert_eq!(*sample, vec![1, 2]);

    // Retained samples survive later publications.
    el.set(&vec![9]).unwrap();
    assert_eq!(*sample, vec![1, 2]);
    assert_eq!(el.get(), vec![9]);
}

#[test]
fn publishing_an_empty_buffer_is_rejected() {
    let el = element::<u64>();
    let mut buffer = el.allocate().unwrap();
    let _ = buffer.take();
    assert!(el.set_allocated(buffer).is_err());
}

#[test]
#[should_panic(expected = "empty DataBuffer")]
fn dereferencing_an_empty_buffer_panics() {
    let buffer: DataBuffer<u64> = DataBuffer::empty();
    let _ = *buffer;
}

#[test]
fn handlers_see_next_value_not_historical_one() {
    let owners = Arc::new(ActiveOwners::new());
    owners.add("consumer");
    let el = DataElement::<u64>::new("element", Arc::clone(&owners));

    el.set(&1).unwrap();

    let seen: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    el.register_handler("consumer", move |s: Sample<u64>| {
        sink.lock().unwrap().push(*s);
    });

    // Registration alone delivers nothing, even though a sample exists.
    assert!(seen.lock().unwrap().is_empty());

    el.set(&2).unwrap();
    assert_eq!(seen.lock().unwrap().clone(), vec![2]);
}

#[test]
fn subscriber_gating_suppresses_inactive_owners() {
    let core = ChannelCore::new();
    let el = core.element::<u64>("velocity");

    let seen: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    el.register_handler("consumer_x", move |s| sink.lock().unwrap().push(*s));

    el.set(&1).unwrap();
    assert!(seen.lock().unwrap().is_empty(), "owner not yet operational");

    core.activate_module("consumer_x");
    el.set(&2).unwrap();
    assert_eq!(seen.lock().unwrap().clone(), vec![2]);

    core.deactivate_module("consumer_x");
    el.set(&3).unwrap();
    assert_eq!(seen.lock().unwrap().clone(), vec![2]);
}

#[test]
fn handlers_registered_under_an_active_owner_start_active() {
    let core = ChannelCore::new();
    let el = core.element::<u64>("velocity");
    core.activate_module("consumer_x");

    let hits = Arc::new(AtomicU64::new(0));
    let sink = Arc::clone(&hits);
    el.register_handler("consumer_x", move |_| {
        sink.fetch_add(1, Ordering::SeqCst);
    });

    el.set(&5).unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn fanout_shares_one_sample_across_subscribers() {
    let core = ChannelCore::new();
    let el = core.element::<String>("label");
    core.activate_module("a");
    core.activate_module("b");

    let copies: Arc<Mutex<Vec<Sample<String>>>> = Arc::new(Mutex::new(Vec::new()));
    for owner in ["a", "b"] {
        let sink = Arc::clone(&copies);
        el.register_handler(owner, move |s| sink.lock().unwrap().push(s));
    }

    el.set(&"shared".to_string()).unwrap();
    let copies = copies.lock().unwrap();
    assert_eq!(copies.len(), 2);
    assert_eq!(*copies[0], "shared");
    assert_eq!(*copies[1], "shared");
}

#[tokio::test]
async fn operation_round_trip() {
    let op: Operation<(u32, u32), u32> = Operation::new("Sum");
    op.register_handler(|(a, b)| a + b);

    let mut future = op.invoke((2, 3));
    assert!(future.is_ready(), "in-process invoke resolves immediately");
    assert_eq!(future.get_result().await.unwrap(), 5);
}

#[tokio::test]
async fn operation_without_handler_errors() {
    let op: Operation<u32, u32> = Operation::new("Echo");
    let result = op.invoke(1).get_result().await;
    let err = result.unwrap_err();
    assert!(err.message().contains("Echo"));
}

#[tokio::test]
async fn operation_handler_is_replaceable_and_clearable() {
    let op: Operation<u32, u32> = Operation::new("Scale");
    op.register_handler(|x| x * 2);
    assert_eq!(op.invoke(4).get_result().await.unwrap(), 8);

    op.register_handler(|x| x * 10);
    assert_eq!(op.invoke(4).get_result().await.unwrap(), 40);

    op.clear_handler();
    assert!(op.invoke(4).get_result().await.is_err());
}

#[tokio::test]
async fn promise_resolves_future_exactly_once() {
    let (promise, mut future) = op_channel::<u64>();
    assert!(!future.is_ready());

    promise.set_value(11);
    assert!(future.is_ready());
    assert_eq!(future.get_result().await.unwrap(), 11);
}

#[tokio::test(start_paused = true)]
async fn wait_for_times_out_on_unset_promise() {
    let (promise, mut future) = op_channel::<u64>();
    assert_eq!(
        future.wait_for(Duration::from_millis(50)).await,
        FutureState::TimedOut
    );

    promise.set_value(3);
    assert_eq!(
        future.wait_for(Duration::ZERO).await,
        FutureState::Ready
    );
    assert_eq!(future.get_result().await.unwrap(), 3);
}

#[tokio::test]
async fn dropped_promise_surfaces_as_error() {
    let (promise, future) = op_channel::<u64>();
    drop(promise);
    assert!(future.get_result().await.is_err());
}

#[tokio::test]
#[should_panic(expected = "error-valued future")]
async fn get_panics_on_error_valued_future() {
    let (promise, future) = op_channel::<u64>();
    promise.set_error(chassis::Error::not_ok("backend offline"));
    let _ = future.get().await;
}
