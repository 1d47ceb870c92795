//! Tests for the sync and tokio connection workers

mod common;

use common::*;
use zero_bolt::{ConnectionState, Error, Message, Opts, TransactionKind};

fn opts(capacity: usize) -> Opts {
    Opts {
        worker_queue_capacity: capacity,
        ..Default::default()
    }
}

fn script() -> Vec<Message> {
    vec![
        Message::hello("test/1.0"),
        Message::begin(),
        Message::run("UNWIND range(1, 3) AS n RETURN n"),
        Message::pull(2),
        Message::pull(2),
        Message::Commit,
    ]
}

fn assert_script_log(calls: &[Call]) {
    let engine_calls: Vec<&Call> = calls.iter().filter(|c| !c.is_response()).collect();
    assert_eq!(
        engine_calls,
        vec![
            &Call::Begin(TransactionKind::Explicit),
            &Call::Run("UNWIND range(1, 3) AS n RETURN n".to_string()),
            &Call::Pull(zero_bolt::FetchSize::Limited(2)),
            &Call::Pull(zero_bolt::FetchSize::Limited(2)),
            &Call::Commit,
        ]
    );
    assert_eq!(calls.iter().filter(|c| matches!(c, Call::Record(_))).count(), 3);
    assert_eq!(calls.last(), Some(&Call::Success(zero_bolt::metadata! { "bookmark" => BOOKMARK })));
}

#[cfg(feature = "sync")]
#[test]
fn test_sync_worker_processes_in_order() {
    use zero_bolt::sync::Worker;

    let engine = FakeEngine::new(Behavior::default());
    let log = engine.log();
    let worker = Worker::spawn(connect(&engine), &opts(4)).unwrap();
    for message in script() {
        worker.send(message).unwrap();
    }
    let conn = worker.join().unwrap();

    // every sender dropped: the session is torn down
    assert_eq!(conn.state(), ConnectionState::Defunct);
    assert_script_log(&take(&log));
}

#[cfg(feature = "sync")]
#[test]
fn test_sync_worker_stops_after_goodbye() {
    use zero_bolt::sync::Worker;

    let engine = FakeEngine::new(Behavior::default());
    let log = engine.log();
    let worker = Worker::spawn(connect(&engine), &opts(4)).unwrap();
    worker.send(Message::hello("test/1.0")).unwrap();
    worker.send(Message::begin()).unwrap();
    worker.send(Message::Goodbye).unwrap();

    let conn = worker.join().unwrap();
    assert!(conn.is_defunct());
    assert!(take(&log).contains(&Call::Rollback));
}

#[cfg(feature = "sync")]
#[test]
fn test_sync_worker_closes_on_disconnect() {
    use zero_bolt::sync::Worker;

    let engine = FakeEngine::new(Behavior::default());
    let log = engine.log();
    let worker = Worker::spawn(connect(&engine), &opts(4)).unwrap();
    worker.send(Message::hello("test/1.0")).unwrap();
    worker.send(Message::run("RETURN 1")).unwrap();

    let conn = worker.join().unwrap();
    assert!(conn.is_defunct());
    assert!(take(&log).contains(&Call::Rollback));
}

#[cfg(feature = "sync")]
#[test]
fn test_sync_worker_queue_capacity_from_opts() {
    use zero_bolt::sync::Worker;

    let engine = FakeEngine::new(Behavior::default());
    let opts = Opts::try_from("worker_queue_capacity=1").unwrap();
    let (entered, release) = engine.hold_next_begin();
    let worker = Worker::spawn(connect(&engine), &opts).unwrap();
    worker.send(Message::hello("test/1.0")).unwrap();
    worker.send(Message::begin()).unwrap();

    // the worker is stuck in BEGIN with an empty queue of capacity 1
    entered.recv().unwrap();
    worker.try_send(Message::Rollback).unwrap();
    assert!(matches!(worker.try_send(Message::Reset), Err(Error::QueueFull)));

    release.send(()).unwrap();
    let conn = worker.join().unwrap();
    assert!(conn.is_defunct());
    assert!(take(&engine.log()).contains(&Call::Rollback));
}

#[cfg(feature = "sync")]
#[test]
fn test_sync_worker_rejects_zero_capacity() {
    use zero_bolt::sync::Worker;

    let engine = FakeEngine::new(Behavior::default());
    let result = Worker::spawn(connect(&engine), &opts(0));
    assert!(matches!(result, Err(Error::InvalidUsage(_))));
}

#[cfg(feature = "tokio")]
#[tokio::test]
async fn test_tokio_worker_rejects_zero_capacity() {
    use zero_bolt::tokio::Worker;

    let engine = FakeEngine::new(Behavior::default());
    let result = Worker::spawn(connect(&engine), &opts(0));
    assert!(matches!(result, Err(Error::InvalidUsage(_))));
}

#[cfg(feature = "tokio")]
#[tokio::test]
async fn test_tokio_worker_processes_in_order() {
    use zero_bolt::tokio::Worker;

    let engine = FakeEngine::new(Behavior::default());
    let log = engine.log();
    let worker = Worker::spawn(connect(&engine), &opts(4)).unwrap();
    for message in script() {
        worker.send(message).await.unwrap();
    }
    let conn = worker.join().await.unwrap();

    assert_eq!(conn.state(), ConnectionState::Defunct);
    assert_script_log(&take(&log));
}

#[cfg(feature = "tokio")]
#[tokio::test]
async fn test_tokio_worker_rejects_after_goodbye() {
    use zero_bolt::tokio::Worker;

    let engine = FakeEngine::new(Behavior::default());
    let worker = Worker::spawn(connect(&engine), &opts(1)).unwrap();
    worker.send(Message::hello("test/1.0")).await.unwrap();
    worker.send(Message::Goodbye).await.unwrap();

    // the task ends on Defunct and drops its receiver
    let mut result = Ok(());
    for _ in 0..100 {
        result = worker.send(Message::Reset).await;
        if result.is_err() {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert!(matches!(result, Err(Error::ConnectionBroken)));
    assert!(worker.join().await.unwrap().is_defunct());
}
