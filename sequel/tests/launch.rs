mod common;

use common::Trigger;
use sequel::{Error, launch};

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, PartialEq)]
struct Refused(u32);

impl fmt::Display for Refused {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "refused with code {}", self.0)
    }
}

impl std::error::Error for Refused {}

#[test]
fn test_immediate_value_is_done_on_return() {
    let task = launch(async { Ok(1) });

    assert!(task.is_done(), "Body without suspension should finish inside launch");
}

#[test]
fn test_drive_skips_predicate_when_done() {
    let calls = AtomicUsize::new(0);
    let mut task = launch(async { Ok(1) });

    let result = task.drive(|| {
        calls.fetch_add(1, Ordering::SeqCst);
        true
    });

    assert_eq!(result.unwrap(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 0, "Predicate must not run");
}

#[test]
fn test_body_runs_eagerly() {
    let steps = Arc::new(AtomicUsize::new(0));
    let trigger = Trigger::<()>::new();

    let task = {
        let steps = steps.clone();
        let trigger = trigger.clone();

        launch(async move {
            steps.fetch_add(1, Ordering::SeqCst);
            trigger.wait().await?;
            steps.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    };

    assert_eq!(steps.load(Ordering::SeqCst), 1, "Should run up to the first suspension");
    assert!(!task.is_done());

    trigger.fire(());

    assert_eq!(steps.load(Ordering::SeqCst), 2);
    assert!(task.is_done());
}

#[test]
fn test_error_is_observed_once() {
    let mut task = launch(async { Err::<u32, _>(Error::failed(Refused(7))) });

    let err = task.drive(|| true).unwrap_err();

    assert_eq!(err.failure::<Refused>(), Some(&Refused(7)));
    assert!(matches!(task.drive(|| true), Err(Error::Consumed)));
}

#[test]
fn test_failed_keeps_engine_errors() {
    let err = Error::failed(Error::Abandoned);

    assert!(matches!(err, Error::Abandoned));
}

#[test]
fn test_panic_is_captured() {
    let mut task = launch(async {
        if true {
            panic!("body exploded");
        }
        Ok(0u8)
    });

    match task.drive(|| true) {
        Err(Error::Panicked(message)) => assert_eq!(message, "body exploded"),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn test_second_extraction_is_rejected() {
    let mut task = launch(async { Ok("once") });

    assert_eq!(task.drive(|| true).unwrap(), "once");
    assert!(matches!(task.drive(|| true), Err(Error::Consumed)));
    assert_eq!(task.id(), None);
}

#[test]
fn test_stopped_driver_keeps_task() {
    let trigger = Trigger::<u32>::new();

    let mut task = {
        let trigger = trigger.clone();
        launch(async move { trigger.wait().await })
    };

    let polls = AtomicUsize::new(0);

    let stopped = task.drive(|| {
        polls.fetch_add(1, Ordering::SeqCst);
        false
    });

    assert!(matches!(stopped, Err(Error::Stopped)));
    assert_eq!(polls.load(Ordering::SeqCst), 1);
    assert!(task.id().is_some(), "Stopping must not consume the task");

    let result = task.drive(|| trigger.fire(9));

    assert_eq!(result.unwrap(), 9);
}
