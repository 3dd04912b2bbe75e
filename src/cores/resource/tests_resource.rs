// Polling behaviour of `Resource`, driven by a scripted transport and a manual clock.
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Value, json};

use super::*;
use crate::errors::RetdecError;
use crate::testing::{ManualClock, ScriptedTransport, job_status};

#[derive(Debug, Deserialize)]
struct Progress {
    #[serde(flatten)]
    state: JobState,
    completion: u8,
}

impl Snapshot for Progress {
    const KIND: &'static str = "progress";

    fn from_json(value: Value) -> Result<Self, RetdecError> {
        serde_json::from_value(value).map_err(|e| RetdecError::ParseError(e.to_string()))
    }

    fn state(&self) -> &JobState {
        &self.state
    }

    fn progress(&self) -> Option<u8> {
        Some(self.completion)
    }

    fn failure_error(message: String) -> RetdecError {
        RetdecError::Generic(message)
    }
}

fn progress(completion: u8, finished: bool) -> Value {
    let mut v = job_status(finished, false, None);
    v["completion"] = json!(completion);
    v
}

fn setup<S: Snapshot>(statuses: Vec<Value>) -> (Resource<S>, Arc<ScriptedTransport>, Arc<ManualClock>) {
    let conn = Arc::new(ScriptedTransport::new(statuses));
    let clock = Arc::new(ManualClock::new());
    let res = Resource::new("ID", conn.clone()).with_clock(clock.clone());
    (res, conn, clock)
}

#[test]
fn first_query_always_fetches() {
    let (mut res, conn, _) = setup::<JobState>(vec![job_status(false, false, None)]);
    assert!(res.snapshot().is_none());
    assert!(res.is_running().unwrap());
    assert_eq!(conn.status_requests(), 1);
}

#[test]
fn back_to_back_queries_fetch_once() {
    let (mut res, conn, _) = setup::<JobState>(vec![job_status(false, false, None)]);
    assert!(!res.has_finished().unwrap());
    assert!(!res.has_failed().unwrap());
    assert!(!res.is_pending().unwrap());
    assert_eq!(res.get_error().unwrap(), None);
    assert_eq!(conn.status_requests(), 1);
}

#[test]
fn query_after_interval_fetches_again() {
    let (mut res, conn, clock) = setup::<JobState>(vec![
        job_status(false, false, None),
        job_status(true, false, None),
    ]);
    assert!(!res.has_finished().unwrap());
    clock.advance(STATE_UPDATE_INTERVAL - Duration::from_millis(1));
    assert!(!res.has_finished().unwrap());
    assert_eq!(conn.status_requests(), 1);

    clock.advance(Duration::from_millis(1));
    assert!(res.has_finished().unwrap());
    assert!(res.has_succeeded().unwrap());
    assert_eq!(conn.status_requests(), 2);
}

#[test]
fn already_finished_job_is_not_slept_on() {
    let (mut res, conn, clock) = setup::<Progress>(vec![progress(100, true)]);
    let calls = Rc::new(RefCell::new(0));
    let c = calls.clone();
    res.wait_until_finished_with(move |_| *c.borrow_mut() += 1, OnFailure::Raise)
        .unwrap();
    assert_eq!(*calls.borrow(), 1);
    assert_eq!(conn.status_requests(), 1);
    assert!(clock.sleeps().is_empty());
}

#[test]
fn callback_fires_on_each_progress_change_and_at_the_end() {
    let (mut res, conn, clock) = setup::<Progress>(vec![
        progress(0, false),
        progress(15, false),
        progress(100, true),
    ]);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    res.wait_until_finished_with(
        move |r: &Resource<Progress>| s.borrow_mut().push(r.snapshot().map(|p| p.completion)),
        OnFailure::Raise,
    )
    .unwrap();
    assert_eq!(*seen.borrow(), vec![Some(15), Some(100)]);
    assert_eq!(conn.status_requests(), 3);
    assert_eq!(clock.sleeps(), vec![STATE_UPDATE_INTERVAL, STATE_UPDATE_INTERVAL]);
}

#[test]
fn unchanged_progress_does_not_fire_callback() {
    let (mut res, _, _) = setup::<Progress>(vec![
        progress(10, false),
        progress(10, false),
        progress(10, false),
        progress(100, true),
    ]);
    let calls = Rc::new(RefCell::new(0));
    let c = calls.clone();
    res.wait_until_finished_with(move |_| *c.borrow_mut() += 1, OnFailure::Raise)
        .unwrap();
    assert_eq!(*calls.borrow(), 1);
}

#[test]
fn wait_sleeps_only_the_rest_of_the_interval() {
    let (mut res, conn, clock) = setup::<JobState>(vec![
        job_status(false, false, None),
        job_status(true, false, None),
    ]);
    assert!(res.is_running().unwrap());
    clock.advance(Duration::from_millis(200));
    res.wait_until_finished(OnFailure::Raise).unwrap();
    assert_eq!(clock.sleeps(), vec![Duration::from_millis(300)]);
    assert_eq!(conn.status_requests(), 2);
}

#[test]
fn failed_job_raises_by_default() {
    let (mut res, _, _) = setup::<JobState>(vec![job_status(true, true, Some("boom"))]);
    let err = res.wait_until_finished(OnFailure::default()).unwrap_err();
    assert!(matches!(err, RetdecError::ResourceFailed(m) if m == "boom"));
}

#[test]
fn failed_job_can_be_ignored_or_reported() {
    let (mut res, _, _) = setup::<JobState>(vec![job_status(true, true, Some("boom"))]);
    res.wait_until_finished(OnFailure::Ignore).unwrap();

    let (mut res, _, _) = setup::<JobState>(vec![job_status(true, true, Some("boom"))]);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    res.wait_until_finished(OnFailure::call(move |m| s.borrow_mut().push(m.to_string())))
        .unwrap();
    assert_eq!(*seen.borrow(), vec!["boom".to_string()]);
}

#[test]
fn failed_job_raises_custom_error() {
    let (mut res, _, _) = setup::<JobState>(vec![job_status(true, true, Some("boom"))]);
    let err = res
        .wait_until_finished(OnFailure::raise_with(|m| RetdecError::Generic(format!("custom {}", m))))
        .unwrap_err();
    assert!(matches!(err, RetdecError::Generic(m) if m == "custom boom"));
}

#[test]
fn failed_job_reports_error_message() {
    let (mut res, _, _) = setup::<JobState>(vec![job_status(true, true, Some("boom"))]);
    assert!(res.has_failed().unwrap());
    assert!(!res.has_succeeded().unwrap());
    assert_eq!(res.get_error().unwrap().as_deref(), Some("boom"));
}

#[test]
fn wait_until_surfaces_predicate_error_immediately() {
    let (mut res, conn, clock) = setup::<JobState>(vec![job_status(false, false, None)]);
    let err = res
        .wait_until(|_| Err(RetdecError::not_requested("archive")))
        .unwrap_err();
    assert!(matches!(err, RetdecError::OutputNotRequested { .. }));
    assert_eq!(conn.status_requests(), 1);
    assert!(clock.sleeps().is_empty());
}

#[test]
fn transport_errors_propagate() {
    let (mut res, _, _) = setup::<JobState>(vec![]);
    assert!(matches!(res.is_running(), Err(RetdecError::UnknownApi { code: 404, .. })));
}

#[test]
fn display_names_kind_and_id() {
    let (res, _, _) = setup::<JobState>(vec![]);
    assert_eq!(res.to_string(), "resource id=ID");
    assert_eq!(res.id(), "ID");
}
