//! Integration tests for the signal dispatcher, driven with form-style
//! notices the way the engine uses it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use dynform_signals::{Recorder, Signal};

#[derive(Debug, Clone, PartialEq)]
enum Notice {
    Validity(bool),
    Changed(&'static str),
    Submit,
}

fn counter(signal: &Signal<Notice>, id: &str, only: fn(&Notice) -> bool) -> Arc<AtomicUsize> {
    let hits = Arc::new(AtomicUsize::new(0));
    let h = Arc::clone(&hits);
    signal.connect(
        id,
        Arc::new(move |notice: &Notice| {
            if only(notice) {
                h.fetch_add(1, Ordering::SeqCst);
            }
        }),
    );
    hits
}

#[test]
fn test_receiver_sees_payload() {
    let signal: Signal<Notice> = Signal::new();
    let last = Arc::new(Mutex::new(None));
    let l = Arc::clone(&last);
    signal.connect(
        "last",
        Arc::new(move |notice: &Notice| *l.lock().unwrap() = Some(notice.clone())),
    );

    signal.send(&Notice::Changed("email"));
    assert_eq!(*last.lock().unwrap(), Some(Notice::Changed("email")));
}

#[test]
fn test_receivers_filter_by_variant() {
    let signal = Signal::new();
    let submits = counter(&signal, "submit", |n| *n == Notice::Submit);
    let invalid = counter(&signal, "invalid", |n| *n == Notice::Validity(false));

    signal.send(&Notice::Validity(false));
    signal.send(&Notice::Submit);
    signal.send(&Notice::Validity(true));

    assert_eq!(submits.load(Ordering::SeqCst), 1);
    assert_eq!(invalid.load(Ordering::SeqCst), 1);
}

#[test]
fn test_disconnect_is_reported_once() {
    let signal = Signal::new();
    let all = counter(&signal, "all", |_| true);

    assert_eq!(signal.send(&Notice::Submit), 1);
    assert!(signal.disconnect("all"));
    assert_eq!(signal.send(&Notice::Submit), 0);

    assert_eq!(all.load(Ordering::SeqCst), 1);
    assert!(!signal.disconnect("all"));
}

#[test]
fn test_reconnect_replaces_in_place() {
    let signal: Signal<Notice> = Signal::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    let tag = |label: &'static str| {
        let o = Arc::clone(&order);
        Arc::new(move |_: &Notice| o.lock().unwrap().push(label))
    };
    signal.connect("a", tag("a1"));
    signal.connect("b", tag("b"));
    signal.connect("a", tag("a2"));

    assert_eq!(signal.receiver_ids(), vec!["a", "b"]);
    assert_eq!(signal.send(&Notice::Submit), 2);
    assert_eq!(*order.lock().unwrap(), vec!["a2", "b"]);
}

#[test]
fn test_recorder_alongside_callback() {
    let signal = Signal::new();
    let all = counter(&signal, "count", |_| true);
    let log: Recorder<Notice> = signal.record("log");

    signal.send(&Notice::Validity(true));
    signal.send(&Notice::Submit);

    assert_eq!(all.load(Ordering::SeqCst), 2);
    assert_eq!(log.take(), vec![Notice::Validity(true), Notice::Submit]);
    assert!(log.is_empty());
}

#[test]
fn test_disconnected_recorder_stops_recording() {
    let signal: Signal<u8> = Signal::new();
    let log = signal.record("log");
    signal.send(&1);
    signal.disconnect("log");
    signal.send(&2);
    assert_eq!(log.snapshot(), vec![1]);
}
