//! Polling supervisor and tracking session scenarios.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{CancelDuringSleepClock, FailingSink, InstantClock, MemorySink, ScriptedSource};
use pagewatch_core::errors::ExErrorKind;
use pagewatch_core::{
    CancellationSignal, SessionOutcome, Snapshot, SourceFault, Supervisor, TerminalOutcome,
    TrackingSession,
};
use std::sync::Arc;
use std::time::Duration;

fn supervisor_with(clock: Arc<InstantClock>) -> Supervisor {
    Supervisor::new(Duration::from_secs(5)).with_clock(clock)
}

fn instant_supervisor() -> Supervisor {
    supervisor_with(Arc::new(InstantClock::default()))
}

// ---------------------------------------------------------------------------
// Supervisor
// ---------------------------------------------------------------------------

#[test]
fn scenario_three_unchanged_ticks_then_change() {
    let baseline = Snapshot::from_text("The price is $10.");
    let unchanged = || Ok(Snapshot::from_text("The price is $10."));
    let (mut source, counters) = ScriptedSource::new(
        baseline.clone(),
        vec![
            unchanged(),
            unchanged(),
            unchanged(),
            Ok(Snapshot::from_text("The price is $15.")),
        ],
    );
    let clock = Arc::new(InstantClock::default());
    let cancel = CancellationSignal::new();

    let outcome = supervisor_with(clock.clone()).run(&mut source, &baseline, &cancel);

    match outcome {
        TerminalOutcome::ChangesDetected { changes, current } => {
            assert_eq!(changes.len(), 1);
            assert_eq!(changes.pairs()[0].removed(), "0");
            assert_eq!(changes.pairs()[0].added(), "5");
            assert_eq!(current.text(), "The price is $15.");
        }
        other => panic!("expected ChangesDetected, got {other:?}"),
    }
    assert_eq!(counters.fetches(), 4);
    assert_eq!(counters.refreshes(), 3);
    assert_eq!(clock.sleeps(), 4);
    // The supervisor never closes the source itself.
    assert_eq!(counters.closes(), 0);
}

#[test]
fn scenario_cancel_before_first_sleep_completes() {
    let baseline = Snapshot::from_text("baseline");
    let (mut source, counters) = ScriptedSource::constant("baseline");
    let cancel = CancellationSignal::new();

    let supervisor =
        Supervisor::new(Duration::from_secs(5)).with_clock(Arc::new(CancelDuringSleepClock));
    let outcome = supervisor.run(&mut source, &baseline, &cancel);

    assert_eq!(outcome, TerminalOutcome::Cancelled);
    assert_eq!(counters.fetches(), 0);
    assert!(cancel.is_cancelled());
}

#[test]
fn test_cancelled_before_start_never_sleeps() {
    let baseline = Snapshot::from_text("baseline");
    let (mut source, counters) = ScriptedSource::constant("baseline");
    let cancel = CancellationSignal::new();
    cancel.cancel();
    let clock = Arc::new(InstantClock::default());

    let outcome = supervisor_with(clock.clone()).run(&mut source, &baseline, &cancel);

    assert_eq!(outcome, TerminalOutcome::Cancelled);
    assert_eq!(clock.sleeps(), 0);
    assert_eq!(counters.fetches(), 0);
}

#[test]
fn test_system_clock_wakes_on_cancel_from_other_thread() {
    let baseline = Snapshot::from_text("baseline");
    let (mut source, counters) = ScriptedSource::constant("baseline");
    let cancel = CancellationSignal::new();
    let supervisor = Supervisor::new(Duration::from_secs(3600));

    let canceller = {
        let cancel = cancel.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            cancel.cancel();
        })
    };
    let outcome = supervisor.run(&mut source, &baseline, &cancel);
    canceller.join().unwrap();

    assert_eq!(outcome, TerminalOutcome::Cancelled);
    assert_eq!(counters.fetches(), 0);
}

#[test]
fn scenario_fault_on_second_tick() {
    let baseline = Snapshot::from_text("baseline");
    let (mut source, counters) = ScriptedSource::new(
        baseline.clone(),
        vec![
            Ok(Snapshot::from_text("baseline")),
            Err(SourceFault::unavailable("connection refused\n  at fetch()")),
        ],
    );
    let cancel = CancellationSignal::new();

    let outcome = instant_supervisor().run(&mut source, &baseline, &cancel);

    match outcome {
        TerminalOutcome::SourceUnavailable { summary } => {
            assert_eq!(summary, "connection refused");
        }
        other => panic!("expected SourceUnavailable, got {other:?}"),
    }
    assert_eq!(counters.fetches(), 2);
    assert_eq!(counters.refreshes(), 1);
}

#[test]
fn test_unknown_fault_with_blank_message_has_summary() {
    let baseline = Snapshot::from_text("baseline");
    let (mut source, _) =
        ScriptedSource::new(baseline.clone(), vec![Err(SourceFault::unknown(""))]);
    let cancel = CancellationSignal::new();

    let outcome = instant_supervisor().run(&mut source, &baseline, &cancel);

    match outcome {
        TerminalOutcome::SourceUnavailable { summary } => assert!(!summary.is_empty()),
        other => panic!("expected SourceUnavailable, got {other:?}"),
    }
}

#[test]
fn test_closed_by_user_is_benign_stop() {
    let baseline = Snapshot::from_text("baseline");
    let (mut source, _) = ScriptedSource::new(
        baseline.clone(),
        vec![Err(SourceFault::closed_by_user("browser window closed"))],
    );
    let cancel = CancellationSignal::new();

    let outcome = instant_supervisor().run(&mut source, &baseline, &cancel);

    assert_eq!(outcome, TerminalOutcome::Cancelled);
}

// ---------------------------------------------------------------------------
// TrackingSession
// ---------------------------------------------------------------------------

#[test]
fn test_session_reports_changes_and_closes_source_once() {
    let baseline = Snapshot::from_text("Alpha 10, Beta 20");
    let (source, counters) = ScriptedSource::new(
        baseline.clone(),
        vec![Ok(Snapshot::from_text("Alpha 11, Beta 25"))],
    );
    let mut sink = MemorySink::default();
    let session = TrackingSession::new(
        "https://example.com/prices",
        source,
        baseline.clone(),
        CancellationSignal::new(),
    );

    let outcome = session.run(&instant_supervisor(), &mut sink).unwrap();

    let SessionOutcome::ChangesReported {
        label,
        pair_count,
        report_path,
    } = outcome
    else {
        panic!("expected ChangesReported, got {outcome:?}");
    };
    assert_eq!(pair_count, 2);
    assert!(report_path.to_string_lossy().contains(label.as_str()));
    assert_eq!(counters.closes(), 1);

    let reports = sink.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].target(), "https://example.com/prices");
    assert_eq!(reports[0].baseline(), &baseline);
    assert_eq!(reports[0].current().text(), "Alpha 11, Beta 25");
}

#[test]
fn test_session_closes_source_once_on_fault() {
    let baseline = Snapshot::from_text("baseline");
    let (source, counters) = ScriptedSource::new(
        baseline.clone(),
        vec![
            Ok(Snapshot::from_text("baseline")),
            Err(SourceFault::unavailable("HTTP 503")),
        ],
    );
    let session = TrackingSession::new("t", source, baseline, CancellationSignal::new());
    let mut sink = MemorySink::default();

    let outcome = session.run(&instant_supervisor(), &mut sink).unwrap();

    assert_eq!(
        outcome,
        SessionOutcome::SourceUnavailable {
            summary: "HTTP 503".to_string()
        }
    );
    assert_eq!(counters.closes(), 1);
}

#[test]
fn test_session_closes_source_once_on_cancel() {
    let baseline = Snapshot::from_text("baseline");
    let (source, counters) = ScriptedSource::constant("baseline");
    let cancel = CancellationSignal::new();
    cancel.cancel();
    let session = TrackingSession::new("t", source, baseline, cancel);
    let mut sink = MemorySink::default();

    let outcome = session.run(&instant_supervisor(), &mut sink).unwrap();

    assert_eq!(outcome, SessionOutcome::Cancelled);
    assert_eq!(counters.closes(), 1);
}

#[test]
fn test_session_sink_failure_is_an_error_and_still_closes() {
    let baseline = Snapshot::from_text("old");
    let (source, counters) =
        ScriptedSource::new(baseline.clone(), vec![Ok(Snapshot::from_text("new"))]);
    let cancel = CancellationSignal::new();
    let session = TrackingSession::new("https://example.com", source, baseline, cancel);
    let session_id = session.id().clone();

    let err = session
        .run(&instant_supervisor(), &mut FailingSink)
        .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Io);
    assert_eq!(err.session_id(), Some(&session_id));
    assert_eq!(err.target(), Some("https://example.com"));
    assert_eq!(counters.closes(), 1);
}

#[test]
fn test_dropping_unrun_session_closes_source() {
    let (source, counters) = ScriptedSource::constant("x");
    let baseline = Snapshot::from_text("x");
    let session = TrackingSession::new("t", source, baseline, CancellationSignal::new());
    drop(session);
    assert_eq!(counters.closes(), 1);
}
