//! Controller that runs one tracking session at a time on a worker thread.

use crate::errors::{ExError, ExErrorKind, PageWatchError, Result};
use crate::report::ReportSink;
use crate::snapshot::Snapshot;
use crate::tracking::cancel::CancellationSignal;
use crate::tracking::session::{SessionOutcome, TrackingSession};
use crate::tracking::source::DocumentSource;
use crate::tracking::supervisor::Supervisor;
use pagewatch_core_types::SessionId;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

/// Name given to session worker threads.
pub const WORKER_THREAD_NAME: &str = "pagewatch-session";

/// Coarse status for the controlling interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerStatus {
    /// No session has been started.
    Idle,
    Running,
    /// The last session ended normally (changes reported or cancelled).
    Stopped,
    /// The last session ended on a source fault, a reporting error or a
    /// worker panic.
    Failed(String),
}

struct ActiveSession {
    target: String,
    handle: JoinHandle<Result<SessionOutcome>>,
}

/// Starts, stops and observes tracking sessions.
///
/// At most one session runs at a time. The cancellation signal is shared
/// across sessions and lowered before each start.
pub struct Tracker {
    supervisor: Supervisor,
    cancel: CancellationSignal,
    status: Arc<Mutex<TrackerStatus>>,
    active: Option<ActiveSession>,
}

impl Tracker {
    pub fn new(supervisor: Supervisor) -> Self {
        Self {
            supervisor,
            cancel: CancellationSignal::new(),
            status: Arc::new(Mutex::new(TrackerStatus::Idle)),
            active: None,
        }
    }

    /// Start tracking `target` on a new worker thread.
    ///
    /// # Errors
    ///
    /// `AlreadyRunning` if a session is still running; `Internal` if the
    /// worker thread cannot be spawned.
    pub fn start<S, K>(
        &mut self,
        target: impl Into<String>,
        source: S,
        baseline: Snapshot,
        mut sink: K,
    ) -> Result<SessionId>
    where
        S: DocumentSource + 'static,
        K: ReportSink + Send + 'static,
    {
        let target = target.into();
        if let Some(active) = &self.active {
            if !active.handle.is_finished() {
                return Err(PageWatchError::AlreadyRunning {
                    target: active.target.clone(),
                }
                .into());
            }
        }
        if let Some(finished) = self.active.take() {
            // Its outcome is already recorded in the status.
            let _ = self.reap(finished);
        }

        self.cancel.reset();
        let session = TrackingSession::new(target.clone(), source, baseline, self.cancel.clone());
        let session_id = session.id().clone();
        let supervisor = self.supervisor.clone();
        let status = Arc::clone(&self.status);
        let worker_target = target.clone();

        *lock_status(&self.status) = TrackerStatus::Running;
        let spawned = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                let run = AssertUnwindSafe(|| session.run(&supervisor, &mut sink));
                let result = match panic::catch_unwind(run) {
                    Ok(result) => result,
                    Err(payload) => Err(worker_panicked(&worker_target, payload.as_ref())),
                };
                *lock_status(&status) = match &result {
                    Ok(SessionOutcome::SourceUnavailable { summary }) => {
                        TrackerStatus::Failed(summary.clone())
                    }
                    Ok(_) => TrackerStatus::Stopped,
                    Err(e) => TrackerStatus::Failed(e.to_string()),
                };
                result
            });

        match spawned {
            Ok(handle) => {
                tracing::debug!(
                    session_id = %session_id,
                    target = %target,
                    "tracking worker spawned"
                );
                self.active = Some(ActiveSession { target, handle });
                Ok(session_id)
            }
            Err(e) => {
                let message = format!("failed to spawn tracking worker: {e}");
                *lock_status(&self.status) = TrackerStatus::Failed(message.clone());
                Err(ExError::new(ExErrorKind::Internal)
                    .with_op("tracker_start")
                    .with_target(target)
                    .with_message(message))
            }
        }
    }

    /// Request the running session to stop. Returns immediately.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn status(&self) -> TrackerStatus {
        lock_status(&self.status).clone()
    }

    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.handle.is_finished())
    }

    /// Handle for raising cancellation from another thread.
    pub fn cancel_handle(&self) -> CancellationSignal {
        self.cancel.clone()
    }

    /// Block until the current session finishes.
    ///
    /// Returns `Ok(None)` if no session was started since the last wait.
    ///
    /// # Errors
    ///
    /// Propagates the session's reporting error, or `Internal` if the worker
    /// panicked.
    pub fn wait(&mut self) -> Result<Option<SessionOutcome>> {
        let Some(active) = self.active.take() else {
            return Ok(None);
        };
        self.reap(active).map(Some)
    }

    /// Join a worker, recording a panic that escaped the session as `Failed`.
    fn reap(&self, active: ActiveSession) -> Result<SessionOutcome> {
        active.handle.join().unwrap_or_else(|payload| {
            let err = worker_panicked(&active.target, payload.as_ref());
            *lock_status(&self.status) = TrackerStatus::Failed(err.to_string());
            Err(err)
        })
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(Supervisor::default())
    }
}

fn worker_panicked(target: &str, payload: &(dyn Any + Send)) -> ExError {
    let message = payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    tracing::error!(target = %target, panic = %message, "tracking worker panicked");
    ExError::from(PageWatchError::WorkerPanicked { message }).with_target(target)
}

fn lock_status(status: &Mutex<TrackerStatus>) -> MutexGuard<'_, TrackerStatus> {
    status.lock().unwrap_or_else(PoisonError::into_inner)
}
