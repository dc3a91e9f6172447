//! Change tracking: the polling supervisor and the session and controller
//! layers around it.
//!
//! ## Layers
//!
//! - [`Supervisor`]: the pure fetch/compare loop; never touches sinks and
//!   never closes the source.
//! - [`TrackingSession`]: owns one source and one baseline, runs the
//!   supervisor, closes the source exactly once and hands changes to a
//!   [`ReportSink`](crate::report::ReportSink).
//! - [`Tracker`]: runs sessions on a worker thread and exposes
//!   start/stop/status to a controlling interface.

pub mod cancel;
pub mod clock;
pub mod fault;
pub mod session;
pub mod source;
pub mod supervisor;
pub mod tracker;

pub use cancel::CancellationSignal;
pub use clock::{Clock, SystemClock, Wake};
pub use fault::{FaultKind, SourceFault};
pub use session::{SessionOutcome, TrackingSession};
pub use source::DocumentSource;
pub use supervisor::{Supervisor, TerminalOutcome, DEFAULT_POLL_INTERVAL};
pub use tracker::{Tracker, TrackerStatus};
