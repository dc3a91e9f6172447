//! Document source trait.

use crate::snapshot::Snapshot;
use crate::tracking::fault::SourceFault;

/// A live handle on the tracked document.
///
/// The supervisor is the only caller while a session runs. Implementations
/// report failures as typed [`SourceFault`]s; a fault of kind
/// [`FaultKind::ClosedByUser`](crate::tracking::FaultKind::ClosedByUser)
/// means the handle was shut from the outside and is treated as a stop,
/// not an error.
pub trait DocumentSource: Send {
    /// Read the document as currently loaded.
    fn current_snapshot(&mut self) -> Result<Snapshot, SourceFault>;

    /// Reload the document so the next snapshot reflects the remote state.
    fn refresh(&mut self) -> Result<(), SourceFault>;

    /// Release the handle. Called exactly once per session.
    fn close(&mut self);
}

impl<S: DocumentSource + ?Sized> DocumentSource for Box<S> {
    fn current_snapshot(&mut self) -> Result<Snapshot, SourceFault> {
        (**self).current_snapshot()
    }

    fn refresh(&mut self) -> Result<(), SourceFault> {
        (**self).refresh()
    }

    fn close(&mut self) {
        (**self).close()
    }
}
