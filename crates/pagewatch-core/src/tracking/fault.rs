//! Typed document source faults.

use crate::errors::{ExError, ExErrorKind};
use serde::Serialize;
use std::fmt;

/// Upper bound on [`SourceFault::summary`] length, in chars.
pub const MAX_SUMMARY_CHARS: usize = 200;

/// Classification of a document source failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    /// The session was closed from the outside; a benign stop.
    ClosedByUser,
    /// The source cannot be reached or answered with an error.
    Unavailable,
    /// Anything else.
    Unknown,
}

impl FaultKind {
    fn describe(&self) -> &'static str {
        match self {
            FaultKind::ClosedByUser => "source closed by user",
            FaultKind::Unavailable => "source unavailable",
            FaultKind::Unknown => "unknown source fault",
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Failure reported by a [`DocumentSource`](crate::tracking::DocumentSource).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct SourceFault {
    kind: FaultKind,
    message: String,
}

impl SourceFault {
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn closed_by_user(message: impl Into<String>) -> Self {
        Self::new(FaultKind::ClosedByUser, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Unavailable, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Unknown, message)
    }

    pub fn kind(&self) -> FaultKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_benign(&self) -> bool {
        self.kind == FaultKind::ClosedByUser
    }

    /// Single-line, non-empty description capped at [`MAX_SUMMARY_CHARS`].
    ///
    /// Uses the first non-blank line of the message, falling back to the
    /// fault kind when the message is blank.
    pub fn summary(&self) -> String {
        let line = self
            .message
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_else(|| self.kind.describe());

        if line.chars().count() <= MAX_SUMMARY_CHARS {
            return line.to_string();
        }
        let mut capped: String = line.chars().take(MAX_SUMMARY_CHARS - 1).collect();
        capped.push('…');
        capped
    }
}

impl From<SourceFault> for ExError {
    fn from(fault: SourceFault) -> Self {
        let kind = match fault.kind {
            FaultKind::ClosedByUser => ExErrorKind::SourceClosed,
            FaultKind::Unavailable => ExErrorKind::SourceUnavailable,
            FaultKind::Unknown => ExErrorKind::SourceFault,
        };
        ExError::new(kind).with_message(fault.summary())
    }
}
