//! Document snapshots.
//!
//! A [`Snapshot`] is one observation of the tracked document: the raw
//! payload as fetched, the plain text the diff engine compares, and a
//! SHA-256 digest of that text so unchanged polls can skip the diff.

pub mod text;

pub use text::extract_body_text;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Immutable observation of the tracked document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    payload: String,
    text: String,
    digest: String,
    captured_at: DateTime<Utc>,
}

impl Snapshot {
    /// Create a snapshot captured now.
    pub fn new(payload: impl Into<String>, text: impl Into<String>) -> Self {
        Self::with_captured_at(payload, text, Utc::now())
    }

    /// Create a snapshot with an explicit capture instant.
    pub fn with_captured_at(
        payload: impl Into<String>,
        text: impl Into<String>,
        captured_at: DateTime<Utc>,
    ) -> Self {
        let text = text.into();
        Self {
            payload: payload.into(),
            digest: text_digest(&text),
            text,
            captured_at,
        }
    }

    /// Snapshot an HTML page, deriving its text with [`extract_body_text`].
    pub fn from_html(html: impl Into<String>) -> Self {
        let html = html.into();
        let text = extract_body_text(&html);
        Self::new(html, text)
    }

    /// Snapshot a plain-text document; payload and text are the same.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(text.clone(), text)
    }

    /// Raw payload as fetched
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Plain text compared by the diff engine
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Hex-encoded SHA-256 of [`Snapshot::text`] (64 characters)
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Instant the snapshot was taken
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Whether both snapshots carry the same text.
    pub fn same_text_as(&self, other: &Snapshot) -> bool {
        self.digest == other.digest && self.text == other.text
    }
}

fn text_digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}
