use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use std::fmt;

/// strftime pattern of report labels, e.g. `2024_03_07 [14_05_09]`.
pub const LABEL_FORMAT: &str = "%Y_%m_%d [%H_%M_%S]";

/// Timestamp used as report title and artifact filename stem.
///
/// The format avoids `:` and `/` so it is a valid filename on every
/// platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TimestampLabel(String);

impl TimestampLabel {
    /// Label for the current local time.
    pub fn now() -> Self {
        Self::from_datetime(&Local::now())
    }

    pub fn from_datetime<Tz>(at: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Self(at.format(LABEL_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TimestampLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
