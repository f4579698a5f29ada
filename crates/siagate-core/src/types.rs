use crate::{
    Result,
    constants::{
        DEFAULT_NEGATIVE_BOUND, DEFAULT_POSITIVE_BOUND, TIMESTAMP_FORMAT,
    },
    error::Error,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Acceptable range of panel-vs-receiver clock difference, in seconds.
///
/// Invariant: `negative <= 0 <= positive`. The constructor silently corrects
/// a bound with the wrong sign to its default rather than failing: a
/// misconfigured window must never take the receiver down or surface as an
/// error to the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WindowBounds")]
pub struct ValidationWindow {
    negative: i64,
    positive: i64,
}

/// Raw window bounds as they appear in configuration, before sign correction.
#[derive(Debug, Clone, Copy, Deserialize)]
struct WindowBounds {
    #[serde(default = "WindowBounds::default_negative")]
    negative: i64,
    #[serde(default = "WindowBounds::default_positive")]
    positive: i64,
}

impl WindowBounds {
    fn default_negative() -> i64 {
        DEFAULT_NEGATIVE_BOUND
    }

    fn default_positive() -> i64 {
        DEFAULT_POSITIVE_BOUND
    }
}

impl From<WindowBounds> for ValidationWindow {
    fn from(bounds: WindowBounds) -> Self {
        ValidationWindow::new(bounds.negative, bounds.positive)
    }
}

impl ValidationWindow {
    /// Create a window, correcting sign violations to the defaults.
    ///
    /// A positive `negative` bound becomes -20, a negative `positive` bound
    /// becomes +40. Zero is legal on either side.
    #[must_use]
    pub fn new(negative: i64, positive: i64) -> Self {
        let negative = if negative > 0 {
            DEFAULT_NEGATIVE_BOUND
        } else {
            negative
        };
        let positive = if positive < 0 {
            DEFAULT_POSITIVE_BOUND
        } else {
            positive
        };
        ValidationWindow { negative, positive }
    }

    /// Lower bound in seconds (always <= 0).
    #[must_use]
    pub fn negative(&self) -> i64 {
        self.negative
    }

    /// Upper bound in seconds (always >= 0).
    #[must_use]
    pub fn positive(&self) -> i64 {
        self.positive
    }

    /// Check whether a clock difference falls inside the window.
    #[must_use]
    pub fn contains(&self, diff_seconds: i64) -> bool {
        (self.negative..=self.positive).contains(&diff_seconds)
    }
}

impl Default for ValidationWindow {
    fn default() -> Self {
        ValidationWindow {
            negative: DEFAULT_NEGATIVE_BOUND,
            positive: DEFAULT_POSITIVE_BOUND,
        }
    }
}

impl fmt::Display for ValidationWindow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}s, +{}s]", self.negative, self.positive)
    }
}

/// Protocol timestamp (`_HH:MM:SS,MM-DD-YYYY`, always UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiaTimestamp(DateTime<Utc>);

impl SiaTimestamp {
    /// Create a timestamp from the current UTC time.
    #[must_use]
    pub fn now() -> Self {
        SiaTimestamp(Utc::now())
    }

    /// Create a timestamp from a DateTime instance.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        SiaTimestamp(dt)
    }

    /// Parse from the protocol literal: `_12:46:06,05-10-2025`.
    ///
    /// # Errors
    /// Returns `Error::InvalidTimestamp` if the literal does not match
    /// `_HH:MM:SS,MM-DD-YYYY` or names an impossible calendar time.
    pub fn parse(s: &str) -> Result<Self> {
        let dt = NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
            .map_err(|e| Error::InvalidTimestamp(format!("{s}: {e}")))?;
        Ok(SiaTimestamp(dt.and_utc()))
    }

    /// Format as the protocol literal (`_HH:MM:SS,MM-DD-YYYY`).
    #[must_use]
    pub fn format(&self) -> String {
        self.0.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Whole seconds since the Unix epoch.
    #[must_use]
    pub fn unix_seconds(&self) -> i64 {
        self.0.timestamp()
    }

    /// Get the inner DateTime reference.
    #[must_use]
    pub fn inner(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl fmt::Display for SiaTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

/// Outcome of timestamp-window validation for one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Clock difference within the window; reply with ACK.
    Accept,
    /// Clock difference outside the window; reply with NAK.
    Reject,
}

impl Verdict {
    /// Returns `true` if the verdict is Accept.
    #[inline]
    #[must_use]
    pub fn is_accept(self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Verdict::Accept => write!(f, "ACK"),
            Verdict::Reject => write!(f, "NAK"),
        }
    }
}
