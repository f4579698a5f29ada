//! Timestamp-window validation.
//!
//! One deterministic comparison per message: the signed difference between
//! the panel clock and the receiver clock, in whole seconds, must fall
//! inside the configured [`ValidationWindow`]. There is no retry and no
//! clock synchronization; a panel whose clock drifts outside the window is
//! NAKed until it resynchronizes.

use siagate_core::{ValidationWindow, Verdict};

use crate::message::MessageTimestamps;

/// Classify a clock difference against the window.
#[must_use]
pub fn validate(diff_seconds: i64, window: &ValidationWindow) -> Verdict {
    if window.contains(diff_seconds) {
        Verdict::Accept
    } else {
        Verdict::Reject
    }
}

/// Classify a resolved timestamp triple against the window.
#[must_use]
pub fn validate_timestamps(
    timestamps: &MessageTimestamps,
    window: &ValidationWindow,
) -> Verdict {
    validate(timestamps.diff_seconds, window)
}
