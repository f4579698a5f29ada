//! Parsed event message and its timestamp triple.

use serde::{Deserialize, Serialize};
use siagate_core::SiaTimestamp;
use std::fmt;

/// Fields of one inbound event message, as extracted by the parser.
///
/// Every field is best-effort: a marker missing from the payload leaves the
/// corresponding field empty (for the always-present segments) or `None`
/// (for the optional ones). Segment fields keep their leading marker
/// character (`receiver` = `"R0"`, `prefix` = `"L0"`, `account` = `"#1234"`)
/// because the ACK reply echoes them verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMessage {
    /// Protocol subtype token, e.g. `SIA-DCS` or `NULL`.
    pub message_type: String,

    /// Message sequence number (numeric string, echoed in the ACK).
    pub sequence: String,

    /// Receiver-line identifier including its `R` marker; absent when the
    /// id segment carries none.
    pub receiver: Option<String>,

    /// Line/account-group identifier including its `L` marker.
    pub prefix: String,

    /// Account identifier including its `#` marker.
    pub account: String,

    /// Raw bracketed data block content, before decoding. Absent when the
    /// brackets are empty or missing.
    pub data_block: Option<String>,

    /// 2-character event code decoded from the data block.
    pub event_code: Option<String>,

    /// Remainder of the decoded block after the event code.
    pub event_address: Option<String>,

    /// Trailing time literal from the payload, exactly as transmitted.
    pub timestamp_raw: Option<String>,
}

impl EventMessage {
    /// Full panel id segment as it would be echoed in an ACK:
    /// sequence + receiver + prefix + account.
    #[must_use]
    pub fn id(&self) -> String {
        format!(
            "{}{}{}{}",
            self.sequence,
            self.receiver.as_deref().unwrap_or(""),
            self.prefix,
            self.account
        )
    }
}

impl fmt::Display for EventMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} code={}",
            self.message_type,
            self.id(),
            self.event_code.as_deref().unwrap_or("-")
        )
    }
}

/// The three clocks attached to one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTimestamps {
    /// Time reported by the panel; falls back to `receipt` when the payload
    /// carried no (parseable) literal.
    pub panel: SiaTimestamp,

    /// Time of arrival at this receiver.
    pub receipt: SiaTimestamp,

    /// `panel - receipt` in whole seconds; negative when the panel clock
    /// lags the receiver.
    pub diff_seconds: i64,
}

impl MessageTimestamps {
    /// Resolve the timestamp triple for a message.
    ///
    /// An absent or malformed literal means the panel supplied no usable
    /// time; the panel clock then defaults to the receipt time and the
    /// difference is zero, which always validates.
    #[must_use]
    pub fn resolve(timestamp_raw: Option<&str>, receipt: SiaTimestamp) -> Self {
        let panel = timestamp_raw
            .and_then(|raw| SiaTimestamp::parse(raw).ok())
            .unwrap_or(receipt);
        MessageTimestamps {
            panel,
            receipt,
            diff_seconds: panel.unix_seconds() - receipt.unix_seconds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt() -> SiaTimestamp {
        SiaTimestamp::parse("_12:00:00,05-10-2025").unwrap()
    }

    #[test]
    fn test_resolve_with_panel_time() {
        let ts = MessageTimestamps::resolve(Some("_12:00:30,05-10-2025"), receipt());
        assert_eq!(ts.diff_seconds, 30);
        assert_eq!(ts.receipt, receipt());
    }

    #[test]
    fn test_resolve_panel_behind_receiver() {
        let ts = MessageTimestamps::resolve(Some("_11:59:40,05-10-2025"), receipt());
        assert_eq!(ts.diff_seconds, -20);
    }

    #[test]
    fn test_resolve_absent_literal_defaults_to_receipt() {
        let ts = MessageTimestamps::resolve(None, receipt());
        assert_eq!(ts.panel, receipt());
        assert_eq!(ts.diff_seconds, 0);
    }

    #[test]
    fn test_resolve_malformed_literal_defaults_to_receipt() {
        let ts = MessageTimestamps::resolve(Some("_garbage"), receipt());
        assert_eq!(ts.panel, receipt());
        assert_eq!(ts.diff_seconds, 0);
    }

    #[test]
    fn test_id_concatenation() {
        let msg = EventMessage {
            sequence: "0123".to_string(),
            receiver: Some("R0".to_string()),
            prefix: "L0".to_string(),
            account: "#1234".to_string(),
            ..Default::default()
        };
        assert_eq!(msg.id(), "0123R0L0#1234");
    }

    #[test]
    fn test_id_without_receiver() {
        let msg = EventMessage {
            sequence: "0123".to_string(),
            prefix: "L0".to_string(),
            account: "#1234".to_string(),
            ..Default::default()
        };
        assert_eq!(msg.id(), "0123L0#1234");
    }
}
