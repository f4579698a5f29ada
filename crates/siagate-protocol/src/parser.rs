//! Event message parser.
//!
//! Converts an unframed DC-09 payload into a structured [`EventMessage`].
//!
//! # Payload Format
//!
//! ```text
//! "TYPE"SEQ[R..]L..#ACCT[data]_HH:MM:SS,MM-DD-YYYY
//! ```
//!
//! Where:
//! - `TYPE`: protocol subtype token between the quotes (e.g. `SIA-DCS`)
//! - `SEQ`: message sequence number, digits
//! - `R..`: optional receiver segment, starts at the first `R`
//! - `L..`: line-prefix segment, starts at the first `L`
//! - `#ACCT`: account segment, starts at the first `#`
//! - `[data]`: bracketed data block; the event code and address live after
//!   the block's `|` and `N` markers
//! - trailing time literal, optional
//!
//! # Best-Effort Semantics
//!
//! Parsing never fails. A payload missing a marker simply leaves the
//! corresponding field empty or absent, and the rest of the payload is
//! still consumed. The reply path stays deterministic for arbitrarily
//! mangled input; nothing a panel sends can raise an error past the codec.
//!
//! The segment markers are consumed by a single left-to-right scan. Each
//! segment runs from its marker to the next segment's marker, and the
//! optional segments (receiver, data block) are absent exactly when their
//! marker is missing or their span is empty.
//!
//! # Examples
//!
//! ```
//! use siagate_protocol::MessageParser;
//!
//! let msg = MessageParser::parse(
//!     "\"SIA-DCS\"0123R0L0#1234[#1234|Nri1/BA05]_12:46:06,05-10-2025",
//! );
//!
//! assert_eq!(msg.message_type, "SIA-DCS");
//! assert_eq!(msg.sequence, "0123");
//! assert_eq!(msg.receiver.as_deref(), Some("R0"));
//! assert_eq!(msg.prefix, "L0");
//! assert_eq!(msg.account, "#1234");
//! assert_eq!(msg.event_code.as_deref(), Some("BA"));
//! assert_eq!(msg.event_address.as_deref(), Some("05"));
//! assert_eq!(msg.timestamp_raw.as_deref(), Some("_12:46:06,05-10-2025"));
//! ```

use siagate_core::constants::{
    ACCOUNT_MARKER, BLOCK_CLOSE, BLOCK_OPEN, DATA_SEPARATOR, EVENT_CODE_LENGTH,
    EVENT_MARKER, PREFIX_MARKER, RECEIVER_MARKER, SUBADDRESS_END,
    SUBADDRESS_PREFIX, TYPE_DELIMITER,
};

use crate::message::EventMessage;

/// Parser for DC-09 event payloads.
pub struct MessageParser;

impl MessageParser {
    /// Parse an unframed payload into an [`EventMessage`].
    ///
    /// Never fails; see the module docs for the best-effort rules.
    #[must_use]
    pub fn parse(payload: &str) -> EventMessage {
        let (message_type, rest) = split_type(payload);
        let (id, block, timestamp_raw) = split_segments(rest);

        let mut msg = EventMessage {
            message_type: message_type.to_string(),
            timestamp_raw: timestamp_raw
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            ..Default::default()
        };

        scan_id(id, &mut msg);

        if let Some(block) = block.filter(|b| !b.is_empty()) {
            let (code, address) = decode_block(block);
            msg.data_block = Some(block.to_string());
            msg.event_code = Some(code.to_string());
            msg.event_address = Some(address.to_string());
        }

        msg
    }
}

/// Split off the quoted type token; returns (type, remainder).
///
/// The token spans the first to the last `"`. A payload with fewer than two
/// quotes yields an empty type and leaves the remainder intact.
fn split_type(payload: &str) -> (&str, &str) {
    let Some(open) = payload.find(TYPE_DELIMITER) else {
        return ("", payload);
    };
    let tail = &payload[open + 1..];
    match tail.rfind(TYPE_DELIMITER) {
        Some(close) => (&tail[..close], &tail[close + 1..]),
        None => ("", tail),
    }
}

/// Split the post-type remainder into (id segment, block content, trailing
/// time literal).
///
/// The id runs to the opening bracket, the block content sits between the
/// brackets, and whatever follows the closing bracket is the time literal.
/// Missing brackets leave the block and literal absent; an unclosed bracket
/// swallows the block (there is no way to tell content from literal).
fn split_segments(rest: &str) -> (&str, Option<&str>, Option<&str>) {
    let Some(open) = rest.find(BLOCK_OPEN) else {
        return (rest, None, None);
    };
    let id = &rest[..open];
    let after_open = &rest[open + 1..];
    match after_open.find(BLOCK_CLOSE) {
        Some(close) => (id, Some(&after_open[..close]), Some(&after_open[close + 1..])),
        None => (id, None, None),
    }
}

/// Scan the id segment left to right, filling sequence, receiver, prefix
/// and account.
///
/// Each segment keeps its marker character. The receiver segment exists only
/// when an `R` appears before the `L`; the sequence is whatever precedes the
/// first segment marker.
fn scan_id(id: &str, msg: &mut EventMessage) {
    let receiver_pos = id.find(RECEIVER_MARKER);
    let prefix_pos = id.find(PREFIX_MARKER);
    let account_pos = id.find(ACCOUNT_MARKER);

    if let (Some(r), Some(l)) = (receiver_pos, prefix_pos)
        && r < l
    {
        msg.sequence = id[..r].to_string();
        msg.receiver = Some(id[r..l].to_string());
    } else if let Some(l) = prefix_pos {
        msg.sequence = id[..l].to_string();
    }

    if let Some(l) = prefix_pos {
        let end = account_pos.filter(|&h| h > l).unwrap_or(id.len());
        msg.prefix = id[l..end].to_string();
    }

    if let Some(h) = account_pos {
        msg.account = id[h..].to_string();
    }
}

/// Decode the event code and address out of a data block.
///
/// The event data starts after the block's `|` separator and its `N` marker.
/// An `ri` subaddress between the marker and the code is skipped up to its
/// `/`. The first two characters of what remains are the code, the rest is
/// the address. Missing markers fall through to scanning the whole block,
/// so nonstandard blocks still yield a best-effort code.
fn decode_block(block: &str) -> (&str, &str) {
    let data = match block.find(DATA_SEPARATOR) {
        Some(sep) => &block[sep + 1..],
        None => block,
    };
    let mut event = match data.find(EVENT_MARKER) {
        Some(n) => &data[n + 1..],
        None => data,
    };
    if event.starts_with(SUBADDRESS_PREFIX)
        && let Some(slash) = event.find(SUBADDRESS_END)
    {
        event = &event[slash + 1..];
    }
    let code_end = event
        .char_indices()
        .nth(EVENT_CODE_LENGTH)
        .map_or(event.len(), |(i, _)| i);
    (&event[..code_end], &event[code_end..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_full_message() {
        let msg = MessageParser::parse(
            "\"SIA-DCS\"0123R0L0#1234[#1234|Nri1/BA05]_12:46:06,05-10-2025",
        );

        assert_eq!(msg.message_type, "SIA-DCS");
        assert_eq!(msg.sequence, "0123");
        assert_eq!(msg.receiver.as_deref(), Some("R0"));
        assert_eq!(msg.prefix, "L0");
        assert_eq!(msg.account, "#1234");
        assert_eq!(msg.data_block.as_deref(), Some("#1234|Nri1/BA05"));
        assert_eq!(msg.event_code.as_deref(), Some("BA"));
        assert_eq!(msg.event_address.as_deref(), Some("05"));
        assert_eq!(msg.timestamp_raw.as_deref(), Some("_12:46:06,05-10-2025"));
    }

    #[test]
    fn test_id_segment_example() {
        let msg = MessageParser::parse("\"SIA-DCS\"0123R0L0#1234[]");

        assert_eq!(msg.sequence, "0123");
        assert_eq!(msg.receiver.as_deref(), Some("R0"));
        assert_eq!(msg.prefix, "L0");
        assert_eq!(msg.account, "#1234");
    }

    #[test]
    fn test_id_without_receiver() {
        let msg = MessageParser::parse("\"SIA-DCS\"0042L0#9876[]");

        assert_eq!(msg.sequence, "0042");
        assert_eq!(msg.receiver, None);
        assert_eq!(msg.prefix, "L0");
        assert_eq!(msg.account, "#9876");
    }

    #[rstest]
    // Block with an ri subaddress before the code
    #[case("1234|Nri/AB5678", "AB", "5678")]
    // Block without a subaddress
    #[case("1234|NCD0099", "CD", "0099")]
    // Subaddress carrying a partition number
    #[case("#77|Nri2/FA01", "FA", "01")]
    fn test_block_decoding(
        #[case] block: &str,
        #[case] code: &str,
        #[case] address: &str,
    ) {
        let payload = format!("\"SIA-DCS\"0001L0#77[{block}]");
        let msg = MessageParser::parse(&payload);

        assert_eq!(msg.data_block.as_deref(), Some(block));
        assert_eq!(msg.event_code.as_deref(), Some(code));
        assert_eq!(msg.event_address.as_deref(), Some(address));
    }

    #[test]
    fn test_empty_block_is_absent() {
        let msg = MessageParser::parse("\"NULL\"0001L0#77[]");

        assert_eq!(msg.data_block, None);
        assert_eq!(msg.event_code, None);
        assert_eq!(msg.event_address, None);
    }

    #[test]
    fn test_missing_timestamp_is_absent() {
        let msg = MessageParser::parse("\"NULL\"0001L0#77[]");
        assert_eq!(msg.timestamp_raw, None);
    }

    #[test]
    fn test_short_event_data() {
        // Fewer than two characters after the markers: the whole remainder
        // becomes the code, the address is empty
        let msg = MessageParser::parse("\"SIA-DCS\"0001L0#77[#77|NB]");
        assert_eq!(msg.event_code.as_deref(), Some("B"));
        assert_eq!(msg.event_address.as_deref(), Some(""));
    }

    #[rstest]
    #[case("")] // nothing at all
    #[case("\"\"")] // empty type, empty id
    #[case("no quotes here")]
    fn test_degenerate_payloads_do_not_panic(#[case] payload: &str) {
        let msg = MessageParser::parse(payload);
        assert_eq!(msg.receiver, None);
        assert_eq!(msg.data_block, None);
    }

    #[test]
    fn test_id_without_any_markers() {
        let msg = MessageParser::parse("\"NULL\"9999[]");

        assert_eq!(msg.sequence, "");
        assert_eq!(msg.receiver, None);
        assert_eq!(msg.prefix, "");
        assert_eq!(msg.account, "");
    }

    #[test]
    fn test_unclosed_block_swallows_remainder() {
        let msg = MessageParser::parse("\"SIA-DCS\"0001L0#77[#77|NBA05");

        assert_eq!(msg.account, "#77");
        assert_eq!(msg.data_block, None);
        assert_eq!(msg.timestamp_raw, None);
    }

    #[test]
    fn test_prefix_runs_to_end_without_account() {
        let msg = MessageParser::parse("\"SIA-DCS\"0001L0[]");

        assert_eq!(msg.sequence, "0001");
        assert_eq!(msg.prefix, "L0");
        assert_eq!(msg.account, "");
    }

    #[test]
    fn test_type_token_with_single_quote() {
        let msg = MessageParser::parse("\"SIA-DCS0001L0#77[]");
        assert_eq!(msg.message_type, "");
        assert_eq!(msg.account, "#77");
    }
}
