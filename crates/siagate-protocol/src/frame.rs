//! Outer frame envelope for DC-09 messages.
//!
//! A frame wraps a payload in a fixed envelope:
//!
//! ```text
//! <LF><CCCC><LLLL>payload<CR>
//! ```
//!
//! where `CCCC` is the CRC-16/ARC of the payload and `LLLL` its byte length,
//! both as 4 uppercase hex digits. Checksum and length are always recomputed
//! from the payload when a frame is emitted; the values embedded in an
//! inbound frame are never trusted and never verified. Panels in the field
//! rely on the transport delivering the frame intact, and rejecting frames
//! on a header mismatch would change accept/reject behavior for deployed
//! equipment, so the inbound header fields are skipped, not checked.
//!
//! # Example
//!
//! ```
//! use siagate_protocol::Frame;
//!
//! let frame = Frame::new("\"ACK\"0123R0L0#1234[]");
//! let bytes = frame.encode();
//! assert_eq!(bytes[0], 0x0A);
//! assert_eq!(bytes[bytes.len() - 1], 0x0D);
//!
//! let raw = String::from_utf8(bytes.to_vec()).unwrap();
//! assert_eq!(Frame::strip(&raw), Some("\"ACK\"0123R0L0#1234[]"));
//! ```
use bytes::{BufMut, Bytes, BytesMut};
use siagate_core::constants::{
    FRAME_MARKER, FRAME_OVERHEAD, FRAME_TERMINATOR, TYPE_DELIMITER,
};
use std::fmt;

use crate::crc::{checksum, hex4};

/// A framed protocol payload.
///
/// Owns the payload text between the length field and the terminator.
/// The envelope fields are derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    body: String,
}

impl Frame {
    /// Create a frame around a payload.
    pub fn new(body: impl Into<String>) -> Self {
        Frame { body: body.into() }
    }

    /// The payload text.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// CRC-16/ARC of the payload as the 4-digit frame field.
    #[must_use]
    pub fn checksum_hex(&self) -> String {
        hex4(usize::from(checksum(self.body.as_bytes())))
    }

    /// Byte length of the payload as the 4-digit frame field.
    #[must_use]
    pub fn length_hex(&self) -> String {
        hex4(self.body.len())
    }

    /// Assemble the wire form: `\n` + checksum + length + payload + `\r`.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.body.len() + FRAME_OVERHEAD);
        buf.put_u8(FRAME_MARKER);
        buf.put_slice(self.checksum_hex().as_bytes());
        buf.put_slice(self.length_hex().as_bytes());
        buf.put_slice(self.body.as_bytes());
        buf.put_u8(FRAME_TERMINATOR);
        buf.freeze()
    }

    /// Extract the payload from a raw inbound frame.
    ///
    /// The payload begins at the first `"` (skipping the marker, checksum and
    /// length fields without interpreting them) and ends before the final
    /// `\r`. A chunk with no terminator yields the rest of the input, so a
    /// block cut short by connection close still parses best-effort.
    ///
    /// Returns `None` when the chunk contains no `"` at all; there is no
    /// payload to recover from such a frame.
    #[must_use]
    pub fn strip(raw: &str) -> Option<&str> {
        let start = raw.find(TYPE_DELIMITER)?;
        let tail = &raw[start..];
        let end = tail.rfind(char::from(FRAME_TERMINATOR)).unwrap_or(tail.len());
        Some(&tail[..end])
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Frame[crc={}, len={}, body='{}']",
            self.checksum_hex(),
            self.length_hex(),
            self.body
        )
    }
}
