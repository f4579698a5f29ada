//! Tokio codec for DC-09 frame handling.
//!
//! `SiaCodec` integrates the protocol with async TCP streams via
//! `tokio_util::codec::Framed`. It implements:
//! - [`Decoder`]: splits the inbound stream at the `\r` terminator, strips
//!   the envelope and best-effort-parses the payload
//! - [`Encoder<ResponseMessage>`]: frames an ACK/NAK reply
//!
//! # Architecture
//!
//! ```text
//! TCP stream -> Decoder -> InboundEvent (payload + parsed message)
//! ResponseMessage -> Encoder -> TCP stream (LF/CRC/LEN framing)
//! ```
//!
//! Decoding never fails on message content: malformed payloads come out as
//! an [`InboundEvent`] with absent fields, so every inbound block still
//! receives its deterministic reply. The only decode errors are transport
//! level: a connection that streams more than [`DEFAULT_MAX_FRAME_SIZE`]
//! bytes without ever sending a terminator is cut off rather than buffered
//! without bound.
//!
//! A trailing block with no terminator is flushed at end of stream
//! (`decode_eof`), so a panel that closes the connection immediately after
//! its event block is still heard.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use siagate_core::{Error, Result, constants::FRAME_TERMINATOR};

use crate::{
    frame::Frame,
    message::EventMessage,
    parser::MessageParser,
    response::ResponseMessage,
};

/// Default maximum inbound frame size in bytes (8 KB).
///
/// Event blocks are a few hundred bytes at most; the limit exists to bound
/// memory for connections that never send a terminator.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 8 * 1024;

/// One decoded inbound block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// The unframed payload text (empty when the block carried none).
    pub payload: String,

    /// Best-effort parse of the payload.
    pub message: EventMessage,
}

/// Tokio codec for DC-09 frames.
#[derive(Debug)]
pub struct SiaCodec {
    max_frame_size: usize,
}

impl SiaCodec {
    /// Create a codec with the default frame size limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Create a codec with a custom frame size limit.
    #[must_use]
    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }

    /// Get the current maximum frame size.
    #[must_use]
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    /// Turn one raw chunk (terminator included, if any) into an event.
    fn decode_chunk(chunk: &[u8]) -> InboundEvent {
        let raw = String::from_utf8_lossy(chunk);
        match Frame::strip(&raw) {
            Some(payload) => InboundEvent {
                message: MessageParser::parse(payload),
                payload: payload.to_string(),
            },
            // No type delimiter anywhere: nothing to extract, but the block
            // still deserves its deterministic reply downstream.
            None => InboundEvent {
                payload: String::new(),
                message: EventMessage::default(),
            },
        }
    }
}

impl Default for SiaCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for SiaCodec {
    type Item = InboundEvent;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        match src.iter().position(|&b| b == FRAME_TERMINATOR) {
            Some(end) => {
                let chunk = src.split_to(end + 1);
                Ok(Some(Self::decode_chunk(&chunk)))
            }
            None if src.len() > self.max_frame_size => Err(Error::FrameTooLarge {
                size: src.len(),
                max_size: self.max_frame_size,
            }),
            None => Ok(None),
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if let Some(event) = self.decode(src)? {
            return Ok(Some(event));
        }
        if src.is_empty() {
            return Ok(None);
        }
        // Unterminated trailing block: flush it best-effort
        let chunk = src.split_to(src.len());
        Ok(Some(Self::decode_chunk(&chunk)))
    }
}

impl Encoder<ResponseMessage> for SiaCodec {
    type Error = Error;

    fn encode(&mut self, item: ResponseMessage, dst: &mut BytesMut) -> Result<()> {
        dst.extend_from_slice(&item.to_frame().encode());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siagate_core::{SiaTimestamp, Verdict};

    use crate::response::ResponseMessage;

    fn framed(body: &str) -> BytesMut {
        BytesMut::from(&Frame::new(body).encode()[..])
    }

    #[test]
    fn test_decode_complete_frame() {
        let mut codec = SiaCodec::new();
        let mut buffer = framed("\"SIA-DCS\"0123R0L0#1234[#1234|NBA05]");

        let event = codec.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(event.message.sequence, "0123");
        assert_eq!(event.message.event_code.as_deref(), Some("BA"));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_decode_partial_frame_waits() {
        let mut codec = SiaCodec::new();
        let mut buffer = BytesMut::from(&b"\n12340010\"SIA-DCS\"01"[..]);

        assert!(codec.decode(&mut buffer).unwrap().is_none());
        assert_eq!(buffer.len(), 20); // nothing consumed
    }

    #[test]
    fn test_decode_two_frames_in_one_read() {
        let mut codec = SiaCodec::new();
        let mut buffer = framed("\"SIA-DCS\"0001L0#11[]");
        buffer.extend_from_slice(&Frame::new("\"SIA-DCS\"0002L0#22[]").encode());

        let first = codec.decode(&mut buffer).unwrap().unwrap();
        let second = codec.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(first.message.sequence, "0001");
        assert_eq!(second.message.sequence, "0002");
        assert!(codec.decode(&mut buffer).unwrap().is_none());
    }

    #[test]
    fn test_decode_frame_without_quote_yields_empty_event() {
        let mut codec = SiaCodec::new();
        let mut buffer = BytesMut::from(&b"\n0000000Agarbage\r"[..]);

        let event = codec.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(event.payload, "");
        assert_eq!(event.message, EventMessage::default());
    }

    #[test]
    fn test_decode_unterminated_stream_hits_size_limit() {
        let mut codec = SiaCodec::with_max_frame_size(16);
        let mut buffer = BytesMut::from(&b"\"SIA-DCS\"0001L0#11[]..."[..]);

        let result = codec.decode(&mut buffer);
        assert!(matches!(result, Err(Error::FrameTooLarge { .. })));
    }

    #[test]
    fn test_decode_eof_flushes_unterminated_block() {
        let mut codec = SiaCodec::new();
        // Envelope with the trailing \r cut off by connection close
        let mut buffer = BytesMut::from(&b"\n12340014\"SIA-DCS\"0001L0#11[]"[..]);

        let event = codec.decode_eof(&mut buffer).unwrap().unwrap();
        assert_eq!(event.message.sequence, "0001");
        assert_eq!(event.message.account, "#11");
        assert!(codec.decode_eof(&mut buffer).unwrap().is_none());
    }

    #[test]
    fn test_encode_ack_reply() {
        let mut codec = SiaCodec::new();
        let mut buffer = BytesMut::new();
        let reply = ResponseMessage::Ack {
            sequence: "0123".to_string(),
            receiver: Some("R0".to_string()),
            prefix: "L0".to_string(),
            account: "#1234".to_string(),
        };

        codec.encode(reply, &mut buffer).unwrap();
        let text = String::from_utf8(buffer.to_vec()).unwrap();
        assert!(text.ends_with("\"ACK\"0123R0L0#1234[]\r"));
        assert_eq!(buffer[0], 0x0A);
    }

    #[test]
    fn test_encode_nak_reply() {
        let mut codec = SiaCodec::new();
        let mut buffer = BytesMut::new();
        let receipt = SiaTimestamp::parse("_12:46:06,05-10-2025").unwrap();
        let reply = ResponseMessage::Nak { receipt };

        codec.encode(reply, &mut buffer).unwrap();
        let text = String::from_utf8(buffer.to_vec()).unwrap();
        assert!(text.contains("\"NAK\"0000R0L0[]_12:46:06,05-10-2025"));
    }

    #[test]
    fn test_one_reply_per_inbound_frame() {
        let mut codec = SiaCodec::new();
        let mut inbound = framed("\"SIA-DCS\"0001L0#11[]");
        let mut outbound = BytesMut::new();

        let event = codec.decode(&mut inbound).unwrap().unwrap();
        let receipt = SiaTimestamp::now();
        let reply = ResponseMessage::for_event(&event.message, Verdict::Accept, receipt);
        codec.encode(reply, &mut outbound).unwrap();

        // exactly one framed reply
        assert_eq!(
            outbound.iter().filter(|&&b| b == FRAME_TERMINATOR).count(),
            1
        );
    }
}
