//! ACK/NAK reply construction.
//!
//! Exactly one reply is produced per inbound message, and the reply body
//! grammar is bit-exact:
//!
//! - accept: `"ACK"<sequence><receiver><prefix><account>[]`
//! - reject: `"NAK"0000R0L0[]<receipt time literal>`
//!
//! The ACK echoes the id segments as extracted from the inbound message
//! (markers included, absent receiver contributes nothing). The NAK fields
//! `0000`, `R0` and `L0` are fixed placeholders mandated by the protocol,
//! never echoes of the inbound id; only the receipt time varies.

use serde::{Deserialize, Serialize};
use siagate_core::{SiaTimestamp, Verdict};

use crate::{frame::Frame, message::EventMessage};

/// NAK body prefix with its fixed placeholder id and empty data block.
const NAK_PREFIX: &str = "\"NAK\"0000R0L0[]";

/// Reply to one inbound event message.
///
/// Constructed once per message and immediately framed; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseMessage {
    /// Positive acknowledgement echoing the panel's id segments.
    Ack {
        sequence: String,
        receiver: Option<String>,
        prefix: String,
        account: String,
    },
    /// Negative acknowledgement carrying the receiver's own clock, so the
    /// panel can resynchronize and retry.
    Nak { receipt: SiaTimestamp },
}

impl ResponseMessage {
    /// Build the reply for a validated message.
    #[must_use]
    pub fn for_event(message: &EventMessage, verdict: Verdict, receipt: SiaTimestamp) -> Self {
        match verdict {
            Verdict::Accept => ResponseMessage::Ack {
                sequence: message.sequence.clone(),
                receiver: message.receiver.clone(),
                prefix: message.prefix.clone(),
                account: message.account.clone(),
            },
            Verdict::Reject => ResponseMessage::Nak { receipt },
        }
    }

    /// Render the reply body.
    #[must_use]
    pub fn body(&self) -> String {
        match self {
            ResponseMessage::Ack {
                sequence,
                receiver,
                prefix,
                account,
            } => format!(
                "\"ACK\"{}{}{}{}[]",
                sequence,
                receiver.as_deref().unwrap_or(""),
                prefix,
                account
            ),
            ResponseMessage::Nak { receipt } => {
                format!("{NAK_PREFIX}{}", receipt.format())
            }
        }
    }

    /// Frame the reply for transmission.
    #[must_use]
    pub fn to_frame(&self) -> Frame {
        Frame::new(self.body())
    }
}

impl From<ResponseMessage> for Frame {
    fn from(response: ResponseMessage) -> Self {
        response.to_frame()
    }
}
