//! The parsed-and-validated event handed to the dispatch boundary.

use serde::{Deserialize, Serialize};
use siagate_core::Verdict;

use crate::message::{EventMessage, MessageTimestamps};

/// One inbound event, fully decoded and classified.
///
/// This is the codec's only output besides the wire reply. Dispatch is
/// fire-and-forget with respect to the protocol path: by the time a record
/// reaches a sink, the ACK or NAK it corresponds to has already been
/// written back to the panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Parsed message fields.
    pub message: EventMessage,

    /// Panel/receipt clocks and their difference.
    pub timestamps: MessageTimestamps,

    /// Accept/reject classification that drove the reply.
    pub verdict: Verdict,

    /// The unframed payload exactly as received, for raw sinks and audit.
    pub raw: String,
}

impl EventRecord {
    /// Account identifier without its `#` marker, for sinks that store it
    /// as a bare key.
    #[must_use]
    pub fn account_number(&self) -> &str {
        self.message.account.strip_prefix('#').unwrap_or(&self.message.account)
    }
}
