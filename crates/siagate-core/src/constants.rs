//! Core constants for the SIA DC-09 receiver.
//!
//! This module defines all protocol-level constants used throughout the
//! siagate receiver. The values are derived from the DC-09 framing and
//! message grammar as spoken by the alarm panels this receiver supports;
//! modifying them will break protocol compatibility.
//!
//! # Frame Structure
//!
//! Every message travels inside a fixed outer envelope:
//!
//! ```text
//! <LF><CCCC><LLLL>"TYPE"SEQ[R..]L..#ACCT[data]_HH:MM:SS,MM-DD-YYYY<CR>
//!  ^    ^     ^   ^-------------- payload --------------------------^
//!  |    |     +-- payload length, 4 uppercase hex digits
//!  |    +-------- CRC-16/ARC of the payload, 4 uppercase hex digits
//!  +------------- frame marker (0x0A)
//! ```
//!
//! # Payload Grammar Markers
//!
//! | Marker | Purpose | Example |
//! |--------|---------|---------|
//! | `"` | Delimits the message type token | `"SIA-DCS"` |
//! | `R` | Starts the optional receiver segment of the id | `0123R0L0#1234` |
//! | `L` | Starts the line-prefix segment of the id | `L0` |
//! | `#` | Starts the account segment of the id | `#1234` |
//! | `[` / `]` | Delimit the data block | `[#1234|Nri1/BA05]` |
//! | `\|` | Separates account echo from event data in the block | |
//! | `N` | Introduces the event payload inside the block | |
//! | `/` | Ends an `ri` subaddress inside the event payload | |

// ============================================================================
// Frame Envelope
// ============================================================================

/// Frame marker byte opening every envelope (LF).
pub const FRAME_MARKER: u8 = 0x0A;

/// Frame terminator byte closing every envelope (CR).
pub const FRAME_TERMINATOR: u8 = 0x0D;

/// Width of the checksum and length fields, in hex digits.
pub const HEX_FIELD_WIDTH: usize = 4;

/// Envelope overhead in bytes: marker + checksum + length + terminator.
pub const FRAME_OVERHEAD: usize = 1 + HEX_FIELD_WIDTH + HEX_FIELD_WIDTH + 1;

// ============================================================================
// Payload Grammar Markers
// ============================================================================

/// Delimits the message type token at the start of the payload.
pub const TYPE_DELIMITER: char = '"';

/// Starts the optional receiver segment of the id.
pub const RECEIVER_MARKER: char = 'R';

/// Starts the line-prefix segment of the id.
pub const PREFIX_MARKER: char = 'L';

/// Starts the account segment of the id.
pub const ACCOUNT_MARKER: char = '#';

/// Opens the bracketed data block.
pub const BLOCK_OPEN: char = '[';

/// Closes the bracketed data block.
pub const BLOCK_CLOSE: char = ']';

/// Separates the account echo from the event data inside the block.
pub const DATA_SEPARATOR: char = '|';

/// Introduces the event payload inside the data block.
pub const EVENT_MARKER: char = 'N';

/// Prefix of an optional subaddress inside the event payload.
pub const SUBADDRESS_PREFIX: &str = "ri";

/// Terminates an `ri` subaddress inside the event payload.
pub const SUBADDRESS_END: char = '/';

/// Length of an event code, in characters.
pub const EVENT_CODE_LENGTH: usize = 2;

// ============================================================================
// Timestamps
// ============================================================================

/// chrono format string for the protocol time literal `_HH:MM:SS,MM-DD-YYYY`.
///
/// Panel timestamps are always interpreted in UTC; the receiver never applies
/// a local offset.
pub const TIMESTAMP_FORMAT: &str = "_%H:%M:%S,%m-%d-%Y";

// ============================================================================
// Validation Window
// ============================================================================

/// Default lower bound of the clock-difference window, in seconds.
///
/// A panel clock may lag the receiver by up to 20 seconds before the
/// message is rejected.
pub const DEFAULT_NEGATIVE_BOUND: i64 = -20;

/// Default upper bound of the clock-difference window, in seconds.
///
/// A panel clock may lead the receiver by up to 40 seconds before the
/// message is rejected.
pub const DEFAULT_POSITIVE_BOUND: i64 = 40;

// ============================================================================
// Network
// ============================================================================

/// Default TCP listening port for inbound panel connections.
pub const DEFAULT_PORT: u16 = 10025;
