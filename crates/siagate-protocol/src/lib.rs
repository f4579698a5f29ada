pub mod codec;
pub mod crc;
pub mod frame;
pub mod message;
pub mod parser;
pub mod record;
pub mod response;
pub mod validation;

pub use codec::{DEFAULT_MAX_FRAME_SIZE, InboundEvent, SiaCodec};
pub use crc::{checksum, checksum_hex, hex4};
pub use frame::Frame;
pub use message::{EventMessage, MessageTimestamps};
pub use parser::MessageParser;
pub use record::EventRecord;
pub use response::ResponseMessage;
pub use validation::{validate, validate_timestamps};
