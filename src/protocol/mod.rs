//! Protocol Module
//!
//! Defines the binary wire protocol spoken with the server.
//!
//! ## Frame Format
//! ```text
//! ┌──────────────┬──────────┬─────────┬─────────────────────┐
//! │ Header (24)  │  Extras  │   Key   │        Value        │
//! └──────────────┴──────────┴─────────┴─────────────────────┘
//! ```
//!
//! ### Magic
//! - 0x80: request
//! - 0x81: response
//!
//! ### Receive Path
//! Read the 24-byte header, validate the magic, then read exactly the
//! declared body length. The body length field sits at the same offset in
//! both request and response headers.

mod codec;
mod command;
mod feature;
mod frame;
mod response;
mod status;

pub use codec::{
    decode_response, encode_command, encode_response, read_frame, read_response, write_command, write_frame,
    FrameChannel, MAX_EXTRAS_LENGTH, MAX_KEY_LENGTH,
};
pub use command::{Command, Opcode, DCP_OPEN_PRODUCER, DEFAULT_OPAQUE};
pub use feature::{decode_features, encode_features, Feature, FeatureSet};
pub use frame::{peek_body_length, Frame, Header, Magic, HEADER_SIZE, REQUEST_MAGIC, RESPONSE_MAGIC};
pub use response::Response;
pub use status::{check_status, status_text, Status, StatusError};
