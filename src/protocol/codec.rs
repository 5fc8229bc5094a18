//! Protocol codec
//!
//! Encoding of commands into request frames and the two-phase receive path.
//!
//! ## Wire Format
//!
//! ```text
//! ┌──────────────┬──────────┬─────────┬─────────────────────┐
//! │ Header (24)  │  Extras  │   Key   │        Value        │
//! └──────────────┴──────────┴─────────┴─────────────────────┘
//! ```
//!
//! All multi-byte header fields are big-endian on the wire. Nothing outside
//! this module sees wire order: callers get a host-order [`Header`] copy.

use crate::error::{BinkvError, Result};
use crate::network::Transport;

use super::command::Command;
use super::frame::{peek_body_length, Frame, Header, Magic, HEADER_SIZE};
use super::response::Response;

/// Largest extras block the 8-bit length field can describe
pub const MAX_EXTRAS_LENGTH: usize = u8::MAX as usize;

/// Largest key the 16-bit length field can describe
pub const MAX_KEY_LENGTH: usize = u16::MAX as usize;

// =============================================================================
// Encoding
// =============================================================================

/// Encode a command into a request frame
///
/// Format: header (24) + extras + key + value
pub fn encode_command(command: &Command) -> Result<Frame> {
    encode_frame(Magic::Request, command, command.vbucket)
}

/// Encode a response frame carrying `command`'s body sections.
///
/// The server side of an exchange; used by in-memory peers and tests.
pub fn encode_response(command: &Command, status: u16) -> Result<Frame> {
    encode_frame(Magic::Response, command, status)
}

fn encode_frame(magic: Magic, command: &Command, vbucket_or_status: u16) -> Result<Frame> {
    if command.extras.len() > MAX_EXTRAS_LENGTH {
        return Err(BinkvError::Encode(format!(
            "Extras too large: {} bytes (max {})",
            command.extras.len(),
            MAX_EXTRAS_LENGTH
        )));
    }
    if command.key.len() > MAX_KEY_LENGTH {
        return Err(BinkvError::Encode(format!(
            "Key too large: {} bytes (max {})",
            command.key.len(),
            MAX_KEY_LENGTH
        )));
    }

    let body_length = command.extras.len() + command.key.len() + command.value.len();
    let body_length = u32::try_from(body_length).map_err(|_| {
        BinkvError::Encode(format!("Body too large: {} bytes", body_length))
    })?;

    let header = Header {
        magic,
        opcode: command.opcode as u8,
        key_length: command.key.len() as u16,
        extras_length: command.extras.len() as u8,
        datatype: command.datatype,
        vbucket_or_status,
        body_length,
        opaque: command.opaque,
        cas: command.cas,
    };

    let mut frame = Frame::with_capacity(HEADER_SIZE + body_length as usize);
    let mut raw = Vec::with_capacity(HEADER_SIZE);
    header.encode(&mut raw);
    frame.append(&raw);
    frame.append(&command.extras);
    frame.append(&command.key);
    frame.append(&command.value);

    Ok(frame)
}

// =============================================================================
// Response Decoding
// =============================================================================

/// Decode a complete frame into a response
///
/// Validates the magic, the declared body length, and that key + extras fit
/// inside the body before any section is sliced.
pub fn decode_response(frame: Frame) -> Result<Response> {
    let header = frame.header()?;
    header.value_length()?;
    let body = frame.into_bytes().slice(HEADER_SIZE..);
    Ok(Response::new(header, body))
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one complete frame from a transport
///
/// Reads the fixed header, validates the magic, then reads exactly the
/// declared body length. Blocks until both reads complete or fail.
pub fn read_frame<T: Transport + ?Sized>(transport: &mut T, max_body_length: u32) -> Result<Frame> {
    let mut frame = Frame::with_capacity(HEADER_SIZE);
    let mut header = [0u8; HEADER_SIZE];
    transport.read_exact(&mut header)?;
    frame.append(&header);

    if Magic::from_u8(header[0]).is_none() {
        return Err(BinkvError::Protocol(format!(
            "Invalid magic received: 0x{:02x}",
            header[0]
        )));
    }

    let body_length = peek_body_length(&header);
    if body_length > max_body_length {
        return Err(BinkvError::Protocol(format!(
            "Body too large: {} bytes (max {})",
            body_length, max_body_length
        )));
    }

    if body_length > 0 {
        transport.read_exact(frame.grow(body_length as usize))?;
    }

    Ok(frame)
}

/// Read and decode one frame
pub fn read_response<T: Transport + ?Sized>(transport: &mut T, max_body_length: u32) -> Result<Response> {
    decode_response(read_frame(transport, max_body_length)?)
}

/// Write a frame to a transport
pub fn write_frame<T: Transport + ?Sized>(transport: &mut T, frame: &Frame) -> Result<()> {
    transport.send(frame.as_bytes())?;
    Ok(())
}

/// Encode and write a command
pub fn write_command<T: Transport + ?Sized>(transport: &mut T, command: &Command) -> Result<()> {
    write_frame(transport, &encode_command(command)?)
}

// =============================================================================
// Frame channel
// =============================================================================

/// A request/response channel that moves whole frames.
///
/// Multi-step exchanges (SASL) drive the channel through this trait so the
/// owner's checks and diagnostics apply to every frame.
pub trait FrameChannel {
    fn send_frame(&mut self, frame: &Frame) -> Result<()>;

    fn recv_frame(&mut self) -> Result<Frame>;

    /// Send a command and decode the reply, rejecting non-response frames
    fn round_trip(&mut self, command: &Command) -> Result<Response> {
        self.send_frame(&encode_command(command)?)?;
        let response = decode_response(self.recv_frame()?)?;
        response.ensure_response()?;
        Ok(response)
    }
}
