//! Frame and header definitions
//!
//! A [`Frame`] owns the raw bytes of one wire message. A [`Header`] is a
//! host-order copy of the fixed 24-byte prefix, produced only once the frame
//! holds its complete body.

use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{BinkvError, Result};

/// Fixed header size shared by requests and responses
pub const HEADER_SIZE: usize = 24;

/// Magic byte for request frames
pub const REQUEST_MAGIC: u8 = 0x80;

/// Magic byte for response frames
pub const RESPONSE_MAGIC: u8 = 0x81;

/// Byte offset of the total body length field
pub const BODY_LENGTH_OFFSET: usize = 8;

/// Leading byte of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Magic {
    Request = REQUEST_MAGIC,
    Response = RESPONSE_MAGIC,
}

impl Magic {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            REQUEST_MAGIC => Some(Magic::Request),
            RESPONSE_MAGIC => Some(Magic::Response),
            _ => None,
        }
    }
}

/// Decoded header in host byte order.
///
/// ```text
/// Byte/     0       |       1       |       2       |       3       |
///   +---------------+---------------+---------------+---------------+
///  0| Magic         | Opcode        | Key length                    |
///   +---------------+---------------+---------------+---------------+
///  4| Extras length | Data type     | vbucket id / status           |
///   +---------------+---------------+---------------+---------------+
///  8| Total body length                                             |
///   +---------------+---------------+---------------+---------------+
/// 12| Opaque                                                        |
///   +---------------+---------------+---------------+---------------+
/// 16| CAS                                                           |
///   |                                                               |
///   +---------------+---------------+---------------+---------------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub magic: Magic,
    pub opcode: u8,
    pub key_length: u16,
    pub extras_length: u8,
    pub datatype: u8,
    /// vbucket for requests, status for responses
    pub vbucket_or_status: u16,
    pub body_length: u32,
    pub opaque: u32,
    pub cas: u64,
}

impl Header {
    /// Parse the fixed header from the start of `data`.
    ///
    /// Fails with a protocol error if fewer than `HEADER_SIZE` bytes are
    /// available or the magic byte is not recognized.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(BinkvError::Protocol(format!(
                "Incomplete header: expected {} bytes, got {}",
                HEADER_SIZE,
                data.len()
            )));
        }

        let mut buf = &data[..HEADER_SIZE];
        let magic_byte = buf.get_u8();
        let magic = Magic::from_u8(magic_byte).ok_or_else(|| {
            BinkvError::Protocol(format!("Invalid magic received: 0x{:02x}", magic_byte))
        })?;

        Ok(Self {
            magic,
            opcode: buf.get_u8(),
            key_length: buf.get_u16(),
            extras_length: buf.get_u8(),
            datatype: buf.get_u8(),
            vbucket_or_status: buf.get_u16(),
            body_length: buf.get_u32(),
            opaque: buf.get_u32(),
            cas: buf.get_u64(),
        })
    }

    /// Write the header in network byte order
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(self.magic as u8);
        buf.put_u8(self.opcode);
        buf.put_u16(self.key_length);
        buf.put_u8(self.extras_length);
        buf.put_u8(self.datatype);
        buf.put_u16(self.vbucket_or_status);
        buf.put_u32(self.body_length);
        buf.put_u32(self.opaque);
        buf.put_u64(self.cas);
    }

    /// Response status; `None` for request frames
    pub fn status(&self) -> Option<u16> {
        (self.magic == Magic::Response).then_some(self.vbucket_or_status)
    }

    /// Target vbucket; `None` for response frames
    pub fn vbucket(&self) -> Option<u16> {
        (self.magic == Magic::Request).then_some(self.vbucket_or_status)
    }

    /// Length of the value section (body minus key and extras).
    pub fn value_length(&self) -> Result<usize> {
        let prefix = self.key_length as u32 + self.extras_length as u32;
        self.body_length
            .checked_sub(prefix)
            .map(|len| len as usize)
            .ok_or_else(|| {
                BinkvError::Protocol(format!(
                    "Body length {} shorter than key ({}) + extras ({})",
                    self.body_length, self.key_length, self.extras_length
                ))
            })
    }
}

/// Read the big-endian body length without interpreting anything else.
///
/// The field sits at the same offset in request and response headers, so the
/// second read phase can be sized before the magic is known to be valid.
pub fn peek_body_length(header: &[u8; HEADER_SIZE]) -> u32 {
    let mut field = &header[BODY_LENGTH_OFFSET..BODY_LENGTH_OFFSET + 4];
    field.get_u32()
}

/// One wire message: header + extras + key + value
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Frame {
    payload: BytesMut,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            payload: BytesMut::with_capacity(capacity),
        }
    }

    /// Wrap bytes already laid out as a frame
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            payload: BytesMut::from(bytes),
        }
    }

    /// Drop all content, keeping the allocation
    pub fn reset(&mut self) {
        self.payload.clear();
    }

    pub fn append(&mut self, data: &[u8]) {
        self.payload.extend_from_slice(data);
    }

    /// Extend by `n` zeroed bytes and return the new tail for filling.
    ///
    /// May reallocate; any slice taken from the frame before this call is
    /// invalidated, which the borrow checker enforces.
    pub fn grow(&mut self, n: usize) -> &mut [u8] {
        let start = self.payload.len();
        self.payload.resize(start + n, 0);
        &mut self.payload[start..]
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.payload
    }

    pub fn into_bytes(self) -> Bytes {
        self.payload.freeze()
    }

    /// Parse the header and check it against the buffer length.
    ///
    /// The declared body length must equal `len() - HEADER_SIZE`.
    pub fn header(&self) -> Result<Header> {
        let header = Header::parse(&self.payload)?;
        let actual = self.payload.len() - HEADER_SIZE;
        if header.body_length as usize != actual {
            return Err(BinkvError::Protocol(format!(
                "Body length mismatch: header declares {}, frame holds {}",
                header.body_length, actual
            )));
        }
        Ok(header)
    }

    /// Hex rendering of the frame for packet dumps
    pub fn hex_dump(&self) -> String {
        let mut out = String::with_capacity(self.payload.len() * 3);
        for (idx, chunk) in self.payload.chunks(8).enumerate() {
            if idx > 0 {
                out.push('\n');
            }
            out.push_str(&format!("{:6}:", idx * 8));
            for byte in chunk {
                out.push_str(&format!(" {:02x}", byte));
            }
        }
        out
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("len", &self.payload.len())
            .field("header", &Header::parse(&self.payload).ok())
            .finish()
    }
}
