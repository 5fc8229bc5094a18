//! Response definitions
//!
//! A received frame after header validation. Ephemeral: each operation
//! consumes its response immediately.

use bytes::Bytes;

use crate::error::{BinkvError, Result};

use super::frame::{Header, Magic};
use super::status::{check_status, Status};

/// A decoded frame: host-order header plus the raw body
#[derive(Debug, Clone)]
pub struct Response {
    header: Header,
    body: Bytes,
}

impl Response {
    /// Caller guarantees `body.len() == header.body_length` and that key +
    /// extras fit inside it.
    pub(crate) fn new(header: Header, body: Bytes) -> Self {
        Self { header, body }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Raw status field. Only meaningful once `ensure_response` passed.
    pub fn status_code(&self) -> u16 {
        self.header.vbucket_or_status
    }

    pub fn status(&self) -> Option<Status> {
        Status::from_u16(self.status_code())
    }

    pub fn is_response(&self) -> bool {
        self.header.magic == Magic::Response
    }

    /// A success status on a response-magic frame
    pub fn is_success(&self) -> bool {
        self.is_response() && self.status_code() == Status::Success as u16
    }

    /// Reject frames that do not carry the response magic
    pub fn ensure_response(&self) -> Result<()> {
        if self.is_response() {
            return Ok(());
        }
        Err(BinkvError::Protocol(format!(
            "Expected response frame, got request magic (opcode 0x{:02x})",
            self.header.opcode
        )))
    }

    pub fn cas(&self) -> u64 {
        self.header.cas
    }

    pub fn datatype(&self) -> u8 {
        self.header.datatype
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn extras(&self) -> &[u8] {
        &self.body[..self.header.extras_length as usize]
    }

    pub fn key(&self) -> &[u8] {
        let start = self.header.extras_length as usize;
        &self.body[start..start + self.header.key_length as usize]
    }

    pub fn value(&self) -> &[u8] {
        let start = self.header.extras_length as usize + self.header.key_length as usize;
        &self.body[start..]
    }

    /// Map a non-success status to an error, prefixed with `context`
    pub fn check(&self, context: impl Into<String>) -> Result<()> {
        self.ensure_response()?;
        check_status(self.status_code(), context)?;
        Ok(())
    }
}
