//! In-memory transport
//!
//! A scripted peer: frames queued with `push_*` are served to reads in
//! order, and everything the client sends is captured for inspection.

use std::collections::VecDeque;
use std::io;

use crate::error::Result;
use crate::protocol::{encode_response, read_frame, Command, Frame};

use super::Transport;

#[derive(Debug, Default)]
pub struct MemoryTransport {
    inbound: VecDeque<u8>,
    outbound: Vec<u8>,
    reconnects: usize,
    fail_reconnect: bool,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue raw bytes for the client to read
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.inbound.extend(bytes);
    }

    pub fn push_frame(&mut self, frame: &Frame) {
        self.push_bytes(frame.as_bytes());
    }

    /// Queue a response frame built from `command`'s sections
    pub fn push_response(&mut self, command: &Command, status: impl Into<u16>) -> Result<()> {
        let frame = encode_response(command, status.into())?;
        self.push_frame(&frame);
        Ok(())
    }

    /// Bytes queued but not yet read
    pub fn pending(&self) -> usize {
        self.inbound.len()
    }

    /// Everything written so far
    pub fn sent(&self) -> &[u8] {
        &self.outbound
    }

    /// Split the captured output back into frames
    pub fn sent_frames(&self) -> Result<Vec<Frame>> {
        let mut replay = MemoryTransport::new();
        replay.push_bytes(&self.outbound);

        let mut frames = Vec::new();
        while replay.pending() > 0 {
            frames.push(read_frame(&mut replay, u32::MAX)?);
        }
        Ok(frames)
    }

    pub fn clear_sent(&mut self) {
        self.outbound.clear();
    }

    /// Number of completed reconnects
    pub fn reconnects(&self) -> usize {
        self.reconnects
    }

    /// Make subsequent reconnects fail
    pub fn set_fail_reconnect(&mut self, fail: bool) {
        self.fail_reconnect = fail;
    }
}

impl Transport for MemoryTransport {
    fn send(&mut self, data: &[u8]) -> io::Result<()> {
        self.outbound.extend_from_slice(data);
        Ok(())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        if self.inbound.len() < buf.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "peer closed: wanted {} bytes, {} available",
                    buf.len(),
                    self.inbound.len()
                ),
            ));
        }
        let n = buf.len();
        for (slot, byte) in buf.iter_mut().zip(self.inbound.drain(..n)) {
            *slot = byte;
        }
        Ok(())
    }

    /// Drops unread input, as a fresh channel would
    fn reconnect(&mut self) -> io::Result<()> {
        if self.fail_reconnect {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "reconnect refused",
            ));
        }
        self.inbound.clear();
        self.reconnects += 1;
        Ok(())
    }

    fn reopen(&self) -> io::Result<Self> {
        Ok(MemoryTransport::new())
    }

    fn peer(&self) -> String {
        "memory".to_string()
    }
}
