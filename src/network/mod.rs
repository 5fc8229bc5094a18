//! Network Module
//!
//! Byte-stream transports the protocol engine runs over.
//!
//! ## Contract
//! - `send` writes the whole buffer or fails
//! - `read_exact` fills the whole buffer or fails (premature close is
//!   `UnexpectedEof`)
//! - No framing or buffering decisions live here; timeouts do
//!
//! ## Implementations
//! - [`TcpTransport`]: blocking TCP socket with configured timeouts
//! - [`MemoryTransport`]: scripted in-memory peer

mod memory;
mod tcp;

pub use memory::MemoryTransport;
pub use tcp::TcpTransport;

use std::io;

/// A blocking, ordered byte stream to one server
pub trait Transport {
    /// Write all of `data`
    fn send(&mut self, data: &[u8]) -> io::Result<()>;

    /// Fill `buf` completely
    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()>;

    /// Tear down the channel and establish a fresh one to the same endpoint
    fn reconnect(&mut self) -> io::Result<()>;

    /// Open an independent channel with the same settings
    fn reopen(&self) -> io::Result<Self>
    where
        Self: Sized;

    /// Endpoint description for logs
    fn peer(&self) -> String;
}
