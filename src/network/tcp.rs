//! TCP Transport
//!
//! Blocking socket transport used by real connections.

use std::io::{self, BufReader, BufWriter, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};

use crate::config::ClientConfig;
use crate::error::{BinkvError, Result};

use super::Transport;

/// Transport over a single TCP connection
pub struct TcpTransport {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Settings reused by reconnect/reopen
    config: ClientConfig,

    /// Peer address for logging
    peer_addr: String,
}

impl TcpTransport {
    /// Connect to `config.addr`
    ///
    /// Tries every resolved address in turn and applies the configured
    /// timeouts and nodelay setting.
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        let addrs = config
            .addr
            .to_socket_addrs()
            .map_err(|e| BinkvError::Config(format!("Invalid address {}: {}", config.addr, e)))?;

        let mut last_err = None;
        for addr in addrs {
            let attempt = match config.connect_timeout() {
                Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
                None => TcpStream::connect(addr),
            };
            match attempt {
                Ok(stream) => return Self::from_stream(stream, config.clone()),
                Err(e) => {
                    tracing::debug!("Connect to {} failed: {}", addr, e);
                    last_err = Some(e);
                }
            }
        }

        Err(match last_err {
            Some(e) => BinkvError::Io(e),
            None => BinkvError::Config(format!("Address {} resolved to nothing", config.addr)),
        })
    }

    /// Wrap an already connected stream
    pub fn from_stream(stream: TcpStream, config: ClientConfig) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| config.addr.clone());

        stream.set_nodelay(config.tcp_nodelay)?;
        stream.set_read_timeout(config.read_timeout())?;
        stream.set_write_timeout(config.write_timeout())?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;

        tracing::debug!("Connected to {}", peer_addr);

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
            config,
            peer_addr,
        })
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

impl Transport for TcpTransport {
    fn send(&mut self, data: &[u8]) -> io::Result<()> {
        self.writer.write_all(data)?;
        self.writer.flush()
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.reader.read_exact(buf)
    }

    fn reconnect(&mut self) -> io::Result<()> {
        tracing::debug!("Reconnecting to {}", self.config.addr);
        let fresh = Self::connect(&self.config).map_err(into_io)?;
        *self = fresh;
        Ok(())
    }

    fn reopen(&self) -> io::Result<Self> {
        Self::connect(&self.config).map_err(into_io)
    }

    fn peer(&self) -> String {
        self.peer_addr.clone()
    }
}

fn into_io(err: BinkvError) -> io::Error {
    match err {
        BinkvError::Io(e) => e,
        other => io::Error::new(io::ErrorKind::Other, other.to_string()),
    }
}
