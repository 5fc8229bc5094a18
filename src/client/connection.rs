//! Client connection
//!
//! One connection serves one outstanding request at a time: a command is
//! sent, then the call blocks until the complete response frame is read.
//! There is no internal locking; use [`Connection::try_clone`] to get an
//! independent channel for concurrent work.

use std::fmt;

use crate::config::ClientConfig;
use crate::error::{BinkvError, Result};
use crate::network::{TcpTransport, Transport};
use crate::protocol::{decode_response, read_frame, write_frame, Command, Feature, FeatureSet, Frame, FrameChannel, Response};

/// A connection to one server
pub struct Connection<T: Transport = TcpTransport> {
    /// Byte stream to the server
    transport: T,

    /// Settings the connection was opened with
    config: ClientConfig,

    /// Features the server enabled in the last successful hello
    features: FeatureSet,

    /// Space-separated mechanism list from the last hello
    sasl_mechanisms: String,

    /// Set when a forced reconnect failed
    invalidated: bool,
}

impl Connection<TcpTransport> {
    /// Open a TCP connection to `config.addr`.
    ///
    /// A non-empty `config.features` is negotiated before returning.
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let transport = TcpTransport::connect(&config)?;
        let mut conn = Self::with_transport(transport, config);
        if !conn.config.features.is_empty() {
            let agent = conn.config.agent.clone();
            let requested = conn.config.features;
            conn.negotiate_features(&agent, requested)?;
        }
        Ok(conn)
    }
}

impl<T: Transport> Connection<T> {
    /// Run the protocol over an existing transport
    pub fn with_transport(transport: T, config: ClientConfig) -> Self {
        Self {
            transport,
            config,
            features: FeatureSet::empty(),
            sasl_mechanisms: String::new(),
            invalidated: false,
        }
    }

    /// Open an independent channel to the same endpoint.
    ///
    /// The clone starts unauthenticated with no negotiated features.
    pub fn try_clone(&self) -> Result<Self> {
        let transport = self.transport.reopen()?;
        Ok(Self::with_transport(transport, self.config.clone()))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Features currently enabled on the server side of this channel
    pub fn features(&self) -> FeatureSet {
        self.features
    }

    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.contains(feature)
    }

    pub(crate) fn set_features(&mut self, features: FeatureSet) {
        self.features = features;
    }

    /// Mechanisms advertised by the server during `hello`
    pub fn sasl_mechanisms(&self) -> &str {
        &self.sasl_mechanisms
    }

    pub(crate) fn set_sasl_mechanisms(&mut self, mechanisms: String) {
        self.sasl_mechanisms = mechanisms;
    }

    pub fn is_invalidated(&self) -> bool {
        self.invalidated
    }

    // =========================================================================
    // Frame I/O
    // =========================================================================

    /// Write one frame
    pub fn send_frame(&mut self, frame: &Frame) -> Result<()> {
        self.ensure_usable()?;
        if self.config.packet_dump {
            tracing::debug!(target: "binkv::packet", "send {:?}\n{}", frame, frame.hex_dump());
        }
        write_frame(&mut self.transport, frame)
    }

    /// Read one complete frame (two-phase: header, then body)
    pub fn recv_frame(&mut self) -> Result<Frame> {
        self.ensure_usable()?;
        let frame = read_frame(&mut self.transport, self.config.max_body_length)?;
        if self.config.packet_dump {
            tracing::debug!(target: "binkv::packet", "recv {:?}\n{}", frame, frame.hex_dump());
        }
        Ok(frame)
    }

    /// Send a command and decode its response, whatever the status
    pub fn execute(&mut self, command: &Command) -> Result<Response> {
        tracing::trace!(
            "{} key={} extras={} value={}",
            command.opcode.name(),
            String::from_utf8_lossy(&command.key),
            command.extras.len(),
            command.value.len()
        );
        let frame = command.encode()?;
        self.send_frame(&frame)?;
        decode_response(self.recv_frame()?)
    }

    /// Send a command and fail on any non-success status
    pub fn execute_checked(&mut self, command: &Command, context: impl Into<String>) -> Result<Response> {
        let response = self.execute(command)?;
        response.check(context)?;
        Ok(response)
    }

    // =========================================================================
    // Channel lifecycle
    // =========================================================================

    /// Tear down and re-establish the channel.
    ///
    /// Negotiated features and mechanisms belong to the old channel and are
    /// cleared.
    pub fn reconnect(&mut self) -> Result<()> {
        self.features = FeatureSet::empty();
        self.sasl_mechanisms.clear();
        match self.transport.reconnect() {
            Ok(()) => {
                self.invalidated = false;
                Ok(())
            }
            Err(e) => {
                self.invalidated = true;
                Err(e.into())
            }
        }
    }

    /// Forced reconnect after the channel state became untrustworthy
    pub(crate) fn invalidate(&mut self, reason: &BinkvError) {
        tracing::warn!(
            "Invalidating connection to {}: {}",
            self.transport.peer(),
            reason
        );
        if let Err(e) = self.reconnect() {
            tracing::warn!("Reconnect to {} failed: {}", self.transport.peer(), e);
        }
    }

    pub(crate) fn ensure_usable(&self) -> Result<()> {
        if self.invalidated {
            Err(BinkvError::ConnectionInvalidated)
        } else {
            Ok(())
        }
    }
}

impl<T: Transport> FrameChannel for Connection<T> {
    fn send_frame(&mut self, frame: &Frame) -> Result<()> {
        Connection::<T>::send_frame(self, frame)
    }

    fn recv_frame(&mut self) -> Result<Frame> {
        Connection::<T>::recv_frame(self)
    }
}

impl<T: Transport> fmt::Debug for Connection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("peer", &self.transport.peer())
            .field("features", &self.features)
            .field("invalidated", &self.invalidated)
            .finish()
    }
}

impl<T: Transport> fmt::Display for Connection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "binkv connection {}", self.transport.peer())
    }
}
