//! Configuration for binkv
//!
//! Centralized client configuration with sensible defaults.

use std::time::Duration;

use crate::protocol::FeatureSet;

/// Environment variable overriding the server address
pub const ENV_ADDR: &str = "BINKV_ADDR";

/// Environment variable enabling packet dumps (any value)
pub const ENV_PACKET_DUMP: &str = "BINKV_PACKET_DUMP";

/// Main configuration for a client connection
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Server address (host:port)
    pub addr: String,

    /// Connect timeout (milliseconds, 0 = block)
    pub connect_timeout_ms: u64,

    /// Socket read timeout (milliseconds, 0 = block)
    pub read_timeout_ms: u64,

    /// Socket write timeout (milliseconds, 0 = block)
    pub write_timeout_ms: u64,

    /// Disable Nagle's algorithm on the socket
    pub tcp_nodelay: bool,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Identifier sent as the key of the hello command
    pub agent: String,

    /// Features negotiated when the connection is opened
    pub features: FeatureSet,

    /// Largest body length accepted from the wire
    pub max_body_length: u32,

    /// Upper bound on SASL continue rounds
    pub max_auth_rounds: usize,

    // -------------------------------------------------------------------------
    // Diagnostics
    // -------------------------------------------------------------------------
    /// Log a hex dump of every frame sent and received
    pub packet_dump: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:11210".to_string(),
            connect_timeout_ms: 0,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
            tcp_nodelay: true,
            agent: format!("binkv/{}", crate::VERSION),
            features: FeatureSet::empty(),
            max_body_length: 30 * 1024 * 1024, // 30 MB
            max_auth_rounds: 32,
            packet_dump: false,
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Default config with `BINKV_ADDR` / `BINKV_PACKET_DUMP` applied
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Builder seeded with this config, for layering explicit settings on top
    pub fn into_builder(self) -> ClientConfigBuilder {
        ClientConfigBuilder { config: self }
    }

    /// Apply environment overrides on top of this config
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(addr) = std::env::var(ENV_ADDR) {
            if !addr.is_empty() {
                self.addr = addr;
            }
        }
        if std::env::var_os(ENV_PACKET_DUMP).is_some() {
            self.packet_dump = true;
        }
        self
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        millis(self.write_timeout_ms)
    }
}

fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the server address
    pub fn addr(mut self, addr: impl Into<String>) -> Self {
        self.config.addr = addr.into();
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn tcp_nodelay(mut self, enabled: bool) -> Self {
        self.config.tcp_nodelay = enabled;
        self
    }

    /// Set the hello identifier
    pub fn agent(mut self, agent: impl Into<String>) -> Self {
        self.config.agent = agent.into();
        self
    }

    /// Set the features negotiated by `Connection::connect`
    pub fn features(mut self, features: FeatureSet) -> Self {
        self.config.features = features;
        self
    }

    pub fn max_body_length(mut self, len: u32) -> Self {
        self.config.max_body_length = len;
        self
    }

    pub fn max_auth_rounds(mut self, rounds: usize) -> Self {
        self.config.max_auth_rounds = rounds;
        self
    }

    pub fn packet_dump(mut self, enabled: bool) -> Self {
        self.config.packet_dump = enabled;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}
