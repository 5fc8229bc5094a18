//! Error types for binkv
//!
//! Provides a unified error type for all client operations.
//!
//! ## Taxonomy
//! - `Io`: transport failures, never retried internally
//! - `Protocol` / `Encode`: framing violations and oversized fields
//! - `Status`: non-success server status, classified by [`StatusError`]
//! - `Auth`: SASL negotiation failures (the channel is re-established first)

use thiserror::Error;

use crate::protocol::StatusError;

/// Result type alias using BinkvError
pub type Result<T> = std::result::Result<T, BinkvError>;

/// Unified error type for binkv operations
#[derive(Debug, Error)]
pub enum BinkvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Framing Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Encode error: {0}")]
    Encode(String),

    // -------------------------------------------------------------------------
    // Server Status Errors
    // -------------------------------------------------------------------------
    #[error("{0}")]
    Status(#[from] StatusError),

    // -------------------------------------------------------------------------
    // Authentication Errors
    // -------------------------------------------------------------------------
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Connection invalidated; reconnect before further use")]
    ConnectionInvalidated,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for BinkvError {
    fn from(err: serde_json::Error) -> Self {
        BinkvError::Serialization(err.to_string())
    }
}

impl BinkvError {
    /// The status-mapped error, if this is one.
    pub fn as_status(&self) -> Option<&StatusError> {
        match self {
            BinkvError::Status(err) => Some(err),
            _ => None,
        }
    }

    /// Raw status code carried by a status-mapped error
    pub fn status_code(&self) -> Option<u16> {
        self.as_status().map(StatusError::reason)
    }

    pub fn is_invalid_arguments(&self) -> bool {
        self.as_status().is_some_and(StatusError::is_invalid_arguments)
    }

    pub fn is_already_exists(&self) -> bool {
        self.as_status().is_some_and(StatusError::is_already_exists)
    }

    pub fn is_not_found(&self) -> bool {
        self.as_status().is_some_and(StatusError::is_not_found)
    }

    pub fn is_not_my_vbucket(&self) -> bool {
        self.as_status().is_some_and(StatusError::is_not_my_vbucket)
    }

    pub fn is_not_stored(&self) -> bool {
        self.as_status().is_some_and(StatusError::is_not_stored)
    }

    pub fn is_access_denied(&self) -> bool {
        self.as_status().is_some_and(StatusError::is_access_denied)
    }

    pub fn is_delta_badval(&self) -> bool {
        self.as_status().is_some_and(StatusError::is_delta_badval)
    }

    /// True for a server AUTH_ERROR status only; provider failures are `Auth`.
    pub fn is_auth_error(&self) -> bool {
        self.as_status().is_some_and(StatusError::is_auth_error)
    }

    /// True for framing violations (bad magic, malformed bodies).
    pub fn is_protocol(&self) -> bool {
        matches!(self, BinkvError::Protocol(_))
    }
}
