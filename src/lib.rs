//! # binkv
//!
//! Client-side engine for a binary, length-prefixed key-value protocol:
//! - 24-byte fixed header + extras/key/value body framing
//! - Two-phase, length-driven reads over a pluggable transport
//! - SASL challenge/response authentication
//! - Feature negotiation with a granted ⊆ requested guarantee
//! - Streamed statistics and typed status errors
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Connection                              │
//! │   get / mutate / incr / decr / buckets / stats / hello       │
//! └──────┬───────────────────────┬──────────────────────────────┘
//!        │                       │
//!        ▼                       ▼
//!   ┌─────────────┐        ┌─────────────┐
//!   │    Auth     │        │  Features   │
//!   │ (SASL FSM)  │        │  (hello)    │
//!   └──────┬──────┘        └──────┬──────┘
//!          └──────────┬───────────┘
//!                     ▼
//!             ┌──────────────┐      ┌──────────────┐
//!             │    Codec     │─────▶│ Status map   │
//!             │ (Frame I/O)  │      │ (StatusError)│
//!             └──────┬───────┘      └──────────────┘
//!                    ▼
//!             ┌──────────────┐
//!             │  Transport   │
//!             │ (TCP / mem)  │
//!             └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod auth;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{BinkvError, Result};
pub use config::ClientConfig;
pub use client::Connection;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of binkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
