//! Client Module
//!
//! Connection and the typed operations built on the codec.
//!
//! ## Operation Pattern
//! ```text
//! Command ──encode──▶ Frame ──send──▶ Transport
//!                                        │
//! Result ◀──decode── Response ◀──recv────┘
//!            │
//!            └─ non-success status ──▶ StatusError
//! ```

mod connection;
mod document;
mod ops;
mod stats;

pub use connection::Connection;
pub use document::{
    datatype_byte, parse_datatype_byte, BucketType, Compression, Datatype, Document, DocumentInfo,
    EwouldblockMode, MutationInfo, MutationType, DATATYPE_JSON, DATATYPE_SNAPPY,
};
pub use stats::{StatValue, Stats};
