//! Authentication Module
//!
//! SASL challenge/response negotiation.
//!
//! ## Responsibilities
//! - Mechanism provider contract ([`Mechanism`]) and a built-in PLAIN
//! - Negotiation state machine ([`Authenticator`])
//! - Credential lookup from a JSON password file

mod credentials;
mod mechanism;
mod negotiator;

pub use credentials::{Credentials, PasswordFile, ENV_PWFILE};
pub use mechanism::{Mechanism, PlainMechanism, SaslError, SaslStart, SaslStep};
pub use negotiator::{invalidates_channel, AuthState, Authenticator};
