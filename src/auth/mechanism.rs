//! SASL mechanism providers
//!
//! A [`Mechanism`] produces the client side of a challenge/response
//! exchange. It is supplied by the caller for each `authenticate` call; there
//! is no global mechanism registry.

use thiserror::Error;

/// Errors raised by a mechanism provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaslError {
    #[error("no usable mechanism for \"{0}\"")]
    NoMechanism(String),

    #[error("bad server challenge: {0}")]
    BadChallenge(String),

    #[error("mechanism failure: {0}")]
    Failed(String),
}

/// Mechanism choice plus the initial client response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaslStart {
    pub mechanism: String,
    pub initial: Vec<u8>,
}

/// Client response to one server challenge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaslStep {
    /// More rounds are expected
    Continue(Vec<u8>),
    /// This is the mechanism's last message
    Final(Vec<u8>),
}

impl SaslStep {
    pub fn data(&self) -> &[u8] {
        match self {
            SaslStep::Continue(data) | SaslStep::Final(data) => data,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, SaslStep::Final(_))
    }
}

/// Client half of a SASL mechanism
pub trait Mechanism {
    /// Pick a mechanism for `hint` ("any" or a name) and produce the
    /// initial response
    fn start(&mut self, username: &str, secret: &str, hint: &str) -> Result<SaslStart, SaslError>;

    /// Answer a server challenge
    fn step(&mut self, challenge: &[u8]) -> Result<SaslStep, SaslError>;
}

/// RFC 4616 PLAIN: a single message, `\0user\0password`
#[derive(Debug, Default)]
pub struct PlainMechanism;

impl PlainMechanism {
    pub const NAME: &'static str = "PLAIN";

    pub fn new() -> Self {
        Self
    }

    fn accepts(hint: &str) -> bool {
        let hint = hint.trim();
        hint.is_empty()
            || hint.eq_ignore_ascii_case("any")
            || hint
                .split_whitespace()
                .any(|name| name.eq_ignore_ascii_case(Self::NAME))
    }
}

impl Mechanism for PlainMechanism {
    fn start(&mut self, username: &str, secret: &str, hint: &str) -> Result<SaslStart, SaslError> {
        if !Self::accepts(hint) {
            return Err(SaslError::NoMechanism(hint.to_string()));
        }

        let mut initial = Vec::with_capacity(username.len() + secret.len() + 2);
        initial.push(0);
        initial.extend_from_slice(username.as_bytes());
        initial.push(0);
        initial.extend_from_slice(secret.as_bytes());

        Ok(SaslStart {
            mechanism: Self::NAME.to_string(),
            initial,
        })
    }

    fn step(&mut self, challenge: &[u8]) -> Result<SaslStep, SaslError> {
        Err(SaslError::BadChallenge(format!(
            "PLAIN expects no challenge, got {} bytes",
            challenge.len()
        )))
    }
}
