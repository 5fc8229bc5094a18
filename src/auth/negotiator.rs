//! Authentication negotiator
//!
//! Drives one SASL exchange over a frame channel:
//!
//! ```text
//! Start ──AUTH_CONTINUE──▶ Continue(n) ──AUTH_CONTINUE──▶ Continue(n+1) ...
//!   │                          │
//!   ├──SUCCESS──▶ Success      ├──SUCCESS──▶ Success
//!   └──other────▶ Failed       └──other────▶ Failed
//! ```
//!
//! Errors of kind [`BinkvError::Auth`] or [`BinkvError::Protocol`] leave the
//! channel mid-negotiation; the caller must re-establish it before reuse.

use crate::error::{BinkvError, Result};
use crate::protocol::{Command, FrameChannel, Opcode, Response, Status, StatusError};

use super::credentials::Credentials;
use super::mechanism::{Mechanism, SaslStep};

/// Negotiation progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Start,
    /// Number of challenge rounds answered so far
    Continue(usize),
    Success,
    Failed,
}

/// One authentication attempt. Holds no state once it finishes.
pub struct Authenticator<'m, M: Mechanism + ?Sized> {
    mechanism: &'m mut M,
    state: AuthState,
    max_rounds: usize,
}

impl<'m, M: Mechanism + ?Sized> Authenticator<'m, M> {
    pub fn new(mechanism: &'m mut M, max_rounds: usize) -> Self {
        Self {
            mechanism,
            state: AuthState::Start,
            max_rounds,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    /// Run the exchange to completion.
    ///
    /// Returns the mechanism name the server accepted.
    pub fn run<C: FrameChannel + ?Sized>(
        &mut self,
        channel: &mut C,
        credentials: &Credentials,
        hint: &str,
    ) -> Result<String> {
        let outcome = self.exchange(channel, credentials, hint);
        self.state = match outcome {
            Ok(_) => AuthState::Success,
            Err(_) => AuthState::Failed,
        };
        outcome
    }

    fn exchange<C: FrameChannel + ?Sized>(
        &mut self,
        channel: &mut C,
        credentials: &Credentials,
        hint: &str,
    ) -> Result<String> {
        let start = self
            .mechanism
            .start(&credentials.username, credentials.password(), hint)
            .map_err(|e| BinkvError::Auth(format!("mechanism start ({}): {}", hint, e)))?;
        let mechanism = start.mechanism;

        tracing::debug!("SASL start with mechanism {}", mechanism);
        let mut response = self.send(channel, Opcode::SaslAuth, &mechanism, start.initial)?;

        let mut rounds = 0;
        let mut client_done = false;
        while response.status() == Some(Status::AuthContinue) {
            if client_done {
                return Err(BinkvError::Auth(format!(
                    "{}: server requested another step after the final client message",
                    mechanism
                )));
            }
            if rounds >= self.max_rounds {
                return Err(BinkvError::Auth(format!(
                    "{}: exceeded {} negotiation rounds",
                    mechanism, self.max_rounds
                )));
            }
            rounds += 1;
            self.state = AuthState::Continue(rounds);

            // Challenge is whatever follows extras and key
            let step = self
                .mechanism
                .step(response.value())
                .map_err(|e| BinkvError::Auth(format!("{} step {}: {}", mechanism, rounds, e)))?;
            tracing::trace!("SASL step {} ({} bytes)", rounds, step.data().len());

            client_done = step.is_final();
            let data = match step {
                SaslStep::Continue(data) | SaslStep::Final(data) => data,
            };
            response = self.send(channel, Opcode::SaslStep, &mechanism, data)?;
        }

        if !response.is_success() {
            return Err(StatusError::new(response.status_code(), "Authentication failed").into());
        }

        tracing::debug!("SASL {} succeeded after {} rounds", mechanism, rounds);
        Ok(mechanism)
    }

    fn send<C: FrameChannel + ?Sized>(
        &self,
        channel: &mut C,
        opcode: Opcode,
        mechanism: &str,
        data: Vec<u8>,
    ) -> Result<Response> {
        let command = Command::new(opcode).with_key(mechanism).with_value(data);
        channel.round_trip(&command)
    }
}

/// True when an authentication error leaves the channel unusable
pub fn invalidates_channel(err: &BinkvError) -> bool {
    matches!(err, BinkvError::Auth(_) | BinkvError::Protocol(_) | BinkvError::Encode(_))
}
