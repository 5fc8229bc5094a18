//! Streamed statistics
//!
//! One STAT request is answered by a sequence of key/value frames ended by
//! a frame with an empty body. Anonymous values (empty key) are numbered
//! from 0 in arrival order.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::Result;
use crate::network::Transport;
use crate::protocol::{decode_response, Command, Opcode};

use super::connection::Connection;

/// A stat value with its inferred type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Bool(bool),
    Number(i64),
    String(String),
}

impl StatValue {
    /// "true"/"false" become booleans, 64-bit integers become numbers,
    /// anything else stays text
    pub fn infer(raw: &[u8]) -> Self {
        let text = String::from_utf8_lossy(raw);
        match text.as_ref() {
            "true" => StatValue::Bool(true),
            "false" => StatValue::Bool(false),
            other => match other.parse::<i64>() {
                Ok(number) => StatValue::Number(number),
                Err(_) => StatValue::String(text.into_owned()),
            },
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            StatValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StatValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StatValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Bool(b) => write!(f, "{}", b),
            StatValue::Number(n) => write!(f, "{}", n),
            StatValue::String(s) => write!(f, "{}", s),
        }
    }
}

/// Stats keyed by name
pub type Stats = BTreeMap<String, StatValue>;

impl<T: Transport> Connection<T> {
    /// Fetch a stat group ("" for the default group).
    ///
    /// Any non-success frame aborts the stream with its mapped error.
    pub fn stats(&mut self, group: &str) -> Result<Stats> {
        let frame = Command::new(Opcode::Stat).with_key(group).encode()?;
        self.send_frame(&frame)?;

        let mut stats = Stats::new();
        let mut counter = 0usize;
        loop {
            let response = decode_response(self.recv_frame()?)?;
            response.check("Stats failed")?;

            if response.header().body_length == 0 {
                break;
            }

            let key = if response.key().is_empty() {
                let ordinal = counter.to_string();
                counter += 1;
                ordinal
            } else {
                String::from_utf8_lossy(response.key()).into_owned()
            };
            stats.insert(key, StatValue::infer(response.value()));
        }

        tracing::debug!("Received {} stats for group \"{}\"", stats.len(), group);
        Ok(stats)
    }
}
