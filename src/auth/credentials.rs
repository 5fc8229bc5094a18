//! Credential store
//!
//! Supplies SASL secrets. The password file is a JSON document:
//!
//! ```text
//! { "users": [ { "username": "alice", "password": "secret" } ] }
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BinkvError, Result};

/// Environment variable naming the password file
pub const ENV_PWFILE: &str = "BINKV_PWFILE";

/// Username and secret for one authentication
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Parsed password file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PasswordFile {
    #[serde(default)]
    users: Vec<Credentials>,
}

impl PasswordFile {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            BinkvError::Config(format!("Cannot read password file {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Load the file named by `BINKV_PWFILE`, if set
    pub fn from_env() -> Result<Option<Self>> {
        match std::env::var_os(ENV_PWFILE) {
            Some(path) => Self::load(path).map(Some),
            None => Ok(None),
        }
    }

    pub fn insert(&mut self, credentials: Credentials) {
        self.users.retain(|c| c.username != credentials.username);
        self.users.push(credentials);
    }

    pub fn lookup(&self, username: &str) -> Option<&Credentials> {
        self.users.iter().find(|c| c.username == username)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
