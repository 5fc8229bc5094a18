//! Mechanism Tests
//!
//! Tests for the built-in PLAIN mechanism.

use binkv::auth::{Mechanism, PlainMechanism, SaslError};

#[test]
fn test_plain_initial_response() {
    let start = PlainMechanism::new().start("alice", "secret", "any").unwrap();
    assert_eq!(start.mechanism, "PLAIN");
    assert_eq!(start.initial, b"\0alice\0secret");
}

#[test]
fn test_plain_accepts_mechanism_lists() {
    let mut plain = PlainMechanism::new();
    assert!(plain.start("u", "p", "SCRAM-SHA1 PLAIN").is_ok());
    assert!(plain.start("u", "p", "plain").is_ok());
    assert_eq!(
        plain.start("u", "p", "SCRAM-SHA512"),
        Err(SaslError::NoMechanism("SCRAM-SHA512".to_string()))
    );
}

#[test]
fn test_plain_rejects_challenge() {
    assert!(PlainMechanism::new().step(b"nonce").is_err());
}
