//! Stats Tests
//!
//! Tests for the streamed STAT exchange.

use binkv::client::{Connection, StatValue, Stats};
use binkv::network::MemoryTransport;
use binkv::protocol::{Command, Opcode, Status, HEADER_SIZE};
use binkv::ClientConfig;

fn stat(key: &str, value: &str) -> Command {
    Command::new(Opcode::Stat).with_key(key).with_value(value)
}

fn terminator() -> Command {
    Command::new(Opcode::Stat)
}

#[test]
fn test_stats_stream() {
    let mut transport = MemoryTransport::new();
    transport.push_response(&stat("a", "1"), Status::Success).unwrap();
    transport.push_response(&stat("b", "true"), Status::Success).unwrap();
    transport.push_response(&stat("", "x"), Status::Success).unwrap();
    transport.push_response(&terminator(), Status::Success).unwrap();

    let mut conn = Connection::with_transport(transport, ClientConfig::default());
    let stats = conn.stats("").unwrap();

    assert_eq!(stats.len(), 3);
    assert_eq!(stats["a"], StatValue::Number(1));
    assert_eq!(stats["b"], StatValue::Bool(true));
    assert_eq!(stats["0"], StatValue::String("x".to_string()));
    assert_eq!(conn.transport().pending(), 0);
}

#[test]
fn test_anonymous_values_numbered_in_order() {
    let mut transport = MemoryTransport::new();
    transport.push_response(&stat("", "first"), Status::Success).unwrap();
    transport.push_response(&stat("named", "-5"), Status::Success).unwrap();
    transport.push_response(&stat("", "second"), Status::Success).unwrap();
    transport.push_response(&terminator(), Status::Success).unwrap();

    let mut conn = Connection::with_transport(transport, ClientConfig::default());
    let stats = conn.stats("").unwrap();

    assert_eq!(stats["0"].as_str(), Some("first"));
    assert_eq!(stats["1"].as_str(), Some("second"));
    assert_eq!(stats["named"].as_i64(), Some(-5));
}

#[test]
fn test_empty_stream() {
    let mut transport = MemoryTransport::new();
    transport.push_response(&terminator(), Status::Success).unwrap();

    let mut conn = Connection::with_transport(transport, ClientConfig::default());
    assert!(conn.stats("").unwrap().is_empty());
}

#[test]
fn test_group_key_sent() {
    let mut transport = MemoryTransport::new();
    transport.push_response(&terminator(), Status::Success).unwrap();

    let mut conn = Connection::with_transport(transport, ClientConfig::default());
    conn.stats("connections").unwrap();

    let frames = conn.transport().sent_frames().unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].header().unwrap().opcode, Opcode::Stat as u8);
    assert_eq!(&frames[0].as_bytes()[HEADER_SIZE..], b"connections");
}

#[test]
fn test_error_mid_stream_aborts() {
    let mut transport = MemoryTransport::new();
    transport.push_response(&stat("a", "1"), Status::Success).unwrap();
    transport.push_response(&terminator(), Status::AccessDenied).unwrap();

    let mut conn = Connection::with_transport(transport, ClientConfig::default());
    let err = conn.stats("audit").unwrap_err();

    assert!(err.is_access_denied());
    assert!(err.to_string().starts_with("Stats failed"));
}

#[test]
fn test_unknown_group() {
    let mut transport = MemoryTransport::new();
    transport.push_response(&terminator(), Status::KeyNotFound).unwrap();

    let mut conn = Connection::with_transport(transport, ClientConfig::default());
    assert!(conn.stats("no-such-group").unwrap_err().is_not_found());
}

#[test]
fn test_stats_to_json() {
    let mut transport = MemoryTransport::new();
    transport.push_response(&stat("uptime", "120"), Status::Success).unwrap();
    transport.push_response(&stat("version", "7.0.0"), Status::Success).unwrap();
    transport.push_response(&terminator(), Status::Success).unwrap();

    let mut conn = Connection::with_transport(transport, ClientConfig::default());
    let stats = conn.stats("").unwrap();

    let json = serde_json::to_string(&stats).unwrap();
    assert_eq!(json, r#"{"uptime":120,"version":"7.0.0"}"#);
}

// =============================================================================
// Value Inference Tests
// =============================================================================

#[test]
fn test_infer_types() {
    assert_eq!(StatValue::infer(b"true"), StatValue::Bool(true));
    assert_eq!(StatValue::infer(b"false"), StatValue::Bool(false));
    assert_eq!(StatValue::infer(b"-42"), StatValue::Number(-42));
    assert_eq!(StatValue::infer(b"1.5"), StatValue::String("1.5".to_string()));
    assert_eq!(StatValue::infer(b"TRUE"), StatValue::String("TRUE".to_string()));
    assert_eq!(StatValue::infer(b""), StatValue::String(String::new()));
}

#[test]
fn test_infer_overflow_stays_text() {
    assert_eq!(
        StatValue::infer(b"99999999999999999999"),
        StatValue::String("99999999999999999999".to_string())
    );
}

#[test]
fn test_serialize_untagged() {
    let mut stats = Stats::new();
    stats.insert("a".to_string(), StatValue::Number(1));
    stats.insert("b".to_string(), StatValue::Bool(true));
    stats.insert("0".to_string(), StatValue::String("x".to_string()));

    let json = serde_json::to_string(&stats).unwrap();
    assert_eq!(json, r#"{"0":"x","a":1,"b":true}"#);
}
