//! Frame Tests
//!
//! Tests for the fixed header layout and the frame buffer.

use binkv::protocol::{peek_body_length, Frame, Header, Magic, HEADER_SIZE, REQUEST_MAGIC, RESPONSE_MAGIC};

// =============================================================================
// Helper Functions
// =============================================================================

fn sample_header() -> Header {
    Header {
        magic: Magic::Response,
        opcode: 0x10,
        key_length: 3,
        extras_length: 4,
        datatype: 1,
        vbucket_or_status: 0x0001,
        body_length: 12,
        opaque: 0xdeadbeef,
        cas: 0x0102030405060708,
    }
}

fn encoded(header: &Header) -> Vec<u8> {
    let mut buf = Vec::new();
    header.encode(&mut buf);
    buf
}

// =============================================================================
// Header Tests
// =============================================================================

#[test]
fn test_header_wire_layout() {
    let buf = encoded(&sample_header());

    assert_eq!(buf.len(), HEADER_SIZE);
    assert_eq!(buf[0], RESPONSE_MAGIC);
    assert_eq!(&buf[2..4], &[0x00, 0x03]);
    assert_eq!(&buf[6..8], &[0x00, 0x01]);
    assert_eq!(&buf[8..12], &[0x00, 0x00, 0x00, 0x0c]);
    assert_eq!(&buf[16..24], &[1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn test_header_parse_matches_encode() {
    let buf = encoded(&sample_header());
    assert_eq!(Header::parse(&buf).unwrap(), sample_header());
}

#[test]
fn test_header_rejects_bad_magic() {
    let mut buf = encoded(&sample_header());
    buf[0] = 0x42;

    let err = Header::parse(&buf).unwrap_err();
    assert!(err.is_protocol());
    assert!(err.to_string().contains("0x42"));
}

#[test]
fn test_header_rejects_short_buffer() {
    assert!(Header::parse(&[REQUEST_MAGIC; 10]).is_err());
}

#[test]
fn test_status_and_vbucket_by_magic() {
    let response = sample_header();
    assert_eq!(response.status(), Some(1));
    assert_eq!(response.vbucket(), None);

    let request = Header {
        magic: Magic::Request,
        ..response
    };
    assert_eq!(request.status(), None);
    assert_eq!(request.vbucket(), Some(1));
}

#[test]
fn test_value_length_underflow() {
    let header = Header {
        body_length: 2,
        ..sample_header()
    };
    assert!(header.value_length().is_err());
    assert_eq!(sample_header().value_length().unwrap(), 5);
}

// =============================================================================
// Frame Buffer Tests
// =============================================================================

#[test]
fn test_frame_header_checks_body_length() {
    let mut frame = Frame::new();
    frame.append(&encoded(&sample_header()));
    frame.append(&[0u8; 11]);
    assert!(frame.header().is_err());

    frame.append(&[0u8]);
    assert_eq!(frame.header().unwrap().body_length, 12);
}

#[test]
fn test_frame_grow_and_reset() {
    let mut frame = Frame::with_capacity(4);
    frame.grow(3).copy_from_slice(b"abc");
    frame.grow(2).copy_from_slice(b"de");
    assert_eq!(frame.as_bytes(), b"abcde");

    frame.reset();
    assert!(frame.is_empty());
}

#[test]
fn test_peek_body_length() {
    let mut raw = [0u8; HEADER_SIZE];
    raw[8..12].copy_from_slice(&0x01020304u32.to_be_bytes());
    assert_eq!(peek_body_length(&raw), 0x01020304);
}
