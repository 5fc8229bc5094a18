//! Codec Tests
//!
//! Tests for frame encoding, the two-phase receive path and response slicing.

use binkv::network::{MemoryTransport, Transport};
use binkv::protocol::{
    decode_response, encode_command, encode_response, read_frame, read_response, write_command,
    Command, Frame, Magic, Opcode, Status, HEADER_SIZE, MAX_EXTRAS_LENGTH, MAX_KEY_LENGTH,
    REQUEST_MAGIC, RESPONSE_MAGIC,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn replay(frame: &Frame) -> MemoryTransport {
    let mut transport = MemoryTransport::new();
    transport.push_frame(frame);
    transport
}

// =============================================================================
// Command Encoding Tests
// =============================================================================

#[test]
fn test_encode_header_round_trip() {
    let cmd = Command::new(Opcode::Set)
        .with_extras(vec![1, 2, 3, 4, 5, 6, 7, 8])
        .with_key("mykey")
        .with_value("myvalue")
        .with_opaque(0x01020304)
        .with_cas(0xfeedface);

    let frame = encode_command(&cmd).unwrap();
    let header = frame.header().unwrap();

    assert_eq!(header.magic, Magic::Request);
    assert_eq!(header.opcode, Opcode::Set as u8);
    assert_eq!(header.key_length, 5);
    assert_eq!(header.extras_length, 8);
    assert_eq!(header.body_length, 8 + 5 + 7);
    assert_eq!(header.opaque, 0x01020304);
    assert_eq!(header.cas, 0xfeedface);
    assert_eq!(frame.len(), HEADER_SIZE + 20);
}

#[test]
fn test_encode_section_order() {
    let cmd = Command::new(Opcode::Get)
        .with_extras(vec![0xee])
        .with_key("k")
        .with_value("v");
    let frame = encode_command(&cmd).unwrap();

    assert_eq!(&frame.as_bytes()[HEADER_SIZE..], &[0xee, b'k', b'v']);
}

#[test]
fn test_encode_default_opaque() {
    let frame = encode_command(&Command::new(Opcode::Noop)).unwrap();
    assert_eq!(frame.header().unwrap().opaque, 0xdeadbeef);
    assert_eq!(frame.len(), HEADER_SIZE);
}

#[test]
fn test_encode_accepts_limits() {
    let cmd = Command::new(Opcode::Set)
        .with_extras(vec![0u8; MAX_EXTRAS_LENGTH])
        .with_key(vec![b'k'; MAX_KEY_LENGTH]);
    let header = encode_command(&cmd).unwrap().header().unwrap();

    assert_eq!(header.extras_length as usize, MAX_EXTRAS_LENGTH);
    assert_eq!(header.key_length as usize, MAX_KEY_LENGTH);
}

#[test]
fn test_encode_rejects_oversized_key() {
    let cmd = Command::new(Opcode::Get).with_key(vec![b'k'; MAX_KEY_LENGTH + 1]);
    let result = encode_command(&cmd);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Key too large"));
}

#[test]
fn test_encode_rejects_oversized_extras() {
    let cmd = Command::new(Opcode::Get).with_extras(vec![0u8; MAX_EXTRAS_LENGTH + 1]);
    let result = encode_command(&cmd);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Extras too large"));
}

#[test]
fn test_encode_vbucket_and_datatype() {
    let cmd = Command::new(Opcode::Get).with_key("k").with_vbucket(513).with_datatype(0x01);
    let frame = encode_command(&cmd).unwrap();

    assert_eq!(&frame.as_bytes()[6..8], &[0x02, 0x01]);
    assert_eq!(frame.as_bytes()[5], 0x01);
    assert_eq!(frame.header().unwrap().vbucket(), Some(513));
}

// =============================================================================
// Two-Phase Read Tests
// =============================================================================

#[test]
fn test_read_frame_exact_length() {
    let response = encode_response(&Command::new(Opcode::Get).with_value("hello"), 0).unwrap();
    let mut transport = replay(&response);
    transport.push_bytes(&[0xaa; 7]); // trailing bytes belong to the next frame

    let frame = read_frame(&mut transport, u32::MAX).unwrap();
    assert_eq!(frame, response);
    assert_eq!(transport.pending(), 7);
}

#[test]
fn test_read_frame_header_only() {
    let response = encode_response(&Command::new(Opcode::Stat), 0).unwrap();
    let mut transport = replay(&response);

    let frame = read_frame(&mut transport, u32::MAX).unwrap();
    assert_eq!(frame.len(), HEADER_SIZE);
    assert_eq!(transport.pending(), 0);
}

#[test]
fn test_read_frame_bad_magic() {
    let mut raw = encode_response(&Command::new(Opcode::Get), 0).unwrap().as_bytes().to_vec();
    raw[0] = 0x42;
    let mut transport = MemoryTransport::new();
    transport.push_bytes(&raw);

    let err = read_frame(&mut transport, u32::MAX).unwrap_err();
    assert!(err.is_protocol());
    assert!(err.to_string().contains("Invalid magic"));
}

#[test]
fn test_read_frame_accepts_request_magic() {
    let request = encode_command(&Command::new(Opcode::Noop)).unwrap();
    let mut transport = replay(&request);

    let frame = read_frame(&mut transport, u32::MAX).unwrap();
    assert_eq!(frame.as_bytes()[0], REQUEST_MAGIC);
}

#[test]
fn test_read_frame_premature_close() {
    let response = encode_response(&Command::new(Opcode::Get).with_value("hello"), 0).unwrap();
    let mut transport = MemoryTransport::new();
    transport.push_bytes(&response.as_bytes()[..HEADER_SIZE + 2]);

    let err = read_frame(&mut transport, u32::MAX).unwrap_err();
    match err {
        binkv::BinkvError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
        other => panic!("Expected IO error, got {:?}", other),
    }
}

#[test]
fn test_read_frame_body_limit() {
    let response = encode_response(&Command::new(Opcode::Get).with_value(vec![0u8; 64]), 0).unwrap();
    let mut transport = replay(&response);

    let err = read_frame(&mut transport, 32).unwrap_err();
    assert!(err.to_string().contains("Body too large"));
}

// =============================================================================
// Response Decoding Tests
// =============================================================================

#[test]
fn test_decode_response_sections() {
    let cmd = Command::new(Opcode::Get)
        .with_extras(vec![0, 0, 0, 9])
        .with_key("key")
        .with_value("value")
        .with_cas(77);
    let mut transport = replay(&encode_response(&cmd, Status::KeyExists.into()).unwrap());

    let response = read_response(&mut transport, u32::MAX).unwrap();
    assert_eq!(response.header().magic, Magic::Response);
    assert_eq!(response.status(), Some(Status::KeyExists));
    assert_eq!(response.extras(), &[0, 0, 0, 9]);
    assert_eq!(response.key(), b"key");
    assert_eq!(response.value(), b"value");
    assert_eq!(response.cas(), 77);
    assert!(!response.is_success());
}

#[test]
fn test_decode_response_status_host_order() {
    let frame = encode_response(&Command::new(Opcode::Get), 0x0086).unwrap();
    assert_eq!(frame.as_bytes()[0], RESPONSE_MAGIC);
    assert_eq!(&frame.as_bytes()[6..8], &[0x00, 0x86]);

    let response = decode_response(frame).unwrap();
    assert_eq!(response.status_code(), 0x0086);
    assert_eq!(response.status(), Some(Status::TemporaryFailure));
}

#[test]
fn test_decode_rejects_key_past_body() {
    let mut raw = encode_response(&Command::new(Opcode::Get).with_key("abc"), 0)
        .unwrap()
        .as_bytes()
        .to_vec();
    raw[3] = 9; // key length 9 in a 3 byte body

    let err = decode_response(Frame::from_bytes(&raw)).unwrap_err();
    assert!(err.is_protocol());
}

#[test]
fn test_check_maps_status() {
    let response = decode_response(encode_response(&Command::new(Opcode::Get), 1).unwrap()).unwrap();
    let err = response.check("Failed to get: k").unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.status_code(), Some(1));
    assert_eq!(err.to_string(), "Failed to get: k: Not found (1)");
}

#[test]
fn test_check_rejects_request_magic() {
    let frame = encode_command(&Command::new(Opcode::Get).with_vbucket(0)).unwrap();
    let response = decode_response(frame).unwrap();

    assert!(!response.is_response());
    assert!(!response.is_success());
    assert!(response.ensure_response().is_err());

    let err = response.check("Failed to get: k").unwrap_err();
    assert!(err.is_protocol());
    assert!(err.to_string().contains("Expected response frame"));
}

// =============================================================================
// Stream I/O Tests
// =============================================================================

#[test]
fn test_write_command_captured() {
    let mut transport = MemoryTransport::new();
    let cmd = Command::new(Opcode::Get).with_key("k1");
    write_command(&mut transport, &cmd).unwrap();
    write_command(&mut transport, &Command::new(Opcode::Noop)).unwrap();

    let frames = transport.sent_frames().unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0], cmd.encode().unwrap());
    assert_eq!(frames[1].header().unwrap().opcode, Opcode::Noop as u8);
}

#[test]
fn test_send_through_trait_object() {
    let mut transport = MemoryTransport::new();
    let dyn_transport: &mut dyn Transport = &mut transport;
    write_command(dyn_transport, &Command::new(Opcode::Noop)).unwrap();

    assert_eq!(transport.sent().len(), HEADER_SIZE);
}
