//! Document Tests
//!
//! Tests for the datatype byte and bucket engine mapping.

use binkv::client::{
    datatype_byte, parse_datatype_byte, BucketType, Compression, Datatype, Document, EwouldblockMode,
};

#[test]
fn test_datatype_byte_round_trip() {
    for datatype in [Datatype::Raw, Datatype::Json] {
        for compression in [Compression::None, Compression::Snappy] {
            let byte = datatype_byte(datatype, compression);
            assert_eq!(parse_datatype_byte(byte), (datatype, compression));
        }
    }
    assert_eq!(datatype_byte(Datatype::Json, Compression::Snappy), 0x03);
}

#[test]
fn test_new_document_defaults() {
    let doc = Document::new("k", "v");
    assert_eq!(doc.info.id, "k");
    assert_eq!(doc.info.cas, 0);
    assert_eq!(doc.info.datatype, Datatype::Raw);
    assert_eq!(doc.value, b"v");
}

#[test]
fn test_bucket_modules() {
    assert_eq!(BucketType::Couchbase.module(), "ep.so");
    assert_eq!(BucketType::Memcached.module(), "default_engine.so");
    assert_eq!(BucketType::EWouldBlock.module(), "ewouldblock_engine.so");
}

#[test]
fn test_ewouldblock_mode_codes() {
    assert_eq!(EwouldblockMode::NextN as u32, 0);
    assert_eq!(EwouldblockMode::Random as u32, 1);
    assert_eq!(EwouldblockMode::First as u32, 2);
    assert_eq!(EwouldblockMode::Sequence as u32, 3);
}
