//! Documents and mutation results

/// Datatype bit: value is JSON
pub const DATATYPE_JSON: u8 = 0x01;

/// Datatype bit: value is Snappy-compressed
pub const DATATYPE_SNAPPY: u8 = 0x02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Datatype {
    #[default]
    Raw,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    None,
    Snappy,
}

/// Encode datatype and compression into the header's datatype byte
pub fn datatype_byte(datatype: Datatype, compression: Compression) -> u8 {
    let mut byte = 0;
    if compression == Compression::Snappy {
        byte |= DATATYPE_SNAPPY;
    }
    if datatype == Datatype::Json {
        byte |= DATATYPE_JSON;
    }
    byte
}

/// Split a header datatype byte
pub fn parse_datatype_byte(byte: u8) -> (Datatype, Compression) {
    let datatype = if byte & DATATYPE_JSON != 0 {
        Datatype::Json
    } else {
        Datatype::Raw
    };
    let compression = if byte & DATATYPE_SNAPPY != 0 {
        Compression::Snappy
    } else {
        Compression::None
    };
    (datatype, compression)
}

/// Metadata stored alongside a value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentInfo {
    pub id: String,
    pub flags: u32,
    /// Relative expiry in seconds, 0 = never
    pub expiry: u32,
    /// 0 means "any version" when storing
    pub cas: u64,
    pub datatype: Datatype,
    pub compression: Compression,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub info: DocumentInfo,
    pub value: Vec<u8>,
}

impl Document {
    pub fn new(id: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            info: DocumentInfo {
                id: id.into(),
                ..DocumentInfo::default()
            },
            value: value.into(),
        }
    }
}

/// Store semantics for `Connection::mutate`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationType {
    /// Store only if the key is absent
    Add,
    Set,
    /// Store only if the key exists
    Replace,
    Append,
    Prepend,
}

/// Result of a successful write.
///
/// `vbucket_uuid` and `seqno` are `None` unless the server returned them
/// (mutation seqno negotiated); zero is a legitimate value for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MutationInfo {
    pub cas: u64,
    pub vbucket_uuid: Option<u64>,
    pub seqno: Option<u64>,
}

/// Engine backing a bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketType {
    Memcached,
    EWouldBlock,
    Couchbase,
}

impl BucketType {
    /// Engine module loaded by the server
    pub fn module(&self) -> &'static str {
        match self {
            BucketType::Memcached => "default_engine.so",
            BucketType::EWouldBlock => "ewouldblock_engine.so",
            BucketType::Couchbase => "ep.so",
        }
    }
}

/// How the ewouldblock test engine decides which calls to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum EwouldblockMode {
    /// Fail the next `value` calls
    NextN = 0,
    /// Fail each call with probability `value` percent
    Random = 1,
    /// Fail the first call of each command, then succeed
    First = 2,
    /// Fail according to the bit pattern in `value`
    Sequence = 3,
}
