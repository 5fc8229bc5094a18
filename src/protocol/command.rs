//! Command definitions
//!
//! A [`Command`] is everything needed to build one request frame. It is
//! assembled with consuming `with_*` methods and not touched afterwards.

use crate::error::Result;

use super::codec::encode_command;
use super::frame::Frame;

/// Opaque token stamped on requests unless the caller supplies one
pub const DEFAULT_OPAQUE: u32 = 0xdeadbeef;

/// Flag in the DCP open extras requesting a producer stream
pub const DCP_OPEN_PRODUCER: u32 = 0x01;

/// Command opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Get = 0x00,
    Set = 0x01,
    Add = 0x02,
    Replace = 0x03,
    Delete = 0x04,
    Increment = 0x05,
    Decrement = 0x06,
    Noop = 0x0a,
    Append = 0x0e,
    Prepend = 0x0f,
    Stat = 0x10,
    Hello = 0x1f,
    SaslListMechs = 0x20,
    SaslAuth = 0x21,
    SaslStep = 0x22,
    IoctlGet = 0x23,
    IoctlSet = 0x24,
    AuditConfigReload = 0x28,
    DcpOpen = 0x50,
    DcpStreamReq = 0x53,
    CreateBucket = 0x85,
    DeleteBucket = 0x86,
    ListBuckets = 0x87,
    SelectBucket = 0x89,
    EwouldblockCtl = 0xeb,
}

impl Opcode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Opcode::Get),
            0x01 => Some(Opcode::Set),
            0x02 => Some(Opcode::Add),
            0x03 => Some(Opcode::Replace),
            0x04 => Some(Opcode::Delete),
            0x05 => Some(Opcode::Increment),
            0x06 => Some(Opcode::Decrement),
            0x0a => Some(Opcode::Noop),
            0x0e => Some(Opcode::Append),
            0x0f => Some(Opcode::Prepend),
            0x10 => Some(Opcode::Stat),
            0x1f => Some(Opcode::Hello),
            0x20 => Some(Opcode::SaslListMechs),
            0x21 => Some(Opcode::SaslAuth),
            0x22 => Some(Opcode::SaslStep),
            0x23 => Some(Opcode::IoctlGet),
            0x24 => Some(Opcode::IoctlSet),
            0x28 => Some(Opcode::AuditConfigReload),
            0x50 => Some(Opcode::DcpOpen),
            0x53 => Some(Opcode::DcpStreamReq),
            0x85 => Some(Opcode::CreateBucket),
            0x86 => Some(Opcode::DeleteBucket),
            0x87 => Some(Opcode::ListBuckets),
            0x89 => Some(Opcode::SelectBucket),
            0xeb => Some(Opcode::EwouldblockCtl),
            _ => None,
        }
    }

    /// Store commands that carry the flags + expiry extras block
    pub fn has_store_extras(&self) -> bool {
        matches!(self, Opcode::Set | Opcode::Add | Opcode::Replace)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Opcode::Get => "GET",
            Opcode::Set => "SET",
            Opcode::Add => "ADD",
            Opcode::Replace => "REPLACE",
            Opcode::Delete => "DELETE",
            Opcode::Increment => "INCREMENT",
            Opcode::Decrement => "DECREMENT",
            Opcode::Noop => "NOOP",
            Opcode::Append => "APPEND",
            Opcode::Prepend => "PREPEND",
            Opcode::Stat => "STAT",
            Opcode::Hello => "HELLO",
            Opcode::SaslListMechs => "SASL_LIST_MECHS",
            Opcode::SaslAuth => "SASL_AUTH",
            Opcode::SaslStep => "SASL_STEP",
            Opcode::IoctlGet => "IOCTL_GET",
            Opcode::IoctlSet => "IOCTL_SET",
            Opcode::AuditConfigReload => "AUDIT_CONFIG_RELOAD",
            Opcode::DcpOpen => "DCP_OPEN",
            Opcode::DcpStreamReq => "DCP_STREAM_REQ",
            Opcode::CreateBucket => "CREATE_BUCKET",
            Opcode::DeleteBucket => "DELETE_BUCKET",
            Opcode::ListBuckets => "LIST_BUCKETS",
            Opcode::SelectBucket => "SELECT_BUCKET",
            Opcode::EwouldblockCtl => "EWOULDBLOCK_CTL",
        }
    }
}

/// A request to encode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub opcode: Opcode,
    pub extras: Vec<u8>,
    pub key: Vec<u8>,
    pub value: Vec<u8>,
    pub opaque: u32,
    pub cas: u64,
    pub vbucket: u16,
    pub datatype: u8,
}

impl Command {
    /// Command with no extras, key or value
    pub fn new(opcode: Opcode) -> Self {
        Self {
            opcode,
            extras: Vec::new(),
            key: Vec::new(),
            value: Vec::new(),
            opaque: DEFAULT_OPAQUE,
            cas: 0,
            vbucket: 0,
            datatype: 0,
        }
    }

    pub fn with_extras(mut self, extras: impl Into<Vec<u8>>) -> Self {
        self.extras = extras.into();
        self
    }

    pub fn with_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_value(mut self, value: impl Into<Vec<u8>>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_opaque(mut self, opaque: u32) -> Self {
        self.opaque = opaque;
        self
    }

    pub fn with_cas(mut self, cas: u64) -> Self {
        self.cas = cas;
        self
    }

    pub fn with_vbucket(mut self, vbucket: u16) -> Self {
        self.vbucket = vbucket;
        self
    }

    pub fn with_datatype(mut self, datatype: u8) -> Self {
        self.datatype = datatype;
        self
    }

    /// Store command: flags + expiry extras, omitted for append/prepend
    pub fn store(opcode: Opcode, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>, flags: u32, expiry: u32) -> Self {
        let mut command = Command::new(opcode).with_key(key).with_value(value);
        if opcode.has_store_extras() {
            let mut extras = Vec::with_capacity(8);
            extras.extend_from_slice(&flags.to_be_bytes());
            extras.extend_from_slice(&expiry.to_be_bytes());
            command.extras = extras;
        }
        command
    }

    /// Counter command: delta (8) + initial (8) + expiry (4)
    pub fn counter(opcode: Opcode, key: impl Into<Vec<u8>>, delta: u64, initial: u64, expiry: u32) -> Self {
        let mut extras = Vec::with_capacity(20);
        extras.extend_from_slice(&delta.to_be_bytes());
        extras.extend_from_slice(&initial.to_be_bytes());
        extras.extend_from_slice(&expiry.to_be_bytes());
        Command::new(opcode).with_key(key).with_extras(extras)
    }

    /// Open a DCP producer named "dcp"
    pub fn dcp_open() -> Self {
        let mut extras = Vec::with_capacity(8);
        extras.extend_from_slice(&0u32.to_be_bytes()); // seqno
        extras.extend_from_slice(&DCP_OPEN_PRODUCER.to_be_bytes());
        Command::new(Opcode::DcpOpen).with_key("dcp").with_extras(extras)
    }

    /// Request the full range of a vbucket's history
    pub fn dcp_stream_req() -> Self {
        let mut extras = Vec::with_capacity(48);
        extras.extend_from_slice(&0u32.to_be_bytes()); // flags
        extras.extend_from_slice(&0u32.to_be_bytes()); // reserved
        extras.extend_from_slice(&u64::MIN.to_be_bytes()); // start seqno
        extras.extend_from_slice(&u64::MAX.to_be_bytes()); // end seqno
        extras.extend_from_slice(&0u64.to_be_bytes()); // vbucket uuid
        extras.extend_from_slice(&u64::MIN.to_be_bytes()); // snapshot start
        extras.extend_from_slice(&u64::MAX.to_be_bytes()); // snapshot end
        Command::new(Opcode::DcpStreamReq).with_extras(extras)
    }

    /// Encode into a request frame
    pub fn encode(&self) -> Result<Frame> {
        encode_command(self)
    }
}
