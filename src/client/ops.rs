//! Command operations
//!
//! Every operation follows the same pattern: build the opcode's extras,
//! encode, send, receive, map a non-success status, decode the payload.

use bytes::{Buf, BufMut};

use crate::auth::{invalidates_channel, Authenticator, Credentials, Mechanism, PlainMechanism};
use crate::error::{BinkvError, Result};
use crate::network::Transport;
use crate::protocol::{decode_features, decode_response, encode_features, Command, Feature, FeatureSet, Frame, Opcode, Response};

use super::connection::Connection;
use super::document::{
    datatype_byte, parse_datatype_byte, BucketType, Document, DocumentInfo, EwouldblockMode, MutationInfo, MutationType,
};

/// Extras length of a GET response (flags)
const GET_EXTRAS_LENGTH: usize = 4;

/// Extras length carrying vbucket uuid + seqno
const SEQNO_EXTRAS_LENGTH: usize = 16;

/// Extras length of an ewouldblock engine control request
const EWOULDBLOCK_EXTRAS_LENGTH: usize = 12;

impl<T: Transport> Connection<T> {
    // =========================================================================
    // Authentication
    // =========================================================================

    /// Authenticate with the built-in PLAIN mechanism
    pub fn authenticate(&mut self, username: &str, password: &str, mech: &str) -> Result<String> {
        let mut plain = PlainMechanism::new();
        self.authenticate_with(&mut plain, &Credentials::new(username, password), mech)
    }

    /// Authenticate with a caller-supplied mechanism provider.
    ///
    /// A provider failure or a broken exchange re-establishes the channel
    /// before the error is returned.
    pub fn authenticate_with<M: Mechanism + ?Sized>(
        &mut self,
        mechanism: &mut M,
        credentials: &Credentials,
        hint: &str,
    ) -> Result<String> {
        self.ensure_usable()?;
        let max_rounds = self.config().max_auth_rounds;
        let mut authenticator = Authenticator::new(mechanism, max_rounds);

        match authenticator.run(self, credentials, hint) {
            Ok(chosen) => Ok(chosen),
            Err(err) => {
                if invalidates_channel(&err) {
                    self.invalidate(&err);
                }
                Err(err)
            }
        }
    }

    /// Fetch the mechanisms the server offers
    pub fn list_sasl_mechanisms(&mut self) -> Result<String> {
        let response = self.execute_checked(
            &Command::new(Opcode::SaslListMechs),
            "Failed to fetch sasl mechanisms",
        )?;
        Ok(String::from_utf8_lossy(response.value()).into_owned())
    }

    // =========================================================================
    // Feature negotiation
    // =========================================================================

    /// Ask the server for `requested` features, identifying as `agent`.
    ///
    /// The connection's feature set is replaced with what the server granted,
    /// which is always a subset of `requested` and may be smaller.
    pub fn negotiate_features(&mut self, agent: &str, requested: FeatureSet) -> Result<FeatureSet> {
        let command = Command::new(Opcode::Hello)
            .with_key(agent)
            .with_value(encode_features(requested));
        let response = self.execute_checked(&command, "Failed to say hello")?;

        let granted = decode_features(response.value(), requested)?;
        tracing::debug!("Requested features {}, server granted {}", requested, granted);
        self.set_features(granted);
        Ok(granted)
    }

    /// Re-announce the current features and fetch the SASL mechanism list.
    ///
    /// `comment` is not sent; the server has no field for it.
    pub fn hello(&mut self, agent: &str, version: &str, comment: &str) -> Result<()> {
        if !comment.is_empty() {
            tracing::debug!("hello from {} {} ({})", agent, version, comment);
        }
        let requested = self.features();
        self.negotiate_features(&format!("{} {}", agent, version), requested)?;
        let mechanisms = self.list_sasl_mechanisms()?;
        self.set_sasl_mechanisms(mechanisms);
        Ok(())
    }

    fn toggle_feature(&mut self, feature: Feature, enable: bool) -> Result<()> {
        let requested = self.features().with(feature, enable);
        let agent = self.config().agent.clone();
        let granted = self.negotiate_features(&agent, requested)?;
        if enable && !granted.contains(feature) {
            return Err(BinkvError::Protocol(format!(
                "Failed to enable {}",
                feature.name()
            )));
        }
        Ok(())
    }

    pub fn set_datatype_support(&mut self, enable: bool) -> Result<()> {
        self.toggle_feature(Feature::Datatype, enable)
    }

    pub fn set_tcp_nodelay_support(&mut self, enable: bool) -> Result<()> {
        self.toggle_feature(Feature::TcpNodelay, enable)
    }

    pub fn set_mutation_seqno_support(&mut self, enable: bool) -> Result<()> {
        self.toggle_feature(Feature::MutationSeqno, enable)
    }

    pub fn set_xattr_support(&mut self, enable: bool) -> Result<()> {
        self.toggle_feature(Feature::Xattr, enable)
    }

    // =========================================================================
    // Bucket administration
    // =========================================================================

    /// Create a bucket; the value is `module\0config`
    pub fn create_bucket(&mut self, name: &str, config: &str, bucket_type: BucketType) -> Result<()> {
        let module = bucket_type.module();
        let mut payload = Vec::with_capacity(module.len() + 1 + config.len());
        payload.extend_from_slice(module.as_bytes());
        payload.push(0);
        payload.extend_from_slice(config.as_bytes());

        let command = Command::new(Opcode::CreateBucket).with_key(name).with_value(payload);
        self.execute_checked(&command, "Create bucket failed")?;
        tracing::debug!("Created bucket {} ({})", name, module);
        Ok(())
    }

    pub fn delete_bucket(&mut self, name: &str) -> Result<()> {
        let command = Command::new(Opcode::DeleteBucket).with_key(name);
        self.execute_checked(&command, "Delete bucket failed")?;
        Ok(())
    }

    pub fn select_bucket(&mut self, name: &str) -> Result<()> {
        let command = Command::new(Opcode::SelectBucket).with_key(name);
        self.execute_checked(&command, "Select bucket failed")?;
        Ok(())
    }

    /// Bucket names, parsed from a whitespace-separated value
    pub fn list_buckets(&mut self) -> Result<Vec<String>> {
        let response = self.execute_checked(&Command::new(Opcode::ListBuckets), "List bucket failed")?;
        let names = String::from_utf8_lossy(response.value());
        Ok(names.split_whitespace().map(str::to_string).collect())
    }

    // =========================================================================
    // Documents
    // =========================================================================

    /// Request frame for a single-key fetch from `vbucket`
    pub fn encode_cmd_get(&self, id: &str, vbucket: u16) -> Result<Frame> {
        Command::new(Opcode::Get).with_key(id).with_vbucket(vbucket).encode()
    }

    pub fn encode_cmd_dcp_open(&self) -> Result<Frame> {
        Command::dcp_open().encode()
    }

    pub fn encode_cmd_dcp_stream_req(&self) -> Result<Frame> {
        Command::dcp_stream_req().encode()
    }

    /// Fetch a document.
    ///
    /// The response must carry exactly the 4-byte flags extras.
    pub fn get(&mut self, id: &str, vbucket: u16) -> Result<Document> {
        let frame = self.encode_cmd_get(id, vbucket)?;
        self.send_frame(&frame)?;
        let response = decode_response(self.recv_frame()?)?;
        response.check(format!("Failed to get: {}", id))?;

        let mut extras = response.extras();
        if extras.len() != GET_EXTRAS_LENGTH {
            return Err(BinkvError::Protocol(format!(
                "GET response: expected {} bytes of extras, got {}",
                GET_EXTRAS_LENGTH,
                extras.len()
            )));
        }

        let (datatype, compression) = parse_datatype_byte(response.datatype());
        Ok(Document {
            info: DocumentInfo {
                id: id.to_string(),
                flags: extras.get_u32(),
                expiry: 0,
                cas: response.cas(),
                datatype,
                compression,
            },
            value: response.value().to_vec(),
        })
    }

    /// Store a document with add/set/replace/append/prepend semantics.
    ///
    /// The document's cas is sent as-is; 0 stores unconditionally.
    pub fn mutate(&mut self, doc: &Document, vbucket: u16, mutation: MutationType) -> Result<MutationInfo> {
        let opcode = match mutation {
            MutationType::Add => Opcode::Add,
            MutationType::Set => Opcode::Set,
            MutationType::Replace => Opcode::Replace,
            MutationType::Append => Opcode::Append,
            MutationType::Prepend => Opcode::Prepend,
        };

        let command = Command::store(opcode, doc.info.id.as_str(), doc.value.as_slice(), doc.info.flags, doc.info.expiry)
            .with_cas(doc.info.cas)
            .with_vbucket(vbucket)
            .with_datatype(datatype_byte(doc.info.datatype, doc.info.compression));

        let response = self.execute_checked(&command, format!("Failed to store {}", doc.info.id))?;
        let mut info = MutationInfo {
            cas: response.cas(),
            ..MutationInfo::default()
        };
        read_seqno_extras(&response, &mut info, "store")?;
        Ok(info)
    }

    pub fn increment(&mut self, key: &str, delta: u64, initial: u64, expiry: u32) -> Result<u64> {
        self.incr_decr(Opcode::Increment, key, delta, initial, expiry)
            .map(|(value, _)| value)
    }

    pub fn decrement(&mut self, key: &str, delta: u64, initial: u64, expiry: u32) -> Result<u64> {
        self.incr_decr(Opcode::Decrement, key, delta, initial, expiry)
            .map(|(value, _)| value)
    }

    /// Increment, also returning cas and (if present) uuid + seqno
    pub fn increment_with_info(&mut self, key: &str, delta: u64, initial: u64, expiry: u32) -> Result<(u64, MutationInfo)> {
        self.incr_decr(Opcode::Increment, key, delta, initial, expiry)
    }

    pub fn decrement_with_info(&mut self, key: &str, delta: u64, initial: u64, expiry: u32) -> Result<(u64, MutationInfo)> {
        self.incr_decr(Opcode::Decrement, key, delta, initial, expiry)
    }

    fn incr_decr(&mut self, opcode: Opcode, key: &str, delta: u64, initial: u64, expiry: u32) -> Result<(u64, MutationInfo)> {
        let command = Command::counter(opcode, key, delta, initial, expiry);
        let verb = if opcode == Opcode::Increment { "incr" } else { "decr" };
        let response = self.execute_checked(&command, format!("{} \"{}\" failed.", verb, key))?;

        let mut info = MutationInfo {
            cas: response.cas(),
            ..MutationInfo::default()
        };
        read_seqno_extras(&response, &mut info, verb)?;

        let mut value = response.value();
        if value.len() != 8 {
            return Err(BinkvError::Protocol(format!(
                "{} response: expected 8 byte counter, got {} bytes",
                verb,
                value.len()
            )));
        }
        Ok((value.get_u64(), info))
    }

    // =========================================================================
    // Server control
    // =========================================================================

    pub fn ioctl_get(&mut self, key: &str) -> Result<String> {
        let command = Command::new(Opcode::IoctlGet).with_key(key);
        let response = self.execute_checked(&command, format!("ioctl_get \"{}\" failed.", key))?;
        Ok(String::from_utf8_lossy(response.value()).into_owned())
    }

    pub fn ioctl_set(&mut self, key: &str, value: &str) -> Result<()> {
        let command = Command::new(Opcode::IoctlSet).with_key(key).with_value(value);
        self.execute_checked(&command, format!("ioctl_set \"{}\" failed.", key))?;
        Ok(())
    }

    pub fn reload_audit_configuration(&mut self) -> Result<()> {
        self.execute_checked(
            &Command::new(Opcode::AuditConfigReload),
            "Failed to reload audit configuration",
        )?;
        Ok(())
    }

    /// Program the ewouldblock test engine to inject `err_code` failures
    /// for the calls selected by `mode` and `value`.
    ///
    /// Extras: inject error (4) + mode (4) + value (4), all big-endian.
    pub fn configure_ewouldblock_engine(
        &mut self,
        mode: EwouldblockMode,
        err_code: u32,
        value: u32,
        key: &str,
    ) -> Result<()> {
        let mut extras = Vec::with_capacity(EWOULDBLOCK_EXTRAS_LENGTH);
        extras.put_u32(err_code);
        extras.put_u32(mode as u32);
        extras.put_u32(value);

        let command = Command::new(Opcode::EwouldblockCtl).with_extras(extras).with_key(key);
        self.execute_checked(&command, "Failed to configure ewouldblock engine")?;
        Ok(())
    }

    /// Round-trip a no-op, failing on anything but success
    pub fn noop(&mut self) -> Result<()> {
        self.execute_checked(&Command::new(Opcode::Noop), "Noop failed")?;
        Ok(())
    }
}

/// Fill uuid + seqno from 16-byte extras; empty extras leave them unset
fn read_seqno_extras(response: &Response, info: &mut MutationInfo, what: &str) -> Result<()> {
    let mut extras = response.extras();
    match extras.len() {
        0 => Ok(()),
        SEQNO_EXTRAS_LENGTH => {
            info.vbucket_uuid = Some(extras.get_u64());
            info.seqno = Some(extras.get_u64());
            Ok(())
        }
        other => Err(BinkvError::Protocol(format!(
            "Unknown extras size {} returned from {}",
            other, what
        ))),
    }
}
