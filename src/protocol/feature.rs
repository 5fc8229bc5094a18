//! Capability negotiation codes
//!
//! The hello command carries requested features as a sequence of 2-byte
//! big-endian codes and the server answers with the subset it enabled.

use std::fmt;

use bytes::{Buf, BufMut};

use crate::error::{BinkvError, Result};

/// Negotiable features, in canonical (wire code) order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum Feature {
    Datatype = 0x0001,
    TcpNodelay = 0x0003,
    MutationSeqno = 0x0004,
    Xattr = 0x0006,
}

impl Feature {
    pub const ALL: [Feature; 4] = [
        Feature::Datatype,
        Feature::TcpNodelay,
        Feature::MutationSeqno,
        Feature::Xattr,
    ];

    pub fn from_u16(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|feature| *feature as u16 == code)
    }

    pub fn code(&self) -> u16 {
        *self as u16
    }

    pub fn name(&self) -> &'static str {
        match self {
            Feature::Datatype => "datatype",
            Feature::TcpNodelay => "tcp nodelay",
            Feature::MutationSeqno => "mutation seqno",
            Feature::Xattr => "xattr",
        }
    }

    fn bit(&self) -> u8 {
        match self {
            Feature::Datatype => 1 << 0,
            Feature::TcpNodelay => 1 << 1,
            Feature::MutationSeqno => 1 << 2,
            Feature::Xattr => 1 << 3,
        }
    }
}

/// Set of features, indexed by [`Feature`] rather than position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FeatureSet {
    bits: u8,
}

impl FeatureSet {
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    pub fn all() -> Self {
        Feature::ALL.into_iter().collect()
    }

    pub fn contains(&self, feature: Feature) -> bool {
        self.bits & feature.bit() != 0
    }

    pub fn insert(&mut self, feature: Feature) {
        self.bits |= feature.bit();
    }

    pub fn remove(&mut self, feature: Feature) {
        self.bits &= !feature.bit();
    }

    /// Copy with `feature` switched on or off
    pub fn with(mut self, feature: Feature, enabled: bool) -> Self {
        if enabled {
            self.insert(feature);
        } else {
            self.remove(feature);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn is_subset(&self, other: &FeatureSet) -> bool {
        self.bits & !other.bits == 0
    }

    /// Members in canonical order
    pub fn iter(&self) -> impl Iterator<Item = Feature> + '_ {
        Feature::ALL.into_iter().filter(move |feature| self.contains(*feature))
    }
}

impl FromIterator<Feature> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        let mut set = FeatureSet::empty();
        for feature in iter {
            set.insert(feature);
        }
        set
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|feature| feature.name()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// Encode the requested features as the hello value
pub fn encode_features(requested: FeatureSet) -> Vec<u8> {
    let mut value = Vec::with_capacity(requested.len() * 2);
    for feature in requested.iter() {
        value.put_u16(feature.code());
    }
    value
}

/// Decode the server's hello value into the granted set.
///
/// Fails on an odd-length value, an unknown code, or a code that was not
/// requested. The result is always a subset of `requested`.
pub fn decode_features(value: &[u8], requested: FeatureSet) -> Result<FeatureSet> {
    if value.len() % 2 != 0 {
        return Err(BinkvError::Protocol(format!(
            "Invalid hello response: odd body length {}",
            value.len()
        )));
    }

    let mut granted = FeatureSet::empty();
    let mut buf = value;
    while buf.has_remaining() {
        let code = buf.get_u16();
        let feature = Feature::from_u16(code).ok_or_else(|| {
            BinkvError::Protocol(format!("Unsupported feature returned: 0x{:04x}", code))
        })?;
        if !requested.contains(feature) {
            return Err(BinkvError::Protocol(format!(
                "Server enabled unrequested feature: {}",
                feature.name()
            )));
        }
        granted.insert(feature);
    }

    Ok(granted)
}
