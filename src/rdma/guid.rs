//! Node GUIDs and link-layer EUI-64 extraction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of an IPoIB link-layer address: 4 bytes of flags and QPN, then the
/// 16-byte port GID.
pub const INFINIBAND_ADDR_LEN: usize = 20;

/// Node GUID parse error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuidParseError {
    /// A character that is neither `:` nor a hexadecimal digit.
    #[error("invalid character {ch:?} at position {pos}")]
    InvalidDigit { ch: char, pos: usize },

    /// The hex digits did not add up to exactly 8 bytes.
    #[error("expected 16 hex digits, found {0}")]
    InvalidLength(usize),
}

/// A 64-bit globally unique identifier assigned to an RDMA device node.
///
/// Sysfs prints it as four colon-separated 16-bit groups
/// (`0002:c903:0033:1a84`); colons are ignored when parsing, so the
/// per-byte form (`00:02:c9:03:00:33:1a:84`) is accepted as well.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct NodeGuid(pub [u8; 8]);

impl NodeGuid {
    /// Parse the content of a `node_guid` file.
    ///
    /// One trailing newline is stripped. Every other character must be a
    /// hex digit or a `:` separator, and there must be exactly 16 digits.
    pub fn parse(text: &str) -> Result<Self, GuidParseError> {
        let text = text.strip_suffix('\n').unwrap_or(text);

        let mut raw = [0u8; 8];
        let mut nibbles = 0usize;
        for (pos, ch) in text.chars().enumerate() {
            if ch == ':' {
                continue;
            }
            let digit = ch
                .to_digit(16)
                .ok_or(GuidParseError::InvalidDigit { ch, pos })? as u8;
            if let Some(byte) = raw.get_mut(nibbles / 2) {
                if nibbles % 2 == 0 {
                    *byte = digit << 4;
                } else {
                    *byte |= digit;
                }
            }
            nibbles += 1;
        }

        if nibbles != 16 {
            return Err(GuidParseError::InvalidLength(nibbles));
        }
        Ok(Self(raw))
    }

    /// Get the raw bytes.
    #[inline]
    pub fn octets(&self) -> [u8; 8] {
        self.0
    }
}

impl fmt::Display for NodeGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Debug for NodeGuid {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeGuid").field(&self.to_string()).finish()
    }
}

impl FromStr for NodeGuid {
    type Err = GuidParseError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<[u8; 8]> for NodeGuid {
    #[inline]
    fn from(raw: [u8; 8]) -> Self {
        Self(raw)
    }
}

impl From<NodeGuid> for [u8; 8] {
    #[inline]
    fn from(guid: NodeGuid) -> Self {
        guid.0
    }
}

impl From<NodeGuid> for u64 {
    #[inline]
    fn from(guid: NodeGuid) -> Self {
        u64::from_be_bytes(guid.0)
    }
}

impl Serialize for NodeGuid {
    #[inline]
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeGuid {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <std::borrow::Cow<'de, str> as Deserialize<'de>>::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Get the EUI-64 carried in the trailing 8 bytes of a link-layer address.
///
/// Returns `None` if the address is shorter than an InfiniBand address, in
/// which case it cannot carry a port GID.
pub fn hardware_eui(hw_addr: &[u8]) -> Option<[u8; 8]> {
    if hw_addr.len() < INFINIBAND_ADDR_LEN {
        return None;
    }
    let mut eui = [0u8; 8];
    eui.copy_from_slice(&hw_addr[hw_addr.len() - 8..]);
    Some(eui)
}
