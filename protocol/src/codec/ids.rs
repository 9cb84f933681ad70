//! Fixed-width identifiers: asset, transaction and chain IDs, owner
//! addresses, codec versions and UTXO IDs.
//!
//! The 32-byte IDs render as CB58 strings (the ecosystem's display form) and
//! compare by raw bytes. [`Address`] renders as `0x`-prefixed hex.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::CodecError;
use super::primitives::{write_u32_be, Decode, Encode, Reader};
use crate::config::{
    ADDRESS_LEN, ASSET_ID_LEN, CHAIN_ID_LEN, CHECKSUM_LEN, CODEC_ONE, CODEC_ZERO, TX_ID_LEN,
    UTXO_ID_LEN,
};
use crate::crypto::hash::{base58_decode, cb58_decode, cb58_encode, validate_checksum};

/// Implements `Serialize`/`Deserialize` through `Display`/`FromStr`.
macro_rules! serde_via_str {
    ($name:ident) => {
        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Defines a 32-byte opaque identifier with CB58 display form.
macro_rules! id32 {
    ($(#[$meta:meta])* $name:ident, $len:expr, $what:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name([u8; $len]);

        impl $name {
            pub const ZERO: Self = Self([0u8; $len]);

            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Builds the ID from a slice, rejecting any other length.
            pub fn from_slice(bytes: &[u8]) -> Result<Self, CodecError> {
                let arr: [u8; $len] = bytes.try_into().map_err(|_| CodecError::InvalidLength {
                    what: $what,
                    expected: $len,
                    got: bytes.len(),
                })?;
                Ok(Self(arr))
            }

            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&cb58_encode(&self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), hex::encode(&self.0[..6]))
            }
        }

        impl FromStr for $name {
            type Err = CodecError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_slice(&cb58_decode(s)?)
            }
        }

        impl Encode for $name {
            fn encode(&self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.0);
            }
        }

        impl Decode for $name {
            fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
                Ok(Self(r.read_array()?))
            }
        }

        serde_via_str!($name);
    };
}

id32!(
    /// 32-byte asset identifier. Immutable; equality is byte equality.
    AssetId,
    ASSET_ID_LEN,
    "asset ID"
);

id32!(
    /// 32-byte ID of the transaction that produced an output.
    TxId,
    TX_ID_LEN,
    "transaction ID"
);

id32!(
    /// 32-byte blockchain identifier (source/destination/own chain).
    ChainId,
    CHAIN_ID_LEN,
    "chain ID"
);

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 20-byte spend authority: an owner short ID on the UTXO chain or an
/// account address on the EVM chain.
///
/// Ordering is raw byte order, which is the canonical order for owner lists.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, CodecError> {
        let arr: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|_| CodecError::InvalidLength {
            what: "address",
            expected: ADDRESS_LEN,
            got: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Lower-case hex without prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", self.to_hex())
    }
}

impl FromStr for Address {
    type Err = CodecError;

    /// Accepts hex with or without a `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(trimmed).map_err(|e| CodecError::Hex(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl Encode for Address {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0);
    }
}

impl Decode for Address {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self(r.read_array()?))
    }
}

serde_via_str!(Address);

// ---------------------------------------------------------------------------
// CodecId
// ---------------------------------------------------------------------------

/// Selects which of the two type-tag numbering schemes an entity uses.
///
/// Not serialized on the entity itself; it is implied by the tag that was
/// read, or chosen by the caller before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CodecId {
    #[default]
    Zero,
    One,
}

impl CodecId {
    pub fn as_u16(self) -> u16 {
        match self {
            Self::Zero => CODEC_ZERO,
            Self::One => CODEC_ONE,
        }
    }

    /// Picks the tag for this codec from a `(codec zero, codec one)` pair.
    pub fn pick(self, ids: (u32, u32)) -> u32 {
        match self {
            Self::Zero => ids.0,
            Self::One => ids.1,
        }
    }
}

impl TryFrom<u16> for CodecId {
    type Error = CodecError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            CODEC_ZERO => Ok(Self::Zero),
            CODEC_ONE => Ok(Self::One),
            other => Err(CodecError::InvalidCodecId(other)),
        }
    }
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

// ---------------------------------------------------------------------------
// UtxoId
// ---------------------------------------------------------------------------

/// `txID || outputIndex`: the identity of a UTXO.
///
/// The derived ordering (tx ID bytes, then index) is identical to comparing
/// the 36 raw bytes, because the index is big-endian on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct UtxoId {
    pub tx_id: TxId,
    pub output_index: u32,
}

impl UtxoId {
    pub fn new(tx_id: TxId, output_index: u32) -> Self {
        Self {
            tx_id,
            output_index,
        }
    }

    /// The raw 36-byte form.
    pub fn to_array(&self) -> [u8; UTXO_ID_LEN] {
        let mut out = [0u8; UTXO_ID_LEN];
        out[..TX_ID_LEN].copy_from_slice(self.tx_id.as_bytes());
        out[TX_ID_LEN..].copy_from_slice(&self.output_index.to_be_bytes());
        out
    }

    fn from_raw(raw: &[u8]) -> Result<Self, CodecError> {
        let mut r = Reader::new(raw);
        Self::decode(&mut r)
    }
}

impl fmt::Display for UtxoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&cb58_encode(&self.to_array()))
    }
}

impl fmt::Debug for UtxoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UtxoId({:?}:{})", self.tx_id, self.output_index)
    }
}

impl FromStr for UtxoId {
    type Err = CodecError;

    /// Accepts the checksummed 40-byte form and the bare 36-byte form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = base58_decode(s)?;
        match raw.len() {
            n if n == UTXO_ID_LEN + CHECKSUM_LEN => {
                if !validate_checksum(&raw) {
                    return Err(CodecError::Checksum);
                }
                Self::from_raw(&raw[..UTXO_ID_LEN])
            }
            UTXO_ID_LEN => Self::from_raw(&raw),
            other => Err(CodecError::InvalidUtxoId(other)),
        }
    }
}

impl Encode for UtxoId {
    fn encode(&self, out: &mut Vec<u8>) {
        self.tx_id.encode(out);
        write_u32_be(out, self.output_index);
    }
}

impl Decode for UtxoId {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let tx_id = TxId::decode(r)?;
        let output_index = r.read_u32()?;
        Ok(Self {
            tx_id,
            output_index,
        })
    }
}

serde_via_str!(UtxoId);
