//! Structured (non-wire) field encodings.
//!
//! The JSON form of the model is for persistence and debugging only; it is
//! never hashed or signed. Each field declares how its bytes are rendered:
//!
//! | Encoding   | Rendering                                        |
//! |------------|--------------------------------------------------|
//! | `Hex`      | `0x`-prefixed lower-case hex                     |
//! | `Decimal`  | big-endian unsigned integer (≤ 8 bytes) in base 10 |
//! | `Cb58`     | base-58 with a 4-byte SHA-256 checksum           |
//! | `Base58`   | plain base-58                                    |
//! | `Utf8`     | the bytes as a UTF-8 string                      |
//!
//! The `with`-modules at the bottom plug these into serde derives.

use serde::{Deserialize, Serialize};

use super::error::CodecError;
use crate::crypto::hash::{base58_decode, base58_encode, cb58_decode, cb58_encode};

/// How a byte field is represented in structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Hex,
    Decimal,
    Cb58,
    Base58,
    Utf8,
}

/// Renders `bytes` with the given encoding.
pub fn encode_field(bytes: &[u8], encoding: Encoding) -> Result<String, CodecError> {
    match encoding {
        Encoding::Hex => Ok(format!("0x{}", hex::encode(bytes))),
        Encoding::Decimal => {
            if bytes.len() > 8 {
                return Err(CodecError::Encoding(format!(
                    "decimal encoding supports at most 8 bytes, got {}",
                    bytes.len()
                )));
            }
            let mut padded = [0u8; 8];
            padded[8 - bytes.len()..].copy_from_slice(bytes);
            Ok(u64::from_be_bytes(padded).to_string())
        }
        Encoding::Cb58 => Ok(cb58_encode(bytes)),
        Encoding::Base58 => Ok(base58_encode(bytes)),
        Encoding::Utf8 => String::from_utf8(bytes.to_vec())
            .map_err(|e| CodecError::Encoding(e.to_string())),
    }
}

/// Parses a field rendered by [`encode_field`].
///
/// `Decimal` always decodes to eight big-endian bytes.
pub fn decode_field(s: &str, encoding: Encoding) -> Result<Vec<u8>, CodecError> {
    match encoding {
        Encoding::Hex => {
            let trimmed = s.strip_prefix("0x").unwrap_or(s);
            hex::decode(trimmed).map_err(|e| CodecError::Hex(e.to_string()))
        }
        Encoding::Decimal => s
            .parse::<u64>()
            .map(|v| v.to_be_bytes().to_vec())
            .map_err(|e| CodecError::Encoding(format!("invalid decimal {:?}: {}", s, e))),
        Encoding::Cb58 => cb58_decode(s),
        Encoding::Base58 => base58_decode(s),
        Encoding::Utf8 => Ok(s.as_bytes().to_vec()),
    }
}

/// Serde helper: `u64` as a decimal string (JSON numbers lose precision
/// above 2^53 in most consumers).
pub mod decimal_u64 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Serde helper: raw bytes as `0x`-prefixed hex.
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{decode_field, Encoding};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        decode_field(&s, Encoding::Hex).map_err(serde::de::Error::custom)
    }
}

/// Serde helper: fixed-size byte arrays (signatures) as `0x`-prefixed hex.
pub mod hex_array {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{decode_field, Encoding};

    pub fn serialize<S: Serializer, const N: usize>(
        bytes: &[u8; N],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(
        deserializer: D,
    ) -> Result<[u8; N], D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = decode_field(&s, Encoding::Hex).map_err(serde::de::Error::custom)?;
        let len = bytes.len();
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::invalid_length(len, &"a fixed-size hex string"))
    }
}
