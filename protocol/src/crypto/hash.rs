//! # Hashing & Checksummed Encodings
//!
//! SHA-256 is the only hash the atomic codec needs. It shows up in three
//! places:
//!
//! - **Signing**: signers sign `SHA-256(unsigned tx bytes)`.
//! - **Transaction IDs**: `SHA-256(signed tx bytes)`.
//! - **CB58**: base-58 of `payload || SHA-256(payload)[28..32]`, the string
//!   form for UTXO IDs, asset IDs, chain IDs and whole UTXOs.
//!
//! Plain base-58 helpers are exposed as well because a UTXO ID string is
//! allowed to carry no checksum at all (see [`crate::codec::ids::UtxoId`]).

use sha2::{Digest, Sha256};

use crate::codec::error::CodecError;
use crate::config::CHECKSUM_LEN;

/// Compute the SHA-256 hash of the input data.
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Same as [`sha256`] but returns a fixed-size array.
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// The CB58 checksum: the last four bytes of `SHA-256(payload)`.
pub fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = sha256_array(payload);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[32 - CHECKSUM_LEN..]);
    out
}

/// Returns `true` when the trailing four bytes of `data` are the checksum of
/// everything before them.
pub fn validate_checksum(data: &[u8]) -> bool {
    if data.len() < CHECKSUM_LEN {
        return false;
    }
    let (payload, sum) = data.split_at(data.len() - CHECKSUM_LEN);
    checksum(payload) == sum
}

/// Appends the checksum to `payload`.
pub fn add_checksum(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    out.extend_from_slice(payload);
    out.extend_from_slice(&checksum(payload));
    out
}

/// Plain base-58 (Bitcoin alphabet), no checksum.
pub fn base58_encode(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

/// Decodes plain base-58.
pub fn base58_decode(s: &str) -> Result<Vec<u8>, CodecError> {
    bs58::decode(s)
        .into_vec()
        .map_err(|e| CodecError::Base58(e.to_string()))
}

/// CB58: base-58 of `payload || checksum(payload)`.
///
/// # Example
///
/// ```
/// use atomic_protocol::crypto::hash::{cb58_decode, cb58_encode};
///
/// let s = cb58_encode(b"atomic");
/// assert_eq!(cb58_decode(&s).unwrap(), b"atomic");
/// ```
pub fn cb58_encode(payload: &[u8]) -> String {
    base58_encode(&add_checksum(payload))
}

/// Decodes CB58 and strips the checksum.
///
/// # Errors
///
/// [`CodecError::Base58`] for non-base-58 input, [`CodecError::Checksum`] when
/// the decoded bytes are too short or the checksum does not match.
pub fn cb58_decode(s: &str) -> Result<Vec<u8>, CodecError> {
    let raw = base58_decode(s)?;
    if !validate_checksum(&raw) {
        return Err(CodecError::Checksum);
    }
    Ok(raw[..raw.len() - CHECKSUM_LEN].to_vec())
}
