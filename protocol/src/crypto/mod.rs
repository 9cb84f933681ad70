//! # Cryptographic Helpers
//!
//! Hashing and checksummed encodings, plus the trait seam behind which the
//! external signer lives. No private key ever enters this crate.

pub mod hash;
pub mod signer;

pub use hash::{cb58_decode, cb58_encode, checksum, sha256, sha256_array};
pub use signer::{KeyHandle, Signer};
