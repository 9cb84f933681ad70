//! # External Signer Interface
//!
//! Key management lives outside this crate. The codec only needs two things
//! from whoever holds the keys: find the key behind an owner address, and
//! produce a 65-byte recoverable signature over a message.
//!
//! Implementations may wrap a hardware wallet, a remote signing service or
//! an in-memory keychain. If the real signer is asynchronous, the host blocks
//! on it inside [`KeyHandle::sign`]; signature order is fixed by the caller
//! (SigIdx order), not by completion order.

use crate::codec::ids::Address;
use crate::transaction::credential::Signature;

/// A single key able to sign on behalf of one address.
pub trait KeyHandle {
    /// Signs `message` (the 32-byte SHA-256 digest of the unsigned tx).
    ///
    /// Errors are returned as strings because they come from arbitrary
    /// foreign backends.
    fn sign(&self, message: &[u8]) -> Result<Signature, String>;
}

/// Looks up signing keys by owner address.
pub trait Signer {
    type Key: KeyHandle;

    /// Returns the key controlling `address`, or `None` if this signer does
    /// not hold it.
    fn key_for(&self, address: &Address) -> Option<&Self::Key>;

    /// Returns `true` if the signer holds a key for `address`.
    fn has_key(&self, address: &Address) -> bool {
        self.key_for(address).is_some()
    }
}
