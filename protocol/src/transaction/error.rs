//! Transaction-level errors.

use thiserror::Error;

use crate::codec::error::CodecError;
use crate::codec::ids::Address;

/// Errors raised while assembling, validating or signing a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxError {
    /// Two EVM outputs credit the same (address, asset) pair.
    #[error("EVM output error: {0}")]
    EvmOutput(String),

    /// The native-asset surplus of an import does not cover its fee.
    #[error("insufficient fee: required {required}, provided {provided}")]
    EvmFee { required: u64, provided: u64 },

    /// The signer holds no key for a required address.
    #[error("no signing key for address {address}")]
    MissingKey { address: Address },

    /// A sig index carries no source address, so nobody can sign for it.
    #[error("signature index {index} has no source address")]
    MissingSource { index: u32 },

    #[error("signing failed: {0}")]
    Sign(String),

    #[error("amount overflow")]
    Overflow,

    #[error(transparent)]
    Codec(#[from] CodecError),
}
