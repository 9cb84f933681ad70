//! Decode and construction errors for the binary codec.
//!
//! Every failure while reading bytes or converting between polymorphic
//! variants surfaces as a [`CodecError`]. None of them are retryable: the
//! input is malformed or the caller asked for the wrong variant.

use thiserror::Error;

/// Errors raised by the binary codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A read or slice ran past the end of the buffer.
    #[error("buffer too short at offset {offset}: need {needed} bytes, {available} available")]
    Truncated {
        /// Offset the read started at.
        offset: usize,
        /// Bytes the read required.
        needed: usize,
        /// Bytes left in the buffer from `offset`.
        available: usize,
    },

    /// `copy_range` was given an inverted or out-of-bounds range.
    #[error("range {start}..{end} out of bounds for buffer of length {len}")]
    Range { start: usize, end: usize, len: usize },

    #[error("unknown output ID: {0}")]
    UnknownOutputId(u32),

    #[error("unknown input ID: {0}")]
    UnknownInputId(u32),

    #[error("unknown operation ID: {0}")]
    UnknownOperationId(u32),

    #[error("unknown credential ID: {0}")]
    UnknownCredentialId(u32),

    #[error("unknown transaction type ID: {0}")]
    UnknownTxTypeId(u32),

    /// Only codec versions 0 and 1 exist.
    #[error("invalid codec ID: {0} (expected 0 or 1)")]
    InvalidCodecId(u16),

    /// A fixed-width field decoded to the wrong number of bytes.
    #[error("invalid {what} length: expected {expected}, got {got}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    /// A UTXO ID string decoded to neither 36 nor 40 bytes.
    #[error("invalid UTXO ID: decoded to {0} bytes (expected 36, or 40 with checksum)")]
    InvalidUtxoId(usize),

    #[error("invalid checksum")]
    Checksum,

    #[error("invalid base-58: {0}")]
    Base58(String),

    #[error("invalid hex: {0}")]
    Hex(String),

    /// A polymorphic value was not the concrete variant the caller needed.
    #[error("expected {expected}, found {found}")]
    WrongVariant {
        expected: &'static str,
        found: &'static str,
    },

    /// An owner list is not strictly ascending, or the threshold exceeds it.
    #[error("invalid owners: {0}")]
    InvalidOwners(String),

    /// A UTXO ID list is not strictly ascending.
    #[error("UTXO IDs must be sorted and unique")]
    UnsortedUtxoIds,

    /// A structured (non-wire) field could not be encoded or decoded.
    #[error("field encoding error: {0}")]
    Encoding(String),

    /// An exact decode finished before the end of the buffer.
    #[error("trailing bytes: consumed {consumed} of {total}")]
    TrailingBytes { consumed: usize, total: usize },
}
