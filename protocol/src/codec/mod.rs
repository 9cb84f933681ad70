//! # Binary Codec
//!
//! The primitives every wire type is built from: big-endian fixed-width
//! integers, a forward-only [`Reader`], the [`Encode`]/[`Decode`] traits,
//! fixed-width identifiers, and the structured (JSON) field encodings.
//!
//! All integers on the wire are big-endian. Every polymorphic entity is
//! preceded by a 4-byte type tag; the tag is always read first and an
//! unknown tag is a fatal decode error.

pub mod error;
pub mod ids;
pub mod primitives;
pub mod serialization;

pub use error::CodecError;
pub use ids::{Address, AssetId, ChainId, CodecId, TxId, UtxoId};
pub use primitives::{copy_range, read_u32_be, Decode, Encode, Reader};
pub use serialization::{decode_field, encode_field, Encoding};
