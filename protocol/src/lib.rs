// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Atomic Protocol: Core Library
//!
//! The deterministic binary codec and object model for atomic cross-chain
//! transactions between an asset-transfer chain and an EVM chain.
//!
//! ## Architecture
//!
//! - **config**: wire constants (type IDs per codec, lengths, chain IDs) and
//!   the builder configuration.
//! - **crypto**: SHA-256, CB58, and the external signer seam.
//! - **codec**: big-endian primitives, the `Encode`/`Decode` traits and
//!   fixed-width identifiers.
//! - **transaction**: outputs, inputs, operations, credentials, and the
//!   import/export envelopes.
//! - **utxo**: the UTXO set, coin selection, and transaction builders.
//! - **logging**: optional subscriber setup for hosts.
//!
//! ## Ground rules
//!
//! 1. Every byte that is hashed or signed comes from `Encode`; the JSON form
//!    is for humans only.
//! 2. Lists are sorted into canonical order before they reach the wire.
//! 3. Decoding is all-or-nothing: an error never yields a half-built value.
//! 4. Amounts are `u64` with checked arithmetic.

pub mod codec;
pub mod config;
pub mod crypto;
pub mod logging;
pub mod transaction;
pub mod utxo;
