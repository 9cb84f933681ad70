//! # Transaction Module
//!
//! The object model of atomic transactions and its canonical binary form.
//!
//! ## Architecture
//!
//! ```text
//! credential.rs  SigIdx, SigIndexList, Signature, Credential
//! output.rs      OutputOwners, the tagged Output variants, TransferableOutput, EvmOutput
//! input.rs       SecpTransferInput, TransferableInput, EvmInput
//! operation.rs   mint/NFT operations and TransferableOperation
//! base.rs        network and chain header shared by every tx
//! import.rs      ImportTx and its output/fee validation
//! export.rs      ExportTx
//! unsigned.rs    EvmTx, UnsignedTx, Tx and signing
//! error.rs       TxError
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Build**: usually via [`crate::utxo::builder`], which selects UTXOs
//!    and attaches a SigIdx per required signer.
//! 2. **Sign**: [`UnsignedTx::sign`] hashes the unsigned bytes once and
//!    collects one [`Credential`] per input.
//! 3. **Serialize**: [`Tx`] encodes to bytes or a CB58 string.
//!
//! ## Canonical order
//!
//! Lists that reach the wire are sorted before encoding. Each sortable type
//! exposes `canonical_cmp` for use with `sort_by`: inputs by UTXO ID, EVM
//! inputs/outputs by (address, asset), transferable outputs and operations by
//! their serialized bytes.

pub mod base;
pub mod credential;
pub mod error;
pub mod export;
pub mod import;
pub mod input;
pub mod operation;
pub mod output;
pub mod unsigned;

pub use base::BaseTx;
pub use credential::{select_credential, Credential, CredentialKind, SigIdx, SigIndexList, Signature};
pub use error::TxError;
pub use export::ExportTx;
pub use import::{validate_outs, FeeRequirement, ImportTx};
pub use input::{select_input, EvmInput, Input, SecpTransferInput, TransferableInput};
pub use operation::{
    select_operation, NftMintOperation, NftTransferOperation, Operation, SecpMintOperation,
    TransferableOperation,
};
pub use output::{
    select_output, EvmOutput, NftMintOutput, NftTransferOutput, Output, OutputOwners,
    SecpMintOutput, SecpTransferOutput, TransferableOutput,
};
pub use unsigned::{EvmTx, Tx, UnsignedTx};
