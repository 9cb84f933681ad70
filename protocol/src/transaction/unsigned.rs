//! Unsigned and signed transaction envelopes.
//!
//! ```text
//! UnsignedTx = [2B codecID][4B txTypeID][tx body]
//! Tx         = UnsignedTx [4B numCreds] ([4B credTypeID][credential])*
//! ```
//!
//! Signing is a separate step from building because keys may live in a
//! hardware wallet or a remote service. Every signer signs the same message,
//! `SHA-256(unsigned bytes)`. Credentials are emitted one per input, in input
//! order, with signatures in SigIdx order.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::credential::{Credential, SigIndexList};
use super::error::TxError;
use super::export::ExportTx;
use super::import::ImportTx;
use crate::codec::error::CodecError;
use crate::codec::ids::{CodecId, TxId};
use crate::codec::primitives::{write_u16_be, write_u32_be, Decode, Encode, Reader};
use crate::config::{EXPORT_TX_TYPE_ID, IMPORT_TX_TYPE_ID};
use crate::crypto::hash::{cb58_decode, cb58_encode, sha256_array};
use crate::crypto::signer::{KeyHandle, Signer};

// ---------------------------------------------------------------------------
// EvmTx
// ---------------------------------------------------------------------------

/// The atomic transaction kinds of the EVM chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EvmTx {
    Import(ImportTx),
    Export(ExportTx),
}

impl EvmTx {
    pub fn type_id(&self) -> u32 {
        match self {
            Self::Import(_) => IMPORT_TX_TYPE_ID,
            Self::Export(_) => EXPORT_TX_TYPE_ID,
        }
    }

    /// One empty credential plus the signer list it must be filled from, per
    /// input, in input order.
    fn credential_slots(&self) -> Vec<(Credential, &SigIndexList)> {
        match self {
            Self::Import(tx) => tx
                .imported_inputs
                .iter()
                .map(|i| (i.input.credential(), i.input.sig_idxs()))
                .collect(),
            Self::Export(tx) => tx
                .ins
                .iter()
                .map(|i| (i.credential(), i.sig_idxs()))
                .collect(),
        }
    }
}

impl Encode for EvmTx {
    fn encode(&self, out: &mut Vec<u8>) {
        write_u32_be(out, self.type_id());
        match self {
            Self::Import(tx) => tx.encode(out),
            Self::Export(tx) => tx.encode(out),
        }
    }
}

impl Decode for EvmTx {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        match r.read_u32()? {
            IMPORT_TX_TYPE_ID => Ok(Self::Import(ImportTx::decode(r)?)),
            EXPORT_TX_TYPE_ID => Ok(Self::Export(ExportTx::decode(r)?)),
            other => Err(CodecError::UnknownTxTypeId(other)),
        }
    }
}

// ---------------------------------------------------------------------------
// UnsignedTx
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTx {
    #[serde(default)]
    pub codec: CodecId,
    pub tx: EvmTx,
}

impl UnsignedTx {
    pub fn new(tx: EvmTx) -> Self {
        Self {
            codec: CodecId::Zero,
            tx,
        }
    }

    /// The message every credential signs.
    pub fn signing_hash(&self) -> [u8; 32] {
        sha256_array(&self.to_bytes())
    }

    /// Signs every input with keys from `signer`.
    ///
    /// # Errors
    ///
    /// - [`TxError::MissingSource`] if a sig index was never bound to an
    ///   address (e.g. the transaction was decoded rather than built).
    /// - [`TxError::MissingKey`] if `signer` lacks a required key.
    /// - [`TxError::Sign`] if the key backend fails.
    pub fn sign<S: Signer>(&self, signer: &S) -> Result<Tx, TxError> {
        let message = self.signing_hash();
        let mut credentials = Vec::new();

        for (mut credential, sig_idxs) in self.tx.credential_slots() {
            for sig_idx in sig_idxs.iter() {
                let address = sig_idx.source().ok_or(TxError::MissingSource {
                    index: sig_idx.index,
                })?;
                let key = signer
                    .key_for(address)
                    .ok_or(TxError::MissingKey { address: *address })?;
                let signature = key.sign(&message).map_err(TxError::Sign)?;
                credential.add_signature(signature);
            }
            credentials.push(credential);
        }

        debug!(
            tx_type = self.tx.type_id(),
            credentials = credentials.len(),
            "transaction signed"
        );
        Ok(Tx::new(self.clone(), credentials))
    }
}

impl Encode for UnsignedTx {
    fn encode(&self, out: &mut Vec<u8>) {
        write_u16_be(out, self.codec.as_u16());
        self.tx.encode(out);
    }
}

impl Decode for UnsignedTx {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let codec = CodecId::try_from(r.read_u16()?)?;
        let tx = EvmTx::decode(r)?;
        Ok(Self { codec, tx })
    }
}

// ---------------------------------------------------------------------------
// Tx
// ---------------------------------------------------------------------------

/// A signed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tx {
    pub unsigned: UnsignedTx,
    pub credentials: Vec<Credential>,
}

impl Tx {
    pub fn new(unsigned: UnsignedTx, credentials: Vec<Credential>) -> Self {
        Self {
            unsigned,
            credentials,
        }
    }

    pub fn credentials(&self) -> &[Credential] {
        &self.credentials
    }

    /// `SHA-256` of the signed transaction bytes.
    pub fn tx_id(&self) -> TxId {
        TxId::new(sha256_array(&self.to_bytes()))
    }

    pub fn to_string_cb58(&self) -> String {
        cb58_encode(&self.to_bytes())
    }

    pub fn from_string_cb58(s: &str) -> Result<Self, CodecError> {
        Self::from_bytes(&cb58_decode(s)?)
    }
}

impl Encode for Tx {
    fn encode(&self, out: &mut Vec<u8>) {
        self.unsigned.encode(out);
        write_u32_be(out, self.credentials.len() as u32);
        for credential in &self.credentials {
            credential.encode_tagged(out);
        }
    }
}

impl Decode for Tx {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let unsigned = UnsignedTx::decode(r)?;
        let count = r.read_u32()? as usize;
        let credentials = r.read_n(count, Credential::decode_tagged)?;
        Ok(Self {
            unsigned,
            credentials,
        })
    }
}

impl FromStr for Tx {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string_cb58(s)
    }
}
