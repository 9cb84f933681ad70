//! Input model.
//!
//! [`SecpTransferInput`] spends an amount-bearing UTXO and names its signers
//! with a [`SigIndexList`]. [`TransferableInput`] binds it to the UTXO being
//! spent. [`EvmInput`] debits an EVM account (address, amount, asset, nonce);
//! its signer list is local bookkeeping and never hits the wire.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::credential::{Credential, CredentialKind, SigIndexList};
use crate::codec::error::CodecError;
use crate::codec::ids::{Address, AssetId, CodecId, TxId, UtxoId};
use crate::codec::primitives::{write_u32_be, write_u64_be, Decode, Encode, Reader};
use crate::config::{SECP_INPUT_ID, SECP_INPUT_ID_CODEC_ONE};

// ---------------------------------------------------------------------------
// SecpTransferInput
// ---------------------------------------------------------------------------

/// Spends `amount` from a SECP transfer output.
///
/// Body wire form: `[8B amount][4B count][4B owner index]*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecpTransferInput {
    #[serde(with = "crate::codec::serialization::decimal_u64")]
    pub amount: u64,
    pub sig_idxs: SigIndexList,
    #[serde(default)]
    pub codec: CodecId,
}

impl SecpTransferInput {
    pub fn new(amount: u64) -> Self {
        Self {
            amount,
            sig_idxs: SigIndexList::new(),
            codec: CodecId::Zero,
        }
    }

    pub fn type_id(&self) -> u32 {
        self.codec.pick((SECP_INPUT_ID, SECP_INPUT_ID_CODEC_ONE))
    }

    fn encode_body(&self, out: &mut Vec<u8>) {
        write_u64_be(out, self.amount);
        self.sig_idxs.encode(out);
    }

    pub fn decode_body(r: &mut Reader<'_>, codec: CodecId) -> Result<Self, CodecError> {
        let amount = r.read_u64()?;
        let sig_idxs = SigIndexList::decode(r)?;
        Ok(Self {
            amount,
            sig_idxs,
            codec,
        })
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Any tagged input. Wire form: `[4B type tag][variant body]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Input {
    SecpTransfer(SecpTransferInput),
}

impl Input {
    pub fn type_id(&self) -> u32 {
        match self {
            Self::SecpTransfer(i) => i.type_id(),
        }
    }

    pub fn codec(&self) -> CodecId {
        match self {
            Self::SecpTransfer(i) => i.codec,
        }
    }

    pub fn set_codec_id(&mut self, codec_id: u16) -> Result<(), CodecError> {
        let codec = CodecId::try_from(codec_id)?;
        match self {
            Self::SecpTransfer(i) => i.codec = codec,
        }
        Ok(())
    }

    pub fn amount(&self) -> u64 {
        match self {
            Self::SecpTransfer(i) => i.amount,
        }
    }

    pub fn sig_idxs(&self) -> &SigIndexList {
        match self {
            Self::SecpTransfer(i) => &i.sig_idxs,
        }
    }

    /// Adds a signer slot for owner position `index` held by `address`.
    /// Returns the new signature count.
    pub fn add_signature_idx(&mut self, index: u32, address: Address) -> usize {
        match self {
            Self::SecpTransfer(i) => i.sig_idxs.add(index, address),
        }
    }

    /// An empty credential of the kind and codec this input needs.
    pub fn credential(&self) -> Credential {
        match self {
            Self::SecpTransfer(i) => Credential::new(CredentialKind::Secp, i.codec),
        }
    }

    /// Signature cost under a flat per-signature fee schedule.
    pub fn cost(&self, cost_per_signature: u64) -> u64 {
        (self.sig_idxs().len() as u64).saturating_mul(cost_per_signature)
    }
}

impl Encode for Input {
    fn encode(&self, out: &mut Vec<u8>) {
        write_u32_be(out, self.type_id());
        match self {
            Self::SecpTransfer(i) => i.encode_body(out),
        }
    }
}

impl Decode for Input {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let type_id = r.read_u32()?;
        let mut input = select_input(type_id, 0)?;
        match &mut input {
            Self::SecpTransfer(i) => *i = SecpTransferInput::decode_body(r, i.codec)?,
        }
        Ok(input)
    }
}

/// Constructs an input of the variant named by `type_id`.
pub fn select_input(type_id: u32, amount: u64) -> Result<Input, CodecError> {
    let codec = match type_id {
        SECP_INPUT_ID => CodecId::Zero,
        SECP_INPUT_ID_CODEC_ONE => CodecId::One,
        other => return Err(CodecError::UnknownInputId(other)),
    };
    let mut input = SecpTransferInput::new(amount);
    input.codec = codec;
    Ok(Input::SecpTransfer(input))
}

// ---------------------------------------------------------------------------
// TransferableInput
// ---------------------------------------------------------------------------

/// An input bound to the UTXO it spends.
///
/// Wire form: `[32B txID][4B output index][32B assetID][tagged input]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferableInput {
    pub tx_id: TxId,
    pub output_index: u32,
    pub asset_id: AssetId,
    pub input: Input,
}

impl TransferableInput {
    pub fn new(utxo_id: UtxoId, asset_id: AssetId, input: Input) -> Self {
        Self {
            tx_id: utxo_id.tx_id,
            output_index: utxo_id.output_index,
            asset_id,
            input,
        }
    }

    pub fn utxo_id(&self) -> UtxoId {
        UtxoId::new(self.tx_id, self.output_index)
    }

    /// Canonical order: by `txID || outputIndex`.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.utxo_id().cmp(&other.utxo_id())
    }
}

impl Encode for TransferableInput {
    fn encode(&self, out: &mut Vec<u8>) {
        self.tx_id.encode(out);
        write_u32_be(out, self.output_index);
        self.asset_id.encode(out);
        self.input.encode(out);
    }
}

impl Decode for TransferableInput {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let tx_id = TxId::decode(r)?;
        let output_index = r.read_u32()?;
        let asset_id = AssetId::decode(r)?;
        let input = Input::decode(r)?;
        Ok(Self {
            tx_id,
            output_index,
            asset_id,
            input,
        })
    }
}

// ---------------------------------------------------------------------------
// EvmInput
// ---------------------------------------------------------------------------

/// A debit from an EVM account.
///
/// Untagged wire form: `[20B address][8B amount][32B assetID][8B nonce]`.
/// Equality covers the wire fields only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvmInput {
    pub address: Address,
    #[serde(with = "crate::codec::serialization::decimal_u64")]
    pub amount: u64,
    pub asset_id: AssetId,
    #[serde(with = "crate::codec::serialization::decimal_u64")]
    pub nonce: u64,
    #[serde(skip)]
    sig_idxs: SigIndexList,
}

impl PartialEq for EvmInput {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
            && self.amount == other.amount
            && self.asset_id == other.asset_id
            && self.nonce == other.nonce
    }
}

impl Eq for EvmInput {}

impl EvmInput {
    pub fn new(address: Address, amount: u64, asset_id: AssetId, nonce: u64) -> Self {
        Self {
            address,
            amount,
            asset_id,
            nonce,
            sig_idxs: SigIndexList::new(),
        }
    }

    pub fn sig_idxs(&self) -> &SigIndexList {
        &self.sig_idxs
    }

    /// Adds a signer slot. Returns the new signature count.
    pub fn add_signature_idx(&mut self, index: u32, address: Address) -> usize {
        self.sig_idxs.add(index, address)
    }

    /// EVM inputs are always authenticated by a codec-zero SECP credential.
    pub fn credential(&self) -> Credential {
        Credential::new(CredentialKind::Secp, CodecId::Zero)
    }

    pub fn cost(&self, cost_per_signature: u64) -> u64 {
        (self.sig_idxs.len() as u64).saturating_mul(cost_per_signature)
    }

    /// Canonical order: by address, then by asset ID.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.address
            .cmp(&other.address)
            .then_with(|| self.asset_id.cmp(&other.asset_id))
    }
}

impl Encode for EvmInput {
    fn encode(&self, out: &mut Vec<u8>) {
        self.address.encode(out);
        write_u64_be(out, self.amount);
        self.asset_id.encode(out);
        write_u64_be(out, self.nonce);
    }
}

impl Decode for EvmInput {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let address = Address::decode(r)?;
        let amount = r.read_u64()?;
        let asset_id = AssetId::decode(r)?;
        let nonce = r.read_u64()?;
        Ok(Self::new(address, amount, asset_id, nonce))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SECP_CREDENTIAL_ID;

    fn addr(b: u8) -> Address {
        Address::new([b; 20])
    }

    fn xfer_in(tx: u8, idx: u32, amount: u64) -> TransferableInput {
        let mut input = Input::SecpTransfer(SecpTransferInput::new(amount));
        input.add_signature_idx(0, addr(1));
        TransferableInput::new(
            UtxoId::new(TxId::new([tx; 32]), idx),
            AssetId::new([0xAA; 32]),
            input,
        )
    }

    #[test]
    fn test_add_signature_idx_updates_count() {
        let mut input = select_input(SECP_INPUT_ID, 10).unwrap();
        assert_eq!(input.add_signature_idx(0, addr(1)), 1);
        assert_eq!(input.add_signature_idx(2, addr(3)), 2);
        assert_eq!(input.sig_idxs().len(), 2);
        assert_eq!(input.cost(1_000), 2_000);
    }

    #[test]
    fn test_transferable_input_roundtrip() {
        let input = xfer_in(9, 3, 777);
        let bytes = input.to_bytes();
        // txid | idx | asset | tag | amount | count | one index
        assert_eq!(bytes.len(), 32 + 4 + 32 + 4 + 8 + 4 + 4);
        let (decoded, consumed) = TransferableInput::from_bytes_at(&bytes, 0).unwrap();
        assert_eq!(decoded, input);
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn test_codec_one_input_roundtrip() {
        let mut input = xfer_in(1, 0, 5);
        input.input.set_codec_id(1).unwrap();
        let decoded = TransferableInput::from_bytes(&input.to_bytes()).unwrap();
        assert_eq!(decoded.input.type_id(), SECP_INPUT_ID_CODEC_ONE);
        assert_eq!(decoded.input.codec(), CodecId::One);
    }

    #[test]
    fn test_unknown_input_tag_rejected() {
        assert_eq!(
            select_input(0xFFFF_FFFF, 0),
            Err(CodecError::UnknownInputId(0xFFFF_FFFF))
        );
        assert_eq!(
            Input::from_bytes(&0xFFFF_FFFFu32.to_be_bytes()),
            Err(CodecError::UnknownInputId(0xFFFF_FFFF))
        );
    }

    #[test]
    fn test_invalid_codec_id_leaves_input_unchanged() {
        let mut input = select_input(SECP_INPUT_ID, 0).unwrap();
        assert_eq!(input.set_codec_id(3), Err(CodecError::InvalidCodecId(3)));
        assert_eq!(input.codec(), CodecId::Zero);
    }

    #[test]
    fn test_transferable_input_sort_is_idempotent() {
        let mut ins = vec![xfer_in(2, 0, 1), xfer_in(1, 5, 1), xfer_in(1, 2, 1)];
        ins.sort_by(TransferableInput::canonical_cmp);
        let order: Vec<(u8, u32)> = ins
            .iter()
            .map(|i| (i.tx_id.as_bytes()[0], i.output_index))
            .collect();
        assert_eq!(order, vec![(1, 2), (1, 5), (2, 0)]);

        let mut again = ins.clone();
        again.sort_by(TransferableInput::canonical_cmp);
        assert_eq!(again, ins);
    }

    #[test]
    fn test_evm_input_wire_excludes_sig_idxs() {
        let mut input = EvmInput::new(addr(4), 1_000, AssetId::new([1; 32]), 7);
        input.add_signature_idx(0, addr(4));
        let bytes = input.to_bytes();
        assert_eq!(bytes.len(), 20 + 8 + 32 + 8);
        let decoded = EvmInput::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, input);
        assert!(decoded.sig_idxs().is_empty());
        assert_eq!(decoded.nonce, 7);
    }

    #[test]
    fn test_evm_input_credential_is_secp_codec_zero() {
        let input = EvmInput::new(addr(4), 1, AssetId::ZERO, 0);
        assert_eq!(input.credential().type_id(), SECP_CREDENTIAL_ID);
    }
}
