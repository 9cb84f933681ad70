//! Operation model.
//!
//! Operations spend mint-right UTXOs rather than balances. Each variant owns
//! its own [`SigIndexList`], written ahead of the variant body:
//!
//! ```text
//! [4B type tag][4B numSigIdx][4B idx]*[variant body]
//! ```

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::credential::{Credential, CredentialKind, SigIndexList};
use super::output::{NftTransferOutput, OutputOwners, SecpMintOutput, SecpTransferOutput};
use crate::codec::error::CodecError;
use crate::codec::ids::{Address, AssetId, CodecId, UtxoId};
use crate::codec::primitives::{
    encode_len_prefixed, encode_vec, write_u32_be, Decode, Encode, Reader,
};
use crate::config::{
    NFT_MINT_OP_ID, NFT_MINT_OP_ID_CODEC_ONE, NFT_XFER_OP_ID, NFT_XFER_OP_ID_CODEC_ONE,
    SECP_MINT_OP_ID, SECP_MINT_OP_ID_CODEC_ONE,
};

// ---------------------------------------------------------------------------
// Variants
// ---------------------------------------------------------------------------

/// Consumes a SECP mint right: re-issues the right and mints new units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecpMintOperation {
    pub sig_idxs: SigIndexList,
    pub mint_output: SecpMintOutput,
    pub transfer_output: SecpTransferOutput,
    #[serde(default)]
    pub codec: CodecId,
}

impl SecpMintOperation {
    pub fn new(mint_output: SecpMintOutput, transfer_output: SecpTransferOutput) -> Self {
        Self {
            sig_idxs: SigIndexList::new(),
            mint_output,
            transfer_output,
            codec: CodecId::Zero,
        }
    }

    fn encode_body(&self, out: &mut Vec<u8>) {
        self.mint_output.encode_body(out);
        self.transfer_output.encode_body(out);
    }

    fn decode_body(r: &mut Reader<'_>, codec: CodecId) -> Result<Self, CodecError> {
        let sig_idxs = SigIndexList::decode(r)?;
        let mint_output = SecpMintOutput::decode_body(r, codec)?;
        let transfer_output = SecpTransferOutput::decode_body(r, codec)?;
        Ok(Self {
            sig_idxs,
            mint_output,
            transfer_output,
            codec,
        })
    }
}

/// Consumes an NFT mint right and mints one payload to each owner group.
///
/// Body: `[4B groupID][4B payloadLen][payload][4B numOwners][owners]*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftMintOperation {
    pub sig_idxs: SigIndexList,
    pub group_id: u32,
    #[serde(with = "crate::codec::serialization::hex_bytes")]
    pub payload: Vec<u8>,
    pub owners: Vec<OutputOwners>,
    #[serde(default)]
    pub codec: CodecId,
}

impl NftMintOperation {
    pub fn new(group_id: u32, payload: Vec<u8>, owners: Vec<OutputOwners>) -> Self {
        Self {
            sig_idxs: SigIndexList::new(),
            group_id,
            payload,
            owners,
            codec: CodecId::Zero,
        }
    }

    fn encode_body(&self, out: &mut Vec<u8>) {
        write_u32_be(out, self.group_id);
        encode_len_prefixed(&self.payload, out);
        encode_vec(&self.owners, out);
    }

    fn decode_body(r: &mut Reader<'_>, codec: CodecId) -> Result<Self, CodecError> {
        let sig_idxs = SigIndexList::decode(r)?;
        let group_id = r.read_u32()?;
        let payload = r.read_len_prefixed()?;
        let owners = r.read_vec()?;
        Ok(Self {
            sig_idxs,
            group_id,
            payload,
            owners,
            codec,
        })
    }
}

/// Moves an NFT to a new owner set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftTransferOperation {
    pub sig_idxs: SigIndexList,
    pub output: NftTransferOutput,
    #[serde(default)]
    pub codec: CodecId,
}

impl NftTransferOperation {
    pub fn new(output: NftTransferOutput) -> Self {
        Self {
            sig_idxs: SigIndexList::new(),
            output,
            codec: CodecId::Zero,
        }
    }

    fn decode_body(r: &mut Reader<'_>, codec: CodecId) -> Result<Self, CodecError> {
        let sig_idxs = SigIndexList::decode(r)?;
        let output = NftTransferOutput::decode_body(r, codec)?;
        Ok(Self {
            sig_idxs,
            output,
            codec,
        })
    }
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// Any tagged operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    SecpMint(SecpMintOperation),
    NftMint(NftMintOperation),
    NftTransfer(NftTransferOperation),
}

impl Operation {
    pub fn type_id(&self) -> u32 {
        match self {
            Self::SecpMint(op) => op.codec.pick((SECP_MINT_OP_ID, SECP_MINT_OP_ID_CODEC_ONE)),
            Self::NftMint(op) => op.codec.pick((NFT_MINT_OP_ID, NFT_MINT_OP_ID_CODEC_ONE)),
            Self::NftTransfer(op) => op.codec.pick((NFT_XFER_OP_ID, NFT_XFER_OP_ID_CODEC_ONE)),
        }
    }

    pub fn codec(&self) -> CodecId {
        match self {
            Self::SecpMint(op) => op.codec,
            Self::NftMint(op) => op.codec,
            Self::NftTransfer(op) => op.codec,
        }
    }

    /// Switches the tag numbering scheme of the operation and of the outputs
    /// it embeds.
    pub fn set_codec_id(&mut self, codec_id: u16) -> Result<(), CodecError> {
        let codec = CodecId::try_from(codec_id)?;
        match self {
            Self::SecpMint(op) => {
                op.codec = codec;
                op.mint_output.codec = codec;
                op.transfer_output.codec = codec;
            }
            Self::NftMint(op) => op.codec = codec,
            Self::NftTransfer(op) => {
                op.codec = codec;
                op.output.codec = codec;
            }
        }
        Ok(())
    }

    pub fn sig_idxs(&self) -> &SigIndexList {
        match self {
            Self::SecpMint(op) => &op.sig_idxs,
            Self::NftMint(op) => &op.sig_idxs,
            Self::NftTransfer(op) => &op.sig_idxs,
        }
    }

    fn sig_idxs_mut(&mut self) -> &mut SigIndexList {
        match self {
            Self::SecpMint(op) => &mut op.sig_idxs,
            Self::NftMint(op) => &mut op.sig_idxs,
            Self::NftTransfer(op) => &mut op.sig_idxs,
        }
    }

    /// Adds a signer slot. Returns the new signature count.
    pub fn add_signature_idx(&mut self, index: u32, address: Address) -> usize {
        self.sig_idxs_mut().add(index, address)
    }

    /// An empty credential of the kind and codec this operation needs.
    pub fn credential(&self) -> Credential {
        let kind = match self {
            Self::SecpMint(_) => CredentialKind::Secp,
            Self::NftMint(_) | Self::NftTransfer(_) => CredentialKind::Nft,
        };
        Credential::new(kind, self.codec())
    }

    /// Canonical order: `type tag || body` compared as raw bytes.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.to_bytes().cmp(&other.to_bytes())
    }
}

impl Encode for Operation {
    fn encode(&self, out: &mut Vec<u8>) {
        write_u32_be(out, self.type_id());
        self.sig_idxs().encode(out);
        match self {
            Self::SecpMint(op) => op.encode_body(out),
            Self::NftMint(op) => op.encode_body(out),
            Self::NftTransfer(op) => op.output.encode_body(out),
        }
    }
}

impl Decode for Operation {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let type_id = r.read_u32()?;
        let codec = operation_codec(type_id)?;
        match type_id {
            SECP_MINT_OP_ID | SECP_MINT_OP_ID_CODEC_ONE => {
                Ok(Self::SecpMint(SecpMintOperation::decode_body(r, codec)?))
            }
            NFT_MINT_OP_ID | NFT_MINT_OP_ID_CODEC_ONE => {
                Ok(Self::NftMint(NftMintOperation::decode_body(r, codec)?))
            }
            NFT_XFER_OP_ID | NFT_XFER_OP_ID_CODEC_ONE => Ok(Self::NftTransfer(
                NftTransferOperation::decode_body(r, codec)?,
            )),
            other => Err(CodecError::UnknownOperationId(other)),
        }
    }
}

fn operation_codec(type_id: u32) -> Result<CodecId, CodecError> {
    match type_id {
        SECP_MINT_OP_ID | NFT_MINT_OP_ID | NFT_XFER_OP_ID => Ok(CodecId::Zero),
        SECP_MINT_OP_ID_CODEC_ONE | NFT_MINT_OP_ID_CODEC_ONE | NFT_XFER_OP_ID_CODEC_ONE => {
            Ok(CodecId::One)
        }
        other => Err(CodecError::UnknownOperationId(other)),
    }
}

/// Constructs an empty operation of the variant named by `type_id`.
pub fn select_operation(type_id: u32) -> Result<Operation, CodecError> {
    let codec = operation_codec(type_id)?;
    let mut op = match type_id {
        SECP_MINT_OP_ID | SECP_MINT_OP_ID_CODEC_ONE => Operation::SecpMint(SecpMintOperation::new(
            SecpMintOutput::new(OutputOwners::default()),
            SecpTransferOutput::new(0, OutputOwners::default()),
        )),
        NFT_MINT_OP_ID | NFT_MINT_OP_ID_CODEC_ONE => {
            Operation::NftMint(NftMintOperation::new(0, Vec::new(), Vec::new()))
        }
        NFT_XFER_OP_ID | NFT_XFER_OP_ID_CODEC_ONE => Operation::NftTransfer(
            NftTransferOperation::new(NftTransferOutput::new(0, Vec::new(), OutputOwners::default())),
        ),
        other => return Err(CodecError::UnknownOperationId(other)),
    };
    op.set_codec_id(codec.as_u16())?;
    Ok(op)
}

// ---------------------------------------------------------------------------
// TransferableOperation
// ---------------------------------------------------------------------------

/// An operation bound to an asset and the mint-right UTXOs it consumes.
///
/// Wire form: `[32B assetID][4B n][36B utxoID]*[tagged operation]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferableOperation {
    pub asset_id: AssetId,
    pub utxo_ids: Vec<UtxoId>,
    pub operation: Operation,
}

impl TransferableOperation {
    /// `utxo_ids` are stored in canonical (raw byte) order, duplicates
    /// dropped.
    pub fn new(asset_id: AssetId, mut utxo_ids: Vec<UtxoId>, operation: Operation) -> Self {
        utxo_ids.sort();
        utxo_ids.dedup();
        Self {
            asset_id,
            utxo_ids,
            operation,
        }
    }

    /// Canonical order: full serialized bytes.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.to_bytes().cmp(&other.to_bytes())
    }
}

impl Encode for TransferableOperation {
    fn encode(&self, out: &mut Vec<u8>) {
        self.asset_id.encode(out);
        encode_vec(&self.utxo_ids, out);
        self.operation.encode(out);
    }
}

impl Decode for TransferableOperation {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let asset_id = AssetId::decode(r)?;
        let utxo_ids: Vec<UtxoId> = r.read_vec()?;
        if utxo_ids.windows(2).any(|w| w[0] >= w[1]) {
            return Err(CodecError::UnsortedUtxoIds);
        }
        let operation = Operation::decode(r)?;
        Ok(Self {
            asset_id,
            utxo_ids,
            operation,
        })
    }
}
