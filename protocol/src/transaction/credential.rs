//! Signature indices, signatures and credentials.
//!
//! A [`SigIdx`] points from a signature slot to a position in the spent
//! output's owner list. Inputs and operations each own a separate
//! [`SigIndexList`]; they never share one. After signing, each input or
//! operation gets a [`Credential`] holding one [`Signature`] per SigIdx, in
//! the same order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::codec::error::CodecError;
use crate::codec::ids::{Address, CodecId};
use crate::codec::primitives::{write_u32_be, Decode, Encode, Reader};
use crate::config::{
    NFT_CREDENTIAL_ID, NFT_CREDENTIAL_ID_CODEC_ONE, SECP_CREDENTIAL_ID,
    SECP_CREDENTIAL_ID_CODEC_ONE, SIGNATURE_LEN,
};

// ---------------------------------------------------------------------------
// SigIdx
// ---------------------------------------------------------------------------

/// Index of a required signer within an output's owner list.
///
/// Only `index` is serialized. `source` is a local annotation naming the
/// address whose key must sign; it is carried from selection to signing and
/// is empty after decoding. Equality ignores it for that reason.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SigIdx {
    pub index: u32,
    #[serde(skip)]
    source: Option<Address>,
}

impl SigIdx {
    pub fn new(index: u32, source: Address) -> Self {
        Self {
            index,
            source: Some(source),
        }
    }

    pub fn source(&self) -> Option<&Address> {
        self.source.as_ref()
    }

    pub fn set_source(&mut self, address: Address) {
        self.source = Some(address);
    }
}

impl PartialEq for SigIdx {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for SigIdx {}

impl Encode for SigIdx {
    fn encode(&self, out: &mut Vec<u8>) {
        write_u32_be(out, self.index);
    }
}

impl Decode for SigIdx {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            index: r.read_u32()?,
            source: None,
        })
    }
}

// ---------------------------------------------------------------------------
// SigIndexList
// ---------------------------------------------------------------------------

/// The ordered signer list of one input or one operation.
///
/// Wire form: `[4B count][4B index]*`. The count is always the list length,
/// so it cannot drift from the entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SigIndexList(Vec<SigIdx>);

impl SigIndexList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a signer slot for owner position `index`, controlled by
    /// `address`. Returns the new signature count.
    pub fn add(&mut self, index: u32, address: Address) -> usize {
        self.0.push(SigIdx::new(index, address));
        self.0.len()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SigIdx> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[SigIdx] {
        &self.0
    }
}

impl Encode for SigIndexList {
    fn encode(&self, out: &mut Vec<u8>) {
        crate::codec::primitives::encode_vec(&self.0, out);
    }
}

impl Decode for SigIndexList {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self(r.read_vec()?))
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// A 65-byte recoverable signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(
    #[serde(with = "crate::codec::serialization::hex_array")] [u8; SIGNATURE_LEN],
);

impl Signature {
    pub const fn new(bytes: [u8; SIGNATURE_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, CodecError> {
        let arr: [u8; SIGNATURE_LEN] =
            bytes.try_into().map_err(|_| CodecError::InvalidLength {
                what: "signature",
                expected: SIGNATURE_LEN,
                got: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}...)", hex::encode(&self.0[..8]))
    }
}

impl Encode for Signature {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0);
    }
}

impl Decode for Signature {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self(r.read_array()?))
    }
}

// ---------------------------------------------------------------------------
// Credential
// ---------------------------------------------------------------------------

/// Which input family a credential authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CredentialKind {
    /// SECP256k1 transfer/mint inputs and operations.
    Secp,
    /// NFT operations.
    Nft,
}

impl CredentialKind {
    fn type_ids(self) -> (u32, u32) {
        match self {
            Self::Secp => (SECP_CREDENTIAL_ID, SECP_CREDENTIAL_ID_CODEC_ONE),
            Self::Nft => (NFT_CREDENTIAL_ID, NFT_CREDENTIAL_ID_CODEC_ONE),
        }
    }
}

/// The signatures authenticating one input or operation.
///
/// Body wire form: `[4B count][65B signature]*`. The type tag is written by
/// the enclosing [`Tx`](super::unsigned::Tx).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub kind: CredentialKind,
    pub codec: CodecId,
    pub signatures: Vec<Signature>,
}

impl Credential {
    pub fn new(kind: CredentialKind, codec: CodecId) -> Self {
        Self {
            kind,
            codec,
            signatures: Vec::new(),
        }
    }

    /// Appends a signature and returns its index.
    pub fn add_signature(&mut self, signature: Signature) -> usize {
        self.signatures.push(signature);
        self.signatures.len() - 1
    }

    /// The type tag for this credential under its codec.
    pub fn type_id(&self) -> u32 {
        self.codec.pick(self.kind.type_ids())
    }

    /// Switches the tag numbering scheme.
    pub fn set_codec_id(&mut self, codec_id: u16) -> Result<(), CodecError> {
        self.codec = CodecId::try_from(codec_id)?;
        Ok(())
    }

    /// Writes `[4B type tag][body]`.
    pub fn encode_tagged(&self, out: &mut Vec<u8>) {
        write_u32_be(out, self.type_id());
        self.encode(out);
    }

    /// Reads a type tag, dispatches on it, then reads the body.
    pub fn decode_tagged(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let mut credential = select_credential(r.read_u32()?)?;
        credential.signatures = r.read_vec()?;
        Ok(credential)
    }
}

impl Encode for Credential {
    fn encode(&self, out: &mut Vec<u8>) {
        crate::codec::primitives::encode_vec(&self.signatures, out);
    }
}

/// Maps a credential type tag to an empty credential of that kind and codec.
pub fn select_credential(type_id: u32) -> Result<Credential, CodecError> {
    let (kind, codec) = match type_id {
        SECP_CREDENTIAL_ID => (CredentialKind::Secp, CodecId::Zero),
        SECP_CREDENTIAL_ID_CODEC_ONE => (CredentialKind::Secp, CodecId::One),
        NFT_CREDENTIAL_ID => (CredentialKind::Nft, CodecId::Zero),
        NFT_CREDENTIAL_ID_CODEC_ONE => (CredentialKind::Nft, CodecId::One),
        other => return Err(CodecError::UnknownCredentialId(other)),
    };
    Ok(Credential::new(kind, codec))
}
