//! Output model.
//!
//! Four tagged variants share one spend condition, [`OutputOwners`]
//! (locktime, threshold, sorted owner list), embedded by value:
//!
//! ```text
//! SecpTransferOutput  owners + amount        (amount-bearing)
//! SecpMintOutput      owners                 (mint right)
//! NftMintOutput       group ID + owners      (mint right)
//! NftTransferOutput   group ID + payload + owners
//! ```
//!
//! [`Output`] is the closed sum over them, dispatched on the leading 4-byte
//! tag. [`EvmOutput`] is the untagged account credit used by EVM imports.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::codec::error::CodecError;
use crate::codec::ids::{Address, AssetId, CodecId};
use crate::codec::primitives::{
    encode_len_prefixed, encode_vec, write_u32_be, write_u64_be, Decode, Encode, Reader,
};
use crate::config::{
    NFT_MINT_OUTPUT_ID, NFT_MINT_OUTPUT_ID_CODEC_ONE, NFT_XFER_OUTPUT_ID,
    NFT_XFER_OUTPUT_ID_CODEC_ONE, SECP_MINT_OUTPUT_ID, SECP_MINT_OUTPUT_ID_CODEC_ONE,
    SECP_XFER_OUTPUT_ID, SECP_XFER_OUTPUT_ID_CODEC_ONE,
};

// ---------------------------------------------------------------------------
// OutputOwners
// ---------------------------------------------------------------------------

/// The threshold spend condition shared by every tagged output.
///
/// Invariants, checked on construction and on decode: owner addresses are
/// strictly ascending by raw bytes (sorted, no duplicates) and
/// `threshold <= addresses.len()`.
///
/// Wire form: `[8B locktime][4B threshold][4B count][20B address]*`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawOwners")]
pub struct OutputOwners {
    #[serde(with = "crate::codec::serialization::decimal_u64")]
    locktime: u64,
    threshold: u32,
    addresses: Vec<Address>,
}

#[derive(Deserialize)]
struct RawOwners {
    #[serde(with = "crate::codec::serialization::decimal_u64")]
    locktime: u64,
    threshold: u32,
    addresses: Vec<Address>,
}

impl TryFrom<RawOwners> for OutputOwners {
    type Error = CodecError;

    fn try_from(raw: RawOwners) -> Result<Self, Self::Error> {
        let owners = Self {
            locktime: raw.locktime,
            threshold: raw.threshold,
            addresses: raw.addresses,
        };
        owners.check()?;
        Ok(owners)
    }
}

impl OutputOwners {
    /// Builds a spend condition, sorting and de-duplicating `addresses`.
    ///
    /// # Errors
    ///
    /// [`CodecError::InvalidOwners`] if `threshold` exceeds the number of
    /// distinct addresses.
    pub fn new(
        mut addresses: Vec<Address>,
        locktime: u64,
        threshold: u32,
    ) -> Result<Self, CodecError> {
        addresses.sort();
        addresses.dedup();
        let owners = Self {
            locktime,
            threshold,
            addresses,
        };
        owners.check()?;
        Ok(owners)
    }

    fn check(&self) -> Result<(), CodecError> {
        if self.addresses.windows(2).any(|w| w[0] >= w[1]) {
            return Err(CodecError::InvalidOwners(
                "addresses must be sorted and unique".to_string(),
            ));
        }
        if self.threshold as usize > self.addresses.len() {
            return Err(CodecError::InvalidOwners(format!(
                "threshold {} exceeds {} owners",
                self.threshold,
                self.addresses.len()
            )));
        }
        Ok(())
    }

    pub fn locktime(&self) -> u64 {
        self.locktime
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    /// Position of `address` in the owner list.
    pub fn address_index(&self, address: &Address) -> Option<u32> {
        self.addresses
            .binary_search(address)
            .ok()
            .map(|i| i as u32)
    }

    /// The owners among `candidates` that may sign at `as_of`, capped at
    /// `threshold`.
    ///
    /// Owners are taken in owner-list order, so the result (and the sig
    /// indices derived from it) is ascending and independent of the order of
    /// `candidates`. Empty while the output is still locked.
    pub fn spenders(&self, candidates: &[Address], as_of: u64) -> Vec<Address> {
        if self.locktime > as_of {
            return Vec::new();
        }
        self.addresses
            .iter()
            .filter(|owner| candidates.contains(owner))
            .take(self.threshold as usize)
            .copied()
            .collect()
    }

    /// `true` iff the output is unlocked at `as_of` and at least `threshold`
    /// distinct candidates are owners.
    pub fn meets_threshold(&self, candidates: &[Address], as_of: u64) -> bool {
        self.locktime <= as_of
            && self.spenders(candidates, as_of).len() >= self.threshold as usize
    }

    fn decode_checked(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let locktime = r.read_u64()?;
        let threshold = r.read_u32()?;
        let addresses = r.read_vec()?;
        let owners = Self {
            locktime,
            threshold,
            addresses,
        };
        owners.check()?;
        Ok(owners)
    }
}

impl Encode for OutputOwners {
    fn encode(&self, out: &mut Vec<u8>) {
        write_u64_be(out, self.locktime);
        write_u32_be(out, self.threshold);
        encode_vec(&self.addresses, out);
    }
}

impl Decode for OutputOwners {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Self::decode_checked(r)
    }
}

// ---------------------------------------------------------------------------
// Concrete variants
// ---------------------------------------------------------------------------

/// Transferable amount guarded by a threshold of owners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecpTransferOutput {
    #[serde(with = "crate::codec::serialization::decimal_u64")]
    pub amount: u64,
    pub owners: OutputOwners,
    #[serde(default)]
    pub codec: CodecId,
}

impl SecpTransferOutput {
    pub fn new(amount: u64, owners: OutputOwners) -> Self {
        Self {
            amount,
            owners,
            codec: CodecId::Zero,
        }
    }

    pub fn type_id(&self) -> u32 {
        self.codec
            .pick((SECP_XFER_OUTPUT_ID, SECP_XFER_OUTPUT_ID_CODEC_ONE))
    }

    pub(crate) fn encode_body(&self, out: &mut Vec<u8>) {
        self.owners.encode(out);
        write_u64_be(out, self.amount);
    }

    /// Decodes the untagged body under `codec`.
    pub fn decode_body(r: &mut Reader<'_>, codec: CodecId) -> Result<Self, CodecError> {
        let owners = OutputOwners::decode(r)?;
        let amount = r.read_u64()?;
        Ok(Self {
            amount,
            owners,
            codec,
        })
    }
}

/// The right to mint more of a fungible asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecpMintOutput {
    pub owners: OutputOwners,
    #[serde(default)]
    pub codec: CodecId,
}

impl SecpMintOutput {
    pub fn new(owners: OutputOwners) -> Self {
        Self {
            owners,
            codec: CodecId::Zero,
        }
    }

    pub fn type_id(&self) -> u32 {
        self.codec
            .pick((SECP_MINT_OUTPUT_ID, SECP_MINT_OUTPUT_ID_CODEC_ONE))
    }

    pub(crate) fn encode_body(&self, out: &mut Vec<u8>) {
        self.owners.encode(out);
    }

    pub fn decode_body(r: &mut Reader<'_>, codec: CodecId) -> Result<Self, CodecError> {
        Ok(Self {
            owners: OutputOwners::decode(r)?,
            codec,
        })
    }
}

/// The right to mint NFTs within one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftMintOutput {
    pub group_id: u32,
    pub owners: OutputOwners,
    #[serde(default)]
    pub codec: CodecId,
}

impl NftMintOutput {
    pub fn new(group_id: u32, owners: OutputOwners) -> Self {
        Self {
            group_id,
            owners,
            codec: CodecId::Zero,
        }
    }

    pub fn type_id(&self) -> u32 {
        self.codec
            .pick((NFT_MINT_OUTPUT_ID, NFT_MINT_OUTPUT_ID_CODEC_ONE))
    }

    pub(crate) fn encode_body(&self, out: &mut Vec<u8>) {
        write_u32_be(out, self.group_id);
        self.owners.encode(out);
    }

    pub fn decode_body(r: &mut Reader<'_>, codec: CodecId) -> Result<Self, CodecError> {
        let group_id = r.read_u32()?;
        let owners = OutputOwners::decode(r)?;
        Ok(Self {
            group_id,
            owners,
            codec,
        })
    }
}

/// An NFT: group ID, opaque payload, owners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftTransferOutput {
    pub group_id: u32,
    #[serde(with = "crate::codec::serialization::hex_bytes")]
    pub payload: Vec<u8>,
    pub owners: OutputOwners,
    #[serde(default)]
    pub codec: CodecId,
}

impl NftTransferOutput {
    pub fn new(group_id: u32, payload: Vec<u8>, owners: OutputOwners) -> Self {
        Self {
            group_id,
            payload,
            owners,
            codec: CodecId::Zero,
        }
    }

    pub fn type_id(&self) -> u32 {
        self.codec
            .pick((NFT_XFER_OUTPUT_ID, NFT_XFER_OUTPUT_ID_CODEC_ONE))
    }

    /// Body without the tag; also embedded untagged by NFT transfer operations.
    pub fn encode_body(&self, out: &mut Vec<u8>) {
        write_u32_be(out, self.group_id);
        encode_len_prefixed(&self.payload, out);
        self.owners.encode(out);
    }

    pub fn decode_body(r: &mut Reader<'_>, codec: CodecId) -> Result<Self, CodecError> {
        let group_id = r.read_u32()?;
        let payload = r.read_len_prefixed()?;
        let owners = OutputOwners::decode(r)?;
        Ok(Self {
            group_id,
            payload,
            owners,
            codec,
        })
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Any tagged output. Wire form: `[4B type tag][variant body]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Output {
    SecpTransfer(SecpTransferOutput),
    SecpMint(SecpMintOutput),
    NftMint(NftMintOutput),
    NftTransfer(NftTransferOutput),
}

impl Output {
    pub fn type_id(&self) -> u32 {
        match self {
            Self::SecpTransfer(o) => o.type_id(),
            Self::SecpMint(o) => o.type_id(),
            Self::NftMint(o) => o.type_id(),
            Self::NftTransfer(o) => o.type_id(),
        }
    }

    pub fn codec(&self) -> CodecId {
        match self {
            Self::SecpTransfer(o) => o.codec,
            Self::SecpMint(o) => o.codec,
            Self::NftMint(o) => o.codec,
            Self::NftTransfer(o) => o.codec,
        }
    }

    /// Switches the tag numbering scheme; anything but 0 or 1 is rejected.
    pub fn set_codec_id(&mut self, codec_id: u16) -> Result<(), CodecError> {
        let codec = CodecId::try_from(codec_id)?;
        match self {
            Self::SecpTransfer(o) => o.codec = codec,
            Self::SecpMint(o) => o.codec = codec,
            Self::NftMint(o) => o.codec = codec,
            Self::NftTransfer(o) => o.codec = codec,
        }
        Ok(())
    }

    pub fn owners(&self) -> &OutputOwners {
        match self {
            Self::SecpTransfer(o) => &o.owners,
            Self::SecpMint(o) => &o.owners,
            Self::NftMint(o) => &o.owners,
            Self::NftTransfer(o) => &o.owners,
        }
    }

    /// The spendable amount, for amount-bearing outputs only.
    pub fn amount(&self) -> Option<u64> {
        match self {
            Self::SecpTransfer(o) => Some(o.amount),
            _ => None,
        }
    }

    pub fn is_amount_bearing(&self) -> bool {
        self.amount().is_some()
    }

    pub fn addresses(&self) -> &[Address] {
        self.owners().addresses()
    }

    pub fn locktime(&self) -> u64 {
        self.owners().locktime()
    }

    pub fn threshold(&self) -> u32 {
        self.owners().threshold()
    }

    pub fn meets_threshold(&self, candidates: &[Address], as_of: u64) -> bool {
        self.owners().meets_threshold(candidates, as_of)
    }

    pub fn spenders(&self, candidates: &[Address], as_of: u64) -> Vec<Address> {
        self.owners().spenders(candidates, as_of)
    }

    pub fn address_index(&self, address: &Address) -> Option<u32> {
        self.owners().address_index(address)
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::SecpTransfer(_) => "SecpTransferOutput",
            Self::SecpMint(_) => "SecpMintOutput",
            Self::NftMint(_) => "NftMintOutput",
            Self::NftTransfer(_) => "NftTransferOutput",
        }
    }
}

impl Encode for Output {
    fn encode(&self, out: &mut Vec<u8>) {
        write_u32_be(out, self.type_id());
        match self {
            Self::SecpTransfer(o) => o.encode_body(out),
            Self::SecpMint(o) => o.encode_body(out),
            Self::NftMint(o) => o.encode_body(out),
            Self::NftTransfer(o) => o.encode_body(out),
        }
    }
}

impl Decode for Output {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let type_id = r.read_u32()?;
        let codec = output_codec(type_id)?;
        match type_id {
            SECP_XFER_OUTPUT_ID | SECP_XFER_OUTPUT_ID_CODEC_ONE => Ok(Self::SecpTransfer(
                SecpTransferOutput::decode_body(r, codec)?,
            )),
            SECP_MINT_OUTPUT_ID | SECP_MINT_OUTPUT_ID_CODEC_ONE => {
                Ok(Self::SecpMint(SecpMintOutput::decode_body(r, codec)?))
            }
            NFT_MINT_OUTPUT_ID | NFT_MINT_OUTPUT_ID_CODEC_ONE => {
                Ok(Self::NftMint(NftMintOutput::decode_body(r, codec)?))
            }
            NFT_XFER_OUTPUT_ID | NFT_XFER_OUTPUT_ID_CODEC_ONE => Ok(Self::NftTransfer(
                NftTransferOutput::decode_body(r, codec)?,
            )),
            other => Err(CodecError::UnknownOutputId(other)),
        }
    }
}

/// Which codec a known output tag belongs to.
fn output_codec(type_id: u32) -> Result<CodecId, CodecError> {
    match type_id {
        SECP_XFER_OUTPUT_ID | SECP_MINT_OUTPUT_ID | NFT_MINT_OUTPUT_ID | NFT_XFER_OUTPUT_ID => {
            Ok(CodecId::Zero)
        }
        SECP_XFER_OUTPUT_ID_CODEC_ONE
        | SECP_MINT_OUTPUT_ID_CODEC_ONE
        | NFT_MINT_OUTPUT_ID_CODEC_ONE
        | NFT_XFER_OUTPUT_ID_CODEC_ONE => Ok(CodecId::One),
        other => Err(CodecError::UnknownOutputId(other)),
    }
}

/// Constructs an output of the variant named by `type_id`.
///
/// `amount` is used by amount-bearing variants only; NFT variants start in
/// group 0 with an empty payload. Used to mint spend and change outputs of
/// the same variant as the UTXOs being consumed.
pub fn select_output(type_id: u32, amount: u64, owners: OutputOwners) -> Result<Output, CodecError> {
    let codec = output_codec(type_id)?;
    let output = match type_id {
        SECP_XFER_OUTPUT_ID | SECP_XFER_OUTPUT_ID_CODEC_ONE => {
            Output::SecpTransfer(SecpTransferOutput {
                amount,
                owners,
                codec,
            })
        }
        SECP_MINT_OUTPUT_ID | SECP_MINT_OUTPUT_ID_CODEC_ONE => {
            Output::SecpMint(SecpMintOutput { owners, codec })
        }
        NFT_MINT_OUTPUT_ID | NFT_MINT_OUTPUT_ID_CODEC_ONE => Output::NftMint(NftMintOutput {
            group_id: 0,
            owners,
            codec,
        }),
        NFT_XFER_OUTPUT_ID | NFT_XFER_OUTPUT_ID_CODEC_ONE => {
            Output::NftTransfer(NftTransferOutput {
                group_id: 0,
                payload: Vec::new(),
                owners,
                codec,
            })
        }
        other => return Err(CodecError::UnknownOutputId(other)),
    };
    Ok(output)
}

impl TryFrom<Output> for SecpTransferOutput {
    type Error = CodecError;

    fn try_from(output: Output) -> Result<Self, Self::Error> {
        match output {
            Output::SecpTransfer(o) => Ok(o),
            other => Err(CodecError::WrongVariant {
                expected: "SecpTransferOutput",
                found: other.variant_name(),
            }),
        }
    }
}

impl TryFrom<Output> for SecpMintOutput {
    type Error = CodecError;

    fn try_from(output: Output) -> Result<Self, Self::Error> {
        match output {
            Output::SecpMint(o) => Ok(o),
            other => Err(CodecError::WrongVariant {
                expected: "SecpMintOutput",
                found: other.variant_name(),
            }),
        }
    }
}

impl TryFrom<Output> for NftTransferOutput {
    type Error = CodecError;

    fn try_from(output: Output) -> Result<Self, Self::Error> {
        match output {
            Output::NftTransfer(o) => Ok(o),
            other => Err(CodecError::WrongVariant {
                expected: "NftTransferOutput",
                found: other.variant_name(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// TransferableOutput
// ---------------------------------------------------------------------------

/// An output bound to an asset. Wire form: `[32B assetID][tagged output]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferableOutput {
    pub asset_id: AssetId,
    pub output: Output,
}

impl TransferableOutput {
    pub fn new(asset_id: AssetId, output: Output) -> Self {
        Self { asset_id, output }
    }

    /// Canonical order: raw comparison of the full serialized bytes.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.to_bytes().cmp(&other.to_bytes())
    }
}

impl Encode for TransferableOutput {
    fn encode(&self, out: &mut Vec<u8>) {
        self.asset_id.encode(out);
        self.output.encode(out);
    }
}

impl Decode for TransferableOutput {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let asset_id = AssetId::decode(r)?;
        let output = Output::decode(r)?;
        Ok(Self { asset_id, output })
    }
}

// ---------------------------------------------------------------------------
// EvmOutput
// ---------------------------------------------------------------------------

/// A credit to an EVM account. Untagged wire form:
/// `[20B address][8B amount][32B assetID]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvmOutput {
    pub address: Address,
    #[serde(with = "crate::codec::serialization::decimal_u64")]
    pub amount: u64,
    pub asset_id: AssetId,
}

impl EvmOutput {
    pub fn new(address: Address, amount: u64, asset_id: AssetId) -> Self {
        Self {
            address,
            amount,
            asset_id,
        }
    }

    /// Canonical order: by address, then by asset ID.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.address
            .cmp(&other.address)
            .then_with(|| self.asset_id.cmp(&other.asset_id))
    }
}

impl Encode for EvmOutput {
    fn encode(&self, out: &mut Vec<u8>) {
        self.address.encode(out);
        write_u64_be(out, self.amount);
        self.asset_id.encode(out);
    }
}

impl Decode for EvmOutput {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let address = Address::decode(r)?;
        let amount = r.read_u64()?;
        let asset_id = AssetId::decode(r)?;
        Ok(Self {
            address,
            amount,
            asset_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address::new([b; 20])
    }

    fn owners(addrs: &[u8], locktime: u64, threshold: u32) -> OutputOwners {
        OutputOwners::new(addrs.iter().map(|b| addr(*b)).collect(), locktime, threshold).unwrap()
    }

    #[test]
    fn test_owners_are_sorted_and_deduplicated() {
        let o = owners(&[3, 1, 2, 1], 0, 2);
        assert_eq!(o.addresses(), &[addr(1), addr(2), addr(3)]);
    }

    #[test]
    fn test_threshold_above_owner_count_rejected() {
        let err = OutputOwners::new(vec![addr(1)], 0, 2).unwrap_err();
        assert!(matches!(err, CodecError::InvalidOwners(_)));
    }

    #[test]
    fn test_transfer_output_layout() {
        let out = Output::SecpTransfer(SecpTransferOutput::new(1000, owners(&[1], 5, 1)));
        let bytes = out.to_bytes();
        // tag | locktime | threshold | count | address | amount
        assert_eq!(bytes.len(), 4 + 8 + 4 + 4 + 20 + 8);
        assert_eq!(&bytes[0..4], &SECP_XFER_OUTPUT_ID.to_be_bytes());
        assert_eq!(&bytes[4..12], &5u64.to_be_bytes());
        assert_eq!(&bytes[12..16], &1u32.to_be_bytes());
        assert_eq!(&bytes[16..20], &1u32.to_be_bytes());
        assert_eq!(&bytes[20..40], addr(1).as_bytes());
        assert_eq!(&bytes[40..48], &1000u64.to_be_bytes());
    }

    #[test]
    fn test_every_variant_roundtrips_exactly() {
        let variants = vec![
            Output::SecpTransfer(SecpTransferOutput::new(42, owners(&[1, 2], 0, 2))),
            Output::SecpMint(SecpMintOutput::new(owners(&[9], 100, 1))),
            Output::NftMint(NftMintOutput::new(3, owners(&[4, 5], 0, 1))),
            Output::NftTransfer(NftTransferOutput::new(
                3,
                b"ipfs://token".to_vec(),
                owners(&[6], 0, 1),
            )),
        ];
        for out in variants {
            let bytes = out.to_bytes();
            let (decoded, consumed) = Output::from_bytes_at(&bytes, 0).unwrap();
            assert_eq!(decoded, out);
            assert_eq!(consumed, bytes.len());
        }
    }

    #[test]
    fn test_codec_one_tag_decodes_as_codec_one() {
        let mut out = Output::SecpMint(SecpMintOutput::new(owners(&[1], 0, 1)));
        out.set_codec_id(1).unwrap();
        assert_eq!(out.type_id(), SECP_MINT_OUTPUT_ID_CODEC_ONE);
        let decoded = Output::from_bytes(&out.to_bytes()).unwrap();
        assert_eq!(decoded.codec(), CodecId::One);
        assert_eq!(out.set_codec_id(7), Err(CodecError::InvalidCodecId(7)));
    }

    #[test]
    fn test_unknown_output_tag_rejected() {
        let bytes = 0xFFFF_FFFFu32.to_be_bytes();
        assert_eq!(
            Output::from_bytes(&bytes),
            Err(CodecError::UnknownOutputId(0xFFFF_FFFF))
        );
        assert_eq!(
            select_output(0xFFFF_FFFF, 1, owners(&[1], 0, 1)),
            Err(CodecError::UnknownOutputId(0xFFFF_FFFF))
        );
    }

    #[test]
    fn test_select_output_nft_transfer_tags() {
        for (tag, codec) in [
            (NFT_XFER_OUTPUT_ID, CodecId::Zero),
            (NFT_XFER_OUTPUT_ID_CODEC_ONE, CodecId::One),
        ] {
            let out = select_output(tag, 5, owners(&[1], 0, 1)).unwrap();
            assert!(matches!(out, Output::NftTransfer(_)));
            assert_eq!(out.codec(), codec);
            assert_eq!(out.amount(), None);
            let decoded = Output::from_bytes(&out.to_bytes()).unwrap();
            assert_eq!(decoded, out);
        }
    }

    #[test]
    fn test_decode_rejects_unsorted_owners() {
        let mut bytes = Vec::new();
        write_u32_be(&mut bytes, SECP_MINT_OUTPUT_ID);
        write_u64_be(&mut bytes, 0);
        write_u32_be(&mut bytes, 1);
        write_u32_be(&mut bytes, 2);
        addr(2).encode(&mut bytes);
        addr(1).encode(&mut bytes);
        assert!(matches!(
            Output::from_bytes(&bytes),
            Err(CodecError::InvalidOwners(_))
        ));
    }

    #[test]
    fn test_truncated_output_fails() {
        let out = Output::SecpTransfer(SecpTransferOutput::new(1, owners(&[1], 0, 1)));
        let bytes = out.to_bytes();
        assert!(matches!(
            Output::from_bytes(&bytes[..bytes.len() - 1]),
            Err(CodecError::Truncated { .. })
        ));
    }

    #[test]
    fn test_meets_threshold_boundary() {
        let o = owners(&[1, 2, 3], 0, 2);
        assert!(o.meets_threshold(&[addr(1), addr(3)], 0));
        assert!(!o.meets_threshold(&[addr(1)], 0));
        // Duplicates count once.
        assert!(!o.meets_threshold(&[addr(1), addr(1)], 0));
        // Non-owners do not count.
        assert!(!o.meets_threshold(&[addr(1), addr(9)], 0));
    }

    #[test]
    fn test_meets_threshold_respects_locktime() {
        let o = owners(&[1], 1_000, 1);
        assert!(!o.meets_threshold(&[addr(1)], 999));
        assert!(o.meets_threshold(&[addr(1)], 1_000));
        assert!(o.spenders(&[addr(1)], 999).is_empty());
    }

    #[test]
    fn test_spenders_capped_at_threshold_in_owner_order() {
        let o = owners(&[1, 2, 3], 0, 2);
        let spenders = o.spenders(&[addr(3), addr(2), addr(1)], 0);
        assert_eq!(spenders, vec![addr(1), addr(2)]);
        let indices: Vec<u32> = spenders
            .iter()
            .filter_map(|a| o.address_index(a))
            .collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn test_spenders_ignore_candidate_order() {
        let o = owners(&[1, 2, 3], 0, 2);
        let forward = o.spenders(&[addr(1), addr(3)], 0);
        let reversed = o.spenders(&[addr(3), addr(1)], 0);
        assert_eq!(forward, reversed);
        assert_eq!(forward, vec![addr(1), addr(3)]);
        // Duplicated and foreign candidates are ignored.
        assert_eq!(o.spenders(&[addr(3), addr(9), addr(3)], 0), vec![addr(3)]);
    }

    #[test]
    fn test_address_index() {
        let o = owners(&[5, 1, 3], 0, 1);
        assert_eq!(o.address_index(&addr(1)), Some(0));
        assert_eq!(o.address_index(&addr(5)), Some(2));
        assert_eq!(o.address_index(&addr(4)), None);
    }

    #[test]
    fn test_wrong_variant_conversion() {
        let out = Output::SecpMint(SecpMintOutput::new(owners(&[1], 0, 1)));
        let err = SecpTransferOutput::try_from(out).unwrap_err();
        assert_eq!(
            err,
            CodecError::WrongVariant {
                expected: "SecpTransferOutput",
                found: "SecpMintOutput"
            }
        );
    }

    #[test]
    fn test_transferable_output_sort_idempotent() {
        let mut outs = vec![
            TransferableOutput::new(
                AssetId::new([2; 32]),
                Output::SecpTransfer(SecpTransferOutput::new(1, owners(&[1], 0, 1))),
            ),
            TransferableOutput::new(
                AssetId::new([1; 32]),
                Output::SecpTransfer(SecpTransferOutput::new(9, owners(&[1], 0, 1))),
            ),
            TransferableOutput::new(
                AssetId::new([1; 32]),
                Output::SecpTransfer(SecpTransferOutput::new(2, owners(&[1], 0, 1))),
            ),
        ];
        outs.sort_by(TransferableOutput::canonical_cmp);
        assert_eq!(outs[0].output.amount(), Some(2));
        assert_eq!(outs[2].asset_id, AssetId::new([2; 32]));
        let mut again = outs.clone();
        again.sort_by(TransferableOutput::canonical_cmp);
        assert_eq!(again, outs);
    }

    #[test]
    fn test_evm_output_order_address_then_asset() {
        let mut outs = vec![
            EvmOutput::new(addr(2), 1, AssetId::new([1; 32])),
            EvmOutput::new(addr(1), 1, AssetId::new([9; 32])),
            EvmOutput::new(addr(1), 1, AssetId::new([3; 32])),
        ];
        outs.sort_by(EvmOutput::canonical_cmp);
        assert_eq!(outs[0].asset_id, AssetId::new([3; 32]));
        assert_eq!(outs[1].asset_id, AssetId::new([9; 32]));
        assert_eq!(outs[2].address, addr(2));
    }

    #[test]
    fn test_evm_output_layout() {
        let out = EvmOutput::new(addr(7), 500, AssetId::new([1; 32]));
        let bytes = out.to_bytes();
        assert_eq!(bytes.len(), 20 + 8 + 32);
        assert_eq!(EvmOutput::from_bytes(&bytes).unwrap(), out);
    }

    #[test]
    fn test_output_json_form() {
        let out = Output::SecpTransfer(SecpTransferOutput::new(1000, owners(&[1], 0, 1)));
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["type"], "secp_transfer");
        assert_eq!(json["amount"], "1000");
        let back: Output = serde_json::from_value(json).unwrap();
        assert_eq!(back, out);
    }

    #[test]
    fn test_output_json_rejects_bad_owners() {
        let json = serde_json::json!({
            "type": "secp_mint",
            "owners": { "locktime": "0", "threshold": 2, "addresses": [addr(1)] },
        });
        assert!(serde_json::from_value::<Output>(json).is_err());
    }
}
