//! # Protocol Configuration & Constants
//!
//! Every wire constant of the atomic transaction codec lives here: the type
//! IDs for both codec versions, fixed field lengths, and the well-known chain
//! identifiers. Changing any of these changes the bytes that validators hash,
//! so treat every value as consensus-critical.
//!
//! [`BuildConfig`] is the one non-constant item: the knobs a host passes to
//! the transaction builders (fee, fee asset, default locktime/threshold).

use serde::{Deserialize, Serialize};

use crate::codec::ids::{AssetId, ChainId};

// ---------------------------------------------------------------------------
// Codec Versions
// ---------------------------------------------------------------------------

/// Codec version 0: the original tag numbering.
pub const CODEC_ZERO: u16 = 0;

/// Codec version 1: tags are namespaced per feature extension
/// (`fx_index << 16 | local_id`).
pub const CODEC_ONE: u16 = 1;

/// The codec written by default when nothing else is negotiated.
pub const LATEST_CODEC: u16 = CODEC_ZERO;

// ---------------------------------------------------------------------------
// Type IDs: Outputs
// ---------------------------------------------------------------------------

pub const SECP_MINT_OUTPUT_ID: u32 = 6;
pub const SECP_MINT_OUTPUT_ID_CODEC_ONE: u32 = 65537;

pub const SECP_XFER_OUTPUT_ID: u32 = 7;
pub const SECP_XFER_OUTPUT_ID_CODEC_ONE: u32 = 65538;

pub const NFT_MINT_OUTPUT_ID: u32 = 10;
pub const NFT_MINT_OUTPUT_ID_CODEC_ONE: u32 = 131072;

pub const NFT_XFER_OUTPUT_ID: u32 = 11;
pub const NFT_XFER_OUTPUT_ID_CODEC_ONE: u32 = 131073;

// ---------------------------------------------------------------------------
// Type IDs: Inputs
// ---------------------------------------------------------------------------

pub const SECP_INPUT_ID: u32 = 5;
pub const SECP_INPUT_ID_CODEC_ONE: u32 = 65536;

// ---------------------------------------------------------------------------
// Type IDs: Operations
// ---------------------------------------------------------------------------

pub const SECP_MINT_OP_ID: u32 = 8;
pub const SECP_MINT_OP_ID_CODEC_ONE: u32 = 65539;

pub const NFT_MINT_OP_ID: u32 = 12;
pub const NFT_MINT_OP_ID_CODEC_ONE: u32 = 131074;

pub const NFT_XFER_OP_ID: u32 = 13;
pub const NFT_XFER_OP_ID_CODEC_ONE: u32 = 131075;

// ---------------------------------------------------------------------------
// Type IDs: Credentials
// ---------------------------------------------------------------------------

pub const SECP_CREDENTIAL_ID: u32 = 9;
pub const SECP_CREDENTIAL_ID_CODEC_ONE: u32 = 65540;

pub const NFT_CREDENTIAL_ID: u32 = 14;
pub const NFT_CREDENTIAL_ID_CODEC_ONE: u32 = 131076;

// ---------------------------------------------------------------------------
// Type IDs: EVM-chain Transactions
// ---------------------------------------------------------------------------

/// Atomic import into the EVM chain.
pub const IMPORT_TX_TYPE_ID: u32 = 0;

/// Atomic export out of the EVM chain.
pub const EXPORT_TX_TYPE_ID: u32 = 1;

// ---------------------------------------------------------------------------
// Field Lengths
// ---------------------------------------------------------------------------

pub const ASSET_ID_LEN: usize = 32;
pub const TX_ID_LEN: usize = 32;
pub const CHAIN_ID_LEN: usize = 32;

/// Owner addresses and EVM addresses are both 20-byte short IDs on the wire.
pub const ADDRESS_LEN: usize = 20;

/// Recoverable secp256k1 signature: `r || s || v`.
pub const SIGNATURE_LEN: usize = 65;

/// `txID (32) || outputIndex (4)`.
pub const UTXO_ID_LEN: usize = TX_ID_LEN + 4;

/// CB58 appends the last four bytes of the payload's SHA-256.
pub const CHECKSUM_LEN: usize = 4;

// ---------------------------------------------------------------------------
// Network Identifiers
// ---------------------------------------------------------------------------

pub const NETWORK_ID_MAINNET: u32 = 1;
pub const NETWORK_ID_TESTNET: u32 = 5;
pub const NETWORK_ID_LOCAL: u32 = 12345;

/// The platform chain's ID is all zeros. It is the default destination of an
/// export when the caller names none.
pub const PLATFORM_CHAIN_ID: ChainId = ChainId::ZERO;

/// Returns a friendly name for a network ID, mainly for logging.
pub fn network_name(network_id: u32) -> String {
    match network_id {
        NETWORK_ID_MAINNET => "mainnet".to_string(),
        NETWORK_ID_TESTNET => "testnet".to_string(),
        NETWORK_ID_LOCAL => "local".to_string(),
        other => format!("unknown({})", other),
    }
}

/// Current Unix time in seconds, the usual `as_of` for spendability checks.
pub fn unix_now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

// ---------------------------------------------------------------------------
// BuildConfig
// ---------------------------------------------------------------------------

/// Parameters shared by the transaction builders.
///
/// Plain data: hosts typically deserialize this from their own config file
/// and pass it down. `fee_asset_id` defaults to `native_asset_id` when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Flat fee charged per atomic transaction, in the fee asset's base unit.
    #[serde(with = "crate::codec::serialization::decimal_u64")]
    pub fee: u64,

    /// Asset the fee is paid in. `None` means the native asset.
    pub fee_asset_id: Option<AssetId>,

    /// The chain's native asset (the only asset fees are checked against).
    pub native_asset_id: AssetId,

    /// Locktime placed on destination outputs.
    #[serde(with = "crate::codec::serialization::decimal_u64")]
    pub locktime: u64,

    /// Signature threshold placed on destination outputs.
    pub threshold: u32,

    /// Per-signature cost used by fee-aware callers via `Input::cost`.
    #[serde(with = "crate::codec::serialization::decimal_u64")]
    pub cost_per_signature: u64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            fee: 0,
            fee_asset_id: None,
            native_asset_id: AssetId::ZERO,
            locktime: 0,
            threshold: 1,
            cost_per_signature: 1_000,
        }
    }
}

impl BuildConfig {
    /// The asset fees are charged in.
    pub fn effective_fee_asset(&self) -> AssetId {
        self.fee_asset_id.unwrap_or(self.native_asset_id)
    }
}
