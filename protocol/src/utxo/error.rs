//! Errors raised by UTXO bookkeeping and the transaction builders.

use thiserror::Error;

use crate::codec::error::CodecError;
use crate::codec::ids::{Address, AssetId, UtxoId};
use crate::transaction::error::TxError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UtxoError {
    /// The spendable UTXOs cannot cover a requested amount plus fee.
    #[error("insufficient funds for asset {asset_id}: requested {requested}, available {available}")]
    InsufficientFunds {
        asset_id: AssetId,
        requested: u64,
        available: u64,
    },

    /// Fees can only be paid in the native asset.
    #[error("fee asset {fee_asset_id} is not the native asset {native_asset_id}")]
    FeeAsset {
        fee_asset_id: AssetId,
        native_asset_id: AssetId,
    },

    /// A selected spender is not among the output's owners. This is a bug in
    /// selection, not bad input.
    #[error("spender {address} not found among output owners")]
    Address { address: Address },

    #[error("amount must be greater than zero")]
    ZeroAmount,

    /// An atomic UTXO handed to the import builder carries no amount.
    #[error("UTXO {utxo_id} is not amount-bearing")]
    NotSpendable { utxo_id: UtxoId },

    #[error("amount overflow")]
    Overflow,

    #[error(transparent)]
    Tx(#[from] TxError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}
