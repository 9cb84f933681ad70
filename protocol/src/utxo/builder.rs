//! Atomic transaction builders.
//!
//! - [`build_import_tx`] pulls UTXOs exported by another chain into EVM
//!   accounts.
//! - [`build_export_tx`] spends UTXOs from a [`UtxoSet`] towards another
//!   chain, via [`UtxoSet::get_minimum_spendable`].
//! - [`build_export_from_account`] debits an EVM account directly.
//!
//! Every builder returns a fully valid, canonically sorted transaction or an
//! error; nothing partial escapes.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::amount::AssetAmountDestination;
use super::error::UtxoError;
use super::set::{Utxo, UtxoSet};
use crate::codec::ids::{Address, AssetId, ChainId, UtxoId};
use crate::config::{BuildConfig, PLATFORM_CHAIN_ID};
use crate::transaction::base::BaseTx;
use crate::transaction::error::TxError;
use crate::transaction::export::ExportTx;
use crate::transaction::import::{FeeRequirement, ImportTx};
use crate::transaction::input::{EvmInput, Input, SecpTransferInput, TransferableInput};
use crate::transaction::output::{
    EvmOutput, Output, OutputOwners, SecpTransferOutput, TransferableOutput,
};
use crate::transaction::unsigned::{EvmTx, UnsignedTx};

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// Where an import comes from and who receives it.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub network_id: u32,
    pub blockchain_id: ChainId,
    pub source_chain: ChainId,
    /// EVM account credited with every imported asset.
    pub to_address: Address,
    /// Owner addresses the caller can sign for.
    pub from_addresses: Vec<Address>,
    pub as_of: u64,
}

/// Builds an import spending every UTXO in `atomics` in full.
///
/// The fee is taken from UTXOs of the fee asset, in the order given, until
/// `config.fee` is covered. Whatever remains of each asset is credited to
/// `to_address` in one output per asset; assets fully used up by the fee get
/// no output.
///
/// # Errors
///
/// - [`UtxoError::NotSpendable`] for an atomic UTXO without an amount.
/// - [`UtxoError::Address`] if a spender has no owner index.
/// - [`UtxoError::Tx`] wrapping [`TxError::EvmFee`] when the atomics cannot
///   pay the fee.
pub fn build_import_tx(
    atomics: &[Utxo],
    request: &ImportRequest,
    config: &BuildConfig,
) -> Result<UnsignedTx, UtxoError> {
    let fee_asset = config.effective_fee_asset();
    let mut fee_paid = 0u64;
    let mut totals: BTreeMap<AssetId, u64> = BTreeMap::new();
    let mut ins = Vec::with_capacity(atomics.len());

    for atomic in atomics {
        let amount = atomic.output.amount().ok_or(UtxoError::NotSpendable {
            utxo_id: atomic.utxo_id(),
        })?;

        let mut credited = amount;
        if atomic.asset_id == fee_asset && fee_paid < config.fee {
            let towards_fee = amount.min(config.fee - fee_paid);
            fee_paid += towards_fee;
            credited = amount - towards_fee;
        }

        let mut input = Input::SecpTransfer(SecpTransferInput::new(amount));
        input.set_codec_id(atomic.codec.as_u16())?;
        for spender in atomic.output.spenders(&request.from_addresses, request.as_of) {
            let index = atomic
                .output
                .address_index(&spender)
                .ok_or(UtxoError::Address { address: spender })?;
            input.add_signature_idx(index, spender);
        }
        ins.push(TransferableInput::new(atomic.utxo_id(), atomic.asset_id, input));

        let total = totals.entry(atomic.asset_id).or_insert(0);
        *total = total.checked_add(credited).ok_or(UtxoError::Overflow)?;
    }

    if fee_paid < config.fee {
        warn!(required = config.fee, provided = fee_paid, "atomics cannot cover import fee");
        return Err(TxError::EvmFee {
            required: config.fee,
            provided: fee_paid,
        }
        .into());
    }

    let outs = totals
        .into_iter()
        .filter(|(_, amount)| *amount > 0)
        .map(|(asset_id, amount)| EvmOutput::new(request.to_address, amount, asset_id))
        .collect();

    // Fees in another asset are not visible to the native-asset check.
    let required = if fee_asset == config.native_asset_id {
        config.fee
    } else {
        0
    };
    let mut tx = ImportTx::new(
        BaseTx::new(request.network_id, request.blockchain_id),
        request.source_chain,
        ins,
        outs,
        FeeRequirement::new(config.native_asset_id, required),
    )?;
    tx.sort();

    debug!(
        inputs = tx.imported_inputs.len(),
        outputs = tx.outs.len(),
        fee = fee_paid,
        "import built"
    );
    Ok(UnsignedTx::new(EvmTx::Import(tx)))
}

// ---------------------------------------------------------------------------
// Export from UTXOs
// ---------------------------------------------------------------------------

/// What to export, to whom, and from which owners.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub network_id: u32,
    pub blockchain_id: ChainId,
    /// Defaults to the platform chain.
    pub destination_chain: Option<ChainId>,
    pub asset_id: AssetId,
    pub amount: u64,
    pub to_addresses: Vec<Address>,
    /// Owner addresses the caller can sign for.
    pub from_addresses: Vec<Address>,
    /// Defaults to `from_addresses` when empty.
    pub change_addresses: Vec<Address>,
    pub as_of: u64,
}

/// An export plus the UTXOs selected to fund it.
///
/// The exported outputs carry both the destination output and any change.
/// `inputs` are the consumed UTXOs with their signer slots; a host removes
/// them from its set (see [`super::set::SharedUtxoSet::build_export_and_consume`]).
///
/// The export's own `ins` list is empty, so [`UnsignedTx::sign`] on `tx`
/// yields no credentials for these UTXOs. Callers must authorize `inputs`
/// themselves, one credential per input from its `sig_idxs` sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltExport {
    pub tx: UnsignedTx,
    pub inputs: Vec<TransferableInput>,
}

impl BuiltExport {
    pub fn consumed_utxo_ids(&self) -> Vec<UtxoId> {
        self.inputs.iter().map(TransferableInput::utxo_id).collect()
    }
}

/// Selects UTXOs from `set` to export `request.amount` plus the fee.
///
/// # Errors
///
/// - [`UtxoError::FeeAsset`] if the configured fee asset is not native.
/// - [`UtxoError::ZeroAmount`] for a zero export.
/// - [`UtxoError::InsufficientFunds`] from coin selection.
pub fn build_export_tx(
    set: &UtxoSet,
    request: &ExportRequest,
    config: &BuildConfig,
) -> Result<BuiltExport, UtxoError> {
    let fee_asset = check_fee_asset(config)?;
    if request.amount == 0 {
        return Err(UtxoError::ZeroAmount);
    }

    let change_addresses = if request.change_addresses.is_empty() {
        request.from_addresses.clone()
    } else {
        request.change_addresses.clone()
    };
    let mut aad = AssetAmountDestination::new(
        request.to_addresses.clone(),
        request.from_addresses.clone(),
        change_addresses,
    );
    if request.asset_id == fee_asset {
        aad.add_asset_amount(request.asset_id, request.amount, config.fee)?;
    } else {
        aad.add_asset_amount(request.asset_id, request.amount, 0)?;
        if config.fee > 0 {
            aad.add_asset_amount(fee_asset, 0, config.fee)?;
        }
    }

    set.get_minimum_spendable(&mut aad, request.as_of, config.locktime, config.threshold)?;

    let (mut inputs, outputs, change) = aad.into_parts();
    inputs.sort_by(TransferableInput::canonical_cmp);
    let mut tx = ExportTx::new(
        BaseTx::new(request.network_id, request.blockchain_id),
        request.destination_chain.unwrap_or(PLATFORM_CHAIN_ID),
        Vec::new(),
        outputs.into_iter().chain(change).collect(),
    );
    tx.sort();

    debug!(
        inputs = inputs.len(),
        exported = tx.exported_outs.len(),
        destination = %tx.destination_chain,
        "export built"
    );
    Ok(BuiltExport {
        tx: UnsignedTx::new(EvmTx::Export(tx)),
        inputs,
    })
}

// ---------------------------------------------------------------------------
// Export from an EVM account
// ---------------------------------------------------------------------------

/// An export funded by an EVM account balance.
#[derive(Debug, Clone)]
pub struct AccountExportRequest {
    pub network_id: u32,
    pub blockchain_id: ChainId,
    /// Defaults to the platform chain.
    pub destination_chain: Option<ChainId>,
    pub from_address: Address,
    /// The account's current nonce.
    pub nonce: u64,
    pub asset_id: AssetId,
    pub amount: u64,
    pub to_addresses: Vec<Address>,
}

/// Debits `amount` (plus the fee, when it is in the same asset) from the
/// account and exports it as one SECP transfer output owned by
/// `to_addresses`. A fee in another asset is debited as a second input
/// with the same nonce.
pub fn build_export_from_account(
    request: &AccountExportRequest,
    config: &BuildConfig,
) -> Result<UnsignedTx, UtxoError> {
    let fee_asset = check_fee_asset(config)?;
    if request.amount == 0 {
        return Err(UtxoError::ZeroAmount);
    }

    let mut ins = Vec::with_capacity(2);
    if request.asset_id == fee_asset {
        let debit = request
            .amount
            .checked_add(config.fee)
            .ok_or(UtxoError::Overflow)?;
        ins.push(account_input(request, request.asset_id, debit));
    } else {
        ins.push(account_input(request, request.asset_id, request.amount));
        if config.fee > 0 {
            ins.push(account_input(request, fee_asset, config.fee));
        }
    }

    let owners = OutputOwners::new(
        request.to_addresses.clone(),
        config.locktime,
        config.threshold,
    )?;
    let exported = TransferableOutput::new(
        request.asset_id,
        Output::SecpTransfer(SecpTransferOutput::new(request.amount, owners)),
    );

    let mut tx = ExportTx::new(
        BaseTx::new(request.network_id, request.blockchain_id),
        request.destination_chain.unwrap_or(PLATFORM_CHAIN_ID),
        ins,
        vec![exported],
    );
    tx.sort();

    debug!(
        from = %request.from_address,
        nonce = request.nonce,
        inputs = tx.ins.len(),
        "account export built"
    );
    Ok(UnsignedTx::new(EvmTx::Export(tx)))
}

fn account_input(request: &AccountExportRequest, asset_id: AssetId, amount: u64) -> EvmInput {
    let mut input = EvmInput::new(request.from_address, amount, asset_id, request.nonce);
    input.add_signature_idx(0, request.from_address);
    input
}

fn check_fee_asset(config: &BuildConfig) -> Result<AssetId, UtxoError> {
    match config.fee_asset_id {
        Some(fee_asset_id) if fee_asset_id != config.native_asset_id => {
            Err(UtxoError::FeeAsset {
                fee_asset_id,
                native_asset_id: config.native_asset_id,
            })
        }
        _ => Ok(config.native_asset_id),
    }
}
