//! Builder-side accounting for coin selection.
//!
//! An [`AssetAmountDestination`] records, per asset, how much must be sent
//! and burned, how much the selected inputs cover so far, and where the
//! resulting spend and change outputs go. It lives only for the duration of
//! one build.

use crate::codec::ids::{Address, AssetId};
use crate::transaction::input::TransferableInput;
use crate::transaction::output::TransferableOutput;

use super::error::UtxoError;

// ---------------------------------------------------------------------------
// AssetAmount
// ---------------------------------------------------------------------------

/// How much of one asset is requested and how much has been gathered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetAmount {
    asset_id: AssetId,
    amount: u64,
    burn: u64,
    spent: u64,
    change: u64,
    finished: bool,
}

impl AssetAmount {
    /// A request for `amount` sent plus `burn` paid as fee. A request for
    /// nothing starts out finished.
    pub fn new(asset_id: AssetId, amount: u64, burn: u64) -> Result<Self, UtxoError> {
        let total = amount.checked_add(burn).ok_or(UtxoError::Overflow)?;
        Ok(Self {
            asset_id,
            amount,
            burn,
            spent: 0,
            change: 0,
            finished: total == 0,
        })
    }

    pub fn asset_id(&self) -> &AssetId {
        &self.asset_id
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn burn(&self) -> u64 {
        self.burn
    }

    pub fn spent(&self) -> u64 {
        self.spent
    }

    pub fn change(&self) -> u64 {
        self.change
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// `amount + burn`. Cannot overflow, checked in [`AssetAmount::new`].
    pub fn total(&self) -> u64 {
        self.amount.saturating_add(self.burn)
    }

    /// Records `value` as gathered. Once the total is covered the surplus
    /// becomes change and the request is finished. Returns whether it is.
    pub fn spend_amount(&mut self, value: u64) -> Result<bool, UtxoError> {
        self.spent = self.spent.checked_add(value).ok_or(UtxoError::Overflow)?;
        let total = self.total();
        if self.spent >= total {
            self.change = self.spent - total;
            self.finished = true;
        }
        Ok(self.finished)
    }
}

// ---------------------------------------------------------------------------
// AssetAmountDestination
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct AssetAmountDestination {
    destinations: Vec<Address>,
    senders: Vec<Address>,
    change_addresses: Vec<Address>,
    amounts: Vec<AssetAmount>,
    inputs: Vec<TransferableInput>,
    outputs: Vec<TransferableOutput>,
    change: Vec<TransferableOutput>,
}

impl AssetAmountDestination {
    pub fn new(
        destinations: Vec<Address>,
        senders: Vec<Address>,
        change_addresses: Vec<Address>,
    ) -> Self {
        Self {
            destinations,
            senders,
            change_addresses,
            ..Default::default()
        }
    }

    /// Requests `amount` of `asset_id` for the destinations plus `burn` as
    /// fee. A repeated asset adds to the existing request.
    pub fn add_asset_amount(
        &mut self,
        asset_id: AssetId,
        amount: u64,
        burn: u64,
    ) -> Result<(), UtxoError> {
        if let Some(existing) = self.amounts.iter_mut().find(|a| a.asset_id == asset_id) {
            let amount = existing
                .amount
                .checked_add(amount)
                .ok_or(UtxoError::Overflow)?;
            let burn = existing.burn.checked_add(burn).ok_or(UtxoError::Overflow)?;
            *existing = AssetAmount::new(asset_id, amount, burn)?;
            return Ok(());
        }
        self.amounts.push(AssetAmount::new(asset_id, amount, burn)?);
        Ok(())
    }

    pub fn asset_exists(&self, asset_id: &AssetId) -> bool {
        self.amounts.iter().any(|a| &a.asset_id == asset_id)
    }

    pub fn asset_amount(&self, asset_id: &AssetId) -> Option<&AssetAmount> {
        self.amounts.iter().find(|a| &a.asset_id == asset_id)
    }

    pub(crate) fn asset_amount_mut(&mut self, asset_id: &AssetId) -> Option<&mut AssetAmount> {
        self.amounts.iter_mut().find(|a| &a.asset_id == asset_id)
    }

    /// True once every requested asset is covered.
    pub fn can_complete(&self) -> bool {
        self.amounts.iter().all(AssetAmount::is_finished)
    }

    pub fn amounts(&self) -> &[AssetAmount] {
        &self.amounts
    }

    pub fn destinations(&self) -> &[Address] {
        &self.destinations
    }

    pub fn senders(&self) -> &[Address] {
        &self.senders
    }

    pub fn change_addresses(&self) -> &[Address] {
        &self.change_addresses
    }

    pub fn add_input(&mut self, input: TransferableInput) {
        self.inputs.push(input);
    }

    pub fn add_output(&mut self, output: TransferableOutput) {
        self.outputs.push(output);
    }

    pub fn add_change(&mut self, output: TransferableOutput) {
        self.change.push(output);
    }

    pub fn inputs(&self) -> &[TransferableInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TransferableOutput] {
        &self.outputs
    }

    pub fn change_outputs(&self) -> &[TransferableOutput] {
        &self.change
    }

    /// Spend outputs followed by change outputs.
    pub fn all_outputs(&self) -> Vec<TransferableOutput> {
        self.outputs.iter().chain(&self.change).cloned().collect()
    }

    pub fn into_parts(
        self,
    ) -> (
        Vec<TransferableInput>,
        Vec<TransferableOutput>,
        Vec<TransferableOutput>,
    ) {
        (self.inputs, self.outputs, self.change)
    }
}
