//! UTXOs and the UTXO set.
//!
//! [`UtxoSet`] keeps UTXOs in insertion order (coin selection must be
//! deterministic) with a secondary index from owner address to the UTXOs it
//! can help spend. [`SharedUtxoSet`] wraps a set for hosts that mutate it
//! from several threads.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::amount::AssetAmountDestination;
use super::builder::{build_export_tx, BuiltExport, ExportRequest};
use super::error::UtxoError;
use crate::codec::error::CodecError;
use crate::codec::ids::{Address, AssetId, CodecId, TxId, UtxoId};
use crate::codec::primitives::{write_u16_be, write_u32_be, Decode, Encode, Reader};
use crate::config::{BuildConfig, SECP_XFER_OUTPUT_ID};
use crate::crypto::hash::{cb58_decode, cb58_encode};
use crate::transaction::input::{Input, SecpTransferInput, TransferableInput};
use crate::transaction::output::{select_output, Output, OutputOwners, TransferableOutput};

// ---------------------------------------------------------------------------
// Utxo
// ---------------------------------------------------------------------------

/// An unspent output and where it came from.
///
/// Wire form: `[2B codecID][32B txID][4B outputIdx][32B assetID][tagged output]`.
/// The string form is CB58 of those bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    #[serde(default)]
    pub codec: CodecId,
    pub tx_id: TxId,
    pub output_index: u32,
    pub asset_id: AssetId,
    pub output: Output,
}

impl Utxo {
    pub fn new(utxo_id: UtxoId, asset_id: AssetId, output: Output) -> Self {
        Self {
            codec: CodecId::Zero,
            tx_id: utxo_id.tx_id,
            output_index: utxo_id.output_index,
            asset_id,
            output,
        }
    }

    pub fn utxo_id(&self) -> UtxoId {
        UtxoId::new(self.tx_id, self.output_index)
    }
}

impl Encode for Utxo {
    fn encode(&self, out: &mut Vec<u8>) {
        write_u16_be(out, self.codec.as_u16());
        self.tx_id.encode(out);
        write_u32_be(out, self.output_index);
        self.asset_id.encode(out);
        self.output.encode(out);
    }
}

impl Decode for Utxo {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let codec = CodecId::try_from(r.read_u16()?)?;
        let tx_id = TxId::decode(r)?;
        let output_index = r.read_u32()?;
        let asset_id = AssetId::decode(r)?;
        let output = Output::decode(r)?;
        Ok(Self {
            codec,
            tx_id,
            output_index,
            asset_id,
            output,
        })
    }
}

impl fmt::Display for Utxo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&cb58_encode(&self.to_bytes()))
    }
}

impl FromStr for Utxo {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(&cb58_decode(s)?)
    }
}

// ---------------------------------------------------------------------------
// MergeRule
// ---------------------------------------------------------------------------

/// How [`UtxoSet::merge_by_rule`] combines `self` with another set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeRule {
    /// In both sets.
    Intersection,
    /// In `self` only.
    DifferenceSelf,
    /// In the other set only.
    DifferenceNew,
    /// In exactly one of the two.
    SymDifference,
    /// In either.
    Union,
    /// The union with the other set's UTXOs taken away.
    UnionMinusNew,
    /// The union with `self`'s UTXOs taken away.
    UnionMinusSelf,
    /// The other set, unchanged.
    OnlyNew,
    /// `self`, unchanged.
    OnlySelf,
}

// ---------------------------------------------------------------------------
// UtxoSet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct UtxoSet {
    order: Vec<UtxoId>,
    utxos: HashMap<UtxoId, Utxo>,
    /// address -> (UTXO ID -> amount, 0 for outputs without one).
    address_utxos: HashMap<Address, BTreeMap<UtxoId, u64>>,
}

impl UtxoSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn includes(&self, utxo_id: &UtxoId) -> bool {
        self.utxos.contains_key(utxo_id)
    }

    /// Adds `utxo`. An existing UTXO with the same ID is kept unless
    /// `overwrite` is set, in which case it is replaced in place (the set
    /// order does not change). Returns whether the set changed.
    pub fn add(&mut self, utxo: Utxo, overwrite: bool) -> bool {
        let utxo_id = utxo.utxo_id();
        if self.utxos.contains_key(&utxo_id) {
            if !overwrite {
                trace!(%utxo_id, "UTXO already present, keeping existing");
                return false;
            }
            self.unindex(&utxo_id);
        } else {
            self.order.push(utxo_id);
        }

        let amount = utxo.output.amount().unwrap_or(0);
        for address in utxo.output.addresses() {
            self.address_utxos
                .entry(*address)
                .or_default()
                .insert(utxo_id, amount);
        }
        debug!(%utxo_id, asset_id = %utxo.asset_id, amount, "UTXO added");
        self.utxos.insert(utxo_id, utxo);
        true
    }

    /// Adds every UTXO and returns the IDs of those that changed the set.
    pub fn add_all(&mut self, utxos: impl IntoIterator<Item = Utxo>, overwrite: bool) -> Vec<UtxoId> {
        let mut added = Vec::new();
        for utxo in utxos {
            let utxo_id = utxo.utxo_id();
            if self.add(utxo, overwrite) {
                added.push(utxo_id);
            }
        }
        added
    }

    pub fn add_from_bytes(&mut self, bytes: &[u8], overwrite: bool) -> Result<bool, CodecError> {
        Ok(self.add(Utxo::from_bytes(bytes)?, overwrite))
    }

    /// Adds a UTXO given in its CB58 string form.
    pub fn add_from_string(&mut self, s: &str, overwrite: bool) -> Result<bool, CodecError> {
        Ok(self.add(s.parse()?, overwrite))
    }

    pub fn remove(&mut self, utxo_id: &UtxoId) -> Option<Utxo> {
        let utxo = self.utxos.remove(utxo_id)?;
        self.order.retain(|id| id != utxo_id);
        self.unindex(utxo_id);
        debug!(%utxo_id, "UTXO removed");
        Some(utxo)
    }

    /// Removes every listed UTXO that is present and returns them.
    pub fn remove_all<'a>(&mut self, utxo_ids: impl IntoIterator<Item = &'a UtxoId>) -> Vec<Utxo> {
        utxo_ids
            .into_iter()
            .filter_map(|id| self.remove(id))
            .collect()
    }

    fn unindex(&mut self, utxo_id: &UtxoId) {
        self.address_utxos.retain(|_, ids| {
            ids.remove(utxo_id);
            !ids.is_empty()
        });
    }

    pub fn get(&self, utxo_id: &UtxoId) -> Option<&Utxo> {
        self.utxos.get(utxo_id)
    }

    /// Every UTXO, in set order.
    pub fn get_all(&self) -> Vec<&Utxo> {
        self.iter().collect()
    }

    /// The listed UTXOs that are present, in the order given.
    pub fn get_many(&self, utxo_ids: &[UtxoId]) -> Vec<&Utxo> {
        utxo_ids.iter().filter_map(|id| self.utxos.get(id)).collect()
    }

    /// Every UTXO in its CB58 string form, in set order.
    pub fn get_all_strings(&self) -> Vec<String> {
        self.iter().map(Utxo::to_string).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Utxo> {
        self.order.iter().filter_map(|id| self.utxos.get(id))
    }

    /// UTXO IDs owned (at least partly) by `addresses`, or every ID when
    /// `addresses` is `None`. With `spendable`, UTXOs still locked at
    /// `as_of` are left out.
    pub fn utxo_ids(&self, addresses: Option<&[Address]>, spendable: bool, as_of: u64) -> Vec<UtxoId> {
        let Some(addresses) = addresses else {
            return self.order.clone();
        };

        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for address in addresses {
            let Some(owned) = self.address_utxos.get(address) else {
                continue;
            };
            for utxo_id in owned.keys() {
                let Some(utxo) = self.utxos.get(utxo_id) else {
                    continue;
                };
                if spendable && utxo.output.locktime() > as_of {
                    continue;
                }
                if seen.insert(*utxo_id) {
                    ids.push(*utxo_id);
                }
            }
        }
        ids
    }

    /// Every address that owns at least one UTXO.
    pub fn addresses(&self) -> Vec<Address> {
        let mut addresses: Vec<Address> = self.address_utxos.keys().copied().collect();
        addresses.sort();
        addresses
    }

    /// Spendable balance of `asset_id` that `addresses` can unlock at `as_of`.
    pub fn balance(&self, addresses: &[Address], asset_id: &AssetId, as_of: u64) -> Result<u64, UtxoError> {
        let mut total = 0u64;
        for utxo_id in self.utxo_ids(Some(addresses), true, as_of) {
            let Some(utxo) = self.utxos.get(&utxo_id) else {
                continue;
            };
            if &utxo.asset_id != asset_id || !utxo.output.meets_threshold(addresses, as_of) {
                continue;
            }
            if let Some(amount) = utxo.output.amount() {
                total = total.checked_add(amount).ok_or(UtxoError::Overflow)?;
            }
        }
        Ok(total)
    }

    /// Distinct asset IDs held by `addresses` (or by anyone), first-seen order.
    pub fn asset_ids(&self, addresses: Option<&[Address]>) -> Vec<AssetId> {
        let mut seen = HashSet::new();
        self.utxo_ids(addresses, false, 0)
            .iter()
            .filter_map(|id| self.utxos.get(id))
            .map(|u| u.asset_id)
            .filter(|asset| seen.insert(*asset))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Set algebra
    // -----------------------------------------------------------------------

    /// A new set holding the UTXOs for which `keep` returns true.
    pub fn filter(&self, mut keep: impl FnMut(&Utxo) -> bool) -> UtxoSet {
        let mut result = UtxoSet::new();
        for utxo in self.iter().filter(|u| keep(u)) {
            result.add(utxo.clone(), false);
        }
        result
    }

    /// `self` plus the UTXOs of `other` (all of them, or only `utxo_ids`)
    /// that `self` lacks.
    pub fn merge(&self, other: &UtxoSet, utxo_ids: Option<&[UtxoId]>) -> UtxoSet {
        let mut result = self.clone();
        let incoming: Vec<&Utxo> = match utxo_ids {
            Some(ids) => other.get_many(ids),
            None => other.get_all(),
        };
        for utxo in incoming {
            result.add(utxo.clone(), false);
        }
        result
    }

    pub fn union(&self, other: &UtxoSet) -> UtxoSet {
        self.merge(other, None)
    }

    pub fn intersection(&self, other: &UtxoSet) -> UtxoSet {
        self.filter(|u| other.includes(&u.utxo_id()))
    }

    pub fn difference(&self, other: &UtxoSet) -> UtxoSet {
        self.filter(|u| !other.includes(&u.utxo_id()))
    }

    pub fn sym_difference(&self, other: &UtxoSet) -> UtxoSet {
        self.difference(other).union(&other.difference(self))
    }

    pub fn merge_by_rule(&self, other: &UtxoSet, rule: MergeRule) -> UtxoSet {
        match rule {
            MergeRule::Intersection => self.intersection(other),
            MergeRule::DifferenceSelf => self.difference(other),
            MergeRule::DifferenceNew => other.difference(self),
            MergeRule::SymDifference => self.sym_difference(other),
            MergeRule::Union => self.union(other),
            MergeRule::UnionMinusNew => self.union(other).difference(other),
            MergeRule::UnionMinusSelf => self.union(other).difference(self),
            MergeRule::OnlyNew => other.clone(),
            MergeRule::OnlySelf => self.clone(),
        }
    }

    // -----------------------------------------------------------------------
    // Coin selection
    // -----------------------------------------------------------------------

    /// Selects UTXOs in set order until `aad` can complete, then creates the
    /// spend and change outputs.
    ///
    /// A UTXO is consumed whole when its asset is requested and not yet
    /// covered, its output carries an amount, and the senders meet its
    /// threshold at `as_of`. Spend outputs go to the destinations under
    /// `locktime`/`threshold`; change goes to the change addresses. Both use
    /// the output variant of the first UTXO consumed for that asset.
    ///
    /// On error `aad` is left exactly as it was.
    ///
    /// # Errors
    ///
    /// - [`UtxoError::InsufficientFunds`] for the first asset left uncovered.
    /// - [`UtxoError::Address`] if a spender has no index among the owners.
    pub fn get_minimum_spendable(
        &self,
        aad: &mut AssetAmountDestination,
        as_of: u64,
        locktime: u64,
        threshold: u32,
    ) -> Result<(), UtxoError> {
        let mut work = aad.clone();
        let mut outids: HashMap<AssetId, u32> = HashMap::new();
        let senders = work.senders().to_vec();

        for utxo in self.iter() {
            if work.can_complete() {
                break;
            }
            let Some(amount) = utxo.output.amount() else {
                continue;
            };
            let needed = work
                .asset_amount(&utxo.asset_id)
                .map_or(false, |am| !am.is_finished());
            if !needed || !utxo.output.meets_threshold(&senders, as_of) {
                continue;
            }

            let mut input = Input::SecpTransfer(SecpTransferInput::new(amount));
            input.set_codec_id(utxo.codec.as_u16())?;
            for spender in utxo.output.spenders(&senders, as_of) {
                let index = utxo
                    .output
                    .address_index(&spender)
                    .ok_or(UtxoError::Address { address: spender })?;
                input.add_signature_idx(index, spender);
            }

            outids
                .entry(utxo.asset_id)
                .or_insert_with(|| utxo.output.type_id());
            if let Some(am) = work.asset_amount_mut(&utxo.asset_id) {
                am.spend_amount(amount)?;
            }
            trace!(utxo_id = %utxo.utxo_id(), amount, "UTXO selected");
            work.add_input(TransferableInput::new(utxo.utxo_id(), utxo.asset_id, input));
        }

        if let Some(short) = work.amounts().iter().find(|am| !am.is_finished()) {
            warn!(
                asset_id = %short.asset_id(),
                requested = short.total(),
                available = short.spent(),
                "coin selection failed"
            );
            return Err(UtxoError::InsufficientFunds {
                asset_id: *short.asset_id(),
                requested: short.total(),
                available: short.spent(),
            });
        }

        let mut outputs = Vec::new();
        let mut change = Vec::new();
        for am in work.amounts() {
            let outid = outids
                .get(am.asset_id())
                .copied()
                .unwrap_or(SECP_XFER_OUTPUT_ID);
            if am.amount() > 0 {
                let owners = OutputOwners::new(work.destinations().to_vec(), locktime, threshold)?;
                outputs.push(TransferableOutput::new(
                    *am.asset_id(),
                    select_output(outid, am.amount(), owners)?,
                ));
            }
            if am.change() > 0 {
                let owners = OutputOwners::new(work.change_addresses().to_vec(), 0, 1)?;
                change.push(TransferableOutput::new(
                    *am.asset_id(),
                    select_output(outid, am.change(), owners)?,
                ));
            }
        }
        for output in outputs {
            work.add_output(output);
        }
        for output in change {
            work.add_change(output);
        }

        debug!(
            inputs = work.inputs().len(),
            outputs = work.outputs().len(),
            change = work.change_outputs().len(),
            "coin selection complete"
        );
        *aad = work;
        Ok(())
    }
}

impl FromIterator<Utxo> for UtxoSet {
    fn from_iter<I: IntoIterator<Item = Utxo>>(iter: I) -> Self {
        let mut set = UtxoSet::new();
        set.add_all(iter, false);
        set
    }
}

// ---------------------------------------------------------------------------
// SharedUtxoSet
// ---------------------------------------------------------------------------

/// A [`UtxoSet`] shared between threads.
///
/// Readers work on [`SharedUtxoSet::snapshot`]s. Building a transaction and
/// removing the UTXOs it consumes happen under one write lock, so two
/// concurrent builds can never select the same UTXO.
#[derive(Debug, Clone, Default)]
pub struct SharedUtxoSet {
    inner: Arc<RwLock<UtxoSet>>,
}

impl SharedUtxoSet {
    pub fn new(set: UtxoSet) -> Self {
        Self {
            inner: Arc::new(RwLock::new(set)),
        }
    }

    pub fn add(&self, utxo: Utxo, overwrite: bool) -> bool {
        self.inner.write().add(utxo, overwrite)
    }

    pub fn remove(&self, utxo_id: &UtxoId) -> Option<Utxo> {
        self.inner.write().remove(utxo_id)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// A consistent copy of the current set.
    pub fn snapshot(&self) -> UtxoSet {
        self.inner.read().clone()
    }

    /// Builds an export and removes the UTXOs it spends, atomically.
    pub fn build_export_and_consume(
        &self,
        request: &ExportRequest,
        config: &BuildConfig,
    ) -> Result<BuiltExport, UtxoError> {
        let mut set = self.inner.write();
        let built = build_export_tx(&set, request, config)?;
        let consumed: Vec<UtxoId> = built.inputs.iter().map(TransferableInput::utxo_id).collect();
        set.remove_all(&consumed);
        debug!(consumed = consumed.len(), remaining = set.len(), "export consumed UTXOs");
        Ok(built)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NFT_XFER_OUTPUT_ID;
    use crate::transaction::output::{NftTransferOutput, SecpMintOutput, SecpTransferOutput};

    const ASSET: AssetId = AssetId::new([0xAA; 32]);

    fn addr(b: u8) -> Address {
        Address::new([b; 20])
    }

    fn owners(addrs: &[u8], locktime: u64, threshold: u32) -> OutputOwners {
        OutputOwners::new(addrs.iter().map(|b| addr(*b)).collect(), locktime, threshold).unwrap()
    }

    fn coin(tx: u8, amount: u64, owner: u8) -> Utxo {
        Utxo::new(
            UtxoId::new(TxId::new([tx; 32]), 0),
            ASSET,
            Output::SecpTransfer(SecpTransferOutput::new(amount, owners(&[owner], 0, 1))),
        )
    }

    fn aad(amount: u64, burn: u64) -> AssetAmountDestination {
        let mut aad = AssetAmountDestination::new(vec![addr(9)], vec![addr(1)], vec![addr(1)]);
        aad.add_asset_amount(ASSET, amount, burn).unwrap();
        aad
    }

    #[test]
    fn test_utxo_layout_and_string_roundtrip() {
        let utxo = coin(3, 1_000, 1);
        let bytes = utxo.to_bytes();
        assert_eq!(&bytes[..2], &[0, 0]);
        assert_eq!(&bytes[70..74], &SECP_XFER_OUTPUT_ID.to_be_bytes());
        assert_eq!(Utxo::from_bytes(&bytes).unwrap(), utxo);

        let s = utxo.to_string();
        assert_eq!(s.parse::<Utxo>().unwrap(), utxo);
    }

    #[test]
    fn test_add_respects_overwrite() {
        let mut set = UtxoSet::new();
        assert!(set.add(coin(1, 10, 1), false));
        assert!(!set.add(coin(1, 20, 1), false));
        assert_eq!(set.get(&coin(1, 0, 1).utxo_id()).unwrap().output.amount(), Some(10));

        assert!(set.add(coin(1, 20, 2), true));
        assert_eq!(set.len(), 1);
        assert_eq!(set.addresses(), vec![addr(2)]);
    }

    #[test]
    fn test_add_from_string_and_remove() {
        let mut set = UtxoSet::new();
        let utxo = coin(4, 5, 1);
        assert!(set.add_from_string(&utxo.to_string(), false).unwrap());
        assert!(set.add_from_string("not-cb58", false).is_err());
        assert_eq!(set.get_all_strings(), vec![utxo.to_string()]);

        assert_eq!(set.remove(&utxo.utxo_id()), Some(utxo.clone()));
        assert!(set.remove(&utxo.utxo_id()).is_none());
        assert!(set.addresses().is_empty());
    }

    #[test]
    fn test_utxo_ids_by_address_and_locktime() {
        let mut set = UtxoSet::new();
        set.add(coin(1, 10, 1), false);
        set.add(coin(2, 10, 2), false);
        let locked = Utxo::new(
            UtxoId::new(TxId::new([3; 32]), 0),
            ASSET,
            Output::SecpTransfer(SecpTransferOutput::new(10, owners(&[1], 500, 1))),
        );
        set.add(locked.clone(), false);

        assert_eq!(set.utxo_ids(None, false, 0).len(), 3);
        assert_eq!(set.utxo_ids(Some(&[addr(1)]), false, 0).len(), 2);
        assert_eq!(set.utxo_ids(Some(&[addr(1)]), true, 100).len(), 1);
        assert_eq!(set.utxo_ids(Some(&[addr(1)]), true, 500).len(), 2);
        assert_eq!(set.balance(&[addr(1)], &ASSET, 100).unwrap(), 10);
        assert_eq!(set.balance(&[addr(1)], &ASSET, 500).unwrap(), 20);
    }

    #[test]
    fn test_asset_ids_first_seen_order() {
        let other = AssetId::new([0xBB; 32]);
        let mut set = UtxoSet::new();
        let mut foreign = coin(1, 5, 1);
        foreign.asset_id = other;
        set.add(foreign, false);
        set.add(coin(2, 5, 1), false);
        set.add(coin(3, 5, 1), false);
        assert_eq!(set.asset_ids(None), vec![other, ASSET]);
        assert!(set.asset_ids(Some(&[addr(7)])).is_empty());
    }

    #[test]
    fn test_set_algebra() {
        let a: UtxoSet = [coin(1, 1, 1), coin(2, 1, 1)].into_iter().collect();
        let b: UtxoSet = [coin(2, 1, 1), coin(3, 1, 1)].into_iter().collect();
        let ids = |s: &UtxoSet| -> Vec<u8> { s.iter().map(|u| u.tx_id.as_bytes()[0]).collect() };

        assert_eq!(ids(&a.merge_by_rule(&b, MergeRule::Intersection)), vec![2]);
        assert_eq!(ids(&a.merge_by_rule(&b, MergeRule::DifferenceSelf)), vec![1]);
        assert_eq!(ids(&a.merge_by_rule(&b, MergeRule::DifferenceNew)), vec![3]);
        assert_eq!(ids(&a.merge_by_rule(&b, MergeRule::SymDifference)), vec![1, 3]);
        assert_eq!(ids(&a.merge_by_rule(&b, MergeRule::Union)), vec![1, 2, 3]);
        assert_eq!(ids(&a.merge_by_rule(&b, MergeRule::UnionMinusNew)), vec![1]);
        assert_eq!(ids(&a.merge_by_rule(&b, MergeRule::UnionMinusSelf)), vec![3]);
        assert_eq!(ids(&a.merge_by_rule(&b, MergeRule::OnlyNew)), vec![2, 3]);
        assert_eq!(ids(&a.merge_by_rule(&b, MergeRule::OnlySelf)), vec![1, 2]);

        let only_three = a.merge(&b, Some(&[coin(3, 0, 1).utxo_id()]));
        assert_eq!(ids(&only_three), vec![1, 2, 3]);
    }

    #[test]
    fn test_minimum_spendable_scenario() {
        let set: UtxoSet = [coin(1, 1_000, 1)].into_iter().collect();
        let mut aad = aad(600, 10);
        set.get_minimum_spendable(&mut aad, 0, 0, 1).unwrap();

        assert!(aad.can_complete());
        assert_eq!(aad.inputs().len(), 1);
        assert_eq!(aad.inputs()[0].input.amount(), 1_000);
        assert_eq!(aad.inputs()[0].input.sig_idxs().len(), 1);
        assert_eq!(aad.outputs()[0].output.amount(), Some(600));
        assert_eq!(aad.outputs()[0].output.addresses(), &[addr(9)]);
        assert_eq!(aad.change_outputs()[0].output.amount(), Some(390));
        assert_eq!(aad.change_outputs()[0].output.addresses(), &[addr(1)]);
    }

    #[test]
    fn test_selection_stops_once_complete() {
        let set: UtxoSet = [coin(1, 500, 1), coin(2, 500, 1), coin(3, 500, 1)]
            .into_iter()
            .collect();
        let mut aad = aad(700, 0);
        set.get_minimum_spendable(&mut aad, 0, 0, 1).unwrap();
        assert_eq!(aad.inputs().len(), 2);
        assert_eq!(aad.change_outputs()[0].output.amount(), Some(300));
    }

    #[test]
    fn test_insufficient_funds_leaves_aad_untouched() {
        let set: UtxoSet = [coin(1, 100, 1), coin(2, 100, 1)].into_iter().collect();
        let mut aad = aad(500, 10);
        let before = aad.clone();

        assert_eq!(
            set.get_minimum_spendable(&mut aad, 0, 0, 1),
            Err(UtxoError::InsufficientFunds {
                asset_id: ASSET,
                requested: 510,
                available: 200
            })
        );
        assert!(aad.inputs().is_empty());
        assert!(aad.outputs().is_empty());
        assert_eq!(aad.amounts(), before.amounts());
    }

    #[test]
    fn test_selection_skips_foreign_locked_and_mint_outputs() {
        let mut set = UtxoSet::new();
        set.add(coin(1, 1_000, 2), false);
        set.add(
            Utxo::new(
                UtxoId::new(TxId::new([2; 32]), 0),
                ASSET,
                Output::SecpMint(SecpMintOutput::new(owners(&[1], 0, 1))),
            ),
            false,
        );
        set.add(
            Utxo::new(
                UtxoId::new(TxId::new([3; 32]), 0),
                ASSET,
                Output::SecpTransfer(SecpTransferOutput::new(1_000, owners(&[1], 99, 1))),
            ),
            false,
        );
        set.add(coin(4, 50, 1), false);

        let mut aad = aad(50, 0);
        set.get_minimum_spendable(&mut aad, 10, 0, 1).unwrap();
        assert_eq!(aad.inputs().len(), 1);
        assert_eq!(aad.inputs()[0].tx_id, TxId::new([4; 32]));
        assert!(aad.change_outputs().is_empty());
    }

    #[test]
    fn test_multisig_selection_attaches_each_spender() {
        let utxo = Utxo::new(
            UtxoId::new(TxId::new([1; 32]), 0),
            ASSET,
            Output::SecpTransfer(SecpTransferOutput::new(100, owners(&[1, 2, 3], 0, 2))),
        );
        let set: UtxoSet = [utxo].into_iter().collect();
        let mut aad = AssetAmountDestination::new(vec![addr(9)], vec![addr(3), addr(1)], vec![addr(1)]);
        aad.add_asset_amount(ASSET, 100, 0).unwrap();
        set.get_minimum_spendable(&mut aad, 0, 0, 1).unwrap();

        let indices: Vec<u32> = aad.inputs()[0].input.sig_idxs().iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn test_multisig_selection_picks_lowest_owner_indices() {
        let utxo = Utxo::new(
            UtxoId::new(TxId::new([1; 32]), 0),
            ASSET,
            Output::SecpTransfer(SecpTransferOutput::new(100, owners(&[1, 2, 3], 0, 2))),
        );
        let set: UtxoSet = [utxo].into_iter().collect();
        let mut aad = AssetAmountDestination::new(
            vec![addr(9)],
            vec![addr(3), addr(2), addr(1)],
            vec![addr(1)],
        );
        aad.add_asset_amount(ASSET, 100, 0).unwrap();
        set.get_minimum_spendable(&mut aad, 0, 0, 1).unwrap();

        let sig_idxs = aad.inputs()[0].input.sig_idxs();
        let indices: Vec<u32> = sig_idxs.iter().map(|s| s.index).collect();
        let sources: Vec<Option<Address>> = sig_idxs.iter().map(|s| s.source().copied()).collect();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(sources, vec![Some(addr(1)), Some(addr(2))]);
    }

    #[test]
    fn test_spend_outputs_keep_source_variant_and_codec() {
        let mut utxo = coin(1, 100, 1);
        utxo.output.set_codec_id(1).unwrap();
        utxo.codec = CodecId::One;
        let set: UtxoSet = [utxo].into_iter().collect();
        let mut aad = aad(40, 0);
        set.get_minimum_spendable(&mut aad, 0, 0, 1).unwrap();

        assert_eq!(aad.outputs()[0].output.codec(), CodecId::One);
        assert_eq!(aad.change_outputs()[0].output.codec(), CodecId::One);
        assert_eq!(aad.inputs()[0].input.codec(), CodecId::One);
    }

    #[test]
    fn test_non_amount_outputs_are_indexed_with_zero() {
        let nft = Utxo::new(
            UtxoId::new(TxId::new([5; 32]), 1),
            ASSET,
            Output::NftTransfer(NftTransferOutput::new(0, vec![1], owners(&[1], 0, 1))),
        );
        assert_eq!(nft.output.type_id(), NFT_XFER_OUTPUT_ID);
        let set: UtxoSet = [nft].into_iter().collect();
        assert_eq!(set.utxo_ids(Some(&[addr(1)]), true, 0).len(), 1);
        assert_eq!(set.balance(&[addr(1)], &ASSET, 0).unwrap(), 0);
    }

    #[test]
    fn test_shared_set_snapshot_is_independent() {
        let shared = SharedUtxoSet::new([coin(1, 10, 1)].into_iter().collect());
        let snapshot = shared.snapshot();
        shared.add(coin(2, 10, 1), false);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(shared.len(), 2);
    }
}
