//! Atomic import into the EVM chain.
//!
//! An [`ImportTx`] consumes UTXOs exported from another chain
//! ([`TransferableInput`]s) and credits EVM accounts ([`EvmOutput`]s). The
//! difference between native-asset inputs and outputs is the fee.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::base::BaseTx;
use super::error::TxError;
use super::input::TransferableInput;
use super::output::EvmOutput;
use crate::codec::error::CodecError;
use crate::codec::ids::{AssetId, ChainId};
use crate::codec::primitives::{encode_vec, Decode, Encode, Reader};

/// What an import must leave behind as fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeRequirement {
    /// The only asset fees are measured in.
    pub native_asset_id: AssetId,
    pub fee: u64,
}

impl FeeRequirement {
    pub fn new(native_asset_id: AssetId, fee: u64) -> Self {
        Self {
            native_asset_id,
            fee,
        }
    }
}

/// Wire body: `[base][32B sourceChain][4B n][TransferableInput]*[4B m][EvmOutput]*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportTx {
    pub base: BaseTx,
    pub source_chain: ChainId,
    pub imported_inputs: Vec<TransferableInput>,
    pub outs: Vec<EvmOutput>,
}

impl ImportTx {
    /// Builds an import, validating it against `fee` when both inputs and
    /// outputs are present.
    ///
    /// An import with no inputs or no outputs is accepted unchecked so it can
    /// be filled in incrementally; call [`ImportTx::validate`] once complete.
    ///
    /// # Errors
    ///
    /// - [`TxError::EvmOutput`] if an (address, asset) pair repeats.
    /// - [`TxError::EvmFee`] if the native surplus is below `fee.fee`.
    pub fn new(
        base: BaseTx,
        source_chain: ChainId,
        imported_inputs: Vec<TransferableInput>,
        outs: Vec<EvmOutput>,
        fee: FeeRequirement,
    ) -> Result<Self, TxError> {
        let tx = Self {
            base,
            source_chain,
            imported_inputs,
            outs,
        };
        if !tx.imported_inputs.is_empty() && !tx.outs.is_empty() {
            tx.validate(&fee)?;
        }
        Ok(tx)
    }

    /// Checks output uniqueness, then that the native-asset surplus covers
    /// the fee. Outputs exceeding inputs report a provided fee of zero.
    pub fn validate(&self, fee: &FeeRequirement) -> Result<(), TxError> {
        validate_outs(&self.outs)?;

        let inputs = self.total_imported(&fee.native_asset_id)?;
        let outputs = sum_checked(
            self.outs
                .iter()
                .filter(|o| o.asset_id == fee.native_asset_id)
                .map(|o| o.amount),
        )?;
        let provided = inputs.saturating_sub(outputs);
        if inputs < outputs || provided < fee.fee {
            warn!(
                required = fee.fee,
                provided,
                inputs,
                outputs,
                "import pays insufficient fee"
            );
            return Err(TxError::EvmFee {
                required: fee.fee,
                provided,
            });
        }
        Ok(())
    }

    /// Sum of imported input amounts of `asset_id`.
    pub fn total_imported(&self, asset_id: &AssetId) -> Result<u64, TxError> {
        sum_checked(
            self.imported_inputs
                .iter()
                .filter(|i| &i.asset_id == asset_id)
                .map(|i| i.input.amount()),
        )
    }

    /// Puts inputs and outputs into canonical order.
    pub fn sort(&mut self) {
        self.imported_inputs
            .sort_by(TransferableInput::canonical_cmp);
        self.outs.sort_by(EvmOutput::canonical_cmp);
    }
}

/// Rejects a second EVM output for the same (address, asset) pair.
pub fn validate_outs(outs: &[EvmOutput]) -> Result<(), TxError> {
    let mut seen = HashSet::with_capacity(outs.len());
    for out in outs {
        if !seen.insert((out.address, out.asset_id)) {
            return Err(TxError::EvmOutput(format!(
                "duplicate output for address {} and asset {}",
                out.address, out.asset_id
            )));
        }
    }
    Ok(())
}

pub(crate) fn sum_checked(mut amounts: impl Iterator<Item = u64>) -> Result<u64, TxError> {
    amounts.try_fold(0u64, |acc, a| acc.checked_add(a).ok_or(TxError::Overflow))
}

impl Encode for ImportTx {
    fn encode(&self, out: &mut Vec<u8>) {
        self.base.encode(out);
        self.source_chain.encode(out);
        encode_vec(&self.imported_inputs, out);
        encode_vec(&self.outs, out);
    }
}

impl Decode for ImportTx {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let base = BaseTx::decode(r)?;
        let source_chain = ChainId::decode(r)?;
        let imported_inputs = r.read_vec()?;
        let outs = r.read_vec()?;
        Ok(Self {
            base,
            source_chain,
            imported_inputs,
            outs,
        })
    }
}
