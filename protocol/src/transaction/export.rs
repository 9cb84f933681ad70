//! Atomic export out of the EVM chain.

use serde::{Deserialize, Serialize};

use super::base::BaseTx;
use super::error::TxError;
use super::import::sum_checked;
use super::input::EvmInput;
use super::output::TransferableOutput;
use crate::codec::error::CodecError;
use crate::codec::ids::{AssetId, ChainId};
use crate::codec::primitives::{encode_vec, Decode, Encode, Reader};

/// Wire body: `[base][32B destinationChain][4B n][EvmInput]*[4B m][TransferableOutput]*`.
///
/// `ins` debit EVM accounts; `exported_outs` are the outputs that appear in
/// the destination chain's shared memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportTx {
    pub base: BaseTx,
    pub destination_chain: ChainId,
    pub ins: Vec<EvmInput>,
    pub exported_outs: Vec<TransferableOutput>,
}

impl ExportTx {
    pub fn new(
        base: BaseTx,
        destination_chain: ChainId,
        ins: Vec<EvmInput>,
        exported_outs: Vec<TransferableOutput>,
    ) -> Self {
        Self {
            base,
            destination_chain,
            ins,
            exported_outs,
        }
    }

    /// Sum of exported amount-bearing outputs of `asset_id`.
    pub fn total_exported(&self, asset_id: &AssetId) -> Result<u64, TxError> {
        sum_checked(
            self.exported_outs
                .iter()
                .filter(|o| &o.asset_id == asset_id)
                .filter_map(|o| o.output.amount()),
        )
    }

    /// Puts inputs and outputs into canonical order.
    pub fn sort(&mut self) {
        self.ins.sort_by(EvmInput::canonical_cmp);
        self.exported_outs.sort_by(TransferableOutput::canonical_cmp);
    }
}

impl Encode for ExportTx {
    fn encode(&self, out: &mut Vec<u8>) {
        self.base.encode(out);
        self.destination_chain.encode(out);
        encode_vec(&self.ins, out);
        encode_vec(&self.exported_outs, out);
    }
}

impl Decode for ExportTx {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let base = BaseTx::decode(r)?;
        let destination_chain = ChainId::decode(r)?;
        let ins = r.read_vec()?;
        let exported_outs = r.read_vec()?;
        Ok(Self {
            base,
            destination_chain,
            ins,
            exported_outs,
        })
    }
}
