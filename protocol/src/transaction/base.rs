//! Fields shared by every atomic EVM transaction.

use serde::{Deserialize, Serialize};

use crate::codec::error::CodecError;
use crate::codec::ids::ChainId;
use crate::codec::primitives::{write_u32_be, Decode, Encode, Reader};

/// `[4B networkID][32B blockchainID]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseTx {
    pub network_id: u32,
    pub blockchain_id: ChainId,
}

impl BaseTx {
    pub fn new(network_id: u32, blockchain_id: ChainId) -> Self {
        Self {
            network_id,
            blockchain_id,
        }
    }
}

impl Encode for BaseTx {
    fn encode(&self, out: &mut Vec<u8>) {
        write_u32_be(out, self.network_id);
        self.blockchain_id.encode(out);
    }
}

impl Decode for BaseTx {
    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let network_id = r.read_u32()?;
        let blockchain_id = ChainId::decode(r)?;
        Ok(Self {
            network_id,
            blockchain_id,
        })
    }
}
