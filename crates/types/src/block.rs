use serde::{Deserialize, Serialize};

use crate::TxId;

/// Snapshot of chain state from `GET /v2/info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
    pub burn_block_height: u64,
    pub stacks_tip_height: u64,
    pub stacks_tip: String,
}

/// Block contents from `GET /v2/blocks/height/{height}`, reduced to what the
/// wait machinery inspects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSummary {
    pub height: u64,
    pub hash: String,
    #[serde(default)]
    pub transactions: Vec<TxId>,
}
