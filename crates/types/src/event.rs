use serde::{Deserialize, Serialize};

use crate::TxId;

/// One observation of the chain advancing.
///
/// Only `height` is always present. Sources that cannot cheaply resolve the
/// rest leave the optional fields unset, and conditions that need them simply
/// do not match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEvent {
    pub height: u64,
    pub cycle_id: Option<u64>,
    pub block_hash: Option<String>,
    pub transactions: Option<Vec<TxId>>,
}

impl ChainEvent {
    pub fn at_height(height: u64) -> Self {
        Self {
            height,
            cycle_id: None,
            block_hash: None,
            transactions: None,
        }
    }

    pub fn block_ref(&self) -> BlockRef {
        BlockRef {
            height: self.height,
            hash: self.block_hash.clone(),
        }
    }

    pub fn includes(&self, txid: &TxId) -> bool {
        self.transactions
            .as_ref()
            .is_some_and(|txs| txs.contains(txid))
    }
}

/// Stable reference to the block an event was observed at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRef {
    pub height: u64,
    pub hash: Option<String>,
}

/// What a wait is looking for in the event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetCondition {
    /// First event whose height is at or past the target. Events below the
    /// target never match, even as the last event seen.
    HeightAtLeast(u64),
    /// First event stamped with the given reward cycle or a later one.
    InCycle(u64),
    /// First event whose block carries the transaction.
    IncludesTransaction(TxId),
}

impl TargetCondition {
    pub fn accepts(&self, event: &ChainEvent) -> bool {
        match self {
            Self::HeightAtLeast(target) => event.height >= *target,
            Self::InCycle(cycle) => event.cycle_id.is_some_and(|id| id >= *cycle),
            Self::IncludesTransaction(txid) => event.includes(txid),
        }
    }
}

impl std::fmt::Display for TargetCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HeightAtLeast(target) => write!(f, "height >= {}", target),
            Self::InCycle(cycle) => write!(f, "reward cycle >= {}", cycle),
            Self::IncludesTransaction(txid) => write!(f, "block includes {}", txid),
        }
    }
}
