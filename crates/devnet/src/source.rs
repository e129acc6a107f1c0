use std::net::SocketAddr;

use async_trait::async_trait;
use pox_api_client::{ApiClient, PoxApiClient};
use pox_sync::ChainEventSource;
use pox_types::{ChainEvent, TxId, TxResult};
use tracing::debug;

#[derive(Debug, Clone, Copy)]
struct CycleConstants {
    first_burnchain_block_height: u64,
    reward_cycle_length: u64,
}

impl CycleConstants {
    fn cycle_of(&self, height: u64) -> Option<u64> {
        (self.reward_cycle_length > 0 && height >= self.first_burnchain_block_height)
            .then(|| (height - self.first_burnchain_block_height) / self.reward_cycle_length)
    }
}

/// Event source backed by a node's HTTP API.
///
/// The cursor starts at the tip observed on the first poll and then walks
/// forward one height per poll, so no block past that baseline is skipped
/// even when the chain outruns the poller.
#[derive(Debug)]
pub struct NodeEventSource<C = PoxApiClient> {
    api_client: C,
    peer: SocketAddr,
    last_height: Option<u64>,
    cycle_constants: Option<CycleConstants>,
}

impl<C: ApiClient> NodeEventSource<C> {
    pub fn new(api_client: C, peer: SocketAddr) -> Self {
        Self {
            api_client,
            peer,
            last_height: None,
            cycle_constants: None,
        }
    }

    /// Reward cycle for a height, loading the PoX constants lazily. Nodes
    /// without PoX state produce unstamped events.
    async fn cycle_of(&mut self, height: u64) -> Option<u64> {
        if self.cycle_constants.is_none() {
            match self.api_client.get_pox_info(self.peer).await {
                Ok(info) => {
                    self.cycle_constants = Some(CycleConstants {
                        first_burnchain_block_height: info.first_burnchain_block_height,
                        reward_cycle_length: info.reward_cycle_length,
                    });
                }
                Err(e) => {
                    debug!("could not load PoX constants from {}: {}", self.peer, e);
                    return None;
                }
            }
        }
        self.cycle_constants?.cycle_of(height)
    }
}

#[async_trait]
impl<C: ApiClient> ChainEventSource for NodeEventSource<C> {
    async fn poll_event(&mut self) -> eyre::Result<Option<ChainEvent>> {
        let info = self.api_client.get_chain_info(self.peer).await?;
        let tip = info.stacks_tip_height;

        let next = match self.last_height {
            None => tip,
            Some(height) if height < tip => height + 1,
            Some(_) => return Ok(None),
        };

        let summary = self.api_client.get_block_at_height(self.peer, next).await?;
        self.last_height = Some(next);
        let cycle_id = self.cycle_of(next).await;

        let event = match summary {
            Some(block) => ChainEvent {
                height: block.height,
                cycle_id,
                block_hash: Some(block.hash),
                transactions: Some(block.transactions),
            },
            // The tip moved but the block body is not served yet. Report the
            // height so height waits progress; inclusion waits keep polling.
            None => ChainEvent {
                height: next,
                cycle_id,
                block_hash: None,
                transactions: None,
            },
        };
        Ok(Some(event))
    }

    async fn transaction_result(&self, txid: &TxId) -> eyre::Result<Option<TxResult>> {
        let status = self.api_client.get_transaction_status(self.peer, txid).await?;
        Ok(status.and_then(|s| s.result))
    }
}
