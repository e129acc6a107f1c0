use std::net::SocketAddr;

use futures::future::join_all;
use pox_api_client::{ApiClient, BroadcastError, PoxApiClient};
use pox_types::{AccountInfo, BroadcastAck, ContractCall, PoxInfo};
use tracing::{debug, info};

use crate::{sign_transaction, TestSigner, DEFAULT_TX_FEE};

/// Mutable submission state for one signer. Nonces live here and nowhere
/// else: a context advances when the node accepts a broadcast, and stays
/// put when the node rejects one, so the next attempt reuses the nonce.
#[derive(Debug)]
pub struct StackingCtx {
    pub signer: TestSigner,
    pub nonce: u64,
    pub fee: u64,
}

impl StackingCtx {
    pub fn new(signer: TestSigner, nonce: u64) -> Self {
        Self {
            signer,
            nonce,
            fee: DEFAULT_TX_FEE,
        }
    }

    pub fn address(&self) -> &str {
        &self.signer.address
    }

    /// Re-aligns the nonce with on chain state, e.g. after out of band
    /// activity from the same signer.
    pub fn sync_with(&mut self, account: &AccountInfo) {
        self.nonce = account.nonce;
    }
}

/// Submits contract calls for a set of signers against one node.
#[derive(Debug, Clone)]
pub struct StackingHarness<C: ApiClient = PoxApiClient> {
    api_client: C,
    peer: SocketAddr,
}

impl<C: ApiClient> StackingHarness<C> {
    pub fn new(api_client: C, peer: SocketAddr) -> Self {
        Self { api_client, peer }
    }

    pub fn api_client(&self) -> &C {
        &self.api_client
    }

    pub async fn pox_info(&self) -> eyre::Result<PoxInfo> {
        self.api_client.get_pox_info(self.peer).await
    }

    pub async fn account(&self, principal: &str) -> eyre::Result<AccountInfo> {
        self.api_client.get_account(self.peer, principal).await
    }

    /// Minimum uSTX a solo stacker must lock for the next cycle.
    pub async fn stacking_minimum(&self) -> eyre::Result<u128> {
        Ok(self.pox_info().await?.stacking_minimum())
    }

    /// Context for a signer, nonce seeded from the account state.
    pub async fn new_ctx(&self, signer: TestSigner) -> eyre::Result<StackingCtx> {
        let account = self.api_client.get_account(self.peer, &signer.address).await?;
        debug!(
            "{} starts at nonce {} with balance {}",
            signer.name, account.nonce, account.balance
        );
        Ok(StackingCtx::new(signer, account.nonce))
    }

    /// Signs with the context's nonce and broadcasts.
    pub async fn submit(
        &self,
        ctx: &mut StackingCtx,
        call: ContractCall,
    ) -> Result<BroadcastAck, BroadcastError> {
        let function = call.function.clone();
        let transaction = sign_transaction(&ctx.signer, ctx.nonce, ctx.fee, call);
        let ack = self
            .api_client
            .broadcast_transaction(self.peer, &transaction)
            .await?;
        info!(
            "{} broadcast {} (nonce {}) as {}",
            ctx.signer.name, function, ctx.nonce, ack.txid
        );
        ctx.nonce += 1;
        Ok(ack)
    }

    /// Signs one call per context, fires every broadcast at once and awaits
    /// them jointly. Contexts whose broadcast was accepted advance even
    /// when a sibling is rejected; the first rejection is returned.
    pub async fn submit_all(
        &self,
        ctxs: &mut [StackingCtx],
        calls: Vec<ContractCall>,
    ) -> eyre::Result<Vec<BroadcastAck>> {
        eyre::ensure!(
            ctxs.len() == calls.len(),
            "one call per context, got {} contexts and {} calls",
            ctxs.len(),
            calls.len()
        );

        let transactions: Vec<_> = ctxs
            .iter()
            .zip(&calls)
            .map(|(ctx, call)| sign_transaction(&ctx.signer, ctx.nonce, ctx.fee, call.clone()))
            .collect();
        let results = join_all(
            transactions
                .iter()
                .map(|tx| self.api_client.broadcast_transaction(self.peer, tx)),
        )
        .await;

        let mut acks = Vec::with_capacity(results.len());
        let mut first_error = None;
        for (ctx, result) in ctxs.iter_mut().zip(results) {
            match result {
                Ok(ack) => {
                    ctx.nonce += 1;
                    acks.push(ack);
                }
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(eyre::Report::new(e));
                    }
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => {
                info!("jointly submitted {} transactions", acks.len());
                Ok(acks)
            }
        }
    }
}
