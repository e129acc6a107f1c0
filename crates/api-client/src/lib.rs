use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use eyre::Result;
use pox_types::{
    AccountInfo, BlockSummary, BroadcastAck, ChainInfo, PoxInfo, RejectionResponse,
    SignedTransaction, TransactionStatusResponse, TxId,
};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};

pub const CLIENT_TIMEOUT: Duration = Duration::from_secs(5);

#[expect(clippy::upper_case_acronyms, reason = "Canonical HTTP method names")]
enum Method {
    GET,
    POST,
}

/// A transaction the node refused at the mempool door, as opposed to a
/// transport failure that says nothing about the transaction itself.
#[derive(Debug, thiserror::Error)]
pub enum BroadcastError {
    #[error("transaction rejected by node: {error}, reason: {reason:?}")]
    Rejected {
        error: String,
        reason: Option<String>,
    },
    #[error(transparent)]
    Transport(#[from] eyre::Report),
}

#[async_trait]
pub trait ApiClient: Clone + Unpin + Default + Send + Sync + 'static {
    async fn get_chain_info(&self, peer: SocketAddr) -> Result<ChainInfo>;

    async fn get_pox_info(&self, peer: SocketAddr) -> Result<PoxInfo>;

    async fn get_account(&self, peer: SocketAddr, principal: &str) -> Result<AccountInfo>;

    /// `None` when the node has no block at that height yet.
    async fn get_block_at_height(
        &self,
        peer: SocketAddr,
        height: u64,
    ) -> Result<Option<BlockSummary>>;

    /// `None` when the node has never seen the transaction.
    async fn get_transaction_status(
        &self,
        peer: SocketAddr,
        txid: &TxId,
    ) -> Result<Option<TransactionStatusResponse>>;

    async fn broadcast_transaction(
        &self,
        peer: SocketAddr,
        transaction: &SignedTransaction,
    ) -> Result<BroadcastAck, BroadcastError>;
}

/// Real client for the node HTTP API.
#[derive(Debug, Clone)]
pub struct PoxApiClient {
    pub client: Client,
    /// Overrides the `http://{peer}/v2` prefix when talking to nodes behind
    /// a hostname rather than a raw socket address.
    base_url: Option<String>,
}

impl Default for PoxApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PoxApiClient {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .timeout(CLIENT_TIMEOUT)
                .read_timeout(CLIENT_TIMEOUT)
                .build()
                .expect("building a reqwest client with static options succeeds"),
            base_url: None,
        }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let base_url = base_url.strip_suffix('/').unwrap_or(&base_url).to_string();
        Self {
            base_url: Some(base_url),
            ..Self::new()
        }
    }

    fn url_for(&self, peer: SocketAddr, path: &str) -> String {
        match &self.base_url {
            Some(base) => format!("{}{}", base, path),
            None => format!("http://{}/v2{}", peer, path),
        }
    }

    async fn make_request<RESBODY, REQBODY>(
        &self,
        peer: SocketAddr,
        method: Method,
        path: &str,
        body: Option<&REQBODY>,
    ) -> Result<Option<RESBODY>>
    where
        RESBODY: DeserializeOwned,
        REQBODY: Serialize + Sync,
    {
        let url = self.url_for(peer, path);

        let mut request = match method {
            Method::GET => self.client.get(&url),
            Method::POST => self.client.post(&url),
        };

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        match status {
            StatusCode::OK => {
                let text = response.text().await?;
                if text.trim().is_empty() {
                    return Ok(None);
                }
                let body: RESBODY = serde_json::from_str(&text).map_err(|e| {
                    eyre::eyre!("{}: Failed to parse JSON: {} - Response: {}", url, e, text)
                })?;
                Ok(Some(body))
            }
            StatusCode::NOT_FOUND => Ok(None),
            _ => {
                let error_text = response.text().await.unwrap_or_default();
                Err(eyre::eyre!(
                    "API request {} failed with status: {} - {}",
                    url,
                    status,
                    error_text
                ))
            }
        }
    }
}

#[async_trait]
impl ApiClient for PoxApiClient {
    async fn get_chain_info(&self, peer: SocketAddr) -> Result<ChainInfo> {
        self.make_request(peer, Method::GET, "/info", None::<&()>)
            .await?
            .ok_or_else(|| eyre::eyre!("Node {} returned no chain info", peer))
    }

    async fn get_pox_info(&self, peer: SocketAddr) -> Result<PoxInfo> {
        self.make_request(peer, Method::GET, "/pox", None::<&()>)
            .await?
            .ok_or_else(|| eyre::eyre!("Node {} returned no PoX info", peer))
    }

    async fn get_account(&self, peer: SocketAddr, principal: &str) -> Result<AccountInfo> {
        let path = format!("/accounts/{}", principal);
        self.make_request(peer, Method::GET, &path, None::<&()>)
            .await?
            .ok_or_else(|| eyre::eyre!("Node {} has no account for {}", peer, principal))
    }

    async fn get_block_at_height(
        &self,
        peer: SocketAddr,
        height: u64,
    ) -> Result<Option<BlockSummary>> {
        let path = format!("/blocks/height/{}", height);
        self.make_request(peer, Method::GET, &path, None::<&()>)
            .await
    }

    async fn get_transaction_status(
        &self,
        peer: SocketAddr,
        txid: &TxId,
    ) -> Result<Option<TransactionStatusResponse>> {
        let path = format!("/transactions/{}", txid);
        self.make_request(peer, Method::GET, &path, None::<&()>)
            .await
    }

    async fn broadcast_transaction(
        &self,
        peer: SocketAddr,
        transaction: &SignedTransaction,
    ) -> Result<BroadcastAck, BroadcastError> {
        let url = self.url_for(peer, "/transactions");

        let response = self
            .client
            .post(&url)
            .json(transaction)
            .send()
            .await
            .map_err(|e| BroadcastError::Transport(e.into()))?;
        let status = response.status();

        if status.is_success() {
            let text = response
                .text()
                .await
                .map_err(|e| BroadcastError::Transport(e.into()))?;
            let ack: BroadcastAck = serde_json::from_str(&text).map_err(|e| {
                BroadcastError::Transport(eyre::eyre!(
                    "{}: Failed to parse broadcast ack: {} - Response: {}",
                    url,
                    e,
                    text
                ))
            })?;
            Ok(ack)
        } else if status.is_client_error() {
            // The node names the rule the transaction broke. Retrying an
            // identical envelope cannot change the answer.
            let body = response.text().await.unwrap_or_default();
            let rejection: RejectionResponse =
                serde_json::from_str(&body).unwrap_or_else(|_| RejectionResponse {
                    error: format!("status {}", status),
                    reason: (!body.is_empty()).then(|| body.clone()),
                });
            Err(BroadcastError::Rejected {
                error: rejection.error,
                reason: rejection.reason,
            })
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(BroadcastError::Transport(eyre::eyre!(
                "Broadcast to {} failed with status: {} - {}",
                url,
                status,
                error_text
            )))
        }
    }
}

#[cfg(feature = "test-utils")]
pub mod test_utils {
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex, MutexGuard};

    use async_trait::async_trait;
    use eyre::Result;
    use pox_types::{
        AccountInfo, BlockSummary, BroadcastAck, ChainInfo, PoxInfo, RejectionResponse,
        SignedTransaction, TransactionStatus, TransactionStatusResponse, TxId, TxResult,
    };
    use tracing::debug;

    use crate::{ApiClient, BroadcastError};

    fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        mutex.lock().expect("mock client lock poisoned")
    }

    /// Scriptable in-memory node. Tests push blocks and account states into
    /// it and it answers like a devnet that already mined them.
    #[derive(Debug, Clone, Default)]
    pub struct CountingMockClient {
        pub blocks: Arc<Mutex<Vec<BlockSummary>>>,
        pub accounts: Arc<Mutex<HashMap<String, AccountInfo>>>,
        pub pox_info: Arc<Mutex<Option<PoxInfo>>>,
        pub statuses: Arc<Mutex<HashMap<TxId, TransactionStatusResponse>>>,
        pub broadcasts: Arc<Mutex<Vec<SignedTransaction>>>,
        pub reject_broadcasts_with: Arc<Mutex<Option<RejectionResponse>>>,
        pub info_calls: Arc<AtomicUsize>,
    }

    impl CountingMockClient {
        /// Appends a block and marks every transaction in it as mined, the
        /// same bookkeeping a node does when a block connects.
        pub fn push_block(&self, block: BlockSummary) {
            let mut statuses = lock(&self.statuses);
            for txid in &block.transactions {
                statuses
                    .entry(txid.clone())
                    .or_insert_with(|| TransactionStatusResponse {
                        status: TransactionStatus::Success,
                        block_height: Some(block.height),
                        block_hash: Some(block.hash.clone()),
                        result: Some(TxResult::ok("(ok true)")),
                    });
            }
            drop(statuses);
            lock(&self.blocks).push(block);
        }

        pub fn set_account(&self, principal: impl Into<String>, account: AccountInfo) {
            lock(&self.accounts).insert(principal.into(), account);
        }

        pub fn set_pox_info(&self, info: PoxInfo) {
            *lock(&self.pox_info) = Some(info);
        }

        pub fn set_status(&self, txid: TxId, status: TransactionStatusResponse) {
            lock(&self.statuses).insert(txid, status);
        }

        /// Makes every subsequent broadcast fail with the given rejection.
        pub fn reject_broadcasts(&self, rejection: RejectionResponse) {
            *lock(&self.reject_broadcasts_with) = Some(rejection);
        }

        pub fn recorded_broadcasts(&self) -> Vec<SignedTransaction> {
            lock(&self.broadcasts).clone()
        }
    }

    #[async_trait]
    impl ApiClient for CountingMockClient {
        async fn get_chain_info(&self, _peer: SocketAddr) -> Result<ChainInfo> {
            self.info_calls.fetch_add(1, Ordering::SeqCst);
            let blocks = lock(&self.blocks);
            let (height, tip) = blocks
                .last()
                .map(|b| (b.height, b.hash.clone()))
                .unwrap_or((0, "genesis".to_string()));
            Ok(ChainInfo {
                burn_block_height: height,
                stacks_tip_height: height,
                stacks_tip: tip,
            })
        }

        async fn get_pox_info(&self, _peer: SocketAddr) -> Result<PoxInfo> {
            lock(&self.pox_info)
                .clone()
                .ok_or_else(|| eyre::eyre!("mock client has no PoX info scripted"))
        }

        async fn get_account(&self, _peer: SocketAddr, principal: &str) -> Result<AccountInfo> {
            lock(&self.accounts)
                .get(principal)
                .cloned()
                .ok_or_else(|| eyre::eyre!("mock client has no account for {}", principal))
        }

        async fn get_block_at_height(
            &self,
            _peer: SocketAddr,
            height: u64,
        ) -> Result<Option<BlockSummary>> {
            Ok(lock(&self.blocks)
                .iter()
                .find(|b| b.height == height)
                .cloned())
        }

        async fn get_transaction_status(
            &self,
            _peer: SocketAddr,
            txid: &TxId,
        ) -> Result<Option<TransactionStatusResponse>> {
            Ok(lock(&self.statuses).get(txid).cloned())
        }

        async fn broadcast_transaction(
            &self,
            _peer: SocketAddr,
            transaction: &SignedTransaction,
        ) -> Result<BroadcastAck, BroadcastError> {
            if let Some(rejection) = lock(&self.reject_broadcasts_with).clone() {
                debug!(
                    "mock client rejecting broadcast from {}: {}",
                    transaction.sender, rejection.error
                );
                return Err(BroadcastError::Rejected {
                    error: rejection.error,
                    reason: rejection.reason,
                });
            }
            let txid = TxId::random();
            debug!(
                "mock client accepted broadcast from {} as {}",
                transaction.sender, txid
            );
            lock(&self.broadcasts).push(transaction.clone());
            Ok(BroadcastAck { txid })
        }
    }
}
