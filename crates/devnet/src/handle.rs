use std::net::{SocketAddr, ToSocketAddrs as _};
use std::path::Path;
use std::time::Duration;

use eyre::Result;
use pox_api_client::{ApiClient, PoxApiClient};
use pox_sync::{ChainSyncWaiter, WaitConfig};
use pox_types::{BlockRef, ChainEvent, DevnetConfig, TxId, TxResult};
use tempfile::TempDir;
use tokio::process::{Child, Command};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::NodeEventSource;

/// Resolves a devnet URL to a socket address, tolerating an `http(s)://`
/// prefix and a trailing path.
pub fn parse_url_to_socket_addr(url: &str) -> Result<SocketAddr> {
    let without_protocol = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .unwrap_or(url);
    let addr_part = without_protocol
        .split('/')
        .next()
        .unwrap_or(without_protocol);
    addr_part
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| eyre::eyre!("Could not resolve address from URL: {}", url))
}

/// Handle on a devnet node, either spawned by this process or already
/// running elsewhere. Owns the child process in the spawned case; dropping
/// the handle kills it.
#[derive(Debug)]
pub struct Devnet<C: ApiClient = PoxApiClient> {
    config: DevnetConfig,
    api_client: C,
    peer: SocketAddr,
    child: Option<Child>,
    workdir: Option<TempDir>,
}

impl Devnet<PoxApiClient> {
    /// Spawns the configured node binary, or attaches to `node_url` when no
    /// binary is configured, then blocks until the node answers.
    pub async fn start(config: DevnetConfig) -> Result<Self> {
        let api_client = PoxApiClient::with_base_url(format!(
            "{}/v2",
            config.node_url.trim_end_matches('/')
        ));
        Self::start_with_client(config, api_client).await
    }

    /// Attaches to an already running node, ignoring any configured binary.
    pub async fn attach(url: &str) -> Result<Self> {
        let config = DevnetConfig {
            node_url: url.trim_end_matches('/').to_string(),
            node_binary: None,
            ..DevnetConfig::from_env()
        };
        Self::start(config).await
    }
}

impl<C: ApiClient> Devnet<C> {
    pub async fn start_with_client(config: DevnetConfig, api_client: C) -> Result<Self> {
        let peer = parse_url_to_socket_addr(&config.node_url)?;

        let (child, workdir) = match &config.node_binary {
            Some(binary) => {
                let (child, workdir) = spawn_node(binary, &config)?;
                (Some(child), Some(workdir))
            }
            None => {
                info!("attaching to devnet node at {}", config.node_url);
                (None, None)
            }
        };

        let devnet = Self {
            config,
            api_client,
            peer,
            child,
            workdir,
        };
        devnet.wait_until_ready().await?;
        Ok(devnet)
    }

    async fn wait_until_ready(&self) -> Result<()> {
        let max_retries = self.config.ready_retries;
        for retry in 1..=max_retries {
            match self.api_client.get_chain_info(self.peer).await {
                Ok(info) => {
                    info!(
                        "devnet node {} is ready at height {}",
                        self.config.node_url, info.stacks_tip_height
                    );
                    return Ok(());
                }
                Err(e) => {
                    warn!(
                        "{} not ready, retry {}/{}: {}",
                        self.config.node_url, retry, max_retries, e
                    );
                }
            }
            if retry < max_retries {
                sleep(Duration::from_secs(2)).await;
            }
        }
        Err(eyre::eyre!(
            "Node {} failed to become ready after {} retries",
            self.config.node_url,
            max_retries
        ))
    }

    pub fn api_client(&self) -> &C {
        &self.api_client
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn config(&self) -> &DevnetConfig {
        &self.config
    }

    /// Working directory of the spawned node, if this handle spawned one.
    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_ref().map(TempDir::path)
    }

    fn waiter(&self) -> ChainSyncWaiter<NodeEventSource<C>> {
        ChainSyncWaiter::with_config(
            NodeEventSource::new(self.api_client.clone(), self.peer),
            WaitConfig::from(&self.config),
        )
    }

    /// Next block mined after the current tip.
    pub async fn wait_for_next_block(&self) -> Result<ChainEvent> {
        let info = self.api_client.get_chain_info(self.peer).await?;
        Ok(self.waiter().wait_for_height(info.stacks_tip_height + 1).await?)
    }

    /// First block at or past `height`. Returns immediately when the chain
    /// is already there.
    pub async fn wait_for_block_at_height(&self, height: u64) -> Result<ChainEvent> {
        Ok(self.waiter().wait_for_height(height).await?)
    }

    /// First block stamped with reward cycle `cycle_id` or later.
    pub async fn wait_for_cycle(&self, cycle_id: u64) -> Result<ChainEvent> {
        Ok(self.waiter().wait_for_cycle(cycle_id).await?)
    }

    /// Block that mines `txid`, plus the execution result.
    pub async fn wait_for_block_including_transaction(
        &self,
        txid: &TxId,
    ) -> Result<(BlockRef, TxResult)> {
        Ok(self.waiter().wait_for_transaction_inclusion(txid).await?)
    }

    /// Kills the spawned node, if any. Attached nodes are left running.
    pub async fn terminate(&mut self) -> Result<()> {
        if let Some(mut child) = self.child.take() {
            child.kill().await?;
            info!("devnet node process terminated");
        }
        Ok(())
    }
}

fn spawn_node(binary: &Path, config: &DevnetConfig) -> Result<(Child, TempDir)> {
    let workdir = tempfile::Builder::new()
        .prefix("pox-devnet-")
        .rand_bytes(8)
        .tempdir()?;
    let rpc_bind = config
        .node_url
        .strip_prefix("http://")
        .unwrap_or(&config.node_url)
        .to_string();

    let mut command = Command::new(binary);
    command
        .args(&config.node_args)
        .arg("--rpc-bind")
        .arg(&rpc_bind)
        .arg("--working-dir")
        .arg(workdir.path())
        .kill_on_drop(true);

    info!(
        "launching devnet node {} with rpc bind {}",
        binary.display(),
        rpc_bind
    );
    let child = command
        .spawn()
        .map_err(|e| eyre::eyre!("Failed to launch devnet node {}: {}", binary.display(), e))?;
    Ok((child, workdir))
}
