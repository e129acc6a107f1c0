use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// URL the suite targets when nothing else is configured.
pub const DEFAULT_DEVNET_URL: &str = "http://127.0.0.1:20443";

/// How the suite reaches (or launches) a devnet node, plus the polling
/// cadence every wait derives its settings from.
///
/// Values load from TOML, then individual fields can be overridden through
/// the `POX_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DevnetConfig {
    /// Base URL of the node RPC endpoint.
    #[serde(default = "default_node_url")]
    pub node_url: String,
    /// Node binary to launch. When unset the suite attaches to an already
    /// running node at `node_url` instead of spawning one.
    #[serde(default)]
    pub node_binary: Option<PathBuf>,
    /// Extra arguments passed to the spawned node.
    #[serde(default)]
    pub node_args: Vec<String>,
    /// Delay between polls, in milliseconds.
    #[serde(default = "default_poll_delay_ms")]
    pub poll_delay_ms: u64,
    /// Polls a single wait may consume before giving up.
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: usize,
    /// Optional wall clock bound on a single wait, in seconds.
    #[serde(default)]
    pub deadline_secs: Option<u64>,
    /// Readiness probes to run against a freshly spawned node.
    #[serde(default = "default_ready_retries")]
    pub ready_retries: usize,
}

fn default_node_url() -> String {
    DEFAULT_DEVNET_URL.to_string()
}

const fn default_poll_delay_ms() -> u64 {
    1_000
}

const fn default_max_poll_attempts() -> usize {
    120
}

const fn default_ready_retries() -> usize {
    30
}

impl Default for DevnetConfig {
    fn default() -> Self {
        Self {
            node_url: default_node_url(),
            node_binary: None,
            node_args: Vec::new(),
            poll_delay_ms: default_poll_delay_ms(),
            max_poll_attempts: default_max_poll_attempts(),
            deadline_secs: None,
            ready_retries: default_ready_retries(),
        }
    }
}

impl DevnetConfig {
    pub fn from_toml(raw: &str) -> eyre::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Defaults with any `POX_*` environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        tracing::debug!(?config, "devnet config loaded from environment");
        config
    }

    /// Applies overrides from a key lookup, ignoring values that fail to
    /// parse. Split out from [`Self::from_env`] so it is testable without
    /// touching process state.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("POX_NODE_URL") {
            self.node_url = url;
        }
        if let Some(binary) = lookup("POX_NODE_BINARY") {
            self.node_binary = Some(PathBuf::from(binary));
        }
        if let Some(delay) = lookup("POX_POLL_DELAY_MS") {
            self.poll_delay_ms = delay.parse().unwrap_or(self.poll_delay_ms);
        }
        if let Some(attempts) = lookup("POX_MAX_POLL_ATTEMPTS") {
            self.max_poll_attempts = attempts.parse().unwrap_or(self.max_poll_attempts);
        }
        if let Some(deadline) = lookup("POX_DEADLINE_SECS") {
            self.deadline_secs = deadline.parse().ok();
        }
    }

    /// Config tuned for tests that run against scripted clients, where real
    /// block times never apply.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn testing() -> Self {
        Self {
            poll_delay_ms: 10,
            max_poll_attempts: 50,
            deadline_secs: Some(30),
            ..Self::default()
        }
    }
}
