//! Polling primitives for driving tests against a live chain.
//!
//! Everything here is pull based: a [`ChainSyncWaiter`] repeatedly asks a
//! [`ChainEventSource`] for the next observed block until a
//! [`TargetCondition`] matches, and [`wait_for_value`] does the same for
//! arbitrary fetches. Every loop is bounded by attempts, and optionally by a
//! wall clock deadline, so a stalled devnet fails the suite instead of
//! hanging it.
use std::future::Future;
use std::time::{Duration, Instant};

use pox_types::{BlockRef, ChainEvent, DevnetConfig, TargetCondition, TxId, TxResult};
use tokio::time::sleep;
use tracing::debug;

/// Outcome of a single wait: the first matching event, or why we gave up.
pub type PollResult = Result<ChainEvent, SyncError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("gave up after {attempts} polling attempts")]
    RetriesExhausted { attempts: usize },
    #[error("deadline exceeded after waiting {waited:?}")]
    DeadlineExceeded { waited: Duration },
}

/// Pacing for a single wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    pub poll_delay: Duration,
    pub max_attempts: usize,
    /// Wall clock bound across all attempts. `None` leaves the wait bounded
    /// by attempts alone.
    pub deadline: Option<Duration>,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            poll_delay: Duration::from_secs(1),
            max_attempts: 120,
            deadline: None,
        }
    }
}

impl From<&DevnetConfig> for WaitConfig {
    fn from(config: &DevnetConfig) -> Self {
        Self {
            poll_delay: Duration::from_millis(config.poll_delay_ms),
            max_attempts: config.max_poll_attempts,
            deadline: config.deadline_secs.map(Duration::from_secs),
        }
    }
}

/// Anything that can be polled for chain progress.
///
/// `poll_event` yields the next block the source has not reported yet, or
/// `None` when the chain has not advanced. Errors are transient by
/// definition here; callers retry them up to their attempt budget.
#[async_trait::async_trait]
pub trait ChainEventSource: Send + Sync {
    async fn poll_event(&mut self) -> eyre::Result<Option<ChainEvent>>;

    /// Execution result of a mined transaction, `None` while the node has
    /// not resolved it yet.
    async fn transaction_result(&self, txid: &TxId) -> eyre::Result<Option<TxResult>>;
}

/// Drives a [`ChainEventSource`] until a condition holds.
#[derive(Debug)]
pub struct ChainSyncWaiter<S> {
    source: S,
    config: WaitConfig,
}

impl<S: ChainEventSource> ChainSyncWaiter<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            config: WaitConfig::default(),
        }
    }

    pub fn with_config(source: S, config: WaitConfig) -> Self {
        Self { source, config }
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// First event satisfying `condition`. An event that does not satisfy it
    /// is never returned, no matter how many attempts remain.
    pub async fn wait_for_event(&mut self, condition: TargetCondition) -> PollResult {
        let start = Instant::now();
        for attempt in 1..=self.config.max_attempts {
            if let Some(limit) = self.config.deadline {
                if start.elapsed() >= limit {
                    return Err(SyncError::DeadlineExceeded {
                        waited: start.elapsed(),
                    });
                }
            }
            match self.source.poll_event().await {
                Ok(Some(event)) => {
                    if condition.accepts(&event) {
                        debug!(
                            "condition {} met at height {} after {} attempts",
                            condition, event.height, attempt
                        );
                        return Ok(event);
                    }
                    debug!(
                        "event at height {} does not meet {} (attempt {}/{})",
                        event.height, condition, attempt, self.config.max_attempts
                    );
                }
                Ok(None) => debug!(
                    "no new chain event (attempt {}/{})",
                    attempt, self.config.max_attempts
                ),
                Err(e) => debug!(
                    "event source error on attempt {}/{}: {}",
                    attempt, self.config.max_attempts, e
                ),
            }
            if attempt < self.config.max_attempts {
                sleep(self.config.poll_delay).await;
            }
        }
        Err(SyncError::RetriesExhausted {
            attempts: self.config.max_attempts,
        })
    }

    /// First event at or past `target` height.
    pub async fn wait_for_height(&mut self, target: u64) -> PollResult {
        self.wait_for_event(TargetCondition::HeightAtLeast(target)).await
    }

    /// First event stamped with reward cycle `cycle_id` or later.
    pub async fn wait_for_cycle(&mut self, cycle_id: u64) -> PollResult {
        self.wait_for_event(TargetCondition::InCycle(cycle_id)).await
    }

    /// Block that mined `txid`, plus the execution result. The result can
    /// lag the block on a busy node, so it gets its own retry budget.
    pub async fn wait_for_transaction_inclusion(
        &mut self,
        txid: &TxId,
    ) -> Result<(BlockRef, TxResult), SyncError> {
        let event = self
            .wait_for_event(TargetCondition::IncludesTransaction(txid.clone()))
            .await?;
        let block = event.block_ref();

        for attempt in 1..=self.config.max_attempts {
            match self.source.transaction_result(txid).await {
                Ok(Some(result)) => return Ok((block, result)),
                Ok(None) => debug!(
                    "transaction {} mined but result not resolved yet (attempt {}/{})",
                    txid, attempt, self.config.max_attempts
                ),
                Err(e) => debug!(
                    "error fetching result for {} on attempt {}/{}: {}",
                    txid, attempt, self.config.max_attempts, e
                ),
            }
            if attempt < self.config.max_attempts {
                sleep(self.config.poll_delay).await;
            }
        }
        Err(SyncError::RetriesExhausted {
            attempts: self.config.max_attempts,
        })
    }
}

/// Repeatedly fetches until `predicate` accepts a value.
///
/// Fetch errors and rejected values both consume one attempt; the
/// distinction only matters to the debug log. The first accepted value is
/// returned untouched, and acceptance on the first attempt never sleeps.
pub async fn wait_for_value<T, F, Fut, P>(
    mut fetch: F,
    mut predicate: P,
    max_retries: usize,
    delay: Duration,
) -> Result<T, SyncError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = eyre::Result<T>>,
    P: FnMut(&T) -> bool,
{
    for attempt in 1..=max_retries {
        match fetch().await {
            Ok(value) if predicate(&value) => {
                debug!("fetched value accepted on attempt {}/{}", attempt, max_retries);
                return Ok(value);
            }
            Ok(_) => debug!("fetched value rejected on attempt {}/{}", attempt, max_retries),
            Err(e) => debug!("fetch failed on attempt {}/{}: {}", attempt, max_retries, e),
        }
        if attempt < max_retries {
            sleep(delay).await;
        }
    }
    Err(SyncError::RetriesExhausted {
        attempts: max_retries,
    })
}
