//! Helpers shared by the devnet scenarios.
//!
//! Scenarios partition the signer list by index so a full run against a
//! freshly seeded devnet never fights over lock state: each locking
//! scenario owns one signer and leaves the others alone.
use eyre::Result;
use pox_devnet::Devnet;
use pox_e2e::{load_test_signers_from_env, StackingCtx, StackingHarness};
use pox_testing_utils::initialize_tracing;
use pox_types::{PoxInfo, DEFAULT_DEVNET_URL};
use tracing::info;

pub fn devnet_url() -> String {
    std::env::var("POX_DEVNET_URL").unwrap_or_else(|_| DEFAULT_DEVNET_URL.to_string())
}

/// Attaches to the devnet every scenario runs against, initializing
/// tracing on the way.
pub async fn attach_devnet() -> Result<Devnet> {
    initialize_tracing();
    let url = devnet_url();
    info!("attaching to devnet at {}", url);
    Devnet::attach(&url).await
}

pub fn harness_for(devnet: &Devnet) -> StackingHarness {
    StackingHarness::new(devnet.api_client().clone(), devnet.peer())
}

/// Contexts for the first `count` env signers, each verified funded.
pub async fn funded_ctxs(harness: &StackingHarness, count: usize) -> Result<Vec<StackingCtx>> {
    let signers = load_test_signers_from_env()?;
    eyre::ensure!(
        signers.len() >= count,
        "need {} funded signers, have {} (set POX_SIGNER_KEYS)",
        count,
        signers.len()
    );
    let mut ctxs = Vec::with_capacity(count);
    for signer in signers.into_iter().take(count) {
        let ctx = harness.new_ctx(signer).await?;
        let account = harness.account(ctx.address()).await?;
        eyre::ensure!(
            account.liquid() > 0,
            "{} ({}) has no spendable funds on this devnet",
            ctx.signer.name,
            ctx.address()
        );
        ctxs.push(ctx);
    }
    Ok(ctxs)
}

/// Context for the signer a scenario owns.
pub async fn funded_ctx(harness: &StackingHarness, index: usize) -> Result<StackingCtx> {
    let mut ctxs = funded_ctxs(harness, index + 1).await?;
    Ok(ctxs.remove(index))
}

/// Start height for lock calls: the current burn tip.
pub fn lock_start(info: &PoxInfo) -> u64 {
    info.current_burnchain_block_height
}

pub fn get_env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .unwrap_or(default)
}
