//! Reward cycle progression scenarios. Owns signer 5 for the unlock flow.
use std::time::Duration;

use eyre::Result;
use pox_e2e::calls;
use pox_sync::wait_for_value;
use tracing::info;

use crate::utils;

/// The chain enters the next reward cycle on its own and PoX stays active.
#[ignore]
#[tokio::test]
async fn reward_cycle_advances_test() -> Result<()> {
    let devnet = utils::attach_devnet().await?;
    let harness = utils::harness_for(&devnet);

    let pox_info = harness.pox_info().await?;
    let current = pox_info.current_cycle.id;
    info!(
        "Step 1: In cycle {}, {} blocks until cycle {}",
        current,
        pox_info.blocks_until_cycle(current + 1),
        current + 1
    );

    let event = devnet.wait_for_cycle(current + 1).await?;
    info!("Step 2: Entered next cycle at height {}", event.height);

    let after = wait_for_value(
        || harness.pox_info(),
        |info| info.current_cycle.id >= current + 1,
        30,
        Duration::from_secs(1),
    )
    .await?;
    eyre::ensure!(
        after.current_cycle.is_pox_active,
        "PoX inactive in cycle {}",
        after.current_cycle.id
    );
    Ok(())
}

/// A one cycle lock expires by itself once its period has passed.
#[ignore]
#[tokio::test]
async fn lock_expires_after_its_period_test() -> Result<()> {
    let devnet = utils::attach_devnet().await?;
    let harness = utils::harness_for(&devnet);

    info!("Step 1: Loading funded signer");
    let mut ctx = utils::funded_ctx(&harness, 5).await?;

    info!("Step 2: Locking for a single cycle");
    let pox_info = harness.pox_info().await?;
    let amount = pox_info.stacking_minimum() * 2;
    let lock_period = utils::get_env_u64("POX_LOCK_PERIOD", 1);
    let call = calls::stack_stx(
        amount,
        &ctx.signer.pox_addr(),
        utils::lock_start(&pox_info),
        lock_period,
    );
    let ack = harness.submit(&mut ctx, call).await?;
    let (_, result) = devnet
        .wait_for_block_including_transaction(&ack.txid)
        .await?;
    eyre::ensure!(result.success, "stack-stx aborted: {}", result.value);

    let locked = harness.account(ctx.address()).await?;
    eyre::ensure!(locked.locked == amount, "lock did not register");
    info!(
        "Step 3: Locked until height {}, waiting for expiry",
        locked.unlock_height
    );

    devnet.wait_for_block_at_height(locked.unlock_height + 1).await?;

    let unlocked = wait_for_value(
        || harness.account(ctx.address()),
        |account| account.locked == 0,
        30,
        Duration::from_secs(1),
    )
    .await?;
    eyre::ensure!(
        unlocked.unlock_height == 0,
        "expired lock should clear the unlock height, found {}",
        unlocked.unlock_height
    );
    eyre::ensure!(
        unlocked.balance == locked.balance,
        "auto unlock changed the balance, {} -> {}",
        locked.balance,
        unlocked.balance
    );
    info!("Step 4: Funds unlocked automatically");
    Ok(())
}
