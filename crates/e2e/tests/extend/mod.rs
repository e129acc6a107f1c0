//! Lock adjustment scenarios. Owns signer 4.
use eyre::Result;
use pox_e2e::calls;
use tracing::info;

use crate::utils;

/// Extends an active lock by two cycles, then raises the locked amount
/// without touching the new unlock height.
#[ignore]
#[tokio::test]
async fn stack_extend_and_increase_test() -> Result<()> {
    let devnet = utils::attach_devnet().await?;
    let harness = utils::harness_for(&devnet);

    info!("=== Lock adjustments: stack-extend then stack-increase ===");
    let mut ctx = utils::funded_ctx(&harness, 4).await?;
    let pox_addr = ctx.signer.pox_addr();

    info!("Step 1: Locking for a single cycle");
    let pox_info = harness.pox_info().await?;
    let amount = pox_info.stacking_minimum() * 2;
    let call = calls::stack_stx(amount, &pox_addr, utils::lock_start(&pox_info), 1);
    let ack = harness.submit(&mut ctx, call).await?;
    let (_, result) = devnet
        .wait_for_block_including_transaction(&ack.txid)
        .await?;
    eyre::ensure!(result.success, "stack-stx aborted: {}", result.value);

    let before = harness.account(ctx.address()).await?;
    eyre::ensure!(before.locked == amount, "lock did not register");
    info!("Step 2: Locked until height {}", before.unlock_height);

    info!("Step 3: Extending the lock by two cycles");
    let ack = harness.submit(&mut ctx, calls::stack_extend(2, &pox_addr)).await?;
    let (_, result) = devnet
        .wait_for_block_including_transaction(&ack.txid)
        .await?;
    eyre::ensure!(result.success, "stack-extend aborted: {}", result.value);

    let extended = harness.account(ctx.address()).await?;
    let expected_unlock = before.unlock_height + 2 * pox_info.reward_cycle_length;
    eyre::ensure!(
        extended.unlock_height == expected_unlock,
        "extend moved the unlock height to {} instead of {}",
        extended.unlock_height,
        expected_unlock
    );
    eyre::ensure!(
        extended.locked == amount,
        "extend must not change the locked amount"
    );

    info!("Step 4: Raising the locked amount");
    let increase = pox_info.stacking_minimum();
    let ack = harness
        .submit(&mut ctx, calls::stack_increase(increase))
        .await?;
    let (_, result) = devnet
        .wait_for_block_including_transaction(&ack.txid)
        .await?;
    eyre::ensure!(result.success, "stack-increase aborted: {}", result.value);

    let increased = harness.account(ctx.address()).await?;
    eyre::ensure!(
        increased.locked == amount + increase,
        "increase left {} locked, expected {}",
        increased.locked,
        amount + increase
    );
    eyre::ensure!(
        increased.unlock_height == expected_unlock,
        "increase must not move the unlock height"
    );
    info!(
        "Lock now holds {} uSTX until height {}",
        increased.locked, increased.unlock_height
    );
    Ok(())
}
