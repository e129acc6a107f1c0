//! Broadcast rejection and joint submission scenarios. Nothing here
//! touches lock state, so sharing signers with other areas is safe.
use assert_matches::assert_matches;
use eyre::Result;
use pox_api_client::BroadcastError;
use pox_e2e::{calls, StackingCtx, TestSigner};
use tracing::info;

use crate::utils;

/// A rejected broadcast must not advance the local nonce, and re-syncing
/// from the account recovers the context.
#[ignore]
#[tokio::test]
async fn rejected_broadcast_preserves_nonce_test() -> Result<()> {
    let devnet = utils::attach_devnet().await?;
    let harness = utils::harness_for(&devnet);
    let mut ctx = utils::funded_ctx(&harness, 5).await?;

    info!("Step 1: Landing a transaction to establish the chain nonce");
    let ack = harness.submit(&mut ctx, calls::revoke_delegate_stx()).await?;
    devnet
        .wait_for_block_including_transaction(&ack.txid)
        .await?;

    info!("Step 2: Replaying a stale nonce");
    let good_nonce = ctx.nonce;
    ctx.nonce -= 1;
    let result = harness.submit(&mut ctx, calls::revoke_delegate_stx()).await;
    assert_matches!(result, Err(BroadcastError::Rejected { ref error, .. }) => {
        info!("Node rejected the replay: {}", error);
    });
    eyre::ensure!(
        ctx.nonce == good_nonce - 1,
        "rejection must leave the nonce untouched"
    );

    info!("Step 3: Re-syncing the nonce from the account");
    let account = harness.account(ctx.address()).await?;
    ctx.sync_with(&account);
    eyre::ensure!(ctx.nonce == good_nonce, "account should be at the next nonce");
    harness.submit(&mut ctx, calls::revoke_delegate_stx()).await?;
    Ok(())
}

/// Two signers submit at once and both transactions mine. Exercises the
/// fire-then-jointly-await path end to end.
#[ignore]
#[tokio::test]
async fn concurrent_submissions_all_mine_test() -> Result<()> {
    let devnet = utils::attach_devnet().await?;
    let harness = utils::harness_for(&devnet);

    info!("Step 1: Loading two funded signers");
    let mut all = utils::funded_ctxs(&harness, 4).await?;
    let mut ctxs = all.split_off(2);

    info!("Step 2: Broadcasting one call per signer at once");
    // revoke-delegate-stx mines whether or not a delegation is active,
    // so it cannot collide with lock state owned by other scenarios.
    let calls = vec![calls::revoke_delegate_stx(), calls::revoke_delegate_stx()];
    let acks = harness.submit_all(&mut ctxs, calls).await?;
    eyre::ensure!(acks.len() == 2, "both broadcasts should be accepted");

    info!("Step 3: Awaiting both inclusions jointly");
    let (first, second) = futures::future::try_join(
        devnet.wait_for_block_including_transaction(&acks[0].txid),
        devnet.wait_for_block_including_transaction(&acks[1].txid),
    )
    .await?;
    info!(
        "Mined in blocks {} and {}",
        first.0.height, second.0.height
    );
    Ok(())
}

/// Broadcasts from an account the devnet never funded are rejected
/// outright and never reach a block.
#[ignore]
#[tokio::test]
async fn unfunded_sender_is_rejected_test() -> Result<()> {
    let devnet = utils::attach_devnet().await?;
    let harness = utils::harness_for(&devnet);

    let signer = TestSigner::random("unfunded");
    info!("Step 1: Broadcasting from fresh account {}", signer.address);
    let mut ctx = StackingCtx::new(signer, 0);

    let pox_info = harness.pox_info().await?;
    let call = calls::stack_stx(
        pox_info.stacking_minimum(),
        &ctx.signer.pox_addr(),
        utils::lock_start(&pox_info),
        1,
    );
    let result = harness.submit(&mut ctx, call).await;
    assert_matches!(result, Err(BroadcastError::Rejected { .. }));
    eyre::ensure!(ctx.nonce == 0, "rejection must leave the nonce untouched");
    Ok(())
}
