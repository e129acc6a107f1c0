//! Full submit-then-wait pipeline against a scripted node. Runs in every
//! environment, no devnet required.
use eyre::Result;
use pox_api_client::test_utils::CountingMockClient;
use pox_devnet::Devnet;
use pox_e2e::{calls, StackingHarness, TestSigner};
use pox_testing_utils::initialize_tracing;
use pox_types::{AccountInfo, BlockSummary, DevnetConfig, PoxInfo, RewardCycleInfo};
use tracing::info;

fn pox_fixture() -> PoxInfo {
    PoxInfo {
        contract_id: calls::POX_CONTRACT_ID.to_string(),
        first_burnchain_block_height: 0,
        current_burnchain_block_height: 1,
        reward_cycle_length: 5,
        prepare_phase_block_length: 1,
        total_liquid_supply_ustx: 1_000_000_000_000_000,
        current_cycle: RewardCycleInfo {
            id: 0,
            min_threshold_ustx: 90_000_000_000,
            stacked_ustx: 0,
            is_pox_active: true,
        },
        next_cycle: RewardCycleInfo {
            id: 1,
            min_threshold_ustx: 90_000_000_000,
            stacked_ustx: 0,
            is_pox_active: true,
        },
    }
}

#[tokio::test]
async fn submit_then_wait_pipeline_against_a_scripted_node_test() -> Result<()> {
    initialize_tracing();

    let client = CountingMockClient::default();
    client.set_pox_info(pox_fixture());
    client.push_block(BlockSummary {
        height: 1,
        hash: "block-1".to_string(),
        transactions: vec![],
    });

    let signer = TestSigner::random("mock-stacker");
    client.set_account(
        signer.address.clone(),
        AccountInfo {
            balance: 1_000_000_000_000,
            locked: 0,
            unlock_height: 0,
            nonce: 0,
        },
    );

    let config = DevnetConfig {
        poll_delay_ms: 1,
        ..DevnetConfig::testing()
    };
    let devnet = Devnet::start_with_client(config, client.clone()).await?;
    let harness = StackingHarness::new(client.clone(), devnet.peer());

    info!("Step 1: Submitting a stacking transaction");
    let mut ctx = harness.new_ctx(signer).await?;
    let pox_info = harness.pox_info().await?;
    let call = calls::stack_stx(
        pox_info.stacking_minimum(),
        &ctx.signer.pox_addr(),
        pox_info.current_burnchain_block_height,
        1,
    );
    let ack = harness.submit(&mut ctx, call).await?;
    eyre::ensure!(ctx.nonce == 1, "accepted broadcast advances the nonce");

    info!("Step 2: Mining the transaction into block 2");
    client.push_block(BlockSummary {
        height: 2,
        hash: "block-2".to_string(),
        transactions: vec![ack.txid.clone()],
    });

    info!("Step 3: Waiting for inclusion");
    let (block, result) = devnet
        .wait_for_block_including_transaction(&ack.txid)
        .await?;
    eyre::ensure!(block.height == 2, "mined in block {}", block.height);
    eyre::ensure!(
        block.hash.as_deref() == Some("block-2"),
        "unexpected block hash {:?}",
        block.hash
    );
    eyre::ensure!(result.success, "scripted node marks transactions ok");

    let recorded = client.recorded_broadcasts();
    eyre::ensure!(recorded.len() == 1, "exactly one broadcast reached the node");
    eyre::ensure!(recorded[0].nonce == 0, "first broadcast uses the seeded nonce");
    Ok(())
}
