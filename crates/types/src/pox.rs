use serde::{Deserialize, Serialize};

/// Reward cycle state from `GET /v2/pox`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoxInfo {
    pub contract_id: String,
    pub first_burnchain_block_height: u64,
    pub current_burnchain_block_height: u64,
    pub reward_cycle_length: u64,
    pub prepare_phase_block_length: u64,
    pub total_liquid_supply_ustx: u128,
    pub current_cycle: RewardCycleInfo,
    pub next_cycle: RewardCycleInfo,
}

/// Per cycle aggregates the node reports for the current and next cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardCycleInfo {
    pub id: u64,
    pub min_threshold_ustx: u128,
    pub stacked_ustx: u128,
    pub is_pox_active: bool,
}

impl PoxInfo {
    /// Cycle the given burn height falls in. Heights before the activation
    /// height are treated as cycle 0.
    pub fn reward_cycle_of(&self, burn_height: u64) -> u64 {
        burn_height.saturating_sub(self.first_burnchain_block_height) / self.reward_cycle_length
    }

    /// First burn height of the given cycle.
    pub fn cycle_start_height(&self, cycle_id: u64) -> u64 {
        self.first_burnchain_block_height + cycle_id * self.reward_cycle_length
    }

    /// Burn blocks left until the given cycle begins. Zero when the chain is
    /// already inside it.
    pub fn blocks_until_cycle(&self, cycle_id: u64) -> u64 {
        self.cycle_start_height(cycle_id)
            .saturating_sub(self.current_burnchain_block_height)
    }

    /// Whether the given burn height sits in the prepare phase at the tail of
    /// its cycle, where stacking operations for the next cycle are frozen.
    pub fn in_prepare_phase(&self, burn_height: u64) -> bool {
        if burn_height < self.first_burnchain_block_height {
            return false;
        }
        let position = (burn_height - self.first_burnchain_block_height) % self.reward_cycle_length;
        self.reward_cycle_length - position <= self.prepare_phase_block_length
    }

    /// Minimum uSTX a solo stacker must lock to earn a reward slot in the
    /// next cycle.
    pub fn stacking_minimum(&self) -> u128 {
        self.next_cycle.min_threshold_ustx
    }
}
