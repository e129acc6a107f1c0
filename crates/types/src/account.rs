use serde::{Deserialize, Serialize};

/// Balances and nonce for a principal, from `GET /v2/accounts/{principal}`.
///
/// Amounts are micro-STX. `locked` counts funds committed to stacking until
/// the burn chain reaches `unlock_height`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub balance: u128,
    pub locked: u128,
    pub unlock_height: u64,
    pub nonce: u64,
}

impl AccountInfo {
    pub fn has_locked_funds(&self) -> bool {
        self.locked > 0
    }

    /// Funds available for new transactions.
    pub fn liquid(&self) -> u128 {
        self.balance.saturating_sub(self.locked)
    }
}
