use pox_types::{ClarityArg, ContractCall, PoxAddr};

/// Boot address of the stacking contract on every devnet.
pub const POX_CONTRACT_ID: &str = "ST000000000000000000002AMW42H.pox";

fn pox_call(function: &str, args: Vec<ClarityArg>) -> ContractCall {
    ContractCall {
        contract_id: POX_CONTRACT_ID.to_string(),
        function: function.to_string(),
        args,
    }
}

/// Lock `amount_ustx` for `lock_period` reward cycles, paying rewards to
/// `pox_addr`.
pub fn stack_stx(
    amount_ustx: u128,
    pox_addr: &PoxAddr,
    start_burn_height: u64,
    lock_period: u64,
) -> ContractCall {
    pox_call(
        "stack-stx",
        vec![
            ClarityArg::uint(amount_ustx),
            ClarityArg::PoxAddr(pox_addr.clone()),
            ClarityArg::uint(start_burn_height.into()),
            ClarityArg::uint(lock_period.into()),
        ],
    )
}

/// Grant `delegate_to` the right to lock up to `amount_ustx` on the
/// sender's behalf.
pub fn delegate_stx(
    amount_ustx: u128,
    delegate_to: &str,
    until_burn_height: Option<u64>,
    pox_addr: Option<&PoxAddr>,
) -> ContractCall {
    let addr_arg = match pox_addr {
        Some(addr) => ClarityArg::Some(Box::new(ClarityArg::PoxAddr(addr.clone()))),
        None => ClarityArg::None,
    };
    pox_call(
        "delegate-stx",
        vec![
            ClarityArg::uint(amount_ustx),
            ClarityArg::principal(delegate_to),
            ClarityArg::optional_uint(until_burn_height),
            addr_arg,
        ],
    )
}

pub fn revoke_delegate_stx() -> ContractCall {
    pox_call("revoke-delegate-stx", vec![])
}

/// Operator side of a delegation: lock the delegator's funds.
pub fn delegate_stack_stx(
    stacker: &str,
    amount_ustx: u128,
    pox_addr: &PoxAddr,
    start_burn_height: u64,
    lock_period: u64,
) -> ContractCall {
    pox_call(
        "delegate-stack-stx",
        vec![
            ClarityArg::principal(stacker),
            ClarityArg::uint(amount_ustx),
            ClarityArg::PoxAddr(pox_addr.clone()),
            ClarityArg::uint(start_burn_height.into()),
            ClarityArg::uint(lock_period.into()),
        ],
    )
}

/// Commit all partially stacked funds behind `pox_addr` to a reward cycle.
pub fn stack_aggregation_commit(pox_addr: &PoxAddr, reward_cycle: u64) -> ContractCall {
    pox_call(
        "stack-aggregation-commit",
        vec![
            ClarityArg::PoxAddr(pox_addr.clone()),
            ClarityArg::uint(reward_cycle.into()),
        ],
    )
}

/// Prolong an active lock by `extend_count` cycles.
pub fn stack_extend(extend_count: u64, pox_addr: &PoxAddr) -> ContractCall {
    pox_call(
        "stack-extend",
        vec![
            ClarityArg::uint(extend_count.into()),
            ClarityArg::PoxAddr(pox_addr.clone()),
        ],
    )
}

/// Raise the locked amount of an active lock without touching its length.
pub fn stack_increase(increase_by_ustx: u128) -> ContractCall {
    pox_call("stack-increase", vec![ClarityArg::uint(increase_by_ustx)])
}
