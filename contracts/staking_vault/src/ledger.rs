//! Stake ledger: per-participant staked balances and the global total.
//!
//! Balances live in two places. Each participant has an [`Account`] record in
//! persistent storage keyed by `(ACCOUNT, address)`; the aggregate lives in
//! [`PoolState::total_staked`](crate::rewards::PoolState) in instance storage.
//! [`increase`] and [`decrease`] mutate both in memory so the caller persists
//! them together after settlement.

use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::rewards::PoolState;
use crate::{ContractError, TTL_EXTEND_TO, TTL_THRESHOLD};

const ACCOUNT: Symbol = symbol_short!("ACCT");

/// Per-participant bookkeeping.
///
/// Created implicitly the first time an address is settled and never
/// removed, so unclaimed rewards survive a full withdrawal.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Account {
    /// Principal currently staked, in the asset's smallest unit.
    pub staked: i128,
    /// Snapshot of the pool's reward-per-token accumulator at the last
    /// settlement (the account's reward debt).
    pub reward_per_token_paid: i128,
    /// Settled but unclaimed rewards.
    pub accrued_rewards: i128,
    /// Ledger timestamp of the last settlement.
    pub last_accrual: u64,
}

fn account_key(owner: &Address) -> (Symbol, Address) {
    (ACCOUNT, owner.clone())
}

/// Load the account for `owner`, or a zeroed record if it has never staked.
pub fn load_account(env: &Env, owner: &Address) -> Account {
    env.storage()
        .persistent()
        .get(&account_key(owner))
        .unwrap_or_default()
}

/// Returns `None` for addresses that have never been settled.
pub fn find_account(env: &Env, owner: &Address) -> Option<Account> {
    env.storage().persistent().get(&account_key(owner))
}

pub fn store_account(env: &Env, owner: &Address, account: &Account) {
    let key = account_key(owner);
    env.storage().persistent().set(&key, account);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn stake_of(env: &Env, owner: &Address) -> i128 {
    load_account(env, owner).staked
}

/// Credit `amount` to the account and to the pool total.
///
/// Both sums are checked; on overflow neither record is modified.
pub fn increase(
    pool: &mut PoolState,
    account: &mut Account,
    amount: i128,
) -> Result<(), ContractError> {
    if amount <= 0 {
        return Err(ContractError::InvalidInput);
    }
    let staked = account
        .staked
        .checked_add(amount)
        .ok_or(ContractError::ArithmeticOverflow)?;
    let total = pool
        .total_staked
        .checked_add(amount)
        .ok_or(ContractError::ArithmeticOverflow)?;

    account.staked = staked;
    pool.total_staked = total;
    Ok(())
}

/// Debit `amount` from the account and from the pool total.
pub fn decrease(
    pool: &mut PoolState,
    account: &mut Account,
    amount: i128,
) -> Result<(), ContractError> {
    if amount <= 0 || amount > account.staked {
        return Err(ContractError::InsufficientStake);
    }
    // total_staked >= staked >= amount holds by construction.
    let total = pool
        .total_staked
        .checked_sub(amount)
        .filter(|total| *total >= 0)
        .ok_or(ContractError::ArithmeticOverflow)?;

    account.staked -= amount;
    pool.total_staked = total;
    Ok(())
}
