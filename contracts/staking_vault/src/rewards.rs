//! Reward accrual engine: pool state and the reward-per-token math.
//!
//! Every entry point settles through [`settle`] (or [`accrue`] for rate
//! changes) before it mutates stake or rate, so no interval is ever priced at
//! a total or rate that did not hold during it.

use soroban_sdk::{contracttype, symbol_short, Env, Symbol};

use crate::ledger::Account;
use crate::ContractError;

/// Fixed-point scaling factor.
///
/// Reward-per-token values are multiplied by this constant before storage so
/// sub-unit shares survive integer division. 10^12 leaves ample headroom in
/// i128 for 7-decimal Stellar assets.
pub const PRECISION: i128 = 1_000_000_000_000;

const POOL: Symbol = symbol_short!("POOL");

/// Global accrual state, stored as a single instance-storage record.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PoolState {
    /// Sum of every account's `staked`.
    pub total_staked: i128,
    /// Units emitted per second across all stakers.
    pub reward_rate: i128,
    /// Cumulative reward per staked unit, scaled by [`PRECISION`].
    pub reward_per_token: i128,
    /// Ledger timestamp up to which `reward_per_token` has been accrued.
    pub last_update: u64,
}

pub fn load_pool(env: &Env) -> PoolState {
    env.storage().instance().get(&POOL).unwrap_or_default()
}

pub fn store_pool(env: &Env, pool: &PoolState) {
    env.storage().instance().set(&POOL, pool);
}

// ── Core reward math ────────────────────────────────────────────────────────

/// Advance a reward-per-token accumulator across `elapsed` seconds.
///
/// ```text
/// Δrpt = reward_rate × elapsed × PRECISION / total_staked
/// ```
///
/// An empty pool leaves `stored` unchanged: nobody is staked, so the
/// interval's emission belongs to nobody and there is nothing to divide by.
/// Division truncates, so the accumulator can only under-state what is owed.
pub fn reward_per_token(
    stored: i128,
    reward_rate: i128,
    elapsed: u64,
    total_staked: i128,
) -> Result<i128, ContractError> {
    if total_staked <= 0 || elapsed == 0 || reward_rate == 0 {
        return Ok(stored);
    }

    let emitted = reward_rate
        .checked_mul(i128::from(elapsed))
        .ok_or(ContractError::ArithmeticOverflow)?;
    let delta = mul_div(emitted, PRECISION, total_staked)?;

    stored
        .checked_add(delta)
        .ok_or(ContractError::ArithmeticOverflow)
}

/// Rewards owed to `staked` units for the accumulator movement since the
/// account's last snapshot.
///
/// ```text
/// pending = staked × (current_rpt − rpt_paid) / PRECISION
/// ```
pub fn pending(staked: i128, current_rpt: i128, rpt_paid: i128) -> Result<i128, ContractError> {
    let delta = current_rpt
        .checked_sub(rpt_paid)
        .ok_or(ContractError::ArithmeticOverflow)?;
    if staked == 0 || delta <= 0 {
        return Ok(0);
    }

    mul_div(staked, delta, PRECISION)
}

/// `⌊a × b / c⌋` for non-negative `a`, `b` and positive `c`.
///
/// Falls back to splitting one factor by `c` when the full product does not
/// fit, so only a quotient that is itself out of range reports overflow. All
/// paths give the same truncated result.
fn mul_div(a: i128, b: i128, c: i128) -> Result<i128, ContractError> {
    if let Some(product) = a.checked_mul(b) {
        return Ok(product / c);
    }
    split_mul_div(a, b, c)
        .or_else(|| split_mul_div(b, a, c))
        .ok_or(ContractError::ArithmeticOverflow)
}

// ⌊a·b/c⌋ = (a/c)·b + ⌊(a%c)·b/c⌋
fn split_mul_div(a: i128, b: i128, c: i128) -> Option<i128> {
    let whole = (a / c).checked_mul(b)?;
    let rest = (a % c).checked_mul(b)? / c;
    whole.checked_add(rest)
}

// ── Settlement ──────────────────────────────────────────────────────────────

/// Flush the global accumulator up to `now` at the rate currently in force.
///
/// Must run before anything that changes `total_staked` or `reward_rate`,
/// otherwise the new value would be applied to time that already elapsed.
pub fn accrue(pool: &mut PoolState, now: u64) -> Result<(), ContractError> {
    let elapsed = now.saturating_sub(pool.last_update);
    pool.reward_per_token = reward_per_token(
        pool.reward_per_token,
        pool.reward_rate,
        elapsed,
        pool.total_staked,
    )?;
    if now > pool.last_update {
        pool.last_update = now;
    }
    Ok(())
}

/// Materialise everything `account` has earned up to `now`.
///
/// Returns the amount newly moved into `accrued_rewards`.
pub fn settle(pool: &mut PoolState, account: &mut Account, now: u64) -> Result<i128, ContractError> {
    accrue(pool, now)?;

    let earned = pending(
        account.staked,
        pool.reward_per_token,
        account.reward_per_token_paid,
    )?;
    account.accrued_rewards = account
        .accrued_rewards
        .checked_add(earned)
        .ok_or(ContractError::ArithmeticOverflow)?;
    account.reward_per_token_paid = pool.reward_per_token;
    if now > account.last_accrual {
        account.last_accrual = now;
    }

    Ok(earned)
}

/// What [`settle`] followed by a full claim would pay at `now`, computed
/// without touching either record.
pub fn project(pool: &PoolState, account: &Account, now: u64) -> Result<i128, ContractError> {
    let elapsed = now.saturating_sub(pool.last_update);
    let current_rpt = reward_per_token(
        pool.reward_per_token,
        pool.reward_rate,
        elapsed,
        pool.total_staked,
    )?;

    pending(account.staked, current_rpt, account.reward_per_token_paid)?
        .checked_add(account.accrued_rewards)
        .ok_or(ContractError::ArithmeticOverflow)
}

// ── Unit tests ──────────────────────────────────────────────────────────────
// Pure math, no Soroban environment needed.
