#![no_std]

pub mod access;
pub mod asset;
pub mod events;
pub mod ledger;
pub mod rewards;

use soroban_sdk::{contract, contractimpl, contracttype, symbol_short, Address, Env, Symbol};

use asset::AssetLedger;
pub use ledger::Account;
pub use rewards::PoolState;

// ── Storage key constants ────────────────────────────────────────────────────

const INITIALIZED: Symbol = symbol_short!("INIT");

pub(crate) const TTL_THRESHOLD: u32 = 518_400;
pub(crate) const TTL_EXTEND_TO: u32 = 1_036_800;

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidInput = 4,
    InsufficientStake = 5,
    NoRewards = 6,
    TransferFailed = 7,
    ArithmeticOverflow = 8,
}

// ── Public-facing types ──────────────────────────────────────────────────────

/// Balances after a successful `stake` or `withdraw`, enough for a client to
/// refresh its derived views without another round-trip.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Position {
    pub staked: i128,
    pub accrued_rewards: i128,
    pub total_staked: i128,
}

/// Snapshot of a user's staking position returned by `get_staker_info`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakerInfo {
    pub staked: i128,
    pub pending_rewards: i128,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct StakingVaultContract;

#[contractimpl]
impl StakingVaultContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the vault.
    ///
    /// * `controller`  – the only address allowed to change the reward rate.
    /// * `asset`       – token contract used for both principal and rewards.
    /// * `reward_rate` – units emitted **per second** across all stakers.
    pub fn initialize(
        env: Env,
        controller: Address,
        asset: Address,
        reward_rate: i128,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }
        if reward_rate < 0 {
            return Err(ContractError::InvalidInput);
        }

        access::set_controller(&env, &controller);
        asset::set_asset(&env, &asset);
        rewards::store_pool(
            &env,
            &PoolState {
                reward_rate,
                last_update: env.ledger().timestamp(),
                ..PoolState::default()
            },
        );
        env.storage().instance().set(&INITIALIZED, &true);
        Self::extend_instance_ttl(&env);

        events::publish_initialized(&env, controller, asset, reward_rate);

        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Deposit `amount` of the asset.
    ///
    /// The caller must have approved the vault for at least `amount`. The
    /// account is settled first so the new principal earns nothing for time
    /// that already passed.
    pub fn stake(env: Env, staker: Address, amount: i128) -> Result<Position, ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidInput);
        }

        // 1. Settle at the old total.
        let (mut pool, mut account) = Self::settle(&env, &staker)?;

        // 2. Credit the ledger and persist before touching the token.
        ledger::increase(&mut pool, &mut account, amount)?;
        Self::persist(&env, &staker, &pool, &account);

        // 3. Pull the principal.
        AssetLedger::load(&env)?.pull(&staker, amount)?;

        events::publish_staked(&env, staker, amount, account.staked, pool.total_staked);

        Ok(Self::position(&pool, &account))
    }

    /// Return `amount` of principal to the staker.
    ///
    /// Accrued rewards are left in place; withdrawing everything does not
    /// forfeit them.
    pub fn withdraw(env: Env, staker: Address, amount: i128) -> Result<Position, ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();

        // 1. Settle at the old total.
        let (mut pool, mut account) = Self::settle(&env, &staker)?;

        // 2. Debit the ledger and persist (checks-effects-interactions).
        ledger::decrease(&mut pool, &mut account, amount)?;
        Self::persist(&env, &staker, &pool, &account);

        // 3. Push the principal back.
        AssetLedger::load(&env)?.push(&staker, amount)?;

        events::publish_withdrawn(&env, staker, amount, account.staked, pool.total_staked);

        Ok(Self::position(&pool, &account))
    }

    // ── Rewards ─────────────────────────────────────────────────────────────

    /// Pay out everything `staker` has earned so far.
    ///
    /// The accrued balance is zeroed and stored before the transfer. If the
    /// vault cannot cover the payout the transfer fails with
    /// `TransferFailed` and the whole invocation, zeroing included, is
    /// rolled back.
    pub fn claim_rewards(env: Env, staker: Address) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();

        let (pool, mut account) = Self::settle(&env, &staker)?;

        let reward = account.accrued_rewards;
        if reward <= 0 {
            return Err(ContractError::NoRewards);
        }

        account.accrued_rewards = 0;
        Self::persist(&env, &staker, &pool, &account);

        AssetLedger::load(&env)?.push(&staker, reward)?;

        events::publish_reward_claimed(&env, staker, reward);

        Ok(reward)
    }

    /// Top up the reward pool from `funder`'s allowance.
    ///
    /// Purely a transfer into the vault; no accounting changes. Returns the
    /// vault's balance afterwards.
    pub fn fund_rewards(env: Env, funder: Address, amount: i128) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        funder.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidInput);
        }

        let asset = AssetLedger::load(&env)?;
        asset.pull(&funder, amount)?;
        let vault_balance = asset.vault_balance();
        Self::extend_instance_ttl(&env);

        events::publish_rewards_funded(&env, funder, amount, vault_balance);

        Ok(vault_balance)
    }

    // ── Controller ──────────────────────────────────────────────────────────

    /// Replace the reward emission rate.
    ///
    /// The global accumulator is flushed at the old rate first, so no
    /// account can later apply the new rate to time before the change.
    pub fn set_reward_rate(env: Env, caller: Address, new_rate: i128) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        access::require_controller(&env, &caller)?;

        if new_rate < 0 {
            return Err(ContractError::InvalidInput);
        }

        let mut pool = rewards::load_pool(&env);
        rewards::accrue(&mut pool, env.ledger().timestamp())?;

        let old_rate = pool.reward_rate;
        pool.reward_rate = new_rate;
        rewards::store_pool(&env, &pool);
        Self::extend_instance_ttl(&env);

        events::publish_reward_rate_set(&env, caller, old_rate, new_rate);

        Ok(())
    }

    // ── View functions ───────────────────────────────────────────────────────

    /// Return the user's current staked balance.
    pub fn get_staked(env: Env, staker: Address) -> i128 {
        ledger::stake_of(&env, &staker)
    }

    /// Return the sum of all currently staked principal.
    pub fn get_total_staked(env: Env) -> i128 {
        rewards::load_pool(&env).total_staked
    }

    /// Return the current reward rate (units per second).
    pub fn get_reward_rate(env: Env) -> i128 {
        rewards::load_pool(&env).reward_rate
    }

    /// Return what `claim_rewards` would pay right now, without mutating
    /// state.
    pub fn earned(env: Env, staker: Address) -> Result<i128, ContractError> {
        let pool = rewards::load_pool(&env);
        let account = ledger::load_account(&env, &staker);
        rewards::project(&pool, &account, env.ledger().timestamp())
    }

    /// Return the combined staking position for a user.
    pub fn get_staker_info(env: Env, staker: Address) -> Result<StakerInfo, ContractError> {
        let pool = rewards::load_pool(&env);
        let account = ledger::load_account(&env, &staker);

        Ok(StakerInfo {
            staked: account.staked,
            pending_rewards: rewards::project(&pool, &account, env.ledger().timestamp())?,
        })
    }

    /// Return the raw account record, or `None` if `staker` was never settled.
    pub fn get_account(env: Env, staker: Address) -> Option<Account> {
        ledger::find_account(&env, &staker)
    }

    /// Return the raw pool record.
    pub fn get_pool(env: Env) -> PoolState {
        rewards::load_pool(&env)
    }

    pub fn get_controller(env: Env) -> Result<Address, ContractError> {
        access::controller(&env)
    }

    pub fn get_asset(env: Env) -> Result<Address, ContractError> {
        asset::asset_address(&env)
    }

    /// Return the vault's token balance (principal plus reward pool).
    pub fn get_vault_balance(env: Env) -> Result<i128, ContractError> {
        Ok(AssetLedger::load(&env)?.vault_balance())
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    /// Guard: revert if the contract is not yet initialized.
    fn require_initialized(env: &Env) -> Result<(), ContractError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::NotInitialized);
        }
        Ok(())
    }

    /// Load the pool and `user`'s account and settle the account up to the
    /// current ledger timestamp. Nothing is written; the caller persists
    /// both records once it has applied its own mutation.
    fn settle(env: &Env, user: &Address) -> Result<(PoolState, Account), ContractError> {
        let mut pool = rewards::load_pool(env);
        let mut account = ledger::load_account(env, user);
        rewards::settle(&mut pool, &mut account, env.ledger().timestamp())?;
        Ok((pool, account))
    }

    fn persist(env: &Env, user: &Address, pool: &PoolState, account: &Account) {
        rewards::store_pool(env, pool);
        ledger::store_account(env, user, account);
        Self::extend_instance_ttl(env);
    }

    fn extend_instance_ttl(env: &Env) {
        env.storage()
            .instance()
            .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
    }

    fn position(pool: &PoolState, account: &Account) -> Position {
        Position {
            staked: account.staked,
            accrued_rewards: account.accrued_rewards,
            total_staked: pool.total_staked,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
