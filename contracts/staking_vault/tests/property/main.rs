#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
//! Property-based test suite entry point.
//!
//! Run with:
//!
//! ```bash
//! cargo test -p staking_vault --test property
//! ```
//!
//! To increase the number of generated cases:
//!
//! ```bash
//! PROPTEST_CASES=512 cargo test -p staking_vault --test property
//! ```

mod state_machine;

use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::token::{Client as TokenClient, StellarAssetClient};
use soroban_sdk::{Address, Env};
use staking_vault::{StakingVaultContract, StakingVaultContractClient};

/// Balance minted (and approved) for every generated participant.
pub const STARTING_BALANCE: i128 = 1_000_000_000_000;

pub struct Harness {
    pub env: Env,
    pub client: StakingVaultContractClient<'static>,
    pub controller: Address,
    pub token: Address,
}

impl Harness {
    pub fn new(reward_rate: i128) -> Self {
        let env = Env::default();
        env.mock_all_auths();
        env.ledger().set_timestamp(0);

        let token = env
            .register_stellar_asset_contract_v2(Address::generate(&env))
            .address();
        let contract_id = env.register(StakingVaultContract, ());
        let client = StakingVaultContractClient::new(&env, &contract_id);

        let controller = Address::generate(&env);
        client.initialize(&controller, &token, &reward_rate);

        Self {
            env,
            client,
            controller,
            token,
        }
    }

    /// A fresh address holding [`STARTING_BALANCE`], all of it approved to
    /// the vault.
    pub fn participant(&self) -> Address {
        let who = Address::generate(&self.env);
        StellarAssetClient::new(&self.env, &self.token).mint(&who, &STARTING_BALANCE);
        let expiration = self.env.ledger().sequence() + 1_000;
        TokenClient::new(&self.env, &self.token).approve(
            &who,
            &self.client.address,
            &STARTING_BALANCE,
            &expiration,
        );
        who
    }

    /// Mint `amount` straight into the vault as reward funding.
    pub fn fund(&self, amount: i128) {
        StellarAssetClient::new(&self.env, &self.token).mint(&self.client.address, &amount);
    }

    pub fn advance(&self, seconds: u64) {
        let now = self.env.ledger().timestamp();
        self.env.ledger().set_timestamp(now + seconds);
    }
}
