#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{Client as TokenClient, StellarAssetClient},
    Address, Env,
};
use staking_vault::{StakingVaultContract, StakingVaultContractClient};

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Stake { amount: u64 },
    Withdraw { amount: u64 },
    ClaimRewards,
    Advance { seconds: u32 },
    SetRewardRate { rate: u32 },
}

const BALANCE: i128 = i64::MAX as i128;

fuzz_target!(|actions: Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();

    let token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let contract_id = env.register(StakingVaultContract, ());
    let client = StakingVaultContractClient::new(&env, &contract_id);

    let controller = Address::generate(&env);
    client.initialize(&controller, &token, &1_000i128);
    StellarAssetClient::new(&env, &token).mint(&contract_id, &BALANCE);

    let mut users = vec![controller.clone()];
    for _ in 0..5 {
        users.push(Address::generate(&env));
    }
    for user in &users {
        StellarAssetClient::new(&env, &token).mint(user, &BALANCE);
        TokenClient::new(&env, &token).approve(user, &contract_id, &BALANCE, &1_000);
    }

    // Errors are expected (insufficient stake, no rewards, insolvency);
    // only host panics and broken accounting are findings.
    for (i, action) in actions.into_iter().enumerate() {
        let caller = &users[i % users.len()];
        match action {
            FuzzAction::Stake { amount } => {
                let _ = client.try_stake(caller, &(amount as i128));
            }
            FuzzAction::Withdraw { amount } => {
                let _ = client.try_withdraw(caller, &(amount as i128));
            }
            FuzzAction::ClaimRewards => {
                let _ = client.try_claim_rewards(caller);
            }
            FuzzAction::Advance { seconds } => {
                let now = env.ledger().timestamp();
                env.ledger().set_timestamp(now + u64::from(seconds));
            }
            FuzzAction::SetRewardRate { rate } => {
                let _ = client.try_set_reward_rate(&controller, &(rate as i128));
            }
        }

        let sum: i128 = users.iter().map(|u| client.get_staked(u)).sum();
        assert_eq!(client.get_total_staked(), sum, "total_staked drifted");
        for user in &users {
            assert!(client.get_staked(user) >= 0);
            if let Ok(Ok(earned)) = client.try_earned(user) {
                assert!(earned >= 0);
            }
        }
    }
});
