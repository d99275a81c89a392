//! Boundary to the token contract holding principal and the reward pool.
//!
//! Every call goes through the client's `try_*` variant so a rejected
//! transfer comes back as [`ContractError::TransferFailed`] instead of
//! trapping the host. The invocation still rolls back as a whole because
//! the caller propagates the error.

use soroban_sdk::{log, symbol_short, token, Address, Env, Symbol};

use crate::ContractError;

const ASSET: Symbol = symbol_short!("ASSET");

pub fn set_asset(env: &Env, asset: &Address) {
    env.storage().instance().set(&ASSET, asset);
}

pub fn asset_address(env: &Env) -> Result<Address, ContractError> {
    env.storage()
        .instance()
        .get(&ASSET)
        .ok_or(ContractError::NotInitialized)
}

/// The vault's view of the configured token.
pub struct AssetLedger<'a> {
    env: &'a Env,
    client: token::Client<'a>,
    vault: Address,
}

impl<'a> AssetLedger<'a> {
    pub fn load(env: &'a Env) -> Result<Self, ContractError> {
        let asset = asset_address(env)?;
        Ok(Self {
            env,
            client: token::Client::new(env, &asset),
            vault: env.current_contract_address(),
        })
    }

    /// Move `amount` from `from` into the vault using the allowance `from`
    /// granted the vault.
    pub fn pull(&self, from: &Address, amount: i128) -> Result<(), ContractError> {
        match self
            .client
            .try_transfer_from(&self.vault, from, &self.vault, &amount)
        {
            Ok(Ok(())) => Ok(()),
            _ => {
                log!(self.env, "asset pull rejected", from.clone(), amount);
                Err(ContractError::TransferFailed)
            }
        }
    }

    /// Pay `amount` out of the vault's own balance.
    pub fn push(&self, to: &Address, amount: i128) -> Result<(), ContractError> {
        match self.client.try_transfer(&self.vault, to, &amount) {
            Ok(Ok(())) => Ok(()),
            _ => {
                log!(self.env, "asset push rejected", to.clone(), amount);
                Err(ContractError::TransferFailed)
            }
        }
    }

    pub fn balance_of(&self, owner: &Address) -> i128 {
        self.client.balance(owner)
    }

    pub fn vault_balance(&self) -> i128 {
        self.balance_of(&self.vault)
    }
}
