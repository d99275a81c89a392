//! Single-controller gate for rate changes.
//!
//! The controller is written once by `initialize` and never rotated.

use soroban_sdk::{symbol_short, Address, Env, Symbol};

use crate::ContractError;

const CONTROLLER: Symbol = symbol_short!("CTRL");

pub fn set_controller(env: &Env, controller: &Address) {
    env.storage().instance().set(&CONTROLLER, controller);
}

pub fn controller(env: &Env) -> Result<Address, ContractError> {
    env.storage()
        .instance()
        .get(&CONTROLLER)
        .ok_or(ContractError::NotInitialized)
}

/// Guard: revert unless `caller` is the stored controller.
pub fn require_controller(env: &Env, caller: &Address) -> Result<(), ContractError> {
    if *caller != controller(env)? {
        return Err(ContractError::Unauthorized);
    }
    Ok(())
}
