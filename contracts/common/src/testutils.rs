//! Test doubles shared by the contract test suites.
//!
//! Compiled only with the `testutils` feature.

use soroban_sdk::{
    contract, contractimpl, contracttype, symbol_short, Address, Bytes, Env, Symbol,
};

use crate::asset::AssetKind;
use crate::gateway::AssetGateway;

const FAIL: Symbol = symbol_short!("FAIL");
const CALLS: Symbol = symbol_short!("CALLS");
const LAST: Symbol = symbol_short!("LAST");

/// Arguments of the most recent successful gateway invocation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GatewayCall {
    pub destination: Address,
    pub kind: AssetKind,
    pub asset_ref: Address,
    pub unit_id: u64,
    pub quantity: i128,
}

/// Gateway double: records every successful call and can be switched into a
/// failing mode to simulate an unfunded vault or a reverted transfer.
#[contract]
pub struct MockGateway;

#[contractimpl]
impl AssetGateway for MockGateway {
    fn transfer(
        env: Env,
        destination: Address,
        kind: AssetKind,
        asset_ref: Address,
        unit_id: u64,
        quantity: i128,
        _payload: Bytes,
    ) -> bool {
        if env.storage().instance().get(&FAIL).unwrap_or(false) {
            return false;
        }
        let calls: u32 = env
            .storage()
            .instance()
            .get(&CALLS)
            .unwrap_or(0u32)
            .saturating_add(1);
        env.storage().instance().set(&CALLS, &calls);
        env.storage().instance().set(
            &LAST,
            &GatewayCall {
                destination,
                kind,
                asset_ref,
                unit_id,
                quantity,
            },
        );
        true
    }
}

pub fn register_gateway(env: &Env) -> Address {
    env.register(MockGateway, ())
}

/// Number of transfers the mock completed successfully.
pub fn gateway_calls(env: &Env, gateway: &Address) -> u32 {
    env.as_contract(gateway, || {
        env.storage().instance().get(&CALLS).unwrap_or(0u32)
    })
}

pub fn last_gateway_call(env: &Env, gateway: &Address) -> Option<GatewayCall> {
    env.as_contract(gateway, || env.storage().instance().get(&LAST))
}

pub fn set_gateway_failing(env: &Env, gateway: &Address, failing: bool) {
    env.as_contract(gateway, || {
        env.storage().instance().set(&FAIL, &failing);
    });
}
