//! Structured event publishing for the vault factory.

use soroban_sdk::{symbol_short, Address, BytesN, Env};

/// `VaultCreated` — the sole reliable way for callers to learn a newly
/// created vault's identity.
pub(crate) fn publish_vault_created(
    env: &Env,
    vault_id: &BytesN<32>,
    host: &Address,
    owner: &Address,
    index: u32,
) {
    env.events().publish(
        (symbol_short!("V_CREATED"), vault_id.clone()),
        (host.clone(), owner.clone(), index),
    );
}

pub(crate) fn publish_implementation_updated(env: &Env, previous: &Address, new_host: &Address) {
    env.events().publish(
        (symbol_short!("IMPL_SET"),),
        (previous.clone(), new_host.clone()),
    );
}

pub(crate) fn publish_ownership_transferred(env: &Env, previous: &Address, new_owner: &Address) {
    env.events().publish(
        (symbol_short!("OWN_XFER"),),
        (previous.clone(), new_owner.clone()),
    );
}
