//! Structured event publishing for the vault contract.

use soroban_sdk::{symbol_short, Address, BytesN, Env};

pub(crate) fn publish_vault_created(
    env: &Env,
    vault_id: &BytesN<32>,
    owner: &Address,
    threshold: u32,
) {
    env.events().publish(
        (symbol_short!("VLT_NEW"), vault_id.clone()),
        (owner.clone(), threshold),
    );
}

pub(crate) fn publish_transaction_submitted(
    env: &Env,
    vault_id: &BytesN<32>,
    tx_id: u64,
    submitter: &Address,
) {
    env.events().publish(
        (symbol_short!("TX_SUB"), vault_id.clone(), tx_id),
        submitter.clone(),
    );
}

pub(crate) fn publish_transaction_confirmed(
    env: &Env,
    vault_id: &BytesN<32>,
    tx_id: u64,
    signer: &Address,
) {
    env.events().publish(
        (symbol_short!("TX_CONF"), vault_id.clone(), tx_id),
        signer.clone(),
    );
}

pub(crate) fn publish_transaction_executed(env: &Env, vault_id: &BytesN<32>, tx_id: u64) {
    env.events()
        .publish((symbol_short!("TX_EXEC"), vault_id.clone()), tx_id);
}

pub(crate) fn publish_confirmation_revoked(
    env: &Env,
    vault_id: &BytesN<32>,
    tx_id: u64,
    signer: &Address,
) {
    env.events().publish(
        (symbol_short!("TX_REV"), vault_id.clone(), tx_id),
        signer.clone(),
    );
}

pub(crate) fn publish_signer_change_requested(
    env: &Env,
    vault_id: &BytesN<32>,
    old_signer: &Address,
    candidate: &Address,
) {
    env.events().publish(
        (symbol_short!("SGN_REQ"), vault_id.clone()),
        (old_signer.clone(), candidate.clone()),
    );
}

pub(crate) fn publish_signer_change_confirmed(
    env: &Env,
    vault_id: &BytesN<32>,
    old_signer: &Address,
    signer: &Address,
) {
    env.events().publish(
        (symbol_short!("SGN_CONF"), vault_id.clone()),
        (old_signer.clone(), signer.clone()),
    );
}

pub(crate) fn publish_signer_rotated(
    env: &Env,
    vault_id: &BytesN<32>,
    old_signer: &Address,
    new_signer: &Address,
) {
    env.events().publish(
        (symbol_short!("SGN_ROT"), vault_id.clone()),
        (old_signer.clone(), new_signer.clone()),
    );
}

pub(crate) fn publish_ownership_transferred(
    env: &Env,
    vault_id: &BytesN<32>,
    previous: &Address,
    new_owner: &Address,
) {
    env.events().publish(
        (symbol_short!("OWN_XFER"), vault_id.clone()),
        (previous.clone(), new_owner.clone()),
    );
}
