//! Signer set storage and the signer-change consensus track.
//!
//! Signer rotation runs on its own confirmation maps, fully disjoint from
//! transaction confirmations: a vote recorded for a transfer can never be
//! reinterpreted as a vote for a membership change.

use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Env, Map, Symbol, Vec};

use crate::VaultError;

// ── Storage key prefixes ─────────────────────────────────────────────────────

pub(crate) const SIGNERS: Symbol = symbol_short!("SIGNERS");
pub(crate) const CHG: Symbol = symbol_short!("CHG");
pub(crate) const CHG_CONF: Symbol = symbol_short!("CHG_CONF");

// TTL: ~60 days at 5s/ledger
const TTL_THRESHOLD: u32 = 1_036_800;
const TTL_EXTEND_TO: u32 = 2_073_600;

// ── Pending signer change ────────────────────────────────────────────────────

/// The single live replacement request for one signer slot.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PendingSignerChange {
    /// Proposed replacement for the vacating signer.
    pub candidate: Address,
    pub requested_by: Address,
    pub requested_at: u64,
}

// ── Signer set ───────────────────────────────────────────────────────────────

fn signers_key(vault_id: &BytesN<32>) -> (Symbol, BytesN<32>) {
    (SIGNERS, vault_id.clone())
}

pub(crate) fn signers(env: &Env, vault_id: &BytesN<32>) -> Vec<Address> {
    env.storage()
        .persistent()
        .get(&signers_key(vault_id))
        .unwrap_or_else(|| Vec::new(env))
}

pub(crate) fn store_signers(env: &Env, vault_id: &BytesN<32>, signers: &Vec<Address>) {
    let key = signers_key(vault_id);
    env.storage().persistent().set(&key, signers);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub(crate) fn is_signer(env: &Env, vault_id: &BytesN<32>, address: &Address) -> bool {
    signers(env, vault_id).contains(address)
}

/// Validate an initial signer configuration.
///
/// Requires a non-empty, duplicate-free signer set, a threshold within
/// `1..=len`, and an owner outside the signer set.
pub fn validate_config(
    signers: &Vec<Address>,
    threshold: u32,
    owner: &Address,
) -> Result<(), VaultError> {
    let len = signers.len();
    if len == 0 || threshold == 0 || threshold > len {
        return Err(VaultError::InvalidConfiguration);
    }
    for i in 0..len {
        let signer = signers.get_unchecked(i);
        if signer == *owner {
            return Err(VaultError::InvalidConfiguration);
        }
        for j in (i + 1)..len {
            if signers.get_unchecked(j) == signer {
                return Err(VaultError::InvalidConfiguration);
            }
        }
    }
    Ok(())
}

// ── Pending request storage ──────────────────────────────────────────────────

fn change_key(vault_id: &BytesN<32>, old_signer: &Address) -> (Symbol, BytesN<32>, Address) {
    (CHG, vault_id.clone(), old_signer.clone())
}

fn change_conf_key(
    vault_id: &BytesN<32>,
    old_signer: &Address,
) -> (Symbol, BytesN<32>, Address) {
    (CHG_CONF, vault_id.clone(), old_signer.clone())
}

pub(crate) fn pending_change(
    env: &Env,
    vault_id: &BytesN<32>,
    old_signer: &Address,
) -> Option<PendingSignerChange> {
    env.storage().persistent().get(&change_key(vault_id, old_signer))
}

/// Open (or supersede) the request for `old_signer`'s slot.
///
/// Any confirmations accumulated for a previous candidate on this slot are
/// wiped: a fresh request always starts from zero votes.
pub(crate) fn open_request(
    env: &Env,
    vault_id: &BytesN<32>,
    old_signer: &Address,
    request: &PendingSignerChange,
) {
    let key = change_key(vault_id, old_signer);
    env.storage().persistent().set(&key, request);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    env.storage()
        .persistent()
        .remove(&change_conf_key(vault_id, old_signer));
}

pub(crate) fn clear_request(env: &Env, vault_id: &BytesN<32>, old_signer: &Address) {
    env.storage().persistent().remove(&change_key(vault_id, old_signer));
    env.storage()
        .persistent()
        .remove(&change_conf_key(vault_id, old_signer));
}

pub(crate) fn change_confirmations(
    env: &Env,
    vault_id: &BytesN<32>,
    old_signer: &Address,
) -> Map<Address, bool> {
    env.storage()
        .persistent()
        .get(&change_conf_key(vault_id, old_signer))
        .unwrap_or_else(|| Map::new(env))
}

pub(crate) fn store_change_confirmations(
    env: &Env,
    vault_id: &BytesN<32>,
    old_signer: &Address,
    confs: &Map<Address, bool>,
) {
    let key = change_conf_key(vault_id, old_signer);
    env.storage().persistent().set(&key, confs);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Count change confirmations from current signers, excluding the vacated
/// slot itself.
pub(crate) fn live_change_confirmation_count(
    signers: &Vec<Address>,
    old_signer: &Address,
    confs: &Map<Address, bool>,
) -> u32 {
    let mut count = 0u32;
    for signer in signers.iter() {
        if signer == *old_signer {
            continue;
        }
        if confs.get(signer).unwrap_or(false) {
            count = count.saturating_add(1);
        }
    }
    count
}

/// Swap `old_signer` for `candidate` in place, preserving slot order.
pub(crate) fn replace_signer(
    signers: &mut Vec<Address>,
    old_signer: &Address,
    candidate: &Address,
) -> Result<(), VaultError> {
    let index = signers
        .first_index_of(old_signer)
        .ok_or(VaultError::InvalidRequest)?;
    signers.set(index, candidate.clone());
    Ok(())
}
