//! Transaction records, confirmation tracking, and the auto-execution rule.
//!
//! Records are append-only: once written they are never deleted, forming the
//! permanent audit trail of the vault. The `executed` flag is monotonic.

use soroban_sdk::{contracttype, symbol_short, Address, Bytes, BytesN, Env, Map, Symbol, Vec};

use common::{AssetDescriptor, AssetGatewayClient};

use crate::{events, VaultError};

// ── Storage key prefixes ─────────────────────────────────────────────────────

pub(crate) const TX: Symbol = symbol_short!("TX");
pub(crate) const TX_CONF: Symbol = symbol_short!("TX_CONF");

// TTL: ~60 days at 5s/ledger
const TTL_THRESHOLD: u32 = 1_036_800;
const TTL_EXTEND_TO: u32 = 2_073_600;

// ── Transaction record ───────────────────────────────────────────────────────

/// A proposed asset transfer and its execution status.
#[contracttype]
#[derive(Clone, Debug)]
pub struct Transaction {
    /// Sequence number, unique within the owning vault instance.
    pub id: u64,
    pub destination: Address,
    pub asset: AssetDescriptor,
    /// Amount/quantity to move. Always zero for non-fungible transfers,
    /// where only `asset.unit_id` matters.
    pub quantity: i128,
    /// Opaque data recorded with the transfer and handed to the gateway.
    pub payload: Bytes,
    /// Earliest ledger timestamp at which execution is allowed; zero means
    /// immediately executable.
    pub not_before: u64,
    pub executed: bool,
    pub submitted_by: Address,
    pub submitted_at: u64,
}

// ── Storage helpers ──────────────────────────────────────────────────────────

fn tx_key(vault_id: &BytesN<32>, id: u64) -> (Symbol, BytesN<32>, u64) {
    (TX, vault_id.clone(), id)
}

fn conf_key(vault_id: &BytesN<32>, id: u64) -> (Symbol, BytesN<32>, u64) {
    (TX_CONF, vault_id.clone(), id)
}

pub(crate) fn store(env: &Env, vault_id: &BytesN<32>, tx: &Transaction) {
    let key = tx_key(vault_id, tx.id);
    env.storage().persistent().set(&key, tx);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub(crate) fn load(env: &Env, vault_id: &BytesN<32>, id: u64) -> Option<Transaction> {
    env.storage().persistent().get(&tx_key(vault_id, id))
}

pub(crate) fn confirmations(env: &Env, vault_id: &BytesN<32>, id: u64) -> Map<Address, bool> {
    env.storage()
        .persistent()
        .get(&conf_key(vault_id, id))
        .unwrap_or_else(|| Map::new(env))
}

pub(crate) fn store_confirmations(
    env: &Env,
    vault_id: &BytesN<32>,
    id: u64,
    confs: &Map<Address, bool>,
) {
    let key = conf_key(vault_id, id);
    env.storage().persistent().set(&key, confs);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

// ── Confirmation counting ────────────────────────────────────────────────────

/// Count confirmations from addresses that are *currently* signers.
///
/// A confirmation left behind by a rotated-out signer stays recorded but no
/// longer counts toward the threshold, so stale approvals can never push a
/// transaction over quorum.
pub(crate) fn live_confirmation_count(
    signers: &Vec<Address>,
    confs: &Map<Address, bool>,
) -> u32 {
    let mut count = 0u32;
    for signer in signers.iter() {
        if confs.get(signer).unwrap_or(false) {
            count = count.saturating_add(1);
        }
    }
    count
}

// ── Auto-execution ───────────────────────────────────────────────────────────

/// Attempt to execute `tx` after a confirmation-state change.
///
/// Executes iff confirmations from at least `threshold` current signers are
/// recorded and the `not_before` gate has passed. Invokes the gateway exactly
/// once; on success marks the record executed and publishes the execution
/// event. A failed gateway call surfaces as [`VaultError::TransferFailed`],
/// which aborts (and rolls back) the whole triggering invocation so the
/// record stays unexecuted and prior confirmations survive for retry.
pub(crate) fn try_execute(
    env: &Env,
    vault_id: &BytesN<32>,
    tx: &mut Transaction,
    signers: &Vec<Address>,
    threshold: u32,
    gateway: &Address,
) -> Result<bool, VaultError> {
    if tx.executed {
        return Ok(false);
    }

    let confs = confirmations(env, vault_id, tx.id);
    if live_confirmation_count(signers, &confs) < threshold {
        return Ok(false);
    }
    if tx.not_before != 0 && env.ledger().timestamp() < tx.not_before {
        return Ok(false);
    }

    let gateway_client = AssetGatewayClient::new(env, gateway);
    let transferred = matches!(
        gateway_client.try_transfer(
            &tx.destination,
            &tx.asset.kind,
            &tx.asset.asset_ref,
            &tx.asset.unit_id,
            &tx.quantity,
            &tx.payload,
        ),
        Ok(Ok(true))
    );
    if !transferred {
        return Err(VaultError::TransferFailed);
    }

    tx.executed = true;
    store(env, vault_id, tx);
    events::publish_transaction_executed(env, vault_id, tx.id);

    Ok(true)
}
