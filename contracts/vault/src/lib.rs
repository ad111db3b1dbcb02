#![no_std]
#![allow(clippy::too_many_arguments)]

//! # Multisig Custody Vault
//!
//! One contract hosting any number of isolated vault instances. Each
//! instance owns a signer set with an approval threshold, an append-only
//! transaction ledger, and an administrative owner distinct from the
//! signers. Asset movement is delegated to an external gateway contract.
//!
//! Instances are identified by a deterministic 32-byte id derived from the
//! creation parameters, so the contract acts as the shared implementation
//! while every instance holds only its own state. The factory contract
//! creates instances here and indexes them; it never mediates transfers.

pub mod events;
pub mod ledger;
pub mod registry;


use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, xdr::ToXdr, Address,
    Bytes, BytesN, Env, Map, String, Symbol, Vec,
};

use common::{AssetDescriptor, AssetKind};
use ledger::Transaction;
use registry::PendingSignerChange;

// ── Storage key constants ────────────────────────────────────────────────────

const VAULT: Symbol = symbol_short!("VAULT");
const INSTANCE_SEQ: Symbol = symbol_short!("SEQ");

// TTL: ~60 days at 5s/ledger
const TTL_THRESHOLD: u32 = 1_036_800;
const TTL_EXTEND_TO: u32 = 2_073_600;

// ── Error codes ──────────────────────────────────────────────────────────────

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum VaultError {
    /// Unknown vault id or transaction id.
    NotFound = 1,
    /// Caller is not a signer (or not the owner) of the instance.
    Unauthorized = 2,
    AlreadyConfirmed = 3,
    AlreadyExecuted = 4,
    NotConfirmed = 5,
    /// Signer-change target invalid: no matching pending request, candidate
    /// already a signer, or candidate is the owner.
    InvalidRequest = 6,
    /// Bad signer set / threshold at creation, or duplicate vault id.
    InvalidConfiguration = 7,
    /// The gateway did not complete the transfer; the record stays
    /// unexecuted.
    TransferFailed = 8,
}

// ── Instance metadata ────────────────────────────────────────────────────────

/// Per-instance administrative record.
#[contracttype]
#[derive(Clone, Debug)]
pub struct VaultMeta {
    /// Administrative principal; never a member of the signer set.
    pub owner: Address,
    /// Confirmations required to execute a transaction or complete a
    /// signer change.
    pub threshold: u32,
    /// Asset-transfer gateway invoked on execution.
    pub gateway: Address,
    /// Next transaction sequence number.
    pub tx_count: u64,
    pub created_at: u64,
    /// Optional creation label the instance id was derived from.
    pub label: Option<String>,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct VaultContract;

#[contractimpl]
impl VaultContract {
    // ── Instance creation ────────────────────────────────────────────────────

    /// Create a new vault instance and return its deterministic id.
    ///
    /// Labelled instances derive their id from `creator || label`, so the
    /// same pair always maps to the same id and re-creation is rejected.
    /// Unlabelled instances mix in a monotonic sequence number and therefore
    /// always yield a fresh id.
    ///
    /// Configuration rules: signers non-empty and duplicate-free,
    /// `1 <= threshold <= signers.len()`, and the owner must not be a
    /// signer.
    pub fn create_vault(
        env: Env,
        creator: Address,
        label: Option<String>,
        owner: Address,
        signers: Vec<Address>,
        threshold: u32,
        gateway: Address,
    ) -> Result<BytesN<32>, VaultError> {
        creator.require_auth();

        registry::validate_config(&signers, threshold, &owner)?;

        let vault_id = Self::derive_vault_id(&env, &creator, &label);
        if env.storage().persistent().has(&(VAULT, vault_id.clone())) {
            return Err(VaultError::InvalidConfiguration);
        }

        let meta = VaultMeta {
            owner: owner.clone(),
            threshold,
            gateway,
            tx_count: 0,
            created_at: env.ledger().timestamp(),
            label,
        };
        Self::store_meta(&env, &vault_id, &meta);
        registry::store_signers(&env, &vault_id, &signers);

        events::publish_vault_created(&env, &vault_id, &owner, threshold);

        Ok(vault_id)
    }

    // ── Transaction lifecycle ────────────────────────────────────────────────

    /// Propose an asset transfer. Submission counts as the submitter's
    /// confirmation, so a threshold-1 vault executes immediately.
    ///
    /// The quantity is normalised to zero for non-fungible transfers, where
    /// only the unit id matters. `not_before` (zero = none) gates execution,
    /// not confirmation.
    pub fn submit(
        env: Env,
        caller: Address,
        vault_id: BytesN<32>,
        destination: Address,
        asset: AssetDescriptor,
        quantity: i128,
        payload: Bytes,
        not_before: u64,
    ) -> Result<u64, VaultError> {
        caller.require_auth();

        let mut meta = Self::load_meta(&env, &vault_id)?;
        let signers = registry::signers(&env, &vault_id);
        if !signers.contains(&caller) {
            return Err(VaultError::Unauthorized);
        }
        if quantity < 0 {
            return Err(VaultError::InvalidRequest);
        }

        let quantity = if matches!(asset.kind, AssetKind::NonFungible) {
            0
        } else {
            quantity
        };

        let tx_id = meta.tx_count;
        meta.tx_count = meta.tx_count.saturating_add(1);
        Self::store_meta(&env, &vault_id, &meta);

        let mut tx = Transaction {
            id: tx_id,
            destination,
            asset,
            quantity,
            payload,
            not_before,
            executed: false,
            submitted_by: caller.clone(),
            submitted_at: env.ledger().timestamp(),
        };
        ledger::store(&env, &vault_id, &tx);

        let mut confs = Map::new(&env);
        confs.set(caller.clone(), true);
        ledger::store_confirmations(&env, &vault_id, tx_id, &confs);

        events::publish_transaction_submitted(&env, &vault_id, tx_id, &caller);

        ledger::try_execute(&env, &vault_id, &mut tx, &signers, meta.threshold, &meta.gateway)?;

        Ok(tx_id)
    }

    /// Record the caller's confirmation and attempt execution.
    ///
    /// Returns whether the transaction is executed after this call.
    pub fn confirm(
        env: Env,
        caller: Address,
        vault_id: BytesN<32>,
        tx_id: u64,
    ) -> Result<bool, VaultError> {
        caller.require_auth();

        let meta = Self::load_meta(&env, &vault_id)?;
        let signers = registry::signers(&env, &vault_id);
        if !signers.contains(&caller) {
            return Err(VaultError::Unauthorized);
        }

        let mut tx = ledger::load(&env, &vault_id, tx_id).ok_or(VaultError::NotFound)?;
        let mut confs = ledger::confirmations(&env, &vault_id, tx_id);
        if confs.get(caller.clone()).unwrap_or(false) {
            return Err(VaultError::AlreadyConfirmed);
        }
        if tx.executed {
            return Err(VaultError::AlreadyExecuted);
        }

        confs.set(caller.clone(), true);
        ledger::store_confirmations(&env, &vault_id, tx_id, &confs);
        events::publish_transaction_confirmed(&env, &vault_id, tx_id, &caller);

        ledger::try_execute(&env, &vault_id, &mut tx, &signers, meta.threshold, &meta.gateway)
    }

    /// Withdraw the caller's own confirmation from a not-yet-executed
    /// transaction.
    pub fn revoke(
        env: Env,
        caller: Address,
        vault_id: BytesN<32>,
        tx_id: u64,
    ) -> Result<(), VaultError> {
        caller.require_auth();

        Self::load_meta(&env, &vault_id)?;
        if !registry::is_signer(&env, &vault_id, &caller) {
            return Err(VaultError::Unauthorized);
        }

        let tx = ledger::load(&env, &vault_id, tx_id).ok_or(VaultError::NotFound)?;
        if tx.executed {
            return Err(VaultError::AlreadyExecuted);
        }

        let mut confs = ledger::confirmations(&env, &vault_id, tx_id);
        if !confs.get(caller.clone()).unwrap_or(false) {
            return Err(VaultError::NotConfirmed);
        }
        confs.remove(caller.clone());
        ledger::store_confirmations(&env, &vault_id, tx_id, &confs);

        events::publish_confirmation_revoked(&env, &vault_id, tx_id, &caller);

        Ok(())
    }

    // ── Signer rotation ──────────────────────────────────────────────────────

    /// Open (or supersede) a replacement request for one signer slot.
    ///
    /// Owner-only. Re-requesting the same slot wipes every confirmation
    /// accumulated for the previous candidate.
    pub fn request_signer_change(
        env: Env,
        caller: Address,
        vault_id: BytesN<32>,
        old_signer: Address,
        new_signer: Address,
    ) -> Result<(), VaultError> {
        caller.require_auth();

        let meta = Self::load_meta(&env, &vault_id)?;
        if caller != meta.owner {
            return Err(VaultError::Unauthorized);
        }
        if !registry::is_signer(&env, &vault_id, &old_signer) {
            return Err(VaultError::InvalidRequest);
        }
        if registry::is_signer(&env, &vault_id, &new_signer) || new_signer == meta.owner {
            return Err(VaultError::InvalidRequest);
        }

        let request = PendingSignerChange {
            candidate: new_signer.clone(),
            requested_by: caller,
            requested_at: env.ledger().timestamp(),
        };
        registry::open_request(&env, &vault_id, &old_signer, &request);

        events::publish_signer_change_requested(&env, &vault_id, &old_signer, &new_signer);

        Ok(())
    }

    /// Confirm the pending replacement of `old_signer` by `new_signer`.
    ///
    /// Once `threshold` distinct current signers (the vacated slot does not
    /// count) have confirmed, the swap happens atomically and the request
    /// state is cleared. Returns whether the rotation completed.
    pub fn confirm_signer_change(
        env: Env,
        caller: Address,
        vault_id: BytesN<32>,
        old_signer: Address,
        new_signer: Address,
    ) -> Result<bool, VaultError> {
        caller.require_auth();

        let meta = Self::load_meta(&env, &vault_id)?;
        let mut signers = registry::signers(&env, &vault_id);
        if !signers.contains(&caller) {
            return Err(VaultError::Unauthorized);
        }

        let pending = registry::pending_change(&env, &vault_id, &old_signer)
            .ok_or(VaultError::InvalidRequest)?;
        if pending.candidate != new_signer {
            return Err(VaultError::InvalidRequest);
        }
        if signers.contains(&new_signer) || new_signer == meta.owner {
            return Err(VaultError::InvalidRequest);
        }

        let mut confs = registry::change_confirmations(&env, &vault_id, &old_signer);
        if confs.get(caller.clone()).unwrap_or(false) {
            return Err(VaultError::AlreadyConfirmed);
        }
        confs.set(caller.clone(), true);
        registry::store_change_confirmations(&env, &vault_id, &old_signer, &confs);
        events::publish_signer_change_confirmed(&env, &vault_id, &old_signer, &caller);

        let count = registry::live_change_confirmation_count(&signers, &old_signer, &confs);
        if count < meta.threshold {
            return Ok(false);
        }

        registry::replace_signer(&mut signers, &old_signer, &new_signer)?;
        registry::store_signers(&env, &vault_id, &signers);
        registry::clear_request(&env, &vault_id, &old_signer);

        events::publish_signer_rotated(&env, &vault_id, &old_signer, &new_signer);

        Ok(true)
    }

    // ── Ownership ────────────────────────────────────────────────────────────

    /// Hand the instance's administrative role to `new_owner`.
    ///
    /// A current signer can never become the owner.
    pub fn transfer_ownership(
        env: Env,
        caller: Address,
        vault_id: BytesN<32>,
        new_owner: Address,
    ) -> Result<(), VaultError> {
        caller.require_auth();

        let mut meta = Self::load_meta(&env, &vault_id)?;
        if caller != meta.owner {
            return Err(VaultError::Unauthorized);
        }
        if registry::is_signer(&env, &vault_id, &new_owner) {
            return Err(VaultError::InvalidConfiguration);
        }

        let previous = meta.owner.clone();
        meta.owner = new_owner.clone();
        Self::store_meta(&env, &vault_id, &meta);

        events::publish_ownership_transferred(&env, &vault_id, &previous, &new_owner);

        Ok(())
    }

    // ── View functions ───────────────────────────────────────────────────────

    pub fn get_vault(env: Env, vault_id: BytesN<32>) -> Result<VaultMeta, VaultError> {
        Self::load_meta(&env, &vault_id)
    }

    pub fn get_owner(env: Env, vault_id: BytesN<32>) -> Result<Address, VaultError> {
        Ok(Self::load_meta(&env, &vault_id)?.owner)
    }

    pub fn get_threshold(env: Env, vault_id: BytesN<32>) -> Result<u32, VaultError> {
        Ok(Self::load_meta(&env, &vault_id)?.threshold)
    }

    pub fn is_signer(env: Env, vault_id: BytesN<32>, address: Address) -> bool {
        registry::is_signer(&env, &vault_id, &address)
    }

    pub fn get_signers(env: Env, vault_id: BytesN<32>) -> Result<Vec<Address>, VaultError> {
        Self::load_meta(&env, &vault_id)?;
        Ok(registry::signers(&env, &vault_id))
    }

    pub fn transaction_count(env: Env, vault_id: BytesN<32>) -> Result<u64, VaultError> {
        Ok(Self::load_meta(&env, &vault_id)?.tx_count)
    }

    pub fn get_transaction(
        env: Env,
        vault_id: BytesN<32>,
        tx_id: u64,
    ) -> Result<Transaction, VaultError> {
        Self::load_meta(&env, &vault_id)?;
        ledger::load(&env, &vault_id, tx_id).ok_or(VaultError::NotFound)
    }

    /// Confirmations currently counting toward the threshold, i.e. recorded
    /// by addresses still in the signer set.
    pub fn confirmation_count(
        env: Env,
        vault_id: BytesN<32>,
        tx_id: u64,
    ) -> Result<u32, VaultError> {
        Self::load_meta(&env, &vault_id)?;
        ledger::load(&env, &vault_id, tx_id).ok_or(VaultError::NotFound)?;
        let signers = registry::signers(&env, &vault_id);
        let confs = ledger::confirmations(&env, &vault_id, tx_id);
        Ok(ledger::live_confirmation_count(&signers, &confs))
    }

    pub fn has_confirmed(
        env: Env,
        vault_id: BytesN<32>,
        tx_id: u64,
        signer: Address,
    ) -> bool {
        ledger::confirmations(&env, &vault_id, tx_id)
            .get(signer)
            .unwrap_or(false)
    }

    pub fn get_pending_change(
        env: Env,
        vault_id: BytesN<32>,
        old_signer: Address,
    ) -> Option<PendingSignerChange> {
        registry::pending_change(&env, &vault_id, &old_signer)
    }

    pub fn has_confirmed_signer_change(
        env: Env,
        vault_id: BytesN<32>,
        old_signer: Address,
        signer: Address,
    ) -> bool {
        registry::change_confirmations(&env, &vault_id, &old_signer)
            .get(signer)
            .unwrap_or(false)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn store_meta(env: &Env, vault_id: &BytesN<32>, meta: &VaultMeta) {
        let key = (VAULT, vault_id.clone());
        env.storage().persistent().set(&key, meta);
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }

    fn load_meta(env: &Env, vault_id: &BytesN<32>) -> Result<VaultMeta, VaultError> {
        env.storage()
            .persistent()
            .get(&(VAULT, vault_id.clone()))
            .ok_or(VaultError::NotFound)
    }

    /// Derive the instance id from the creation parameters.
    ///
    /// `sha256(creator || label)` for labelled instances,
    /// `sha256(creator || sequence)` otherwise.
    fn derive_vault_id(env: &Env, creator: &Address, label: &Option<String>) -> BytesN<32> {
        let mut data = Bytes::new(env);
        data.append(&creator.clone().to_xdr(env));
        match label {
            Some(label) => data.append(&label.clone().to_xdr(env)),
            None => {
                let seq = Self::next_instance_seq(env);
                for b in seq.to_be_bytes() {
                    data.push_back(b);
                }
            }
        }
        env.crypto().sha256(&data).into()
    }

    fn next_instance_seq(env: &Env) -> u64 {
        let seq: u64 = env
            .storage()
            .instance()
            .get(&INSTANCE_SEQ)
            .unwrap_or(0u64)
            .saturating_add(1);
        env.storage().instance().set(&INSTANCE_SEQ, &seq);
        seq
    }
}
