#![no_std]
#![allow(clippy::too_many_arguments)]

//! # Vault Factory
//!
//! Pure creation and bookkeeping layer above the vault-host contract. The
//! factory stores one implementation reference (the host address, updatable
//! by the factory owner), creates instances through it, and indexes every
//! created vault by creation order and — when supplied — by label. It never
//! mediates transfers; callers interact with created vaults directly on the
//! host.
//!
//! Factory ownership and vault ownership are independent: the factory owner
//! administers the factory itself, while each created vault gets its own
//! owner fixed at creation time (the creating caller unless an explicit
//! owner is supplied).

pub mod events;


use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, Address, BytesN, Env,
    String, Symbol, Vec,
};

use vault::VaultContractClient;

// ── Storage key constants ────────────────────────────────────────────────────

const INIT: Symbol = symbol_short!("INIT");
const OWNER: Symbol = symbol_short!("OWNER");
const IMPL: Symbol = symbol_short!("IMPL");
const GATEWAY: Symbol = symbol_short!("GATEWAY");
const COUNT: Symbol = symbol_short!("COUNT");
const BY_INDEX: Symbol = symbol_short!("V_IDX");
const BY_LABEL: Symbol = symbol_short!("V_LBL");
const RECORD: Symbol = symbol_short!("V_REC");

// TTL: ~60 days at 5s/ledger
const TTL_THRESHOLD: u32 = 1_036_800;
const TTL_EXTEND_TO: u32 = 2_073_600;

// ── Error codes ──────────────────────────────────────────────────────────────

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum FactoryError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    /// Bad signer set / threshold, or a label that is already taken.
    InvalidConfiguration = 4,
    /// Out-of-range index or unknown vault / label lookup.
    NotFound = 5,
}

// ── Creation record ──────────────────────────────────────────────────────────

/// Bookkeeping entry the factory keeps for every vault it created.
#[contracttype]
#[derive(Clone, Debug)]
pub struct CreationRecord {
    pub vault_id: BytesN<32>,
    /// Administrative owner the vault was created with.
    pub owner: Address,
    /// Caller that requested the creation.
    pub creator: Address,
    /// Position in the append-only creation-order registry.
    pub index: u32,
    pub label: Option<String>,
    pub created_at: u64,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct VaultFactoryContract;

#[contractimpl]
impl VaultFactoryContract {
    // ── Initialisation ───────────────────────────────────────────────────────

    /// Bootstrap the factory.
    ///
    /// * `vault_host` — the shared vault implementation contract instances
    ///                  are created on.
    /// * `gateway`    — asset-transfer gateway wired into every created
    ///                  vault.
    pub fn initialize(
        env: Env,
        admin: Address,
        vault_host: Address,
        gateway: Address,
    ) -> Result<(), FactoryError> {
        if env.storage().instance().has(&INIT) {
            return Err(FactoryError::AlreadyInitialized);
        }
        admin.require_auth();

        env.storage().instance().set(&OWNER, &admin);
        env.storage().instance().set(&IMPL, &vault_host);
        env.storage().instance().set(&GATEWAY, &gateway);
        env.storage().instance().set(&INIT, &true);

        Ok(())
    }

    // ── Vault creation ───────────────────────────────────────────────────────

    /// Create a new vault instance and return its id.
    ///
    /// The vault's owner is `owner` when supplied, otherwise the creating
    /// caller. Labelled creations are deterministic per `(caller, label)`
    /// and re-using a taken label is rejected; unlabelled creations always
    /// produce a fresh vault. Emits `VaultCreated`.
    pub fn create(
        env: Env,
        caller: Address,
        signers: Vec<Address>,
        threshold: u32,
        owner: Option<Address>,
        label: Option<String>,
    ) -> Result<BytesN<32>, FactoryError> {
        Self::require_init(&env)?;
        caller.require_auth();

        let vault_owner = owner.unwrap_or_else(|| caller.clone());
        vault::registry::validate_config(&signers, threshold, &vault_owner)
            .map_err(|_| FactoryError::InvalidConfiguration)?;

        if let Some(ref label) = label {
            if env
                .storage()
                .persistent()
                .has(&(BY_LABEL, label.clone()))
            {
                return Err(FactoryError::InvalidConfiguration);
            }
        }

        let host: Address = env
            .storage()
            .instance()
            .get(&IMPL)
            .ok_or(FactoryError::NotInitialized)?;
        let gateway: Address = env
            .storage()
            .instance()
            .get(&GATEWAY)
            .ok_or(FactoryError::NotInitialized)?;

        let host_client = VaultContractClient::new(&env, &host);
        let vault_id = match host_client.try_create_vault(
            &caller,
            &label,
            &vault_owner,
            &signers,
            &threshold,
            &gateway,
        ) {
            Ok(Ok(vault_id)) => vault_id,
            // The host re-validates and rejects duplicate ids.
            _ => return Err(FactoryError::InvalidConfiguration),
        };

        let index = Self::append_to_registry(&env, &vault_id);
        if let Some(ref label) = label {
            let key = (BY_LABEL, label.clone());
            env.storage().persistent().set(&key, &vault_id);
            env.storage()
                .persistent()
                .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
        }

        let record = CreationRecord {
            vault_id: vault_id.clone(),
            owner: vault_owner.clone(),
            creator: caller,
            index,
            label,
            created_at: env.ledger().timestamp(),
        };
        let record_key = (RECORD, vault_id.clone());
        env.storage().persistent().set(&record_key, &record);
        env.storage()
            .persistent()
            .extend_ttl(&record_key, TTL_THRESHOLD, TTL_EXTEND_TO);

        events::publish_vault_created(&env, &vault_id, &host, &vault_owner, index);

        Ok(vault_id)
    }

    // ── Registry lookups ─────────────────────────────────────────────────────

    /// Number of vaults this factory has created.
    pub fn vault_count(env: Env) -> u32 {
        env.storage().instance().get(&COUNT).unwrap_or(0u32)
    }

    /// Vault id at position `index` in creation order.
    pub fn vault_at(env: Env, index: u32) -> Result<BytesN<32>, FactoryError> {
        env.storage()
            .persistent()
            .get(&(BY_INDEX, index))
            .ok_or(FactoryError::NotFound)
    }

    /// Vault id registered under `label`.
    pub fn vault_by_label(env: Env, label: String) -> Result<BytesN<32>, FactoryError> {
        env.storage()
            .persistent()
            .get(&(BY_LABEL, label))
            .ok_or(FactoryError::NotFound)
    }

    pub fn get_record(env: Env, vault_id: BytesN<32>) -> Result<CreationRecord, FactoryError> {
        env.storage()
            .persistent()
            .get(&(RECORD, vault_id))
            .ok_or(FactoryError::NotFound)
    }

    // ── Administration ───────────────────────────────────────────────────────

    /// Point the factory at a new vault-host implementation. Existing vaults
    /// keep living on the host they were created on; only future creations
    /// are affected.
    pub fn set_vault_implementation(
        env: Env,
        caller: Address,
        new_host: Address,
    ) -> Result<(), FactoryError> {
        Self::require_init(&env)?;
        caller.require_auth();
        Self::require_owner(&env, &caller)?;

        let previous: Address = env
            .storage()
            .instance()
            .get(&IMPL)
            .ok_or(FactoryError::NotInitialized)?;
        env.storage().instance().set(&IMPL, &new_host);

        events::publish_implementation_updated(&env, &previous, &new_host);

        Ok(())
    }

    pub fn get_implementation(env: Env) -> Result<Address, FactoryError> {
        env.storage()
            .instance()
            .get(&IMPL)
            .ok_or(FactoryError::NotInitialized)
    }

    pub fn get_gateway(env: Env) -> Result<Address, FactoryError> {
        env.storage()
            .instance()
            .get(&GATEWAY)
            .ok_or(FactoryError::NotInitialized)
    }

    /// Hand the factory's administrative role to `new_owner`. Unrelated to
    /// the ownership of any created vault.
    pub fn transfer_ownership(
        env: Env,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), FactoryError> {
        Self::require_init(&env)?;
        caller.require_auth();
        Self::require_owner(&env, &caller)?;

        let previous: Address = env
            .storage()
            .instance()
            .get(&OWNER)
            .ok_or(FactoryError::NotInitialized)?;
        env.storage().instance().set(&OWNER, &new_owner);

        events::publish_ownership_transferred(&env, &previous, &new_owner);

        Ok(())
    }

    pub fn get_owner(env: Env) -> Result<Address, FactoryError> {
        env.storage()
            .instance()
            .get(&OWNER)
            .ok_or(FactoryError::NotInitialized)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn require_init(env: &Env) -> Result<(), FactoryError> {
        if !env.storage().instance().has(&INIT) {
            return Err(FactoryError::NotInitialized);
        }
        Ok(())
    }

    fn require_owner(env: &Env, caller: &Address) -> Result<(), FactoryError> {
        let owner: Address = env
            .storage()
            .instance()
            .get(&OWNER)
            .ok_or(FactoryError::NotInitialized)?;
        if *caller != owner {
            return Err(FactoryError::Unauthorized);
        }
        Ok(())
    }

    fn append_to_registry(env: &Env, vault_id: &BytesN<32>) -> u32 {
        let index: u32 = env.storage().instance().get(&COUNT).unwrap_or(0u32);
        let key = (BY_INDEX, index);
        env.storage().persistent().set(&key, vault_id);
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
        env.storage()
            .instance()
            .set(&COUNT, &index.saturating_add(1));
        index
    }
}
