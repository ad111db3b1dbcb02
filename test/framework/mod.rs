//! # Custody Suite Testing Harness
//!
//! Cross-contract test environment wiring the vault factory, the vault-host
//! implementation, and the mock asset gateway together the way a deployment
//! would, so integration tests read as end-to-end flows:
//!
//! ```rust,ignore
//! let env = Env::default();
//! let harness = CustodyHarness::new(&env);
//! let signers = harness.new_signers(4);
//! let (vault_id, owner) = harness.create_vault(&signers, 2);
//! let tx_id = harness.submit_transfer(&vault_id, &signers[0]);
//! harness.host.confirm(&signers[1], &vault_id, &tx_id);
//! assert_eq!(harness.gateway_transfer_count(), 1);
//! ```

use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    Address, Bytes, BytesN, Env, Vec,
};

use common::testutils::{gateway_calls, register_gateway, set_gateway_failing};
use common::{AssetDescriptor, AssetKind};
use factory::{VaultFactoryContract, VaultFactoryContractClient};
use vault::{VaultContract, VaultContractClient};

// ── Harness ──────────────────────────────────────────────────────────────────

/// Factory + vault host + gateway, initialised and ready for use.
pub struct CustodyHarness<'a> {
    pub env: &'a Env,
    pub admin: Address,
    pub factory_id: Address,
    pub host_id: Address,
    pub gateway: Address,
    pub factory: VaultFactoryContractClient<'a>,
    pub host: VaultContractClient<'a>,
}

impl<'a> CustodyHarness<'a> {
    /// Register and initialise the whole contract suite with all auth
    /// mocked.
    pub fn new(env: &'a Env) -> Self {
        env.mock_all_auths();

        let factory_id = env.register(VaultFactoryContract, ());
        let factory = VaultFactoryContractClient::new(env, &factory_id);
        let host_id = env.register(VaultContract, ());
        let host = VaultContractClient::new(env, &host_id);
        let gateway = register_gateway(env);

        let admin = Address::generate(env);
        factory.initialize(&admin, &host_id, &gateway);

        Self {
            env,
            admin,
            factory_id,
            host_id,
            gateway,
            factory,
            host,
        }
    }

    /// Generate `n` distinct signer addresses.
    pub fn new_signers(&self, n: usize) -> std::vec::Vec<Address> {
        (0..n).map(|_| Address::generate(self.env)).collect()
    }

    /// Create a vault through the factory with a freshly generated owner.
    pub fn create_vault(&self, signers: &[Address], threshold: u32) -> (BytesN<32>, Address) {
        let owner = Address::generate(self.env);
        let vault_id = self.factory.create(
            &owner,
            &Vec::from_slice(self.env, signers),
            &threshold,
            &None,
            &None,
        );
        (vault_id, owner)
    }

    /// Submit a plain fungible transfer with no execution gate.
    pub fn submit_transfer(&self, vault_id: &BytesN<32>, submitter: &Address) -> u64 {
        let asset = AssetDescriptor {
            kind: AssetKind::Fungible,
            asset_ref: Address::generate(self.env),
            unit_id: 0,
        };
        self.host.submit(
            submitter,
            vault_id,
            &Address::generate(self.env),
            &asset,
            &100i128,
            &Bytes::new(self.env),
            &0u64,
        )
    }

    /// Number of transfers the mock gateway completed.
    pub fn gateway_transfer_count(&self) -> u32 {
        gateway_calls(self.env, &self.gateway)
    }

    /// Toggle the gateway's failure mode.
    pub fn fail_gateway(&self, failing: bool) {
        set_gateway_failing(self.env, &self.gateway, failing);
    }

    /// Advance the ledger timestamp by `delta` seconds.
    pub fn advance_time(&self, delta: u64) {
        let current = self.env.ledger().timestamp();
        self.env.ledger().set_timestamp(current.saturating_add(delta));
    }
}
