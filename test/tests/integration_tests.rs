//! End-to-end flows across factory, vault host, and gateway, plus
//! property-based checks of the confirmation-threshold semantics.

use proptest::prelude::*;
use soroban_sdk::Env;

use factory::FactoryError;
use test_framework::CustodyHarness;
use vault::VaultError;

// ═════════════════════════════════════════════════════════════════════════════
//  End-to-end scenarios
// ═════════════════════════════════════════════════════════════════════════════

/// The canonical custody flow: create through the factory, execute at the
/// second confirmation, then rotate a signer under the same owner.
#[test]
fn test_factory_vault_full_lifecycle() {
    let env = Env::default();
    let harness = CustodyHarness::new(&env);

    let signers = harness.new_signers(4);
    let (vault_id, owner) = harness.create_vault(&signers, 2);
    assert_eq!(harness.factory.vault_at(&0u32), vault_id);

    // Submission counts as one confirmation; the second executes.
    let tx_id = harness.submit_transfer(&vault_id, &signers[0]);
    assert!(!harness.host.get_transaction(&vault_id, &tx_id).executed);
    assert!(harness.host.confirm(&signers[1], &vault_id, &tx_id));
    assert_eq!(harness.gateway_transfer_count(), 1);

    assert_eq!(
        harness.host.try_confirm(&signers[1], &vault_id, &tx_id),
        Err(Ok(VaultError::AlreadyConfirmed))
    );

    // Rotate signer 0 out with two of four confirmations.
    let replacement = harness.new_signers(1).remove(0);
    harness
        .host
        .request_signer_change(&owner, &vault_id, &signers[0], &replacement);
    assert!(!harness
        .host
        .confirm_signer_change(&signers[1], &vault_id, &signers[0], &replacement));
    assert!(harness
        .host
        .confirm_signer_change(&signers[2], &vault_id, &signers[0], &replacement));
    assert!(!harness.host.is_signer(&vault_id, &signers[0]));
    assert!(harness.host.is_signer(&vault_id, &replacement));

    // A stale confirmation referencing the vacated slot is rejected.
    assert_eq!(
        harness
            .host
            .try_confirm_signer_change(&signers[3], &vault_id, &signers[0], &replacement),
        Err(Ok(VaultError::InvalidRequest))
    );

    // The owner can never hand the vault to one of its signers.
    assert_eq!(
        harness
            .host
            .try_transfer_ownership(&owner, &vault_id, &replacement),
        Err(Ok(VaultError::InvalidConfiguration))
    );
}

/// Vaults created by one factory share an implementation but nothing else.
#[test]
fn test_sibling_vaults_do_not_interfere() {
    let env = Env::default();
    let harness = CustodyHarness::new(&env);

    let signers = harness.new_signers(3);
    let (vault_a, owner_a) = harness.create_vault(&signers, 2);
    let (vault_b, _owner_b) = harness.create_vault(&signers, 2);

    let tx_a = harness.submit_transfer(&vault_a, &signers[0]);
    let tx_b = harness.submit_transfer(&vault_b, &signers[0]);

    harness.host.confirm(&signers[1], &vault_a, &tx_a);
    assert!(harness.host.get_transaction(&vault_a, &tx_a).executed);
    assert!(!harness.host.get_transaction(&vault_b, &tx_b).executed);
    assert_eq!(harness.host.confirmation_count(&vault_b, &tx_b), 1);

    // Rotating a signer on A leaves B's signer set intact.
    let replacement = harness.new_signers(1).remove(0);
    harness
        .host
        .request_signer_change(&owner_a, &vault_a, &signers[0], &replacement);
    harness
        .host
        .confirm_signer_change(&signers[1], &vault_a, &signers[0], &replacement);
    harness
        .host
        .confirm_signer_change(&signers[2], &vault_a, &signers[0], &replacement);

    assert!(!harness.host.is_signer(&vault_a, &signers[0]));
    assert!(harness.host.is_signer(&vault_b, &signers[0]));
}

/// A gateway outage never corrupts ledger state; funding the vault and
/// resubmitting the confirmation completes the transfer.
#[test]
fn test_gateway_outage_and_recovery() {
    let env = Env::default();
    let harness = CustodyHarness::new(&env);

    let signers = harness.new_signers(2);
    let (vault_id, _) = harness.create_vault(&signers, 2);
    let tx_id = harness.submit_transfer(&vault_id, &signers[0]);

    harness.fail_gateway(true);
    assert_eq!(
        harness.host.try_confirm(&signers[1], &vault_id, &tx_id),
        Err(Ok(VaultError::TransferFailed))
    );
    assert_eq!(harness.host.confirmation_count(&vault_id, &tx_id), 1);

    harness.fail_gateway(false);
    assert!(harness.host.confirm(&signers[1], &vault_id, &tx_id));
    assert_eq!(harness.gateway_transfer_count(), 1);
}

/// Replacing the implementation reference only affects future creations.
#[test]
fn test_implementation_upgrade_preserves_existing_vaults() {
    let env = Env::default();
    let harness = CustodyHarness::new(&env);

    let signers = harness.new_signers(3);
    let (vault_id, _) = harness.create_vault(&signers, 2);

    let new_host = env.register(vault::VaultContract, ());
    harness
        .factory
        .set_vault_implementation(&harness.admin, &new_host);

    // The old vault still answers on the old host.
    let tx_id = harness.submit_transfer(&vault_id, &signers[0]);
    assert!(harness.host.confirm(&signers[1], &vault_id, &tx_id));

    // New creations land on the new implementation.
    let (fresh_id, _) = harness.create_vault(&signers, 2);
    let fresh_host = vault::VaultContractClient::new(&env, &new_host);
    assert_eq!(fresh_host.get_threshold(&fresh_id), 2);
    assert_eq!(
        harness.host.try_get_threshold(&fresh_id),
        Err(Ok(VaultError::NotFound))
    );
}

#[test]
fn test_factory_rejects_out_of_range_lookup() {
    let env = Env::default();
    let harness = CustodyHarness::new(&env);
    assert_eq!(
        harness.factory.try_vault_at(&0u32),
        Err(Ok(FactoryError::NotFound))
    );
}

// ═════════════════════════════════════════════════════════════════════════════
//  Property-based tests
// ═════════════════════════════════════════════════════════════════════════════

/// `(signer count, threshold)` pairs with `1 <= threshold <= count`.
fn signer_config() -> impl Strategy<Value = (usize, u32)> {
    (1usize..=6).prop_flat_map(|n| (Just(n), 1u32..=(n as u32)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// **Property**: a transaction executes exactly when confirmations from
    /// `threshold` current signers have accumulated, and the gateway is
    /// invoked exactly once.
    #[test]
    fn prop_executes_exactly_at_threshold((n, threshold) in signer_config()) {
        let env = Env::default();
        let harness = CustodyHarness::new(&env);
        let signers = harness.new_signers(n);
        let (vault_id, _) = harness.create_vault(&signers, threshold);

        let tx_id = harness.submit_transfer(&vault_id, &signers[0]);
        let mut confirmed = 1u32;
        prop_assert_eq!(
            harness.host.get_transaction(&vault_id, &tx_id).executed,
            confirmed >= threshold
        );

        for signer in signers.iter().skip(1) {
            if confirmed >= threshold {
                break;
            }
            let executed = harness.host.confirm(signer, &vault_id, &tx_id);
            confirmed += 1;
            prop_assert_eq!(executed, confirmed >= threshold);
        }

        prop_assert!(harness.host.get_transaction(&vault_id, &tx_id).executed);
        prop_assert_eq!(harness.gateway_transfer_count(), 1);
    }

    /// **Property**: a second confirmation from the same signer is always
    /// rejected and never changes execution state.
    #[test]
    fn prop_duplicate_confirmation_rejected(n in 2usize..=6) {
        let env = Env::default();
        let harness = CustodyHarness::new(&env);
        let signers = harness.new_signers(n);
        // Full unanimity required, so nothing executes mid-loop.
        let (vault_id, _) = harness.create_vault(&signers, n as u32);

        let tx_id = harness.submit_transfer(&vault_id, &signers[0]);
        for signer in signers.iter().take(n - 1) {
            if signer != &signers[0] {
                harness.host.confirm(signer, &vault_id, &tx_id);
            }
            prop_assert_eq!(
                harness.host.try_confirm(signer, &vault_id, &tx_id),
                Err(Ok(VaultError::AlreadyConfirmed))
            );
            prop_assert!(!harness.host.get_transaction(&vault_id, &tx_id).executed);
        }
    }
}
