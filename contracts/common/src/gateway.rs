use soroban_sdk::{contractclient, Address, Bytes, Env};

use crate::asset::AssetKind;

/// Interface of the asset-transfer gateway a vault instance invokes when a
/// transaction crosses its confirmation threshold.
///
/// The gateway performs the actual movement of value (native amount, token
/// balance, or token unit) to `destination` and reports success. The vault
/// guarantees it calls `transfer` at most once per executed transaction
/// record; a `false` return (or a trapped sub-call) leaves the record
/// unexecuted so the transfer can be retried after remediation.
#[contractclient(name = "AssetGatewayClient")]
pub trait AssetGateway {
    /// Move `quantity` of the described asset (or the unit named by
    /// `unit_id` for non-fungible kinds) to `destination`.
    ///
    /// `payload` is the opaque data recorded with the transaction; gateways
    /// for [`AssetKind::Custom`] may interpret it, all others ignore it.
    fn transfer(
        env: Env,
        destination: Address,
        kind: AssetKind,
        asset_ref: Address,
        unit_id: u64,
        quantity: i128,
        payload: Bytes,
    ) -> bool;
}
