use soroban_sdk::{contracttype, Address};

/// The category of asset a transfer concerns.
///
/// Mirrors the wire ordering used by off-chain tooling (0 = native, 1 =
/// fungible, 2 = non-fungible, 3 = semi-fungible, 4 = custom), so the
/// variant order must not be rearranged.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AssetKind {
    /// The chain's native currency; `asset_ref` carries the native asset
    /// contract and `unit_id` is ignored.
    Native,
    /// A fungible token balance identified by `asset_ref` alone.
    Fungible,
    /// A unique token; only `unit_id` matters, quantity is meaningless.
    NonFungible,
    /// A token family where `unit_id` selects the class and quantity the
    /// number of units.
    SemiFungible,
    /// Gateway-defined transfer; interpretation of the remaining fields is
    /// up to the gateway implementation.
    Custom,
}

/// Typed reference identifying which asset kind/unit a transfer concerns.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AssetDescriptor {
    pub kind: AssetKind,
    /// Contract managing the asset (token contract, collection, ...).
    pub asset_ref: Address,
    /// Unit identifier for non-fungible and semi-fungible kinds; zero
    /// otherwise.
    pub unit_id: u64,
}

impl AssetDescriptor {
    /// Whether the quantity field of a transfer is meaningful for this
    /// descriptor. Non-fungible transfers move exactly the unit named by
    /// `unit_id`.
    pub fn carries_quantity(&self) -> bool {
        !matches!(self.kind, AssetKind::NonFungible)
    }
}
