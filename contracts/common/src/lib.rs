//! Shared types for the Tozmium custody contract suite.
//!
//! This crate provides:
//! - [`AssetKind`] / [`AssetDescriptor`] — typed references to the asset a
//!   transfer concerns.
//! - [`AssetGateway`] — the transfer-execution interface vault instances
//!   invoke once a transaction reaches quorum, plus its generated
//!   cross-contract client [`AssetGatewayClient`].

#![no_std]

pub mod asset;
pub mod gateway;
#[cfg(any(test, feature = "testutils"))]
pub mod testutils;

pub use asset::{AssetDescriptor, AssetKind};
pub use gateway::{AssetGateway, AssetGatewayClient};
