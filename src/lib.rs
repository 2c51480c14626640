//! Client for an on-chain asset registry.
//!
//! The registry contract records, per address, whether the address is
//! registered, an accumulated asset amount and a 32-byte content hash. This
//! crate registers an amount together with a hash on behalf of a wallet
//! account, and exposes the contract's simpler read and write calls.
//!
//! Deployed registries differ in small ways: the hash parameter may be
//! `bytes32`, `bytes` or `string`, and the registration function may have
//! been renamed. [`RegistryClient::register_asset_with_hash`] resolves the
//! function by name or keyword, checks that the caller is registered with
//! read-only calls, then submits with a byte-vector hash and falls back to a
//! hex-string hash if the node refuses to estimate the first.
//!
//! Failures are [`RegistryError`]s. [`translate::translate`] maps them to a
//! bounded set of user-facing [`translate::Outcome`]s and [`report::notify`]
//! logs them for callers that only want a value or nothing.

pub mod address;
pub mod amount;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod hash;
pub mod interface;
#[cfg(feature = "logging")]
pub mod logging;
pub mod pipeline;
pub mod precheck;
pub mod report;
pub mod resolver;
pub mod rpc;
pub mod signer;
pub mod translate;

#[cfg(test)]
mod test_utils;

pub use address::{parse_address, valid_address};
pub use amount::AssetAmount;
pub use client::{AssetWithHash, RegistryClient};
pub use config::{ClientConfig, ConfigError};
pub use endpoint::{ContractEndpoint, PendingTransaction, ReadEndpoint, TransactionSigner, TxReceipt};
pub use error::{RegistryError, Result};
pub use hash::{content_hash, EncodedHash, HashEncoding};
pub use interface::InterfaceDescriptor;
pub use resolver::{FunctionRegistry, Operation};
pub use rpc::{HttpEndpoint, HttpSigner, ProviderSigner, RpcEndpoint};
pub use signer::{resolve_signer, LocalKeyWallet, NodeAccountWallet, WalletInjection};
pub use translate::{translate, Outcome};

/// Re-exported so callers can build providers and values without pinning
/// their own alloy version.
pub use alloy;
