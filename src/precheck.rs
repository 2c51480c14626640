//! Read-only eligibility check run before a hash registration.

use crate::endpoint::{ContractEndpoint, ReadEndpoint};
use crate::error::{RegistryError, Result};
use crate::hash::hash_from_value;
use crate::resolver::Operation;
use alloy::dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256};
use std::fmt;
use tracing::{debug, warn};

/// Something worth telling the caller that does not block registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrecheckWarning {
    /// The address already holds an asset; a new registration adds to it.
    ExistingAsset(U256),
    AssetUnavailable(String),
    HashUnavailable(String),
}

impl fmt::Display for PrecheckWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrecheckWarning::ExistingAsset(asset) => {
                write!(f, "address already holds asset {asset}, amounts will accumulate")
            }
            PrecheckWarning::AssetUnavailable(reason) => {
                write!(f, "current asset could not be read: {reason}")
            }
            PrecheckWarning::HashUnavailable(reason) => {
                write!(f, "current hash could not be read: {reason}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecheckReport {
    pub address: Address,
    pub existing_asset: Option<U256>,
    pub existing_hash: Option<String>,
    pub warnings: Vec<PrecheckWarning>,
}

/// Check the registration state of `caller`.
///
/// Only an unregistered caller is fatal. Reading the current asset and hash
/// is best-effort and failures come back as warnings.
pub async fn run<B: ReadEndpoint>(
    endpoint: &ContractEndpoint<B>,
    caller: Address,
) -> Result<PrecheckReport> {
    let account = [DynSolValue::Address(caller)];

    let registered = endpoint.read(Operation::IsRegistered, &account).await?;
    if !matches!(registered.first(), Some(DynSolValue::Bool(true))) {
        return Err(RegistryError::NotRegistered(caller.to_checksum(None)));
    }

    let mut report = PrecheckReport {
        address: caller,
        existing_asset: None,
        existing_hash: None,
        warnings: Vec::new(),
    };

    match endpoint.read(Operation::GetAsset, &account).await {
        Ok(out) => match out.first().and_then(DynSolValue::as_uint) {
            Some((asset, _)) => {
                report.existing_asset = Some(asset);
                if !asset.is_zero() {
                    report.warnings.push(PrecheckWarning::ExistingAsset(asset));
                }
            }
            None => report.warnings.push(PrecheckWarning::AssetUnavailable(
                "unexpected return value".to_string(),
            )),
        },
        Err(e) => report
            .warnings
            .push(PrecheckWarning::AssetUnavailable(e.to_string())),
    }

    match endpoint.read(Operation::GetAssetWithHash, &account).await {
        Ok(out) => match out.get(1).and_then(hash_from_value) {
            Some(hash) => report.existing_hash = Some(hash),
            None => report.warnings.push(PrecheckWarning::HashUnavailable(
                "no hash in result".to_string(),
            )),
        },
        Err(e) => report
            .warnings
            .push(PrecheckWarning::HashUnavailable(e.to_string())),
    }

    for warning in &report.warnings {
        warn!(address = %caller, "{warning}");
    }
    debug!(
        address = %caller,
        asset = ?report.existing_asset,
        hash = ?report.existing_hash,
        "precheck passed"
    );

    Ok(report)
}
