//! Submission of a hash registration.
//!
//! The digest is first offered as a raw byte vector. If the node will not
//! estimate that call, or the byte vector does not fit the parameter type at
//! all, the same digest is offered again as a `0x` hex string. Anything that
//! goes wrong after a successful estimate is final.

use crate::amount::AssetAmount;
use crate::endpoint::{ContractEndpoint, TransactionSigner, TxReceipt};
use crate::error::{RegistryError, Result};
use crate::hash::{EncodedHash, HashEncoding};
use alloy::dyn_abi::{DynSolValue, Specifier};
use alloy::json_abi::Function;
use tracing::{debug, info, warn};

/// Gas limit sent is this many times the estimate.
pub const GAS_LIMIT_MULTIPLIER: u64 = 2;

/// Arguments of `registerAssetWithHash(amount, hash)` for the given encoding,
/// typed against the function's declared parameters.
pub fn registration_args(
    function: &Function,
    amount: &AssetAmount,
    hash: &EncodedHash,
    encoding: HashEncoding,
) -> Result<Vec<DynSolValue>> {
    let [amount_param, hash_param] = function.inputs.as_slice() else {
        return Err(RegistryError::Abi(format!(
            "{} does not take (amount, hash)",
            function.signature()
        )));
    };

    let amount_ty = amount_param.resolve()?;
    let hash_ty = hash_param.resolve()?;

    Ok(vec![
        amount_ty.coerce_str(&amount.to_string())?,
        hash.value_for(encoding, &hash_ty)?,
    ])
}

enum AttemptError {
    /// Encoding or estimation failed; nothing was sent.
    Estimation(RegistryError),
    /// Failed after the transaction left for the network.
    Submission(RegistryError),
}

/// Register `amount` with `hash` through `function`.
///
/// The returned receipt records which encoding landed.
pub async fn submit<S: TransactionSigner>(
    endpoint: &ContractEndpoint<S>,
    function: &Function,
    amount: &AssetAmount,
    hash: &EncodedHash,
) -> Result<TxReceipt> {
    dry_run(endpoint, function, amount, hash).await;

    let primary = match attempt(endpoint, function, amount, hash, HashEncoding::ByteVector).await {
        Ok(receipt) => return Ok(receipt),
        Err(AttemptError::Submission(e)) => return Err(e),
        Err(AttemptError::Estimation(e)) => e,
    };

    warn!(
        function = %function.name,
        error = %primary,
        "byte-vector hash rejected, retrying as hex string"
    );

    match attempt(endpoint, function, amount, hash, HashEncoding::HexString).await {
        Ok(receipt) => Ok(receipt),
        Err(AttemptError::Submission(e)) => Err(e),
        Err(AttemptError::Estimation(fallback)) => {
            warn!(error = %fallback, "hex-string hash rejected as well");
            Err(primary)
        }
    }
}

/// Static call with the byte-vector encoding. The result is only logged.
async fn dry_run<S: TransactionSigner>(
    endpoint: &ContractEndpoint<S>,
    function: &Function,
    amount: &AssetAmount,
    hash: &EncodedHash,
) {
    let args = match registration_args(function, amount, hash, HashEncoding::ByteVector) {
        Ok(args) => args,
        Err(e) => {
            debug!(error = %e, "dry run skipped");
            return;
        }
    };

    match endpoint.simulate(function, &args).await {
        Ok(_) => debug!(function = %function.name, "dry run succeeded"),
        Err(e) => debug!(function = %function.name, error = %e, "dry run failed"),
    }
}

async fn attempt<S: TransactionSigner>(
    endpoint: &ContractEndpoint<S>,
    function: &Function,
    amount: &AssetAmount,
    hash: &EncodedHash,
    encoding: HashEncoding,
) -> std::result::Result<TxReceipt, AttemptError> {
    let args =
        registration_args(function, amount, hash, encoding).map_err(AttemptError::Estimation)?;

    let estimate = endpoint
        .estimate_gas(function, &args)
        .await
        .map_err(AttemptError::Estimation)?;
    let gas_limit = estimate.saturating_mul(GAS_LIMIT_MULTIPLIER);
    info!(%encoding, estimate, gas_limit, "gas estimated");

    let pending = endpoint
        .send(function, &args, gas_limit)
        .await
        .map_err(AttemptError::Submission)?;
    let mut receipt = endpoint
        .confirm(&pending)
        .await
        .map_err(AttemptError::Submission)?;

    receipt.encoding = Some(encoding);
    Ok(receipt)
}
