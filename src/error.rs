//! Error type shared by every registry operation.
//!
//! Validation and precheck failures are raised before any network write.
//! Transport failures coming out of alloy are classified by [`classify_rpc_error`]
//! so that revert reasons survive as text and wallet refusals stay distinct
//! from plain network trouble.

use alloy::rpc::json_rpc::ErrorPayload;
use alloy::transports::{RpcError, TransportErrorKind};
use alloy_primitives::TxHash;
use thiserror::Error;

/// EIP-1193 error code for "user rejected the request".
pub const USER_REJECTED_CODE: i64 = 4001;

/// JSON-RPC error code most nodes use for reverted execution.
const EXECUTION_REVERTED_CODE: i64 = 3;

pub type Result<T, E = RegistryError> = std::result::Result<T, E>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no wallet is available to sign transactions")]
    NoWallet,

    #[error("the request was rejected in the wallet")]
    UserRejected,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid hash: {0}")]
    InvalidHash(String),

    #[error("address {0} is not registered")]
    NotRegistered(String),

    #[error("no contract function matches `{wanted}` (available: {})", available.join(", "))]
    NotFound {
        wanted: String,
        available: Vec<String>,
    },

    #[error("contract reverted: {reason}")]
    ContractRevert { reason: String },

    #[error("transaction {tx_hash} was mined but reverted")]
    Reverted { tx_hash: TxHash },

    #[error("network failure: {0}")]
    NetworkFailure(String),

    #[error("transaction {tx_hash} was not confirmed: {reason}")]
    Unconfirmed { tx_hash: TxHash, reason: String },

    #[error("abi error: {0}")]
    Abi(String),
}

impl RegistryError {
    /// The raw revert reason, if this error carries one.
    pub fn revert_reason(&self) -> Option<&str> {
        match self {
            RegistryError::ContractRevert { reason } => Some(reason),
            _ => None,
        }
    }
}

impl From<alloy::dyn_abi::Error> for RegistryError {
    fn from(err: alloy::dyn_abi::Error) -> Self {
        RegistryError::Abi(err.to_string())
    }
}

impl From<RpcError<TransportErrorKind>> for RegistryError {
    fn from(err: RpcError<TransportErrorKind>) -> Self {
        classify_rpc_error(err)
    }
}

/// Sort an alloy transport error into the registry taxonomy.
pub fn classify_rpc_error(err: RpcError<TransportErrorKind>) -> RegistryError {
    match err {
        RpcError::ErrorResp(payload) => classify_error_payload(&payload),
        other => RegistryError::NetworkFailure(other.to_string()),
    }
}

fn classify_error_payload(payload: &ErrorPayload) -> RegistryError {
    if payload.code == USER_REJECTED_CODE {
        return RegistryError::UserRejected;
    }

    if let Some(data) = payload.as_revert_data() {
        if let Some(reason) = alloy_sol_types::decode_revert_reason(&data) {
            return RegistryError::ContractRevert {
                reason: strip_revert_prefix(&reason),
            };
        }
    }

    let message = payload.message.to_string();
    if payload.code == EXECUTION_REVERTED_CODE || message.contains("execution reverted") {
        return RegistryError::ContractRevert {
            reason: strip_revert_prefix(&message),
        };
    }

    RegistryError::NetworkFailure(format!("{} (code {})", message, payload.code))
}

/// Nodes report `execution reverted: <reason>`, the decoder reports
/// `revert: <reason>`. Both collapse to the bare reason when one is present.
fn strip_revert_prefix(message: &str) -> String {
    for prefix in ["execution reverted: ", "revert: "] {
        if let Some(reason) = message.strip_prefix(prefix) {
            if !reason.is_empty() {
                return reason.to_string();
            }
        }
    }
    message.to_string()
}
