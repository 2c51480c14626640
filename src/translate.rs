//! Bounded, user-facing outcomes for registry failures.

use crate::error::RegistryError;
use std::fmt;

/// Revert reason of a second `registerAddress` for the same account.
pub const ALREADY_REGISTERED_REASON: &str = "Address already registered";

/// Revert reason of a write from an account that never registered.
pub const SENDER_NOT_REGISTERED_REASON: &str = "Sender is not a registered address";

/// Substrings that mark a revert reason as a generic execution failure.
const FAILURE_KEYWORDS: [&str; 2] = ["revert", "fail"];

/// What a failed operation means to the person who started it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    AlreadyRegistered,
    SenderNotRegistered,
    ContractExecution { reason: String },
    NotRegistered { address: String },
    NoWallet,
    UserRejected,
    InvalidInput { message: String },
    FunctionNotFound { wanted: String, available: Vec<String> },
    Generic { message: String },
}

impl Outcome {
    pub fn message(&self) -> String {
        match self {
            Outcome::AlreadyRegistered => "This address is already registered.".to_string(),
            Outcome::SenderNotRegistered => {
                "Your address must be registered before it can register assets.".to_string()
            }
            Outcome::ContractExecution { reason } => {
                format!("The contract rejected the transaction: {reason}")
            }
            Outcome::NotRegistered { address } => {
                format!("Address {address} is not registered. Register the address first.")
            }
            Outcome::NoWallet => "No wallet found. Connect a wallet to continue.".to_string(),
            Outcome::UserRejected => "The request was rejected in the wallet.".to_string(),
            Outcome::InvalidInput { message } => format!("Invalid input: {message}"),
            Outcome::FunctionNotFound { wanted, available } => format!(
                "The contract has no function matching {wanted}. Available: {}",
                available.join(", ")
            ),
            Outcome::Generic { message } => format!("The operation failed: {message}"),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Classify `err` into an [`Outcome`].
pub fn translate(err: &RegistryError) -> Outcome {
    match err {
        RegistryError::ContractRevert { reason } => translate_reason(reason),
        RegistryError::NotRegistered(address) => Outcome::NotRegistered {
            address: address.clone(),
        },
        RegistryError::NoWallet => Outcome::NoWallet,
        RegistryError::UserRejected => Outcome::UserRejected,
        RegistryError::InvalidInput(message) | RegistryError::InvalidHash(message) => {
            Outcome::InvalidInput {
                message: message.clone(),
            }
        }
        RegistryError::NotFound { wanted, available } => Outcome::FunctionNotFound {
            wanted: wanted.clone(),
            available: available.clone(),
        },
        other => Outcome::Generic {
            message: other.to_string(),
        },
    }
}

fn translate_reason(reason: &str) -> Outcome {
    let reason = reason.trim();
    if reason == ALREADY_REGISTERED_REASON {
        return Outcome::AlreadyRegistered;
    }
    if reason == SENDER_NOT_REGISTERED_REASON {
        return Outcome::SenderNotRegistered;
    }

    let lowered = reason.to_lowercase();
    if FAILURE_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        return Outcome::ContractExecution {
            reason: reason.to_string(),
        };
    }

    Outcome::Generic {
        message: format!("contract reverted: {reason}"),
    }
}
