//! Mapping logical operations onto the functions a contract actually exposes.
//!
//! Deployed registries drift: a later contract version may rename
//! `registerAssetWithHash` to `registerAssetAndHash`. Resolution always tries
//! the exact name first, then falls back to the first function, in
//! declaration order, whose lower-cased name contains every keyword of the
//! wanted name. A read operation only falls back to `view`/`pure` functions
//! and a write only to state-changing ones. Fallback picks are flagged as
//! substitutions.

use crate::error::{RegistryError, Result};
use crate::interface::InterfaceDescriptor;
use alloy::json_abi::{Function, StateMutability};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Words that connect the meaningful parts of a function name.
const CONNECTIVES: [&str; 8] = ["with", "and", "by", "of", "to", "for", "get", "set"];

/// The logical operations this client knows how to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operation {
    Number,
    Increment,
    RegisterUser,
    GetUser,
    RegisterAddress,
    IsRegistered,
    GetCount,
    GetAddressByIndex,
    GetAsset,
    RegisterAssetWithHash,
    GetAssetWithHash,
}

impl Operation {
    pub const ALL: [Operation; 11] = [
        Operation::Number,
        Operation::Increment,
        Operation::RegisterUser,
        Operation::GetUser,
        Operation::RegisterAddress,
        Operation::IsRegistered,
        Operation::GetCount,
        Operation::GetAddressByIndex,
        Operation::GetAsset,
        Operation::RegisterAssetWithHash,
        Operation::GetAssetWithHash,
    ];

    /// The function name the client expects the contract to use.
    pub fn function_name(&self) -> &'static str {
        match self {
            Operation::Number => "number",
            Operation::Increment => "increment",
            Operation::RegisterUser => "registerUser",
            Operation::GetUser => "getUser",
            Operation::RegisterAddress => "registerAddress",
            Operation::IsRegistered => "isRegistered",
            Operation::GetCount => "getCount",
            Operation::GetAddressByIndex => "getAddressByIndex",
            Operation::GetAsset => "getAsset",
            Operation::RegisterAssetWithHash => "registerAssetWithHash",
            Operation::GetAssetWithHash => "getAssetWithHash",
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Operation::Number
            | Operation::GetUser
            | Operation::IsRegistered
            | Operation::GetCount
            | Operation::GetAddressByIndex
            | Operation::GetAsset
            | Operation::GetAssetWithHash => Access::Read,
            Operation::Increment
            | Operation::RegisterUser
            | Operation::RegisterAddress
            | Operation::RegisterAssetWithHash => Access::Write,
        }
    }

    /// Whether keyword fallback may stand in for a missing exact match.
    ///
    /// Only the hash registration and its read-back have drifted between
    /// contract versions; a fuzzy match for `number` would be nonsense.
    pub fn allows_substitution(&self) -> bool {
        matches!(
            self,
            Operation::RegisterAssetWithHash | Operation::GetAssetWithHash
        )
    }
}

/// Whether an operation only reads contract state or changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl Access {
    /// Reads bind to `view`/`pure` functions, writes to `nonpayable`/`payable`.
    pub fn admits(&self, function: &Function) -> bool {
        let reads = matches!(
            function.state_mutability,
            StateMutability::View | StateMutability::Pure
        );
        match self {
            Access::Read => reads,
            Access::Write => !reads,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.function_name())
    }
}

/// Split a camelCase or snake_case name into its lower-cased keywords,
/// dropping connective words.
///
/// `registerAssetWithHash` gives `["register", "asset", "hash"]`.
pub fn keyword_tokens(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    for c in name.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_ascii_uppercase() && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(c.to_ascii_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }

    words.retain(|w| !CONNECTIVES.contains(&w.as_str()));
    words
}

/// The outcome of resolving one wanted name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub wanted: String,
    pub function: Function,
    /// Set when the function was found by keyword rather than by name.
    pub substituted: bool,
}

impl Resolution {
    pub fn name(&self) -> &str {
        &self.function.name
    }
}

/// Find the function called `wanted`, or the first keyword match.
///
/// An exact name match always wins, even if keyword matches are declared
/// earlier. When nothing matches the error lists every available name.
pub fn resolve(wanted: &str, functions: &[Function]) -> Result<Resolution> {
    resolve_with(wanted, functions, Fallback::Any)
}

/// Which functions keyword fallback may pick.
#[derive(Clone, Copy)]
enum Fallback {
    None,
    Any,
    Only(Access),
}

fn resolve_with(wanted: &str, functions: &[Function], fallback: Fallback) -> Result<Resolution> {
    if let Some(function) = functions.iter().find(|f| f.name == wanted) {
        return Ok(Resolution {
            wanted: wanted.to_string(),
            function: function.clone(),
            substituted: false,
        });
    }

    let tokens = keyword_tokens(wanted);
    let admitted = |f: &Function| match fallback {
        Fallback::None => false,
        Fallback::Any => true,
        Fallback::Only(access) => access.admits(f),
    };
    if !tokens.is_empty() {
        let candidates: Vec<&Function> = functions
            .iter()
            .filter(|f| admitted(*f))
            .filter(|f| {
                let name = f.name.to_lowercase();
                tokens.iter().all(|token| name.contains(token.as_str()))
            })
            .collect();

        if let Some(first) = candidates.first() {
            warn!(
                wanted,
                substitute = %first.name,
                candidates = candidates.len(),
                "contract function not found by name, using keyword match"
            );
            return Ok(Resolution {
                wanted: wanted.to_string(),
                function: (*first).clone(),
                substituted: true,
            });
        }
    }

    Err(RegistryError::NotFound {
        wanted: wanted.to_string(),
        available: functions.iter().map(|f| f.name.clone()).collect(),
    })
}

/// Every logical operation resolved once against one contract interface.
#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    resolved: BTreeMap<Operation, Resolution>,
    missing: BTreeMap<Operation, RegistryError>,
}

impl FunctionRegistry {
    pub fn from_interface(interface: &InterfaceDescriptor) -> Self {
        let mut resolved = BTreeMap::new();
        let mut missing = BTreeMap::new();

        for op in Operation::ALL {
            let fallback = if op.allows_substitution() {
                Fallback::Only(op.access())
            } else {
                Fallback::None
            };
            match resolve_with(op.function_name(), interface.functions(), fallback) {
                Ok(resolution) => {
                    resolved.insert(op, resolution);
                }
                Err(e) => {
                    missing.insert(op, e);
                }
            }
        }

        Self { resolved, missing }
    }

    /// The resolution for `op`, or the `NotFound` error recorded for it.
    pub fn get(&self, op: Operation) -> Result<&Resolution> {
        match self.resolved.get(&op) {
            Some(resolution) => Ok(resolution),
            None => Err(self.missing.get(&op).cloned().unwrap_or_else(|| {
                RegistryError::NotFound {
                    wanted: op.function_name().to_string(),
                    available: Vec::new(),
                }
            })),
        }
    }

    pub fn function(&self, op: Operation) -> Result<&Function> {
        self.get(op).map(|r| &r.function)
    }

    /// Operations that resolved by keyword instead of by name.
    pub fn substitutions(&self) -> Vec<(Operation, &str)> {
        self.resolved
            .iter()
            .filter(|(_, r)| r.substituted)
            .map(|(op, r)| (*op, r.name()))
            .collect()
    }

    pub fn missing(&self) -> Vec<Operation> {
        self.missing.keys().copied().collect()
    }
}
