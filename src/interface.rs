use crate::error::{RegistryError, Result};
use alloy::json_abi::Function;
use serde_json::Value;

/// ABI of the registry contract shipped with the client, in the artifact
/// layout compilers emit (`{ "abi": [...] }`).
pub const BUNDLED_ABI: &str = include_str!("../abi/AssetRegistry.json");

/// The callable surface of a contract, kept in declaration order.
///
/// `alloy`'s `JsonAbi` groups functions by name in a sorted map, which loses
/// the order entries were declared in. Keyword fallback in
/// [`crate::resolver`] picks the first declared match, so the order matters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceDescriptor {
    functions: Vec<Function>,
}

impl InterfaceDescriptor {
    pub fn new(functions: Vec<Function>) -> Self {
        Self { functions }
    }

    /// The interface compiled into the crate.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_ABI)
    }

    /// Parse either a bare ABI array or an artifact object with an `abi` key.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| RegistryError::Abi(format!("interface is not valid JSON: {e}")))?;

        let items = match value {
            Value::Array(_) => value,
            Value::Object(mut artifact) => artifact.remove("abi").ok_or_else(|| {
                RegistryError::Abi("interface object has no `abi` field".to_string())
            })?,
            other => {
                return Err(RegistryError::Abi(format!(
                    "interface must be an array or artifact object, got {other}"
                )))
            }
        };

        let Value::Array(items) = items else {
            return Err(RegistryError::Abi("`abi` must be an array".to_string()));
        };

        let mut functions = Vec::new();
        for item in items {
            // entries without a type are functions
            let is_function = match item.get("type") {
                None => true,
                Some(kind) => kind == "function",
            };
            if !is_function {
                continue;
            }
            let function: Function = serde_json::from_value(item)
                .map_err(|e| RegistryError::Abi(format!("malformed ABI function: {e}")))?;
            functions.push(function);
        }

        Ok(Self { functions })
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn get(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.functions.iter().map(|f| f.name.clone()).collect()
    }
}
