use crate::error::{RegistryError, Result};
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A non-negative integer quantity of the registered asset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetAmount(U256);

impl AssetAmount {
    pub const ZERO: AssetAmount = AssetAmount(U256::ZERO);

    pub fn new(value: U256) -> Self {
        Self(value)
    }

    pub fn value(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Parse from a string like "1000", " 42 " or "0x3e8".
    pub fn from_string(amount_str: &str) -> Result<Self> {
        let trimmed = amount_str.trim();

        if trimmed.is_empty() {
            return Err(RegistryError::InvalidInput("empty amount".to_string()));
        }

        let parsed = if let Some(hex) = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            if hex.is_empty() {
                return Err(RegistryError::InvalidInput(format!(
                    "invalid amount: {amount_str:?}"
                )));
            }
            U256::from_str_radix(hex, 16)
        } else {
            if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
                return Err(RegistryError::InvalidInput(format!(
                    "amount must be a non-negative integer: {amount_str:?}"
                )));
            }
            U256::from_str_radix(trimmed, 10)
        };

        parsed
            .map(Self)
            .map_err(|e| RegistryError::InvalidInput(format!("invalid amount {amount_str:?}: {e}")))
    }

    /// Parse from whatever JSON value the caller supplied.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Self::from_string(s),
            Value::Number(n) => {
                if let Some(v) = n.as_u64() {
                    Ok(Self(U256::from(v)))
                } else if n.is_i64() {
                    Err(RegistryError::InvalidInput(format!(
                        "amount must be non-negative: {n}"
                    )))
                } else {
                    Err(RegistryError::InvalidInput(format!(
                        "amount must be an integer: {n}"
                    )))
                }
            }
            other => Err(RegistryError::InvalidInput(format!(
                "amount must be a number or string, got {other}"
            ))),
        }
    }
}

impl FromStr for AssetAmount {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_string(s)
    }
}

impl From<u64> for AssetAmount {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl From<U256> for AssetAmount {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl fmt::Display for AssetAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_string() {
        assert_eq!(AssetAmount::from_string("1000").unwrap(), AssetAmount::from(1000));
        assert_eq!(AssetAmount::from_string(" 42 ").unwrap(), AssetAmount::from(42));
        assert_eq!(AssetAmount::from_string("0x3e8").unwrap(), AssetAmount::from(1000));
        assert_eq!(AssetAmount::from_string("0").unwrap(), AssetAmount::ZERO);
    }

    #[test]
    fn test_rejects_non_integers() {
        for bad in ["", "  ", "-5", "1.5", "1e3", "ten", "0x", "0xzz", "+7"] {
            assert!(
                matches!(AssetAmount::from_string(bad), Err(RegistryError::InvalidInput(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_rejects_overflow() {
        let too_big = format!("1{}", "0".repeat(78));
        assert!(AssetAmount::from_string(&too_big).is_err());
    }

    #[test]
    fn test_from_json() {
        assert_eq!(AssetAmount::from_json(&json!(500)).unwrap(), AssetAmount::from(500));
        assert_eq!(AssetAmount::from_json(&json!("500")).unwrap(), AssetAmount::from(500));
        assert!(AssetAmount::from_json(&json!(-1)).is_err());
        assert!(AssetAmount::from_json(&json!(2.5)).is_err());
        assert!(AssetAmount::from_json(&json!(null)).is_err());
        assert!(AssetAmount::from_json(&json!([1])).is_err());
    }
}
