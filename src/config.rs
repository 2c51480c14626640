//! Client configuration from the environment or a JSON document.

use crate::address::parse_address;
use crate::error::RegistryError;
use crate::interface::InterfaceDescriptor;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

pub const CONTRACT_ADDRESS_ENV: &str = "REGISTRY_CONTRACT_ADDRESS";
pub const PROVIDER_URL_ENV: &str = "REGISTRY_PROVIDER_URL";
pub const CHAIN_ID_ENV: &str = "REGISTRY_CHAIN_ID";
pub const ABI_PATH_ENV: &str = "REGISTRY_ABI_PATH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("invalid contract address {value:?}")]
    InvalidAddress {
        value: String,
        #[source]
        source: RegistryError,
    },
    #[error("invalid provider url {value:?}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid chain id {0:?}")]
    InvalidChainId(String),
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config JSON")]
    Json(#[from] serde_json::Error),
    #[error("failed to load contract interface")]
    Interface(#[source] RegistryError),
}

/// Where the registry lives and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientConfig {
    pub contract_address: Address,
    pub provider_url: Url,
    pub chain_id: Option<u64>,
    /// ABI file to use instead of the bundled interface.
    pub abi_path: Option<PathBuf>,
}

#[derive(Deserialize)]
struct RawConfig {
    contract_address: String,
    provider_url: String,
    #[serde(default)]
    chain_id: Option<u64>,
    #[serde(default)]
    abi_path: Option<PathBuf>,
}

impl ClientConfig {
    pub fn new(contract_address: Address, provider_url: Url) -> Self {
        Self {
            contract_address,
            provider_url,
            chain_id: None,
            abi_path: None,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup using the `REGISTRY_*` variable names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &'static str| lookup(key).filter(|v| !v.trim().is_empty());

        let contract_address = get(CONTRACT_ADDRESS_ENV).ok_or(ConfigError::Missing(CONTRACT_ADDRESS_ENV))?;
        let provider_url = get(PROVIDER_URL_ENV).ok_or(ConfigError::Missing(PROVIDER_URL_ENV))?;
        let chain_id = get(CHAIN_ID_ENV)
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidChainId(raw.clone()))
            })
            .transpose()?;

        Self::build(RawConfig {
            contract_address,
            provider_url,
            chain_id,
            abi_path: get(ABI_PATH_ENV).map(PathBuf::from),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Self::build(serde_json::from_str(json)?)
    }

    fn build(raw: RawConfig) -> Result<Self, ConfigError> {
        let contract_address =
            parse_address(&raw.contract_address).map_err(|source| ConfigError::InvalidAddress {
                value: raw.contract_address.clone(),
                source,
            })?;
        let provider_url =
            Url::parse(raw.provider_url.trim()).map_err(|source| ConfigError::InvalidUrl {
                value: raw.provider_url.clone(),
                source,
            })?;

        Ok(Self {
            contract_address,
            provider_url,
            chain_id: raw.chain_id,
            abi_path: raw.abi_path,
        })
    }

    /// The configured ABI file, or the bundled interface when none is set.
    pub fn load_interface(&self) -> Result<InterfaceDescriptor, ConfigError> {
        let Some(path) = &self.abi_path else {
            return InterfaceDescriptor::bundled().map_err(ConfigError::Interface);
        };
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        InterfaceDescriptor::from_json(&json).map_err(ConfigError::Interface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const CONTRACT: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_from_lookup() {
        let config = ClientConfig::from_lookup(lookup(&[
            (CONTRACT_ADDRESS_ENV, CONTRACT),
            (PROVIDER_URL_ENV, "http://localhost:8545"),
            (CHAIN_ID_ENV, "31337"),
        ]))
        .unwrap();

        assert_eq!(config.contract_address, CONTRACT.parse::<Address>().unwrap());
        assert_eq!(config.provider_url.as_str(), "http://localhost:8545/");
        assert_eq!(config.chain_id, Some(31337));
        assert_eq!(config.abi_path, None);
    }

    #[test]
    fn test_missing_and_invalid_values() {
        let err = ClientConfig::from_lookup(lookup(&[(PROVIDER_URL_ENV, "http://localhost:8545")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(CONTRACT_ADDRESS_ENV)));

        // bad checksum
        let err = ClientConfig::from_lookup(lookup(&[
            (CONTRACT_ADDRESS_ENV, "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAeD"),
            (PROVIDER_URL_ENV, "http://localhost:8545"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAddress { .. }));

        let err = ClientConfig::from_lookup(lookup(&[
            (CONTRACT_ADDRESS_ENV, CONTRACT),
            (PROVIDER_URL_ENV, "not a url"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));

        let err = ClientConfig::from_lookup(lookup(&[
            (CONTRACT_ADDRESS_ENV, CONTRACT),
            (PROVIDER_URL_ENV, "http://localhost:8545"),
            (CHAIN_ID_ENV, "mainnet"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidChainId(_)));
    }

    #[test]
    fn test_from_json() {
        let config = ClientConfig::from_json(&format!(
            r#"{{"contract_address":"{CONTRACT}","provider_url":"https://rpc.example.org"}}"#
        ))
        .unwrap();
        assert_eq!(config.chain_id, None);
        assert_eq!(config.load_interface().unwrap(), InterfaceDescriptor::bundled().unwrap());

        assert!(matches!(
            ClientConfig::from_json("{}"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_missing_abi_file() {
        let mut config = ClientConfig::new(Address::ZERO, "http://localhost:8545".parse().unwrap());
        config.abi_path = Some(PathBuf::from("/nonexistent/AssetRegistry.json"));
        assert!(matches!(config.load_interface(), Err(ConfigError::Io { .. })));
    }
}
