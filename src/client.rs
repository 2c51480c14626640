//! The registry client context.
//!
//! A [`RegistryClient`] is built once from a [`ClientConfig`] (or directly
//! from an endpoint) and passed to whatever needs it. It holds the read-only
//! endpoint; transactions bind a signer per call through the wallet
//! injection handed in by the caller.

use crate::address::parse_address;
use crate::amount::AssetAmount;
use crate::config::{ClientConfig, ConfigError};
use crate::endpoint::{ContractEndpoint, ReadEndpoint, TransactionSigner, TxReceipt};
use crate::error::{RegistryError, Result};
use crate::hash::{self, hash_from_value};
use crate::pipeline;
use crate::precheck;
use crate::resolver::Operation;
use crate::rpc::HttpEndpoint;
use crate::signer::{resolve_signer, WalletInjection};
use alloy::dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

/// Asset and hash recorded for one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetWithHash {
    pub asset: U256,
    /// `0x` hex when the contract stores bytes, verbatim when it stores a string.
    pub hash: String,
}

#[derive(Debug, Clone)]
pub struct RegistryClient<R> {
    endpoint: ContractEndpoint<R>,
}

impl RegistryClient<HttpEndpoint> {
    /// Build a client over HTTP. No request is made until the first call.
    pub fn connect(config: &ClientConfig) -> std::result::Result<Self, ConfigError> {
        let interface = config.load_interface()?;
        let endpoint = ContractEndpoint::new(
            config.contract_address,
            &interface,
            HttpEndpoint::connect_http(config.provider_url.clone()),
        );
        info!(
            contract = %config.contract_address,
            provider = %config.provider_url,
            chain_id = ?config.chain_id,
            "registry client ready"
        );
        Ok(Self::new(endpoint))
    }
}

impl<R: ReadEndpoint> RegistryClient<R> {
    pub fn new(endpoint: ContractEndpoint<R>) -> Self {
        let registry = endpoint.registry();
        for (op, name) in registry.substitutions() {
            warn!(operation = %op, function = name, "operation bound by keyword match");
        }
        let missing = registry.missing();
        if !missing.is_empty() {
            warn!(?missing, "contract does not expose every operation");
        }
        Self { endpoint }
    }

    pub fn endpoint(&self) -> &ContractEndpoint<R> {
        &self.endpoint
    }

    pub fn contract_address(&self) -> Address {
        self.endpoint.address()
    }

    /// Register `amount` together with a content hash for the wallet's account.
    ///
    /// Inputs are validated and the register function resolved before the
    /// wallet is asked for anything. The caller must already be registered;
    /// existing asset and hash values are only reported.
    pub async fn register_asset_with_hash<W>(
        &self,
        wallet: Option<&W>,
        amount: &Value,
        hash_input: &Value,
    ) -> Result<TxReceipt>
    where
        W: WalletInjection + ?Sized,
    {
        let amount = AssetAmount::from_json(amount)?;
        let hash = hash::encode(hash_input)?;
        let function = self.endpoint.function(Operation::RegisterAssetWithHash)?;

        let signer = resolve_signer(wallet).await?;
        let caller = signer.address();
        let endpoint = self.endpoint.with_backend(signer);

        let report = precheck::run(&endpoint, caller).await?;

        info!(
            address = %caller,
            function = %function.name,
            %amount,
            hash = %hash.as_string,
            derived = hash.derived,
            warnings = report.warnings.len(),
            "registering asset with hash"
        );

        pipeline::submit(&endpoint, function, &amount, &hash).await
    }

    pub async fn get_asset_with_hash(&self, address: &str) -> Result<AssetWithHash> {
        let address = parse_address(address)?;
        let out = self
            .endpoint
            .read(Operation::GetAssetWithHash, &[DynSolValue::Address(address)])
            .await?;

        let asset = out.first().and_then(DynSolValue::as_uint).map(|(v, _)| v);
        let hash = out.get(1).and_then(hash_from_value);
        match (asset, hash) {
            (Some(asset), Some(hash)) => Ok(AssetWithHash { asset, hash }),
            _ => Err(RegistryError::Abi(format!(
                "unexpected getAssetWithHash result: {out:?}"
            ))),
        }
    }

    pub async fn number(&self) -> Result<U256> {
        let value = self.read_one(Operation::Number, &[]).await?;
        expect_uint(Operation::Number, &value)
    }

    pub async fn increment<W>(&self, wallet: Option<&W>) -> Result<TxReceipt>
    where
        W: WalletInjection + ?Sized,
    {
        self.transact(wallet, Operation::Increment, &[]).await
    }

    pub async fn register_user<W>(&self, wallet: Option<&W>, name: &str) -> Result<TxReceipt>
    where
        W: WalletInjection + ?Sized,
    {
        if name.trim().is_empty() {
            return Err(RegistryError::InvalidInput("user name is empty".to_string()));
        }
        self.transact(
            wallet,
            Operation::RegisterUser,
            &[DynSolValue::String(name.to_string())],
        )
        .await
    }

    pub async fn get_user(&self, address: &str) -> Result<String> {
        let address = parse_address(address)?;
        let value = self
            .read_one(Operation::GetUser, &[DynSolValue::Address(address)])
            .await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| unexpected(Operation::GetUser, &value))
    }

    pub async fn register_address<W>(&self, wallet: Option<&W>) -> Result<TxReceipt>
    where
        W: WalletInjection + ?Sized,
    {
        self.transact(wallet, Operation::RegisterAddress, &[]).await
    }

    pub async fn is_registered(&self, address: &str) -> Result<bool> {
        let address = parse_address(address)?;
        let value = self
            .read_one(Operation::IsRegistered, &[DynSolValue::Address(address)])
            .await?;
        value
            .as_bool()
            .ok_or_else(|| unexpected(Operation::IsRegistered, &value))
    }

    pub async fn get_count(&self) -> Result<U256> {
        let value = self.read_one(Operation::GetCount, &[]).await?;
        expect_uint(Operation::GetCount, &value)
    }

    pub async fn get_address_by_index(&self, index: U256) -> Result<Address> {
        let value = self
            .read_one(Operation::GetAddressByIndex, &[DynSolValue::Uint(index, 256)])
            .await?;
        value
            .as_address()
            .ok_or_else(|| unexpected(Operation::GetAddressByIndex, &value))
    }

    async fn read_one(&self, op: Operation, args: &[DynSolValue]) -> Result<DynSolValue> {
        self.endpoint
            .read(op, args)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RegistryError::Abi(format!("{op} returned nothing")))
    }

    async fn transact<W>(
        &self,
        wallet: Option<&W>,
        op: Operation,
        args: &[DynSolValue],
    ) -> Result<TxReceipt>
    where
        W: WalletInjection + ?Sized,
    {
        // fail before asking the wallet when the contract lacks the function
        self.endpoint.function(op)?;
        let signer = resolve_signer(wallet).await?;
        self.endpoint.with_backend(signer).transact(op, args).await
    }
}

fn expect_uint(op: Operation, value: &DynSolValue) -> Result<U256> {
    value
        .as_uint()
        .map(|(v, _)| v)
        .ok_or_else(|| unexpected(op, value))
}

fn unexpected(op: Operation, value: &DynSolValue) -> RegistryError {
    RegistryError::Abi(format!("unexpected {op} result: {value:?}"))
}
