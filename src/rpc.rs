//! alloy-backed implementations of the endpoint seams.
//!
//! [`RpcEndpoint`] answers read-only queries over any alloy provider.
//! [`ProviderSigner`] adds transaction submission for one account; whether
//! the provider signs locally (wallet filler) or lets the node sign
//! (`eth_sendTransaction`) is decided when the provider is built.

use crate::endpoint::{PendingTransaction, ReadEndpoint, TransactionSigner, TxReceipt};
use crate::error::{RegistryError, Result};
use alloy::providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use tracing::debug;
use url::Url;

/// Read-only endpoint over plain HTTP.
pub type HttpEndpoint = RpcEndpoint<DynProvider>;

/// Signer over plain HTTP.
pub type HttpSigner = ProviderSigner<DynProvider>;

/// Read-only access through an alloy provider.
#[derive(Debug, Clone)]
pub struct RpcEndpoint<P> {
    provider: P,
}

impl<P> RpcEndpoint<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl HttpEndpoint {
    /// Connects lazily; no request is made until the first query.
    pub fn connect_http(url: Url) -> Self {
        Self::new(ProviderBuilder::new().connect_http(url).erased())
    }
}

#[async_trait]
impl<P> ReadEndpoint for RpcEndpoint<P>
where
    P: Provider + Send + Sync,
{
    async fn call(&self, contract: Address, calldata: Bytes) -> Result<Bytes> {
        let tx = TransactionRequest::default()
            .to(contract)
            .input(calldata.into());
        Ok(self.provider.call(tx).await?)
    }
}

/// Transaction submission for one account through an alloy provider.
#[derive(Debug, Clone)]
pub struct ProviderSigner<P> {
    provider: P,
    address: Address,
    required_confirmations: u64,
}

impl<P> ProviderSigner<P> {
    pub fn new(provider: P, address: Address) -> Self {
        Self {
            provider,
            address,
            required_confirmations: 1,
        }
    }

    pub fn with_required_confirmations(mut self, confirmations: u64) -> Self {
        self.required_confirmations = confirmations.max(1);
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn request(&self, contract: Address, calldata: Bytes) -> TransactionRequest {
        TransactionRequest::default()
            .from(self.address)
            .to(contract)
            .input(calldata.into())
    }
}

#[async_trait]
impl<P> ReadEndpoint for ProviderSigner<P>
where
    P: Provider + Send + Sync,
{
    async fn call(&self, contract: Address, calldata: Bytes) -> Result<Bytes> {
        let tx = TransactionRequest::default()
            .to(contract)
            .input(calldata.into());
        Ok(self.provider.call(tx).await?)
    }
}

#[async_trait]
impl<P> TransactionSigner for ProviderSigner<P>
where
    P: Provider + Send + Sync,
{
    fn address(&self) -> Address {
        self.address
    }

    async fn simulate(&self, contract: Address, calldata: Bytes) -> Result<Bytes> {
        Ok(self.provider.call(self.request(contract, calldata)).await?)
    }

    async fn estimate_gas(&self, contract: Address, calldata: Bytes) -> Result<u64> {
        Ok(self
            .provider
            .estimate_gas(self.request(contract, calldata))
            .await?)
    }

    async fn send(
        &self,
        contract: Address,
        calldata: Bytes,
        gas_limit: u64,
    ) -> Result<PendingTransaction> {
        let tx = self.request(contract, calldata).gas_limit(gas_limit);
        let pending = self.provider.send_transaction(tx).await?;
        Ok(PendingTransaction {
            hash: *pending.tx_hash(),
            gas_limit,
        })
    }

    async fn confirm(&self, pending: &PendingTransaction) -> Result<TxReceipt> {
        debug!(tx_hash = %pending.hash, "waiting for confirmation");

        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), pending.hash)
            .with_required_confirmations(self.required_confirmations)
            .get_receipt()
            .await
            .map_err(|e| RegistryError::Unconfirmed {
                tx_hash: pending.hash,
                reason: e.to_string(),
            })?;

        if !receipt.status() {
            return Err(RegistryError::Reverted {
                tx_hash: receipt.transaction_hash,
            });
        }

        Ok(TxReceipt {
            hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            gas_limit: pending.gas_limit,
            encoding: None,
        })
    }
}
