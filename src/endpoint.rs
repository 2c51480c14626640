//! A typed binding to a deployed contract.
//!
//! [`ContractEndpoint`] pairs a contract address and its resolved interface
//! with a backend. With a [`ReadEndpoint`] backend it can only query; with a
//! [`TransactionSigner`] backend it can also simulate, estimate, send and
//! confirm transactions on behalf of the signer's account.

use crate::error::{RegistryError, Result};
use crate::hash::HashEncoding;
use crate::interface::InterfaceDescriptor;
use crate::resolver::{FunctionRegistry, Operation};
use alloy::dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy::json_abi::Function;
use alloy_primitives::{Address, Bytes, TxHash};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Read-only access to contract state.
#[async_trait]
pub trait ReadEndpoint: Send + Sync {
    /// Execute `eth_call` against `contract` with `calldata`.
    async fn call(&self, contract: Address, calldata: Bytes) -> Result<Bytes>;
}

/// An authorizing account able to submit state-changing calls.
///
/// Extends [`ReadEndpoint`] so a signer-bound endpoint can still query.
#[async_trait]
pub trait TransactionSigner: ReadEndpoint {
    /// The account this signer submits from.
    fn address(&self) -> Address;

    /// `eth_call` from the signer's account, reporting whether the call would
    /// succeed without committing anything.
    async fn simulate(&self, contract: Address, calldata: Bytes) -> Result<Bytes>;

    async fn estimate_gas(&self, contract: Address, calldata: Bytes) -> Result<u64>;

    /// Submit the transaction and return as soon as the node accepts it.
    async fn send(
        &self,
        contract: Address,
        calldata: Bytes,
        gas_limit: u64,
    ) -> Result<PendingTransaction>;

    /// Wait until `pending` is mined. There is no timeout.
    async fn confirm(&self, pending: &PendingTransaction) -> Result<TxReceipt>;
}

#[async_trait]
impl<T: ReadEndpoint + ?Sized> ReadEndpoint for Arc<T> {
    async fn call(&self, contract: Address, calldata: Bytes) -> Result<Bytes> {
        (**self).call(contract, calldata).await
    }
}

#[async_trait]
impl<T: TransactionSigner + ?Sized> TransactionSigner for Arc<T> {
    fn address(&self) -> Address {
        (**self).address()
    }

    async fn simulate(&self, contract: Address, calldata: Bytes) -> Result<Bytes> {
        (**self).simulate(contract, calldata).await
    }

    async fn estimate_gas(&self, contract: Address, calldata: Bytes) -> Result<u64> {
        (**self).estimate_gas(contract, calldata).await
    }

    async fn send(
        &self,
        contract: Address,
        calldata: Bytes,
        gas_limit: u64,
    ) -> Result<PendingTransaction> {
        (**self).send(contract, calldata, gas_limit).await
    }

    async fn confirm(&self, pending: &PendingTransaction) -> Result<TxReceipt> {
        (**self).confirm(pending).await
    }
}

/// A submitted transaction that has not been observed as mined yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction {
    pub hash: TxHash,
    pub gas_limit: u64,
}

/// Transaction receipt returned after confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// Transaction hash
    pub hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    /// The limit the transaction was sent with
    pub gas_limit: u64,
    /// Which hash encoding landed, for hash registrations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<HashEncoding>,
}

/// A contract address bound to its resolved interface and a backend.
#[derive(Debug, Clone)]
pub struct ContractEndpoint<B> {
    address: Address,
    registry: Arc<FunctionRegistry>,
    backend: B,
}

impl<B> ContractEndpoint<B> {
    /// Creates an endpoint, resolving every operation against `interface`.
    pub fn new(address: Address, interface: &InterfaceDescriptor, backend: B) -> Self {
        Self::with_registry(
            address,
            Arc::new(FunctionRegistry::from_interface(interface)),
            backend,
        )
    }

    pub fn with_registry(address: Address, registry: Arc<FunctionRegistry>, backend: B) -> Self {
        Self {
            address,
            registry,
            backend,
        }
    }

    /// Rebind the same contract to another backend, e.g. a freshly resolved signer.
    pub fn with_backend<C>(&self, backend: C) -> ContractEndpoint<C> {
        ContractEndpoint {
            address: self.address,
            registry: self.registry.clone(),
            backend,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn function(&self, op: Operation) -> Result<&Function> {
        self.registry.function(op)
    }
}

/// ABI-encode a call to `function`, selector included.
pub fn encode_call(function: &Function, args: &[DynSolValue]) -> Result<Bytes> {
    if args.len() != function.inputs.len() {
        return Err(RegistryError::Abi(format!(
            "{} takes {} arguments, got {}",
            function.signature(),
            function.inputs.len(),
            args.len()
        )));
    }
    Ok(function.abi_encode_input(args)?.into())
}

fn decode_output(function: &Function, data: &[u8]) -> Result<Vec<DynSolValue>> {
    if data.is_empty() && !function.outputs.is_empty() {
        return Err(RegistryError::Abi(format!(
            "empty result from {}",
            function.signature()
        )));
    }
    Ok(function.abi_decode_output(data)?)
}

impl<B: ReadEndpoint> ContractEndpoint<B> {
    /// Query a view function of a logical operation.
    pub async fn read(&self, op: Operation, args: &[DynSolValue]) -> Result<Vec<DynSolValue>> {
        let function = self.function(op)?;
        self.read_function(function, args).await
    }

    pub async fn read_function(
        &self,
        function: &Function,
        args: &[DynSolValue],
    ) -> Result<Vec<DynSolValue>> {
        let calldata = encode_call(function, args)?;
        let result = self.backend.call(self.address, calldata).await?;
        decode_output(function, &result)
    }
}

impl<B: TransactionSigner> ContractEndpoint<B> {
    pub fn signer_address(&self) -> Address {
        self.backend.address()
    }

    pub async fn simulate(
        &self,
        function: &Function,
        args: &[DynSolValue],
    ) -> Result<Vec<DynSolValue>> {
        let calldata = encode_call(function, args)?;
        let result = self.backend.simulate(self.address, calldata).await?;
        decode_output(function, &result)
    }

    pub async fn estimate_gas(&self, function: &Function, args: &[DynSolValue]) -> Result<u64> {
        let calldata = encode_call(function, args)?;
        self.backend.estimate_gas(self.address, calldata).await
    }

    pub async fn send(
        &self,
        function: &Function,
        args: &[DynSolValue],
        gas_limit: u64,
    ) -> Result<PendingTransaction> {
        let calldata = encode_call(function, args)?;
        let pending = self.backend.send(self.address, calldata, gas_limit).await?;
        info!(
            tx_hash = %pending.hash,
            function = %function.name,
            gas_limit,
            "transaction submitted"
        );
        Ok(pending)
    }

    pub async fn confirm(&self, pending: &PendingTransaction) -> Result<TxReceipt> {
        let receipt = self.backend.confirm(pending).await?;
        info!(
            tx_hash = %receipt.hash,
            block = ?receipt.block_number,
            gas_used = receipt.gas_used,
            "transaction confirmed"
        );
        Ok(receipt)
    }

    /// Submit a plain state-changing call: estimate, send with the estimate
    /// as the limit, and wait for the receipt.
    pub async fn transact(&self, op: Operation, args: &[DynSolValue]) -> Result<TxReceipt> {
        let function = self.function(op)?;
        let gas = self.estimate_gas(function, args).await?;
        debug!(function = %function.name, gas, "gas estimated");
        let pending = self.send(function, args, gas).await?;
        self.confirm(&pending).await
    }
}
