//! Scripted chain double for unit tests.

use crate::endpoint::{ContractEndpoint, PendingTransaction, ReadEndpoint, TransactionSigner, TxReceipt};
use crate::error::{RegistryError, Result};
use crate::interface::InterfaceDescriptor;
use crate::signer::WalletInjection;
use alloy::dyn_abi::{DynSolType, DynSolValue, FunctionExt, Specifier};
use alloy::json_abi::Function;
use alloy_primitives::{address, hex, keccak256, Address, Bytes, B256, U256};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

alloy_sol_macro::sol! {
    interface IAssetRegistry {
        function registerAssetWithHash(uint256 asset, bytes32 hash) external;
    }

    interface IStringHashRegistry {
        function registerAssetWithHash(uint256 asset, string hash) external;
    }
}

pub const CONTRACT: Address = address!("0xcccccccccccccccccccccccccccccccccccccccc");
pub const CALLER: Address = address!("0x1111111111111111111111111111111111111111");

/// Default estimate when none is scripted.
pub const DEFAULT_ESTIMATE: u64 = 50_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Read(String),
    Simulate(String),
    Estimate(String),
    Send(String, u64),
    Confirm,
}

#[derive(Debug, Default)]
struct ChainState {
    registered: bool,
    asset: U256,
    stored_hash: B256,
    returns: HashMap<String, Vec<DynSolValue>>,
    read_failures: HashMap<String, RegistryError>,
    simulate_failure: Option<RegistryError>,
    estimates: VecDeque<Result<u64>>,
    send_failure: Option<RegistryError>,
    confirm_failure: Option<RegistryError>,
    calls: Vec<RecordedCall>,
    sent: Vec<Bytes>,
}

/// An in-memory registry contract that answers from scripted state and
/// records every call made against it.
#[derive(Debug, Clone)]
pub struct MockChain {
    interface: Arc<InterfaceDescriptor>,
    state: Arc<Mutex<ChainState>>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChain {
    pub fn new() -> Self {
        Self::with_interface(InterfaceDescriptor::bundled().unwrap())
    }

    pub fn with_interface(interface: InterfaceDescriptor) -> Self {
        Self {
            interface: Arc::new(interface),
            state: Arc::new(Mutex::new(ChainState::default())),
        }
    }

    pub fn with_signatures(signatures: &[&str]) -> Self {
        Self::with_interface(InterfaceDescriptor::new(
            signatures.iter().map(|s| Function::parse(s).unwrap()).collect(),
        ))
    }

    pub fn registered(self, registered: bool) -> Self {
        self.state.lock().unwrap().registered = registered;
        self
    }

    pub fn asset(self, asset: U256) -> Self {
        self.state.lock().unwrap().asset = asset;
        self
    }

    pub fn stored_hash(self, hash: B256) -> Self {
        self.state.lock().unwrap().stored_hash = hash;
        self
    }

    pub fn returns(self, function: &str, values: Vec<DynSolValue>) -> Self {
        self.state
            .lock()
            .unwrap()
            .returns
            .insert(function.to_string(), values);
        self
    }

    pub fn fail_read(self, function: &str, err: RegistryError) -> Self {
        self.state
            .lock()
            .unwrap()
            .read_failures
            .insert(function.to_string(), err);
        self
    }

    pub fn fail_simulate(self, err: RegistryError) -> Self {
        self.state.lock().unwrap().simulate_failure = Some(err);
        self
    }

    /// Queue estimation outcomes, consumed in order.
    pub fn estimates(self, estimates: Vec<Result<u64>>) -> Self {
        self.state.lock().unwrap().estimates = estimates.into();
        self
    }

    pub fn fail_send(self, err: RegistryError) -> Self {
        self.state.lock().unwrap().send_failure = Some(err);
        self
    }

    pub fn fail_confirm(self, err: RegistryError) -> Self {
        self.state.lock().unwrap().confirm_failure = Some(err);
        self
    }

    pub fn interface(&self) -> &InterfaceDescriptor {
        &self.interface
    }

    pub fn endpoint(&self) -> ContractEndpoint<MockChain> {
        ContractEndpoint::new(CONTRACT, &self.interface, self.clone())
    }

    pub fn caller(&self) -> Address {
        CALLER
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calldata of every transaction sent, in order.
    pub fn sent(&self) -> Vec<Bytes> {
        self.state.lock().unwrap().sent.clone()
    }

    fn function_for(&self, calldata: &[u8]) -> Result<&Function> {
        self.interface
            .functions()
            .iter()
            .find(|f| calldata.len() >= 4 && f.selector().as_slice() == &calldata[..4])
            .ok_or_else(|| RegistryError::Abi(format!("unknown selector in {}", hex::encode(calldata))))
    }

    fn record(&self, call: RecordedCall) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn output_for(&self, function: &Function) -> Vec<DynSolValue> {
        let state = self.state.lock().unwrap();
        if let Some(values) = state.returns.get(&function.name) {
            return values.clone();
        }
        match function.name.as_str() {
            "isRegistered" => vec![DynSolValue::Bool(state.registered)],
            "getAsset" => vec![DynSolValue::Uint(state.asset, 256)],
            "getAssetWithHash" => {
                let hash_ty = function
                    .outputs
                    .get(1)
                    .and_then(|p| p.resolve().ok())
                    .unwrap_or(DynSolType::FixedBytes(32));
                let hash = match hash_ty {
                    DynSolType::String => {
                        DynSolValue::String(hex::encode_prefixed(state.stored_hash))
                    }
                    DynSolType::Bytes => DynSolValue::Bytes(state.stored_hash.to_vec()),
                    _ => DynSolValue::FixedBytes(state.stored_hash, 32),
                };
                vec![DynSolValue::Uint(state.asset, 256), hash]
            }
            _ => Vec::new(),
        }
    }
}

#[async_trait]
impl ReadEndpoint for MockChain {
    async fn call(&self, _contract: Address, calldata: Bytes) -> Result<Bytes> {
        let function = self.function_for(&calldata)?;
        self.record(RecordedCall::Read(function.name.clone()));

        if let Some(err) = self.state.lock().unwrap().read_failures.get(&function.name) {
            return Err(err.clone());
        }

        let values = self.output_for(function);
        Ok(function.abi_encode_output(&values)?.into())
    }
}

#[async_trait]
impl TransactionSigner for MockChain {
    fn address(&self) -> Address {
        CALLER
    }

    async fn simulate(&self, _contract: Address, calldata: Bytes) -> Result<Bytes> {
        let function = self.function_for(&calldata)?;
        self.record(RecordedCall::Simulate(function.name.clone()));
        match self.state.lock().unwrap().simulate_failure.clone() {
            Some(err) => Err(err),
            None => Ok(Bytes::new()),
        }
    }

    async fn estimate_gas(&self, _contract: Address, calldata: Bytes) -> Result<u64> {
        let function = self.function_for(&calldata)?;
        self.record(RecordedCall::Estimate(function.name.clone()));
        self.state
            .lock()
            .unwrap()
            .estimates
            .pop_front()
            .unwrap_or(Ok(DEFAULT_ESTIMATE))
    }

    async fn send(
        &self,
        _contract: Address,
        calldata: Bytes,
        gas_limit: u64,
    ) -> Result<PendingTransaction> {
        let function = self.function_for(&calldata)?;
        self.record(RecordedCall::Send(function.name.clone(), gas_limit));

        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.send_failure.clone() {
            return Err(err);
        }
        state.sent.push(calldata.clone());
        Ok(PendingTransaction {
            hash: keccak256(&calldata),
            gas_limit,
        })
    }

    async fn confirm(&self, pending: &PendingTransaction) -> Result<TxReceipt> {
        self.record(RecordedCall::Confirm);
        if let Some(err) = self.state.lock().unwrap().confirm_failure.clone() {
            return Err(err);
        }
        Ok(TxReceipt {
            hash: pending.hash,
            block_number: Some(1),
            gas_used: pending.gas_limit / 2,
            gas_limit: pending.gas_limit,
            encoding: None,
        })
    }
}

/// Wallet injection that either hands out a [`MockChain`] or refuses.
#[derive(Debug, Clone)]
pub enum MockWallet {
    Approving(MockChain),
    Rejecting,
}

impl MockWallet {
    pub fn approving(chain: MockChain) -> Self {
        MockWallet::Approving(chain)
    }

    pub fn rejecting() -> Self {
        MockWallet::Rejecting
    }
}

#[async_trait]
impl WalletInjection for MockWallet {
    type Signer = MockChain;

    async fn request_signer(&self) -> Result<MockChain> {
        match self {
            MockWallet::Approving(chain) => Ok(chain.clone()),
            MockWallet::Rejecting => Err(RegistryError::UserRejected),
        }
    }
}
