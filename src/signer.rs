//! Wallet injection and signer resolution.
//!
//! A [`WalletInjection`] is whatever the hosting environment hands the client
//! to authorize transactions: a key held by the process, or an account the
//! RPC node manages on the user's behalf. The injection may be missing
//! entirely, and the user may refuse the connection request; the two cases
//! surface as [`RegistryError::NoWallet`] and [`RegistryError::UserRejected`].

use crate::endpoint::TransactionSigner;
use crate::error::{classify_rpc_error, RegistryError, Result};
use crate::rpc::{HttpSigner, ProviderSigner};
use alloy::network::EthereumWallet;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::RpcError;
use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use std::str::FromStr;
use tracing::{debug, info};
use url::Url;

/// Environment variable holding a hex private key for [`LocalKeyWallet::from_env`].
pub const PRIVATE_KEY_ENV: &str = "REGISTRY_PRIVATE_KEY";

/// JSON-RPC "method not found".
const METHOD_NOT_FOUND_CODE: i64 = -32601;

/// Source of an authorizing signer bound to the end user's account.
#[async_trait]
pub trait WalletInjection: Send + Sync {
    type Signer: TransactionSigner;

    /// Ask for a signer. May wait on the user and may be refused.
    async fn request_signer(&self) -> Result<Self::Signer>;
}

/// Obtain a signer from the injected wallet.
///
/// Without an injection context this fails with `NoWallet` before any
/// network traffic.
pub async fn resolve_signer<W>(wallet: Option<&W>) -> Result<W::Signer>
where
    W: WalletInjection + ?Sized,
{
    let Some(wallet) = wallet else {
        return Err(RegistryError::NoWallet);
    };
    let signer = wallet.request_signer().await?;
    info!(address = %signer.address(), "wallet connected");
    Ok(signer)
}

/// A private key held in process memory.
#[derive(Clone)]
pub struct LocalKeyWallet {
    signer: PrivateKeySigner,
    provider_url: Url,
    required_confirmations: u64,
}

impl std::fmt::Debug for LocalKeyWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalKeyWallet")
            .field("address", &self.signer.address())
            .field("provider_url", &self.provider_url.as_str())
            .finish()
    }
}

impl LocalKeyWallet {
    /// Create a wallet from a private key in hexadecimal string format
    pub fn from_private_key(private_key: &str, provider_url: Url) -> Result<Self> {
        let clean_key = private_key.trim().trim_start_matches("0x");

        if clean_key.len() != 64 {
            return Err(RegistryError::InvalidInput(
                "private key must be 32 bytes (64 hex characters)".to_string(),
            ));
        }

        let key = B256::from_str(clean_key)
            .map_err(|e| RegistryError::InvalidInput(format!("invalid private key: {e}")))?;
        let signer = PrivateKeySigner::from_bytes(&key)
            .map_err(|e| RegistryError::InvalidInput(format!("invalid private key: {e}")))?;

        Ok(Self {
            signer,
            provider_url,
            required_confirmations: 1,
        })
    }

    /// Read the key from [`PRIVATE_KEY_ENV`]. An unset variable means no
    /// wallet is injected.
    pub fn from_env(provider_url: Url) -> Result<Option<Self>> {
        match std::env::var(PRIVATE_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => {
                Self::from_private_key(&key, provider_url).map(Some)
            }
            _ => Ok(None),
        }
    }

    pub fn with_required_confirmations(mut self, confirmations: u64) -> Self {
        self.required_confirmations = confirmations;
        self
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }
}

#[async_trait]
impl WalletInjection for LocalKeyWallet {
    type Signer = HttpSigner;

    async fn request_signer(&self) -> Result<HttpSigner> {
        let address = self.signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(self.signer.clone()))
            .connect_http(self.provider_url.clone())
            .erased();
        Ok(ProviderSigner::new(provider, address)
            .with_required_confirmations(self.required_confirmations))
    }
}

/// An account unlocked in the RPC node, requested the way a browser wallet
/// is: `eth_requestAccounts`, falling back to `eth_accounts` on nodes that
/// do not know the former.
#[derive(Clone)]
pub struct NodeAccountWallet {
    provider: DynProvider,
}

impl NodeAccountWallet {
    pub fn new(provider: DynProvider) -> Self {
        Self { provider }
    }

    pub fn connect_http(provider_url: Url) -> Self {
        Self::new(ProviderBuilder::new().connect_http(provider_url).erased())
    }
}

#[async_trait]
impl WalletInjection for NodeAccountWallet {
    type Signer = HttpSigner;

    async fn request_signer(&self) -> Result<HttpSigner> {
        let requested: std::result::Result<Vec<Address>, _> = self
            .provider
            .client()
            .request_noparams("eth_requestAccounts")
            .await;

        let accounts = match requested {
            Ok(accounts) => accounts,
            Err(RpcError::ErrorResp(payload)) if payload.code == METHOD_NOT_FOUND_CODE => {
                debug!("eth_requestAccounts unsupported, using eth_accounts");
                self.provider.get_accounts().await?
            }
            Err(e) => return Err(classify_rpc_error(e)),
        };

        let Some(address) = accounts.first().copied() else {
            return Err(RegistryError::NoWallet);
        };

        Ok(ProviderSigner::new(self.provider.clone(), address))
    }
}
