use async_trait::async_trait;
use ethers::{
    prelude::{JsonRpcClient, *},
    providers::{Http, Provider},
    signers::{LocalWallet, Signer},
    types::{transaction::eip2718::TypedTransaction, Address, Bytes, Eip1559TransactionRequest, U256},
    utils::{format_units, parse_units},
};
use std::{str::FromStr, time::Duration};
use tracing::{debug, info, warn};

use super::traits::BlockchainClient;
use crate::core::config::NetworkConfig;
use crate::core::domain::{PrivateKey, TransactionStatus, TxReceipt};
use crate::core::errors::WalletError;
use crate::security::redaction::short_hex;

/// Environment variable holding the bearer token for the RPC proxy.
pub const RPC_TOKEN_ENV: &str = "DEWALLET_RPC_TOKEN";

/// Parse a `0x` + 40 hex character address.
pub fn parse_address(address: &str) -> Result<Address, WalletError> {
    let trimmed = address.trim();
    if !trimmed.starts_with("0x") || trimmed.len() != 42 {
        return Err(WalletError::AddressError(format!("Invalid Ethereum address: {}", trimmed)));
    }
    Address::from_str(trimmed)
        .map_err(|e| WalletError::AddressError(format!("Invalid Ethereum address: {}", e)))
}

/// Parse a plain decimal amount (`123`, `0.5`) into base units with `decimals`
/// places. More fractional digits than `decimals` is an error, not a rounding.
pub fn parse_amount(amount: &str, decimals: u32) -> Result<U256, WalletError> {
    let trimmed = amount.trim();
    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (trimmed, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !fraction.map_or(true, all_digits) {
        return Err(WalletError::ValidationError(format!(
            "Invalid amount '{}': expected a decimal number like 1.5",
            amount
        )));
    }
    if fraction.is_some_and(|f| f.len() > decimals as usize) {
        return Err(WalletError::ValidationError(format!(
            "Invalid amount '{}': at most {} decimal places allowed",
            amount, decimals
        )));
    }
    let parsed = parse_units(trimmed, decimals)
        .map_err(|e| WalletError::ValidationError(format!("Invalid amount '{}': {}", amount, e)))?;
    Ok(U256::from(parsed))
}

/// Format base units as a decimal string without trailing zeros (`"0"` for zero).
pub fn format_amount(value: U256, decimals: u32) -> Result<String, WalletError> {
    let formatted = format_units(value, decimals)
        .map_err(|e| WalletError::SerializationError(format!("Cannot format amount: {}", e)))?;
    Ok(trim_decimal(&formatted))
}

fn trim_decimal(s: &str) -> String {
    let trimmed = if s.contains('.') { s.trim_end_matches('0').trim_end_matches('.') } else { s };
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '0') {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn network_name_for(chain_id: u64) -> String {
    match chain_id {
        1 => "ethereum".to_string(),
        11155111 => "sepolia".to_string(),
        17000 => "holesky".to_string(),
        31337 => "localhost".to_string(),
        _ => format!("ethereum-{}", chain_id),
    }
}

#[derive(Clone)]
pub struct EthereumClient<P: JsonRpcClient + Clone = Http> {
    provider: Provider<P>,
    network_name: String,
    chain_id: u64,
    confirmations: usize,
}

impl EthereumClient<Http> {
    /// Build a client for the configured endpoint. No request is sent yet.
    pub fn new(network: &NetworkConfig) -> Result<Self, WalletError> {
        let rpc_url_clean = network.rpc_url.trim();
        let parsed_url = reqwest::Url::parse(rpc_url_clean).map_err(|e| {
            WalletError::ConfigError(format!(
                "Invalid Ethereum RPC URL '{}': {}. Please check dewallet.toml or DEWALLET_RPC_URL.",
                rpc_url_clean, e
            ))
        })?;

        // Build a reqwest client with a short timeout; allow proxy environment vars.
        let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(10));
        if let Ok(proxy) = std::env::var("HTTPS_PROXY").or_else(|_| std::env::var("HTTP_PROXY")) {
            if let Ok(p) = reqwest::Proxy::all(proxy) {
                builder = builder.proxy(p);
            }
        }
        if let Ok(token) = std::env::var(RPC_TOKEN_ENV) {
            let mut value = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token.trim()))
                .map_err(|_| {
                    WalletError::ConfigError(format!("{} is not a valid header value", RPC_TOKEN_ENV))
                })?;
            value.set_sensitive(true);
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert(reqwest::header::AUTHORIZATION, value);
            builder = builder.default_headers(headers);
            debug!("Using bearer token for RPC proxy");
        }
        let client = builder
            .build()
            .map_err(|e| WalletError::NetworkError(format!("Failed to build HTTP client: {}", e)))?;

        let provider = Provider::new(Http::new_with_client(parsed_url, client));
        Ok(Self {
            provider,
            network_name: network.name.clone(),
            chain_id: network.chain_id,
            confirmations: 1,
        })
    }
}

impl<P: JsonRpcClient + Clone> EthereumClient<P>
where
    P: Send + Sync,
{
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Creates a new EthereumClient with a given provider.
    /// This is useful for testing with a `MockProvider`.
    pub fn new_with_provider(provider: Provider<P>, chain_id: u64) -> EthereumClient<P> {
        EthereumClient { provider, network_name: network_name_for(chain_id), chain_id, confirmations: 1 }
    }

    /// Number of blocks to wait for after a submission (at least one).
    pub fn with_confirmations(mut self, confirmations: usize) -> Self {
        self.confirmations = confirmations.max(1);
        self
    }

    fn create_wallet_from_private_key(&self, private_key: &[u8]) -> Result<LocalWallet, WalletError> {
        // Do NOT log key material.
        let wallet = LocalWallet::from_bytes(private_key)
            .map_err(|e| WalletError::KeyDerivationError(format!("Invalid private key: {}", e)))?
            .with_chain_id(self.chain_id);
        Ok(wallet)
    }
}

#[async_trait]
impl<P> BlockchainClient for EthereumClient<P>
where
    P: JsonRpcClient + Clone + 'static + Send + Sync,
{
    async fn get_balance(&self, address: &str) -> Result<String, WalletError> {
        debug!("Getting ETH balance for address: {}", short_hex(address));

        let address = parse_address(address)?;
        let balance = self
            .provider
            .get_balance(address, None)
            .await
            .map_err(|e| WalletError::NetworkError(format!("Failed to get balance: {}", e)))?;

        let balance_eth = format_amount(balance, 18)?;
        debug!("Balance: {} ETH", balance_eth);
        Ok(balance_eth)
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, WalletError> {
        let tx: TypedTransaction = Eip1559TransactionRequest::new().to(to).data(data).into();
        self.provider
            .call(&tx, None)
            .await
            .map_err(|e| WalletError::from_submission(format!("eth_call failed: {}", e)))
    }

    async fn send_contract_call(
        &self,
        private_key: &PrivateKey,
        to: Address,
        data: Bytes,
        value: U256,
    ) -> Result<TxReceipt, WalletError> {
        // Create wallet from private key using scoped secret access
        let wallet = private_key.with_secret(|pk_bytes| self.create_wallet_from_private_key(pk_bytes))?;

        let tx = Eip1559TransactionRequest::new()
            .to(to)
            .data(data)
            .value(value)
            .chain_id(self.chain_id);

        let client = SignerMiddleware::new(self.provider.clone(), wallet);
        let pending_tx = client
            .send_transaction(tx, None)
            .await
            .map_err(|e| WalletError::from_submission(e.to_string()))?;

        // Convert H256 hash to a canonical 0x-prefixed hex string for logs/returns.
        let tx_hash = format!("0x{}", hex::encode(pending_tx.tx_hash().as_bytes()));
        info!(tx_hash = %tx_hash, confirmations = self.confirmations, "Transaction sent, awaiting confirmation");

        let receipt = pending_tx
            .confirmations(self.confirmations)
            .await
            .map_err(|e| WalletError::from_submission(e.to_string()))?
            .ok_or_else(|| {
                warn!(tx_hash = %tx_hash, "Transaction dropped before confirmation");
                WalletError::TransactionFailed(format!("transaction {} was dropped", tx_hash))
            })?;

        let status = if receipt.status == Some(U64::from(1)) {
            TransactionStatus::Confirmed
        } else {
            TransactionStatus::Reverted
        };
        debug!(tx_hash = %tx_hash, ?status, "Receipt received");

        Ok(TxReceipt {
            tx_hash,
            block_number: receipt.block_number.map(|b| b.as_u64()),
            gas_used: receipt.gas_used.map(|g| g.to_string()),
            status,
        })
    }

    async fn get_chain_id(&self) -> Result<u64, WalletError> {
        let chain_id = self.provider.get_chainid().await.map_err(|e| {
            WalletError::NetworkError(format!(
                "Failed to get chain ID from {}: {}. This might be due to a network issue, firewall, or an invalid RPC URL.",
                self.network_name, e
            ))
        })?;
        Ok(chain_id.as_u64())
    }

    fn get_network_name(&self) -> &str {
        &self.network_name
    }
}
