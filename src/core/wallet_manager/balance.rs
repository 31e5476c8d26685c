//! Balance queries
//!
//! Native balance from the node plus configured ERC-20 tokens. Results are
//! display projections and are never persisted.

use tracing::{info, warn};

use super::WalletManager;
use crate::blockchain::contract::token_balance_of;
use crate::blockchain::ethereum::{format_amount, parse_address};
use crate::core::domain::{TokenDescriptor, NATIVE_SYMBOL};
use crate::core::errors::WalletError;
use crate::security::redaction::short_hex;

impl WalletManager {
    /// Native balance of `address` in ether. One attempt, no retry.
    pub async fn fetch_balance(&self, address: &str) -> Result<String, WalletError> {
        self.client.get_balance(address).await
    }

    /// Token list for the stored wallet: ETH first, then configured tokens.
    pub async fn fetch_tokens(&self) -> Result<Vec<TokenDescriptor>, WalletError> {
        let address = self.wallet_address().await?;
        info!(address = %short_hex(&address), network = self.client.get_network_name(), "Fetching balance");
        let mut tokens = vec![TokenDescriptor::unpriced(
            NATIVE_SYMBOL,
            "Ethereum",
            self.fetch_balance(&address).await?,
            "eth",
        )];

        let owner = parse_address(&address)?;
        for token in &self.config.tokens {
            let token_address = parse_address(&token.address).map_err(|e| {
                WalletError::ConfigError(format!("Token {} has an invalid address: {}", token.symbol, e))
            })?;
            let raw = token_balance_of(self.client.as_ref(), token_address, owner).await?;
            tokens.push(TokenDescriptor::unpriced(
                &token.symbol,
                &token.name,
                format_amount(raw, token.decimals)?,
                &token.icon,
            ));
        }
        Ok(tokens)
    }

    /// Refresh the cached token list. On failure the error is logged, the
    /// previously known balances stay as they were and the error is returned.
    pub async fn refresh_balance(&self) -> Result<Vec<TokenDescriptor>, WalletError> {
        match self.fetch_tokens().await {
            Ok(tokens) => {
                info!(tokens = tokens.len(), "Balance refreshed");
                *self.balance_cache.write() = Some(tokens.clone());
                Ok(tokens)
            }
            Err(e) => {
                warn!(error = %e, "Balance refresh failed, keeping last known balance");
                Err(e)
            }
        }
    }

    /// Last successfully fetched token list, if any.
    pub fn cached_balance(&self) -> Option<Vec<TokenDescriptor>> {
        self.balance_cache.read().clone()
    }

    /// Native balance as last fetched, `"0"` before the first successful fetch.
    pub fn cached_native_balance(&self) -> String {
        self.balance_cache
            .read()
            .as_ref()
            .and_then(|tokens| tokens.iter().find(|t| t.symbol == NATIVE_SYMBOL))
            .map(|t| t.balance.clone())
            .unwrap_or_else(|| "0".to_string())
    }
}
