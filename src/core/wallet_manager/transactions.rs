//! Transaction operations
//!
//! Every transfer goes through the DeWallet contract: `transferETH` for the
//! native currency, `transferToken` for configured ERC-20 tokens.

use ethers::types::{Address, U256};
use tracing::info;

use super::WalletManager;
use crate::blockchain::ethereum::{format_amount, parse_address, parse_amount};
use crate::core::domain::{TransactionIntent, TxReceipt};
use crate::core::errors::WalletError;

const NATIVE_DECIMALS: u32 = 18;

/// An intent whose fields have been checked and parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTransfer {
    pub to: Address,
    pub value: U256,
    /// ERC-20 contract for token transfers, `None` for ETH.
    pub token: Option<Address>,
}

fn validate_amount(amount: &str, decimals: u32) -> Result<U256, WalletError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(WalletError::ValidationError("Amount is required".into()));
    }
    if amount.starts_with('-') {
        return Err(WalletError::ValidationError("Amount cannot be negative".into()));
    }
    let value = parse_amount(amount, decimals)?;
    if value.is_zero() {
        return Err(WalletError::ValidationError("Amount must be greater than zero".into()));
    }
    Ok(value)
}

fn validate_recipient(recipient: &str) -> Result<Address, WalletError> {
    if recipient.trim().is_empty() {
        return Err(WalletError::ValidationError("Recipient address is required".into()));
    }
    parse_address(recipient)
        .map_err(|e| WalletError::ValidationError(format!("Invalid recipient: {}", e)))
}

impl WalletManager {
    /// Check an intent without touching the store or the network.
    pub fn validate_intent(&self, intent: &TransactionIntent) -> Result<ValidatedTransfer, WalletError> {
        let to = validate_recipient(&intent.recipient_address)?;
        if intent.is_native() {
            let value = validate_amount(&intent.amount, NATIVE_DECIMALS)?;
            return Ok(ValidatedTransfer { to, value, token: None });
        }

        let token = self.config.token(&intent.token_symbol).ok_or_else(|| {
            WalletError::ValidationError(format!("Unknown token: {}", intent.token_symbol))
        })?;
        let token_address = parse_address(&token.address).map_err(|e| {
            WalletError::ConfigError(format!("Token {} has an invalid address: {}", token.symbol, e))
        })?;
        let value = validate_amount(&intent.amount, token.decimals)?;
        Ok(ValidatedTransfer { to, value, token: Some(token_address) })
    }

    /// Submit `intent` and wait for confirmation. The intent is consumed whatever
    /// the outcome. The private key is decrypted only for the duration of the call.
    pub async fn send(
        &self,
        intent: TransactionIntent,
        passphrase: &str,
    ) -> Result<TxReceipt, WalletError> {
        let transfer = self.validate_intent(&intent)?;
        drop(intent);

        let record = self.load_record().await?;
        let key = record.private_key(passphrase)?;
        info!(to = ?transfer.to, token = ?transfer.token, "Submitting transfer");

        let receipt = match transfer.token {
            None => self.contract.transfer_eth(&key, transfer.to, transfer.value).await?,
            Some(token) => {
                self.contract.transfer_token(&key, token, transfer.to, transfer.value).await?
            }
        };
        info!(tx_hash = %receipt.tx_hash, block = ?receipt.block_number, "Transfer confirmed");
        Ok(receipt)
    }

    /// Fee quote for sending `amount` ETH to `to`, in ether.
    pub async fn estimate_fee(&self, to: &str, amount: &str) -> Result<String, WalletError> {
        let to = validate_recipient(to)?;
        let value = validate_amount(amount, NATIVE_DECIMALS)?;
        let fee = self.contract.estimate_gas_fee(to, value).await?;
        format_amount(fee, NATIVE_DECIMALS)
    }
}
