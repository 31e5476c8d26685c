use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::core::errors::WalletError;
use crate::security::SealedSecret;

/// Symbol of the chain's native currency.
pub const NATIVE_SYMBOL: &str = "ETH";

/// The persisted wallet: a public address plus both secrets sealed under the
/// user's passphrase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredWallet {
    pub address: String,
    pub encrypted_private_key: SealedSecret,
    pub encrypted_seed_phrase: SealedSecret,
}

/// Display projection of one asset held by the wallet. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDescriptor {
    pub symbol: String,
    pub name: String,
    pub balance: String,
    pub price: String,
    pub change: String,
    pub icon: String,
}

impl TokenDescriptor {
    /// Descriptor without a price feed behind it.
    pub fn unpriced(symbol: &str, name: &str, balance: String, icon: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            balance,
            price: "$0".to_string(),
            change: "+$0".to_string(),
            icon: icon.to_string(),
        }
    }
}

/// A single transfer request. Taken by value on submission so it cannot be
/// reused afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionIntent {
    pub recipient_address: String,
    pub amount: String,
    pub token_symbol: String,
}

impl TransactionIntent {
    pub fn native(recipient_address: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            recipient_address: recipient_address.into(),
            amount: amount.into(),
            token_symbol: NATIVE_SYMBOL.to_string(),
        }
    }

    pub fn token(
        recipient_address: impl Into<String>,
        amount: impl Into<String>,
        token_symbol: impl Into<String>,
    ) -> Self {
        Self {
            recipient_address: recipient_address.into(),
            amount: amount.into(),
            token_symbol: token_symbol.into(),
        }
    }

    pub fn is_native(&self) -> bool {
        self.token_symbol.eq_ignore_ascii_case(NATIVE_SYMBOL)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Confirmed,
    Reverted,
}

/// Outcome of a submission once it reached the configured confirmation depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: String,
    pub block_number: Option<u64>,
    pub gas_used: Option<String>,
    pub status: TransactionStatus,
}

/// Private key wrapper (32 bytes) with secrecy::Secret for automatic zeroization and display-hiding
pub struct PrivateKey(Secret<[u8; 32]>);
impl PrivateKey {
    pub fn new(k: [u8; 32]) -> Self {
        Self(Secret::new(k))
    }

    /// Scoped access to the underlying secret bytes. Callers can't hold on to or
    /// clone the key outside the closure.
    pub fn with_secret<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[u8; 32]) -> R,
    {
        f(self.0.expose_secret())
    }

    /// Try to construct a PrivateKey from a byte slice (must be 32 bytes).
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, WalletError> {
        if slice.len() != 32 {
            return Err(WalletError::CryptoError(format!(
                "Private key must be 32 bytes, got {}",
                slice.len()
            )));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(slice);
        let key = PrivateKey::new(arr);
        arr.zeroize();
        Ok(key)
    }

    /// Parse a hex private key as stored by earlier wallet revisions.
    pub fn from_hex(s: &str) -> Result<Self, WalletError> {
        let trimmed = s.trim();
        let hex_part = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = zeroize::Zeroizing::new(
            hex::decode(hex_part)
                .map_err(|_| WalletError::CryptoError("Private key is not valid hex".into()))?,
        );
        Self::try_from_slice(&bytes)
    }
}
impl Zeroize for PrivateKey {
    fn zeroize(&mut self) {
        self.0 = Secret::new([0u8; 32]);
    }
}
impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}
impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateKey([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_key_with_secret() {
        let key = [7u8; 32];
        let pk = PrivateKey::new(key);
        assert_eq!(pk.with_secret(|b| *b), key);
    }

    #[test]
    fn test_private_key_try_from_slice() {
        assert!(PrivateKey::try_from_slice(&[1u8; 31]).is_err());
        let pk = PrivateKey::try_from_slice(&[1u8; 32]).unwrap();
        pk.with_secret(|b| assert_eq!(b, &[1u8; 32]));
    }

    #[test]
    fn test_private_key_from_hex() {
        let hex_key = format!("0x{}", "ab".repeat(32));
        let pk = PrivateKey::from_hex(&hex_key).unwrap();
        pk.with_secret(|b| assert_eq!(b, &[0xab; 32]));
        assert!(PrivateKey::from_hex("0xnothex").is_err());
    }

    #[test]
    fn test_private_key_debug_redacted() {
        let pk = PrivateKey::new([9u8; 32]);
        assert_eq!(format!("{:?}", pk), "PrivateKey([REDACTED])");
    }

    #[test]
    fn test_intent_native_detection() {
        assert!(TransactionIntent::native("0xabc", "1").is_native());
        assert!(TransactionIntent::token("0xabc", "1", "eth").is_native());
        assert!(!TransactionIntent::token("0xabc", "1", "USDT").is_native());
    }

    #[test]
    fn test_unpriced_descriptor() {
        let d = TokenDescriptor::unpriced("ETH", "Ethereum", "0".into(), "eth");
        assert_eq!(d.price, "$0");
        assert_eq!(d.change, "+$0");
    }
}
