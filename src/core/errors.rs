use std::fmt;

/// Custom error type for wallet operations.
#[derive(Debug)]
pub enum WalletError {
    /// Configuration-related errors.
    ConfigError(String),
    /// Storage-related errors, including inconsistent wallet records.
    StorageError(String),
    /// Blockchain interaction errors.
    BlockchainError(String),
    /// Encryption/decryption errors.
    CryptoError(String),
    /// Security-related errors (passphrase policy, secret handling).
    SecurityError(String),
    /// Validation errors.
    ValidationError(String),
    /// Network errors.
    NetworkError(String),
    /// Mnemonic generation/parsing errors.
    MnemonicError(String),
    /// Key derivation errors.
    KeyDerivationError(String),
    /// Address derivation errors.
    AddressError(String),
    /// Serialization/deserialization errors.
    SerializationError(String),
    /// No usable wallet in the store.
    NoWallet,
    /// Insufficient funds errors.
    InsufficientFunds(String),
    /// Key generation failed errors.
    KeyGenerationFailed(String),
    /// Transaction failed errors (reverted, dropped).
    TransactionFailed(String),
    /// Decryption errors (wrong passphrase or tampered envelope).
    DecryptionError(String),
    /// Generic errors (legacy).
    Other(String),
}

impl fmt::Display for WalletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            WalletError::StorageError(msg) => write!(f, "Storage error: {}", msg),
            WalletError::BlockchainError(msg) => write!(f, "Blockchain error: {}", msg),
            WalletError::CryptoError(msg) => write!(f, "Crypto error: {}", msg),
            WalletError::SecurityError(msg) => write!(f, "Security error: {}", msg),
            WalletError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            WalletError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            WalletError::MnemonicError(msg) => write!(f, "Mnemonic error: {}", msg),
            WalletError::KeyDerivationError(msg) => write!(f, "Key derivation error: {}", msg),
            WalletError::AddressError(msg) => write!(f, "Address error: {}", msg),
            WalletError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            WalletError::NoWallet => write!(f, "No wallet found; create or import one first"),
            WalletError::InsufficientFunds(msg) => write!(f, "Insufficient funds: {}", msg),
            WalletError::KeyGenerationFailed(msg) => write!(f, "Key generation failed: {}", msg),
            WalletError::TransactionFailed(msg) => write!(f, "Transaction failed: {}", msg),
            WalletError::DecryptionError(msg) => write!(f, "Decryption error: {}", msg),
            WalletError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for WalletError {}

impl WalletError {
    /// Whether a caller may reasonably try the same operation again.
    /// Nothing in this crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WalletError::NetworkError(_))
    }

    /// Classify a provider/middleware error message from a submission.
    pub fn from_submission(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        let lower = msg.to_lowercase();
        if lower.contains("insufficient funds") {
            WalletError::InsufficientFunds(msg)
        } else if lower.contains("revert") {
            WalletError::TransactionFailed(msg)
        } else if lower.contains("error sending request")
            || lower.contains("connection")
            || lower.contains("timed out")
        {
            WalletError::NetworkError(msg)
        } else {
            WalletError::BlockchainError(msg)
        }
    }
}

impl From<anyhow::Error> for WalletError {
    fn from(err: anyhow::Error) -> Self {
        WalletError::Other(err.to_string())
    }
}

impl From<std::io::Error> for WalletError {
    fn from(err: std::io::Error) -> Self {
        WalletError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(err: serde_json::Error) -> Self {
        WalletError::SerializationError(err.to_string())
    }
}
