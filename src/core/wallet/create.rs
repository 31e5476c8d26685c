// filepath: src/core/wallet/create.rs
use bip39::{Language, Mnemonic};
use ethers::signers::{coins_bip39::English, LocalWallet, MnemonicBuilder, Signer};
use ethers::utils::to_checksum;
use rand_core::{OsRng, RngCore};
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::core::domain::PrivateKey;
use crate::core::errors::WalletError;
use crate::security::redaction::short_hex;
use crate::security::SecretString;

/// BIP-44 path of the first Ethereum account.
pub const DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";

pub const DEFAULT_WORD_COUNT: usize = 12;

/// Fresh (or imported) wallet material. Lives only until it has been sealed
/// into the store; nothing here is `Clone` or `Debug`.
pub struct GeneratedWallet {
    pub address: String,
    pub mnemonic: SecretString,
    pub private_key: PrivateKey,
}

impl GeneratedWallet {
    pub fn word_count(&self) -> usize {
        self.mnemonic.split_whitespace().count()
    }
}

fn entropy_len(words: usize) -> Result<usize, WalletError> {
    match words {
        12 => Ok(16),
        24 => Ok(32),
        other => Err(WalletError::ValidationError(format!(
            "Unsupported mnemonic length {}, use 12 or 24 words",
            other
        ))),
    }
}

/// Generate a new wallet from OS entropy. Has no persistence side effect.
pub fn generate(words: usize) -> Result<GeneratedWallet, WalletError> {
    let mut entropy = Zeroizing::new(vec![0u8; entropy_len(words)?]);
    OsRng
        .try_fill_bytes(&mut entropy)
        .map_err(|e| WalletError::KeyGenerationFailed(format!("entropy source unavailable: {}", e)))?;

    let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy)
        .map_err(|e| WalletError::KeyGenerationFailed(e.to_string()))?;
    let phrase = Zeroizing::new(mnemonic.to_string());
    let wallet = from_mnemonic(&phrase)?;
    info!(address = %short_hex(&wallet.address), words, "Generated new wallet");
    Ok(wallet)
}

/// Derive the wallet for an existing phrase (import, legacy migration).
pub fn from_mnemonic(phrase: &str) -> Result<GeneratedWallet, WalletError> {
    let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase.trim())
        .map_err(|e| WalletError::MnemonicError(format!("Invalid mnemonic: {}", e)))?;
    let normalized = Zeroizing::new(mnemonic.to_string());

    debug!("Using derivation path: {}", DERIVATION_PATH);
    let signer = MnemonicBuilder::<English>::default()
        .phrase(normalized.as_str())
        .derivation_path(DERIVATION_PATH)
        .map_err(|e| WalletError::KeyDerivationError(format!("Failed to set derivation path: {}", e)))?
        .build()
        .map_err(|e| WalletError::KeyDerivationError(format!("Failed to build wallet: {}", e)))?;

    let key_bytes = Zeroizing::new(signer.signer().to_bytes().to_vec());
    let private_key = PrivateKey::try_from_slice(&key_bytes)?;

    Ok(GeneratedWallet {
        address: to_checksum(&signer.address(), None),
        mnemonic: normalized,
        private_key,
    })
}

/// Checksummed address belonging to `key`.
pub fn address_from_private_key(key: &PrivateKey) -> Result<String, WalletError> {
    let wallet = key
        .with_secret(|b| LocalWallet::from_bytes(b))
        .map_err(|e| WalletError::KeyDerivationError(format!("Invalid private key: {}", e)))?;
    Ok(to_checksum(&wallet.address(), None))
}
