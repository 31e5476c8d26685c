//! Wallet lifecycle management
//!
//! Provides wallet creation, import, seed export, legacy migration and removal.

use tracing::{info, warn};

use super::WalletManager;
use crate::core::domain::StoredWallet;
use crate::core::errors::WalletError;
use crate::core::wallet::{self, GeneratedWallet};
use crate::security::redaction::short_hex;
use crate::security::{validate_passphrase, SecretString};

/// What `dewallet status` reports. Reading it needs no passphrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletStatus {
    pub has_wallet: bool,
    pub address: Option<String>,
    pub legacy_record: bool,
    pub network: String,
}

impl WalletManager {
    /// Generate a new wallet, seal it under `passphrase` and persist it.
    ///
    /// The returned material carries the mnemonic so the caller can show it
    /// once; nothing else keeps a plaintext copy.
    ///
    /// # Errors
    /// * `WalletError::ValidationError` - a wallet already exists
    /// * `WalletError::SecurityError` - the passphrase does not meet the policy
    /// * `WalletError::KeyGenerationFailed` - entropy could not be read
    pub async fn create_wallet(
        &self,
        passphrase: &str,
        words: Option<usize>,
    ) -> Result<GeneratedWallet, WalletError> {
        self.ensure_empty().await?;
        validate_passphrase(passphrase, &self.passphrase_policy)?;

        let generated = wallet::generate(words.unwrap_or(self.config.mnemonic_words))?;
        self.persist(&generated, passphrase).await?;
        info!(address = %short_hex(&generated.address), "Wallet created");
        Ok(generated)
    }

    /// Restore a wallet from an existing seed phrase.
    pub async fn import_wallet(
        &self,
        phrase: &str,
        passphrase: &str,
    ) -> Result<String, WalletError> {
        self.ensure_empty().await?;
        validate_passphrase(passphrase, &self.passphrase_policy)?;

        let imported = wallet::from_mnemonic(phrase)?;
        self.persist(&imported, passphrase).await?;
        info!(address = %short_hex(&imported.address), "Wallet imported");
        Ok(imported.address.clone())
    }

    /// Address of the stored wallet; `NoWallet` when there is none.
    pub async fn wallet_address(&self) -> Result<String, WalletError> {
        self.session.require_wallet().await?;
        self.store.address().await?.ok_or(WalletError::NoWallet)
    }

    /// Decrypt the seed phrase for backup.
    pub async fn export_seed_phrase(&self, passphrase: &str) -> Result<SecretString, WalletError> {
        let record = self.load_record().await?;
        let phrase = record.seed_phrase(passphrase)?;
        warn!(address = %short_hex(&record.address), "Seed phrase decrypted for export");
        Ok(phrase)
    }

    /// Rewrite a plaintext record from an earlier revision. Returns `false` when
    /// the store was already in the sealed form.
    pub async fn migrate_legacy(&self, passphrase: &str) -> Result<bool, WalletError> {
        let migrated = self.store.migrate_legacy(passphrase, &self.config.kdf).await?;
        if migrated {
            self.balance_cache.write().take();
        }
        Ok(migrated)
    }

    pub async fn clear_wallet(&self) -> Result<(), WalletError> {
        self.store.clear().await?;
        self.balance_cache.write().take();
        Ok(())
    }

    pub async fn status(&self) -> Result<WalletStatus, WalletError> {
        let has_wallet = self.session.has_wallet().await?;
        let address = self.store.address().await?;
        let legacy_record = self.store.has_legacy_record().await?;
        Ok(WalletStatus {
            has_wallet,
            address,
            legacy_record,
            network: self.client.get_network_name().to_string(),
        })
    }

    /// The sealed record, failing with `NoWallet` if there is none.
    pub(crate) async fn load_record(&self) -> Result<StoredWallet, WalletError> {
        self.session.require_wallet().await?;
        self.store.read().await?.ok_or(WalletError::NoWallet)
    }

    async fn ensure_empty(&self) -> Result<(), WalletError> {
        if self.store.has_legacy_record().await? {
            return Err(WalletError::ValidationError(
                "A wallet from an earlier version is stored; run `dewallet migrate` first".into(),
            ));
        }
        if self.session.has_wallet().await? {
            return Err(WalletError::ValidationError(
                "A wallet already exists; clear it before creating another".into(),
            ));
        }
        Ok(())
    }

    async fn persist(&self, wallet: &GeneratedWallet, passphrase: &str) -> Result<(), WalletError> {
        let record = StoredWallet::seal(wallet, passphrase, &self.config.kdf)?;
        self.store.save(&record).await?;
        self.balance_cache.write().take();
        Ok(())
    }
}
