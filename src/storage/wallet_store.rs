//! Persistence of the single wallet record.
//!
//! Three keys make up a record: `walletAddress` (clear), `encryptedPrivateKey`
//! and `seedPhrase` (both [`SealedSecret`] envelopes). A record missing any of
//! them counts as no wallet. Earlier revisions wrote the private key in clear
//! under `privateKey` and the phrase in clear under `seedPhrase`;
//! [`WalletStore::migrate_legacy`] rewrites those into the sealed form.

use std::sync::Arc;

use tracing::{info, warn};

use super::{KeyValueStore, WriteBatch};
use crate::core::domain::{PrivateKey, StoredWallet};
use crate::core::errors::WalletError;
use crate::core::wallet::{address_from_private_key, from_mnemonic, GeneratedWallet};
use crate::crypto::KdfParams;
use crate::security::redaction::short_hex;
use crate::security::secret::secret_to_string;
use crate::security::{SealedSecret, SealingKey, SecretString};

pub const KEY_WALLET_ADDRESS: &str = "walletAddress";
pub const KEY_ENCRYPTED_PRIVATE_KEY: &str = "encryptedPrivateKey";
pub const KEY_SEED_PHRASE: &str = "seedPhrase";
pub const LEGACY_KEY_PRIVATE_KEY: &str = "privateKey";

const ALL_KEYS: [&str; 4] =
    [KEY_WALLET_ADDRESS, KEY_ENCRYPTED_PRIVATE_KEY, KEY_SEED_PHRASE, LEGACY_KEY_PRIVATE_KEY];

fn storage_err(e: anyhow::Error) -> WalletError {
    WalletError::StorageError(format!("{:#}", e))
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

impl StoredWallet {
    /// Seal freshly generated (or imported) material under `passphrase`.
    pub fn seal(
        wallet: &GeneratedWallet,
        passphrase: &str,
        kdf: &KdfParams,
    ) -> Result<Self, WalletError> {
        let key = SealingKey::derive(passphrase, kdf)?;
        let encrypted_private_key =
            wallet.private_key.with_secret(|b| key.seal(b, KEY_ENCRYPTED_PRIVATE_KEY))?;
        let encrypted_seed_phrase = key.seal(wallet.mnemonic.as_bytes(), KEY_SEED_PHRASE)?;
        Ok(Self { address: wallet.address.clone(), encrypted_private_key, encrypted_seed_phrase })
    }

    /// Decrypt the signing key. Keep the result scoped to the operation using it.
    pub fn private_key(&self, passphrase: &str) -> Result<PrivateKey, WalletError> {
        let bytes = self.encrypted_private_key.open(passphrase, KEY_ENCRYPTED_PRIVATE_KEY)?;
        PrivateKey::try_from_slice(&bytes)
    }

    pub fn seed_phrase(&self, passphrase: &str) -> Result<SecretString, WalletError> {
        let bytes = self.encrypted_seed_phrase.open(passphrase, KEY_SEED_PHRASE)?;
        secret_to_string(bytes)
            .map_err(|_| WalletError::DecryptionError("Seed phrase is not valid UTF-8".into()))
    }
}

#[derive(Clone)]
pub struct WalletStore {
    store: Arc<dyn KeyValueStore>,
}

impl WalletStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Write all three fields in one batch. Any legacy plaintext key is dropped
    /// in the same batch.
    pub async fn save(&self, record: &StoredWallet) -> Result<(), WalletError> {
        if record.address.trim().is_empty() {
            return Err(WalletError::ValidationError("Wallet address is empty".into()));
        }
        let batch = WriteBatch::new()
            .delete(LEGACY_KEY_PRIVATE_KEY)
            .put(KEY_WALLET_ADDRESS, record.address.clone())
            .put(KEY_ENCRYPTED_PRIVATE_KEY, record.encrypted_private_key.to_storage_string()?)
            .put(KEY_SEED_PHRASE, record.encrypted_seed_phrase.to_storage_string()?);
        self.store.write_batch(batch).await.map_err(storage_err)?;
        info!(address = %short_hex(&record.address), "Wallet record saved");
        Ok(())
    }

    /// True iff all three record fields are present and non-empty.
    pub async fn exists(&self) -> Result<bool, WalletError> {
        let values = self
            .store
            .get_many(&[KEY_WALLET_ADDRESS, KEY_ENCRYPTED_PRIVATE_KEY, KEY_SEED_PHRASE])
            .await
            .map_err(storage_err)?;
        Ok(values.into_iter().all(|v| non_empty(v).is_some()))
    }

    /// The stored record, or `None` when there is no complete record. Fields
    /// that are present but not sealed envelopes are an inconsistency.
    pub async fn read(&self) -> Result<Option<StoredWallet>, WalletError> {
        let mut values = self
            .store
            .get_many(&[KEY_WALLET_ADDRESS, KEY_ENCRYPTED_PRIVATE_KEY, KEY_SEED_PHRASE])
            .await
            .map_err(storage_err)?
            .into_iter()
            .map(non_empty);
        let (Some(Some(address)), Some(Some(private_key)), Some(Some(seed))) =
            (values.next(), values.next(), values.next())
        else {
            return Ok(None);
        };

        let encrypted_private_key = SealedSecret::from_storage_string(&private_key)
            .ok_or_else(|| inconsistent(KEY_ENCRYPTED_PRIVATE_KEY))?;
        let encrypted_seed_phrase =
            SealedSecret::from_storage_string(&seed).ok_or_else(|| inconsistent(KEY_SEED_PHRASE))?;
        Ok(Some(StoredWallet { address, encrypted_private_key, encrypted_seed_phrase }))
    }

    /// Address only; does not require the secrets to be sealed.
    pub async fn address(&self) -> Result<Option<String>, WalletError> {
        Ok(non_empty(self.store.get(KEY_WALLET_ADDRESS).await.map_err(storage_err)?))
    }

    /// Remove every stored key, legacy plaintext included.
    pub async fn clear(&self) -> Result<(), WalletError> {
        self.store.clear().await.map_err(storage_err)?;
        info!("Wallet record cleared");
        Ok(())
    }

    /// Whether the store holds plaintext material from an earlier revision.
    pub async fn has_legacy_record(&self) -> Result<bool, WalletError> {
        let snapshot = self.snapshot().await?;
        Ok(snapshot.is_legacy())
    }

    /// Re-encrypt a legacy record into the sealed form under `passphrase` and
    /// remove the plaintext key, all in one batch. Returns `false` when there
    /// was nothing to migrate.
    pub async fn migrate_legacy(
        &self,
        passphrase: &str,
        kdf: &KdfParams,
    ) -> Result<bool, WalletError> {
        let snapshot = self.snapshot().await?;
        if !snapshot.is_legacy() {
            return Ok(false);
        }
        warn!("Legacy plaintext wallet record found, migrating");

        // The seed phrase is the root of the record; everything else must agree with it.
        let phrase = match snapshot.seed.as_ref() {
            Some(RawField::Plain(phrase)) => phrase.clone(),
            Some(RawField::Sealed(sealed)) => secret_to_string(sealed.open(passphrase, KEY_SEED_PHRASE)?)
                .map_err(|_| WalletError::DecryptionError("Seed phrase is not valid UTF-8".into()))?,
            None => {
                return Err(WalletError::StorageError(
                    "Legacy record has no seed phrase; clear it and import the wallet again".into(),
                ))
            }
        };
        let wallet = from_mnemonic(&phrase)?;

        for field in [snapshot.private_key.as_ref(), snapshot.legacy_key.as_ref()].into_iter().flatten() {
            let key = match field {
                RawField::Plain(hex_key) => PrivateKey::from_hex(hex_key)?,
                RawField::Sealed(sealed) => {
                    PrivateKey::try_from_slice(&sealed.open(passphrase, KEY_ENCRYPTED_PRIVATE_KEY)?)?
                }
            };
            let key_address = address_from_private_key(&key)?;
            if !key_address.eq_ignore_ascii_case(&wallet.address) {
                return Err(mismatch("private key", &key_address, &wallet.address));
            }
        }
        if let Some(address) = snapshot.address.as_deref() {
            if !address.trim().eq_ignore_ascii_case(&wallet.address) {
                return Err(mismatch("walletAddress", address, &wallet.address));
            }
        }

        // Re-seal both secrets so the record opens with one passphrase.
        let sealing = SealingKey::derive(passphrase, kdf)?;
        let encrypted_seed_phrase = sealing.seal(wallet.mnemonic.as_bytes(), KEY_SEED_PHRASE)?;
        let encrypted_private_key =
            wallet.private_key.with_secret(|b| sealing.seal(b, KEY_ENCRYPTED_PRIVATE_KEY))?;
        let address = wallet.address.clone();

        self.save(&StoredWallet { address, encrypted_private_key, encrypted_seed_phrase }).await?;
        info!("Legacy wallet record migrated");
        Ok(true)
    }

    async fn snapshot(&self) -> Result<RawRecord, WalletError> {
        let mut values =
            self.store.get_many(&ALL_KEYS).await.map_err(storage_err)?.into_iter().map(non_empty);
        let address = values.next().flatten();
        let private_key = values.next().flatten().map(RawField::parse);
        let seed = values.next().flatten().map(RawField::parse);
        let legacy_key = values.next().flatten().map(RawField::parse);
        Ok(RawRecord { address, private_key, seed, legacy_key })
    }
}

fn mismatch(field: &str, found: &str, derived: &str) -> WalletError {
    WalletError::StorageError(format!(
        "Legacy {} belongs to {} but the seed phrase derives {}; refusing to migrate",
        field,
        short_hex(found),
        short_hex(derived)
    ))
}

fn inconsistent(key: &str) -> WalletError {
    WalletError::StorageError(format!(
        "Stored `{}` is not an encrypted envelope; run `dewallet migrate`",
        key
    ))
}

enum RawField {
    Sealed(SealedSecret),
    Plain(SecretString),
}

impl RawField {
    fn parse(raw: String) -> Self {
        match SealedSecret::from_storage_string(&raw) {
            Some(sealed) => RawField::Sealed(sealed),
            None => RawField::Plain(SecretString::new(raw)),
        }
    }

    fn is_plain(&self) -> bool {
        matches!(self, RawField::Plain(_))
    }
}

struct RawRecord {
    address: Option<String>,
    private_key: Option<RawField>,
    seed: Option<RawField>,
    legacy_key: Option<RawField>,
}

impl RawRecord {
    fn is_legacy(&self) -> bool {
        self.legacy_key.is_some()
            || self.private_key.as_ref().is_some_and(RawField::is_plain)
            || self.seed.as_ref().is_some_and(RawField::is_plain)
    }
}
