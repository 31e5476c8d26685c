// src/security/encryption.rs
//! Passphrase-based sealing of wallet secrets at rest.
//!
//! Every sensitive value in the wallet store is kept as a [`SealedSecret`]:
//! AES-256-GCM under a key derived from the user's passphrase, with the
//! storage key name bound in as associated data. Envelopes carry their own
//! KDF parameters and salt, so they can be opened after defaults change.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::Aes256Gcm;
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::core::errors::WalletError;
use crate::crypto::kdf::{KdfParams, KEY_LEN};
use crate::security::secret::SecretVec;

pub const ENVELOPE_VERSION: u8 = 1;
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;

/// Encrypted value as persisted in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedSecret {
    pub version: u8,
    pub kdf: KdfParams,
    #[serde(with = "b64")]
    pub salt: Vec<u8>,
    #[serde(with = "b64")]
    pub nonce: Vec<u8>,
    #[serde(with = "b64")]
    pub ciphertext: Vec<u8>,
}

/// A passphrase-derived key together with the salt and parameters it came from.
/// Lets one save seal several fields with a single (slow) derivation.
pub struct SealingKey {
    kdf: KdfParams,
    salt: Vec<u8>,
    key: Zeroizing<[u8; KEY_LEN]>,
}

impl SealingKey {
    /// Derive a fresh key with a random salt.
    pub fn derive(passphrase: &str, kdf: &KdfParams) -> Result<Self, WalletError> {
        let salt = KdfParams::generate_salt(SALT_LEN)?;
        Self::derive_with_salt(passphrase, kdf, salt)
    }

    fn derive_with_salt(
        passphrase: &str,
        kdf: &KdfParams,
        salt: Vec<u8>,
    ) -> Result<Self, WalletError> {
        let key = kdf.derive_key(passphrase.as_bytes(), &salt)?;
        Ok(Self { kdf: kdf.clone(), salt, key })
    }

    /// Encrypt `plaintext`, binding it to `aad` (the storage key name).
    pub fn seal(&self, plaintext: &[u8], aad: &str) -> Result<SealedSecret, WalletError> {
        let cipher = Aes256Gcm::new_from_slice(&self.key[..])
            .map_err(|_| WalletError::CryptoError("Invalid key length".to_string()))?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng
            .try_fill_bytes(&mut nonce_bytes)
            .map_err(|e| WalletError::CryptoError(format!("Entropy source unavailable: {}", e)))?;
        #[allow(deprecated)]
        let nonce = aes_gcm::aead::Nonce::<Aes256Gcm>::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, Payload { msg: plaintext, aad: aad.as_bytes() })
            .map_err(|_| WalletError::CryptoError("Encryption failed".to_string()))?;

        Ok(SealedSecret {
            version: ENVELOPE_VERSION,
            kdf: self.kdf.clone(),
            salt: self.salt.clone(),
            nonce: nonce_bytes.to_vec(),
            ciphertext,
        })
    }

    fn open(&self, sealed: &SealedSecret, aad: &str) -> Result<SecretVec, WalletError> {
        let cipher = Aes256Gcm::new_from_slice(&self.key[..])
            .map_err(|_| WalletError::DecryptionError("Invalid key length".to_string()))?;
        #[allow(deprecated)]
        let nonce = aes_gcm::aead::Nonce::<Aes256Gcm>::from_slice(&sealed.nonce);
        let plaintext = cipher
            .decrypt(nonce, Payload { msg: &sealed.ciphertext, aad: aad.as_bytes() })
            .map_err(|_| {
                WalletError::DecryptionError("wrong passphrase or corrupted secret".to_string())
            })?;
        Ok(Zeroizing::new(plaintext))
    }
}

impl SealedSecret {
    /// Decrypt with `passphrase`. The plaintext is returned in a zeroizing buffer
    /// and should be dropped as soon as the caller is done with it.
    pub fn open(&self, passphrase: &str, aad: &str) -> Result<SecretVec, WalletError> {
        if self.version != ENVELOPE_VERSION {
            return Err(WalletError::DecryptionError(format!(
                "Unsupported envelope version {}",
                self.version
            )));
        }
        if self.nonce.len() != NONCE_LEN {
            return Err(WalletError::DecryptionError("Malformed nonce".to_string()));
        }
        let key = SealingKey::derive_with_salt(passphrase, &self.kdf, self.salt.clone())?;
        key.open(self, aad)
    }

    /// Serialized form stored under a key in the wallet store.
    pub fn to_storage_string(&self) -> Result<String, WalletError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a stored value. Returns `None` for values that are not envelopes
    /// (plaintext written by older revisions).
    pub fn from_storage_string(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

mod b64 {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        base64::engine::general_purpose::STANDARD.decode(s).map_err(serde::de::Error::custom)
    }
}
