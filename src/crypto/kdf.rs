use pbkdf2::pbkdf2_hmac;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;
use zeroize::Zeroizing;

use crate::core::errors::WalletError;

/// Length of every derived passphrase key (AES-256).
pub const KEY_LEN: usize = 32;

/// Passphrase key derivation parameters. Stored next to every sealed secret so
/// that changing the configured defaults never strands existing records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "lowercase")]
pub enum KdfParams {
    Argon2id { memory_kib: u32, iterations: u32, parallelism: u32 },
    Scrypt { log_n: u8, r: u32, p: u32 },
    Pbkdf2 { iterations: u32 },
}

impl Default for KdfParams {
    fn default() -> Self {
        // OWASP baseline for Argon2id: 19 MiB, 2 passes, 1 lane
        KdfParams::Argon2id { memory_kib: 19_456, iterations: 2, parallelism: 1 }
    }
}

impl KdfParams {
    pub fn scrypt() -> Self {
        KdfParams::Scrypt { log_n: 15, r: 8, p: 1 }
    }

    pub fn pbkdf2(iterations: u32) -> Self {
        KdfParams::Pbkdf2 { iterations }
    }

    /// Derive a 32-byte key from `passphrase` and `salt`.
    pub fn derive_key(
        &self,
        passphrase: &[u8],
        salt: &[u8],
    ) -> Result<Zeroizing<[u8; KEY_LEN]>, WalletError> {
        if salt.len() < 8 {
            return Err(WalletError::KeyDerivationError(
                "Salt must be at least 8 bytes".to_string(),
            ));
        }
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        match self {
            KdfParams::Argon2id { memory_kib, iterations, parallelism } => {
                debug!("Using Argon2id m={} t={} p={}", memory_kib, iterations, parallelism);
                let params =
                    argon2::Params::new(*memory_kib, *iterations, *parallelism, Some(KEY_LEN))
                        .map_err(|e| {
                            WalletError::KeyDerivationError(format!(
                                "Invalid Argon2 parameters: {}",
                                e
                            ))
                        })?;
                argon2::Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params)
                    .hash_password_into(passphrase, salt, &mut key[..])
                    .map_err(|e| {
                        WalletError::KeyDerivationError(format!("Argon2 derivation failed: {}", e))
                    })?;
            }
            KdfParams::Scrypt { log_n, r, p } => {
                debug!("Using Scrypt with parameters log_n={}, r={}, p={}", log_n, r, p);
                let params = scrypt::Params::new(*log_n, *r, *p, KEY_LEN).map_err(|e| {
                    WalletError::KeyDerivationError(format!("Invalid Scrypt parameters: {}", e))
                })?;
                scrypt::scrypt(passphrase, salt, &params, &mut key[..]).map_err(|e| {
                    WalletError::KeyDerivationError(format!("Scrypt derivation failed: {}", e))
                })?;
            }
            KdfParams::Pbkdf2 { iterations } => {
                if *iterations == 0 {
                    return Err(WalletError::KeyDerivationError(
                        "PBKDF2 iterations must be non-zero".to_string(),
                    ));
                }
                debug!("Using PBKDF2 with {} iterations", iterations);
                pbkdf2_hmac::<Sha256>(passphrase, salt, *iterations, &mut key[..]);
            }
        }
        Ok(key)
    }

    pub fn generate_salt(length: usize) -> Result<Vec<u8>, WalletError> {
        use rand_core::{OsRng, RngCore};
        let mut salt = vec![0u8; length];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|e| WalletError::CryptoError(format!("Entropy source unavailable: {}", e)))?;
        Ok(salt)
    }
}
