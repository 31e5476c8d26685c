// filepath: src/core/wallet/recover.rs
//! Seed phrase hashing shared by on-chain registration and recovery.
//!
//! The contract only ever sees `keccak256(phrase)`. Registration hashes the
//! stored phrase and recovery hashes what the user types, so both go through
//! [`normalize_phrase`] first.

use ethers::utils::keccak256;
use zeroize::Zeroizing;

use crate::core::errors::WalletError;

/// Collapse runs of whitespace and trim the ends.
pub fn normalize_phrase(phrase: &str) -> Zeroizing<String> {
    Zeroizing::new(phrase.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// keccak256 over the UTF-8 bytes of the normalized phrase. Empty phrases are rejected.
pub fn seed_phrase_hash(phrase: &str) -> Result<[u8; 32], WalletError> {
    let normalized = normalize_phrase(phrase);
    if normalized.is_empty() {
        return Err(WalletError::ValidationError("Seed phrase is required".to_string()));
    }
    Ok(keccak256(normalized.as_bytes()))
}
