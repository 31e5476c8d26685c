// src/security/mod.rs
//! Security-related functionality for the wallet: sealing secrets at rest,
//! zeroizing buffers, passphrase policy and log redaction.

pub mod encryption;
pub mod password_validator;
pub mod redaction;
pub mod secret;

pub use encryption::{SealedSecret, SealingKey};
pub use password_validator::{validate_passphrase, PassphrasePolicy, PassphraseStrength};
pub use secret::{SecretString, SecretVec};
