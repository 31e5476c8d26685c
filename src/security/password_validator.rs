//! Passphrase strength validation for the key that seals wallet secrets.

use crate::core::errors::WalletError;

/// Passphrase strength levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PassphraseStrength {
    Weak,
    Medium,
    Strong,
    VeryStrong,
}

#[derive(Debug, Clone)]
pub struct PassphrasePolicy {
    pub min_length: usize,
    pub require_letter: bool,
    pub require_digit: bool,
    pub min_strength: PassphraseStrength,
}

impl Default for PassphrasePolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_letter: true,
            require_digit: true,
            min_strength: PassphraseStrength::Medium,
        }
    }
}

impl PassphrasePolicy {
    pub fn strict() -> Self {
        Self {
            min_length: 12,
            require_letter: true,
            require_digit: true,
            min_strength: PassphraseStrength::Strong,
        }
    }
}

const WEAK_PASSPHRASES: [&str; 10] = [
    "password", "123456", "12345678", "qwerty", "abc123", "password123", "admin", "letmein",
    "welcome", "monkey",
];

/// Validate `passphrase` against `policy`, returning its strength.
pub fn validate_passphrase(
    passphrase: &str,
    policy: &PassphrasePolicy,
) -> Result<PassphraseStrength, WalletError> {
    if passphrase.is_empty() {
        return Err(WalletError::SecurityError("Passphrase cannot be empty".to_string()));
    }

    if passphrase.chars().count() < policy.min_length {
        return Err(WalletError::SecurityError(format!(
            "Passphrase must be at least {} characters",
            policy.min_length
        )));
    }

    if policy.require_letter && !passphrase.chars().any(|c| c.is_alphabetic()) {
        return Err(WalletError::SecurityError("Passphrase must contain a letter".to_string()));
    }

    if policy.require_digit && !passphrase.chars().any(|c| c.is_ascii_digit()) {
        return Err(WalletError::SecurityError("Passphrase must contain a digit".to_string()));
    }

    let lower = passphrase.to_lowercase();
    if WEAK_PASSPHRASES.iter().any(|&weak| lower.contains(weak)) {
        return Err(WalletError::SecurityError(
            "Passphrase is too common, choose a less predictable one".to_string(),
        ));
    }

    let strength = calculate_strength(passphrase);
    if strength < policy.min_strength {
        return Err(WalletError::SecurityError(format!(
            "Passphrase too weak, at least {:?} required",
            policy.min_strength
        )));
    }

    Ok(strength)
}

fn calculate_strength(passphrase: &str) -> PassphraseStrength {
    let mut score = match passphrase.chars().count() {
        0..=7 => 0,
        8..=11 => 1,
        12..=15 => 2,
        _ => 3,
    };

    if passphrase.chars().any(|c| c.is_lowercase()) {
        score += 1;
    }
    if passphrase.chars().any(|c| c.is_uppercase()) {
        score += 1;
    }
    if passphrase.chars().any(|c| c.is_ascii_digit()) {
        score += 1;
    }
    if passphrase.chars().any(|c| !c.is_alphanumeric()) {
        score += 2;
    }

    match score {
        0..=2 => PassphraseStrength::Weak,
        3..=5 => PassphraseStrength::Medium,
        6..=7 => PassphraseStrength::Strong,
        _ => PassphraseStrength::VeryStrong,
    }
}
