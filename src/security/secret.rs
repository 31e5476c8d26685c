//! Small helpers and aliases for secret buffers that must be zeroized on drop.
use zeroize::Zeroizing;

/// Common alias for secret byte buffers which will be zeroed when dropped.
pub type SecretVec = Zeroizing<Vec<u8>>;

/// Passphrase or mnemonic text that is wiped when dropped.
pub type SecretString = Zeroizing<String>;

/// Interpret decrypted bytes as UTF-8 text without leaving a plain copy behind.
pub fn secret_to_string(v: SecretVec) -> Result<SecretString, std::str::Utf8Error> {
    let s = std::str::from_utf8(&v)?;
    Ok(Zeroizing::new(s.to_owned()))
}
