use ethers::types::{Address, U256};
use sha3::{Digest, Keccak256};

use crate::core::errors::WalletError;

/// Compute the first 4 bytes (function selector) from a signature string, e.g. "transferETH(address)".
pub fn selector_from_signature(signature: &str) -> [u8; 4] {
    let mut keccak = Keccak256::new();
    keccak.update(signature.as_bytes());
    let out = keccak.finalize();
    [out[0], out[1], out[2], out[3]]
}

/// Encode an Ethereum address into a 32-byte ABI word (left-padded).
pub fn abi_word_address(addr: Address) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[12..].copy_from_slice(addr.as_bytes());
    out
}

/// Encode an unsigned integer as a 32-byte big-endian ABI word.
pub fn abi_word_uint256(value: U256) -> [u8; 32] {
    let mut out = [0u8; 32];
    value.to_big_endian(&mut out);
    out
}

/// A `bytes32` argument is already a full word.
pub fn abi_word_bytes32(value: [u8; 32]) -> [u8; 32] {
    value
}

/// Pack a selector and ABI words contiguously into calldata.
pub fn abi_pack(selector: [u8; 4], words: &[[u8; 32]]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + 32 * words.len());
    out.extend_from_slice(&selector);
    for w in words {
        out.extend_from_slice(w);
    }
    out
}

/// Decode the single `uint256` returned by a view call.
pub fn decode_uint256(data: &[u8]) -> Result<U256, WalletError> {
    if data.len() < 32 {
        return Err(WalletError::SerializationError(format!(
            "Expected a 32-byte uint256 return value, got {} bytes",
            data.len()
        )));
    }
    Ok(U256::from_big_endian(&data[..32]))
}
