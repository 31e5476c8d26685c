// filepath: src/core/wallet/mod.rs
pub mod create;
pub mod recover;

pub use create::{address_from_private_key, from_mnemonic, generate, GeneratedWallet};
pub use recover::seed_phrase_hash;
