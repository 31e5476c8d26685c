// src/lib.rs
//! DeWallet: a self-custodial Ethereum wallet whose transfers and recovery
//! requests go through the DeWallet contract.

pub mod blockchain;
pub mod cli;
pub mod core;
pub mod crypto;
pub mod security;
pub mod storage;

pub use crate::core::errors::WalletError;
pub use crate::core::WalletManager;
