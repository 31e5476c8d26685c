pub mod abi;
pub mod config;
pub mod domain;
pub mod errors;
pub mod session;
pub mod wallet;
pub mod wallet_manager;

pub use wallet_manager::WalletManager;
