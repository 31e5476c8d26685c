pub mod contract;
pub mod ethereum;
pub mod traits;

pub use contract::DeWalletContract;
pub use ethereum::EthereumClient;
pub use traits::BlockchainClient;
