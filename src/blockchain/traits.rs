use async_trait::async_trait;
use ethers::types::{Address, Bytes, U256};

use crate::core::domain::{PrivateKey, TxReceipt};
use crate::core::errors::WalletError;

/// Defines the interface the wallet needs from an Ethereum node.
#[async_trait]
pub trait BlockchainClient: Send + Sync {
    /// Native balance of `address` in ether, normalized (`"0"` for an empty account).
    async fn get_balance(&self, address: &str) -> Result<String, WalletError>;

    /// Read-only `eth_call` against `to`.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, WalletError>;

    /// Sign and submit a call to `to` with `value` wei attached, then wait for the
    /// configured confirmation depth. A mined but reverted transaction is returned
    /// with `TransactionStatus::Reverted`; callers decide how to surface it.
    async fn send_contract_call(
        &self,
        private_key: &PrivateKey,
        to: Address,
        data: Bytes,
        value: U256,
    ) -> Result<TxReceipt, WalletError>;

    /// Chain id reported by the node.
    async fn get_chain_id(&self) -> Result<u64, WalletError>;

    /// Returns the name of the network (e.g., "sepolia").
    fn get_network_name(&self) -> &str;
}
