//! Calls into the DeWallet contract and ERC-20 token contracts.
//!
//! Calldata is built locally from the function signatures with the helpers in
//! `core::abi`; the node only ever sees raw bytes.

use std::sync::Arc;

use ethers::types::{Address, Bytes, U256};
use tracing::{info, warn};

use super::traits::BlockchainClient;
use crate::core::abi::{
    abi_pack, abi_word_address, abi_word_bytes32, abi_word_uint256, decode_uint256,
    selector_from_signature,
};
use crate::core::domain::{PrivateKey, TransactionStatus, TxReceipt};
use crate::core::errors::WalletError;

pub const SIG_TRANSFER_ETH: &str = "transferETH(address)";
pub const SIG_TRANSFER_TOKEN: &str = "transferToken(address,address,uint256)";
pub const SIG_CREATE_WALLET: &str = "createWallet(bytes32)";
pub const SIG_INITIATE_RECOVERY: &str = "initiateRecovery(bytes32)";
pub const SIG_ESTIMATE_GAS_FEE: &str = "estimateGasFee(address,uint256)";
pub const SIG_BALANCE_OF: &str = "balanceOf(address)";

pub fn transfer_eth_calldata(to: Address) -> Bytes {
    abi_pack(selector_from_signature(SIG_TRANSFER_ETH), &[abi_word_address(to)]).into()
}

pub fn transfer_token_calldata(token: Address, to: Address, amount: U256) -> Bytes {
    abi_pack(
        selector_from_signature(SIG_TRANSFER_TOKEN),
        &[abi_word_address(token), abi_word_address(to), abi_word_uint256(amount)],
    )
    .into()
}

pub fn create_wallet_calldata(seed_hash: [u8; 32]) -> Bytes {
    abi_pack(selector_from_signature(SIG_CREATE_WALLET), &[abi_word_bytes32(seed_hash)]).into()
}

pub fn initiate_recovery_calldata(seed_hash: [u8; 32]) -> Bytes {
    abi_pack(selector_from_signature(SIG_INITIATE_RECOVERY), &[abi_word_bytes32(seed_hash)]).into()
}

pub fn estimate_gas_fee_calldata(to: Address, value: U256) -> Bytes {
    abi_pack(
        selector_from_signature(SIG_ESTIMATE_GAS_FEE),
        &[abi_word_address(to), abi_word_uint256(value)],
    )
    .into()
}

pub fn balance_of_calldata(owner: Address) -> Bytes {
    abi_pack(selector_from_signature(SIG_BALANCE_OF), &[abi_word_address(owner)]).into()
}

/// Handle on the deployed DeWallet contract.
#[derive(Clone)]
pub struct DeWalletContract {
    address: Address,
    client: Arc<dyn BlockchainClient>,
}

impl DeWalletContract {
    pub fn new(address: Address, client: Arc<dyn BlockchainClient>) -> Self {
        Self { address, client }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// `transferETH(to)` with `value` wei attached.
    pub async fn transfer_eth(
        &self,
        key: &PrivateKey,
        to: Address,
        value: U256,
    ) -> Result<TxReceipt, WalletError> {
        self.submit("transferETH", key, transfer_eth_calldata(to), value).await
    }

    pub async fn transfer_token(
        &self,
        key: &PrivateKey,
        token: Address,
        to: Address,
        amount: U256,
    ) -> Result<TxReceipt, WalletError> {
        self.submit("transferToken", key, transfer_token_calldata(token, to, amount), U256::zero())
            .await
    }

    pub async fn create_wallet(
        &self,
        key: &PrivateKey,
        seed_hash: [u8; 32],
    ) -> Result<TxReceipt, WalletError> {
        self.submit("createWallet", key, create_wallet_calldata(seed_hash), U256::zero()).await
    }

    pub async fn initiate_recovery(
        &self,
        key: &PrivateKey,
        seed_hash: [u8; 32],
    ) -> Result<TxReceipt, WalletError> {
        self.submit("initiateRecovery", key, initiate_recovery_calldata(seed_hash), U256::zero())
            .await
    }

    /// Fee quote in wei from the contract's `estimateGasFee` view.
    pub async fn estimate_gas_fee(&self, to: Address, value: U256) -> Result<U256, WalletError> {
        let out = self.client.call(self.address, estimate_gas_fee_calldata(to, value)).await?;
        decode_uint256(&out)
    }

    async fn submit(
        &self,
        method: &str,
        key: &PrivateKey,
        data: Bytes,
        value: U256,
    ) -> Result<TxReceipt, WalletError> {
        info!(method, network = self.client.get_network_name(), "Submitting contract call");
        let receipt = self.client.send_contract_call(key, self.address, data, value).await?;
        match receipt.status {
            TransactionStatus::Confirmed => {
                info!(method, tx_hash = %receipt.tx_hash, "Contract call confirmed");
                Ok(receipt)
            }
            TransactionStatus::Reverted => {
                warn!(method, tx_hash = %receipt.tx_hash, "Contract call reverted");
                Err(WalletError::TransactionFailed(format!(
                    "{} reverted in transaction {}",
                    method, receipt.tx_hash
                )))
            }
        }
    }
}

/// ERC-20 `balanceOf(owner)` in base units.
pub async fn token_balance_of(
    client: &dyn BlockchainClient,
    token: Address,
    owner: Address,
) -> Result<U256, WalletError> {
    let out = client.call(token, balance_of_calldata(owner)).await?;
    decode_uint256(&out)
}
