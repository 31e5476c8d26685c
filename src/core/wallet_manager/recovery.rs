//! On-chain registration and recovery initiation.
//!
//! The contract knows a wallet only by the keccak256 hash of its seed phrase;
//! the phrase itself never leaves the machine.

use tracing::info;

use super::WalletManager;
use crate::core::domain::TxReceipt;
use crate::core::errors::WalletError;
use crate::core::wallet::seed_phrase_hash;

impl WalletManager {
    /// Register the stored wallet with the contract (`createWallet(hash)`), so a
    /// later recovery with the same phrase is recognised.
    pub async fn register(&self, passphrase: &str) -> Result<TxReceipt, WalletError> {
        let record = self.load_record().await?;
        let hash = {
            let phrase = record.seed_phrase(passphrase)?;
            seed_phrase_hash(&phrase)?
        };
        let key = record.private_key(passphrase)?;
        let receipt = self.contract.create_wallet(&key, hash).await?;
        info!(tx_hash = %receipt.tx_hash, "Wallet registered with contract");
        Ok(receipt)
    }

    /// Start recovery for `seed_phrase` (`initiateRecovery(hash)`). The phrase is
    /// checked for emptiness before anything else happens.
    pub async fn initiate_recovery(
        &self,
        seed_phrase: &str,
        passphrase: &str,
    ) -> Result<TxReceipt, WalletError> {
        let hash = seed_phrase_hash(seed_phrase)?;
        let record = self.load_record().await?;
        let key = record.private_key(passphrase)?;
        let receipt = self.contract.initiate_recovery(&key, hash).await?;
        info!(tx_hash = %receipt.tx_hash, "Recovery initiated");
        Ok(receipt)
    }
}
