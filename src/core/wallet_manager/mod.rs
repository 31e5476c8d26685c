//! Wallet Manager Core Module
//!
//! Ties the wallet store, the session guard and the chain client together for
//! callers (the CLI, tests).
//!
//! ## Module Structure
//! - `lifecycle` - create, import, export, migrate, clear
//! - `balance` - native and token balances with a last-known cache
//! - `transactions` - transfers through the DeWallet contract and fee quotes
//! - `recovery` - on-chain registration and recovery initiation

pub mod balance;
pub mod lifecycle;
pub mod recovery;
pub mod transactions;

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::blockchain::ethereum::parse_address;
use crate::blockchain::{BlockchainClient, DeWalletContract, EthereumClient};
use crate::core::config::WalletConfig;
use crate::core::domain::TokenDescriptor;
use crate::core::errors::WalletError;
use crate::core::session::SessionGuard;
use crate::security::PassphrasePolicy;
use crate::storage::{FileStore, KeyValueStore, WalletStore};

pub use lifecycle::WalletStatus;

pub struct WalletManager {
    pub config: WalletConfig,
    store: WalletStore,
    session: SessionGuard,
    client: Arc<dyn BlockchainClient>,
    contract: DeWalletContract,
    passphrase_policy: PassphrasePolicy,
    /// Last successfully fetched balances
    balance_cache: Arc<RwLock<Option<Vec<TokenDescriptor>>>>,
}

impl WalletManager {
    /// Build a manager over an injected store and chain client.
    pub fn new(
        config: WalletConfig,
        kv: Arc<dyn KeyValueStore>,
        client: Arc<dyn BlockchainClient>,
    ) -> Result<Self, WalletError> {
        config.validate()?;
        let contract_address = parse_address(&config.contract_address).map_err(|e| {
            WalletError::ConfigError(format!("Invalid contract_address: {}", e))
        })?;
        let store = WalletStore::new(kv);
        Ok(Self {
            session: SessionGuard::new(store.clone()),
            contract: DeWalletContract::new(contract_address, client.clone()),
            store,
            client,
            config,
            passphrase_policy: PassphrasePolicy::default(),
            balance_cache: Arc::new(RwLock::new(None)),
        })
    }

    /// Manager over the configured JSON store and RPC endpoint. Does no network I/O.
    pub fn from_config(config: WalletConfig) -> Result<Self, WalletError> {
        let client = EthereumClient::new(&config.network)?.with_confirmations(config.confirmations);
        let kv = Arc::new(FileStore::new(config.store_path.clone()));
        Self::new(config, kv, Arc::new(client))
    }

    /// Check the endpoint serves the configured chain before anything is signed.
    pub async fn verify_network(&self) -> Result<(), WalletError> {
        let chain_id = self.client.get_chain_id().await?;
        if chain_id != self.config.network.chain_id {
            return Err(WalletError::ConfigError(format!(
                "RPC endpoint serves chain {} but {} (chain {}) is configured",
                chain_id, self.config.network.name, self.config.network.chain_id
            )));
        }
        info!("Connected to {} (Chain ID: {})", self.client.get_network_name(), chain_id);
        Ok(())
    }

    pub fn with_passphrase_policy(mut self, policy: PassphrasePolicy) -> Self {
        self.passphrase_policy = policy;
        self
    }

    pub fn store(&self) -> &WalletStore {
        &self.store
    }

    pub fn session(&self) -> &SessionGuard {
        &self.session
    }

    pub fn contract(&self) -> &DeWalletContract {
        &self.contract
    }
}
