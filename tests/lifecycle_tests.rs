//! WalletManager flows against an in-memory store and a scripted chain client.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dewallet::blockchain::contract::{SIG_CREATE_WALLET, SIG_INITIATE_RECOVERY, SIG_TRANSFER_ETH};
use dewallet::blockchain::BlockchainClient;
use dewallet::core::abi::{abi_word_uint256, selector_from_signature};
use dewallet::core::config::{TokenConfig, WalletConfig};
use dewallet::core::domain::{PrivateKey, TransactionIntent, TransactionStatus, TxReceipt};
use dewallet::core::session::Route;
use dewallet::core::wallet::seed_phrase_hash;
use dewallet::crypto::KdfParams;
use dewallet::storage::MemoryStore;
use dewallet::{WalletError, WalletManager};
use ethers::types::{Address, Bytes, U256};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

const PASSPHRASE: &str = "correct-Horse-42-battery";
const PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
const PHRASE_ADDRESS: &str = "0x9858EfFD232B4033E47d90003D41EC34EcaEda94";
const RECIPIENT: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";

/// Behaves like the DeWallet contract: recovery only succeeds for a hash that
/// was registered first.
#[derive(Default)]
struct ScriptedChain {
    calls: AtomicUsize,
    balance: Mutex<Option<String>>,
    registered: Mutex<HashSet<Vec<u8>>>,
    sent: Mutex<Vec<(Address, Bytes, U256)>>,
    calls_to: Mutex<Vec<Address>>,
    /// Word returned by every `eth_call`; a 21000 gwei fee quote when unset.
    call_word: Option<U256>,
    chain_id: Option<u64>,
}

impl ScriptedChain {
    fn with_balance(balance: &str) -> Self {
        Self { balance: Mutex::new(Some(balance.to_string())), ..Default::default() }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlockchainClient for ScriptedChain {
    async fn get_balance(&self, _address: &str) -> Result<String, WalletError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.balance
            .lock()
            .clone()
            .ok_or_else(|| WalletError::NetworkError("connection refused".into()))
    }

    async fn call(&self, to: Address, _data: Bytes) -> Result<Bytes, WalletError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.calls_to.lock().push(to);
        let word = self.call_word.unwrap_or_else(|| U256::from(21_000_000_000_000u64));
        Ok(Bytes::from(abi_word_uint256(word).to_vec()))
    }

    async fn send_contract_call(
        &self,
        _private_key: &PrivateKey,
        to: Address,
        data: Bytes,
        value: U256,
    ) -> Result<TxReceipt, WalletError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().push((to, data.clone(), value));

        let selector = &data[..4];
        let arg = data[4..].to_vec();
        let ok = if selector == selector_from_signature(SIG_CREATE_WALLET) {
            self.registered.lock().insert(arg);
            true
        } else if selector == selector_from_signature(SIG_INITIATE_RECOVERY) {
            self.registered.lock().contains(&arg)
        } else {
            true
        };
        Ok(TxReceipt {
            tx_hash: format!("0x{:064x}", self.calls()),
            block_number: Some(7),
            gas_used: Some("21000".into()),
            status: if ok { TransactionStatus::Confirmed } else { TransactionStatus::Reverted },
        })
    }

    async fn get_chain_id(&self) -> Result<u64, WalletError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.chain_id.unwrap_or(11155111))
    }

    fn get_network_name(&self) -> &str {
        "sepolia"
    }
}

fn test_config() -> WalletConfig {
    WalletConfig { kdf: KdfParams::pbkdf2(1000), ..Default::default() }
}

const USDC_ADDRESS: &str = "0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238";

fn usdc_config() -> WalletConfig {
    let mut config = test_config();
    config.tokens.push(TokenConfig {
        symbol: "USDC".into(),
        name: "USD Coin".into(),
        address: USDC_ADDRESS.into(),
        decimals: 6,
        icon: "usdc".into(),
    });
    config
}

fn manager_with(chain: Arc<ScriptedChain>) -> (WalletManager, MemoryStore) {
    let kv = MemoryStore::new();
    let manager = WalletManager::new(test_config(), Arc::new(kv.clone()), chain).unwrap();
    (manager, kv)
}

#[tokio::test]
async fn test_create_then_export_round_trip() {
    let chain = Arc::new(ScriptedChain::with_balance("0"));
    let (manager, _kv) = manager_with(chain.clone());

    let created = manager.create_wallet(PASSPHRASE, None).await.unwrap();
    assert_eq!(created.word_count(), 12);
    assert!(manager.session().has_wallet().await.unwrap());
    assert_eq!(manager.wallet_address().await.unwrap(), created.address);

    let exported = manager.export_seed_phrase(PASSPHRASE).await.unwrap();
    assert_eq!(exported.as_str(), created.mnemonic.as_str());

    // Creating a wallet never touches the network.
    assert_eq!(chain.calls(), 0);
}

#[tokio::test]
async fn test_create_refuses_second_wallet() {
    let (manager, _kv) = manager_with(Arc::new(ScriptedChain::default()));
    manager.create_wallet(PASSPHRASE, Some(24)).await.unwrap();
    let err = manager.create_wallet(PASSPHRASE, None).await.err().expect("second create must fail");
    assert!(matches!(err, WalletError::ValidationError(_)));
}

#[tokio::test]
async fn test_weak_passphrase_rejected_before_storage() {
    let (manager, kv) = manager_with(Arc::new(ScriptedChain::default()));
    let err = manager.create_wallet("short", None).await.err().expect("weak passphrase accepted");
    assert!(matches!(err, WalletError::SecurityError(_)));
    assert!(kv.is_empty().await);
}

#[tokio::test]
async fn test_import_known_phrase() {
    let (manager, _kv) = manager_with(Arc::new(ScriptedChain::default()));
    let address = manager.import_wallet(PHRASE, PASSPHRASE).await.unwrap();
    assert_eq!(address, PHRASE_ADDRESS);
    assert_eq!(manager.store().address().await.unwrap().as_deref(), Some(PHRASE_ADDRESS));
}

#[tokio::test]
async fn test_export_with_wrong_passphrase_fails() {
    let (manager, _kv) = manager_with(Arc::new(ScriptedChain::default()));
    manager.import_wallet(PHRASE, PASSPHRASE).await.unwrap();
    assert!(manager.export_seed_phrase("other-Passphrase-99").await.is_err());
}

#[tokio::test]
async fn test_clear_removes_wallet_and_redirects() {
    let (manager, kv) = manager_with(Arc::new(ScriptedChain::default()));
    manager.import_wallet(PHRASE, PASSPHRASE).await.unwrap();
    assert_eq!(manager.session().resolve(Route::Send).await.unwrap(), Route::Send);

    manager.clear_wallet().await.unwrap();
    assert!(kv.is_empty().await);
    assert_eq!(manager.session().resolve(Route::Send).await.unwrap(), Route::Home);
    assert!(matches!(manager.wallet_address().await, Err(WalletError::NoWallet)));
}

#[tokio::test]
async fn test_status_reports_legacy_record() {
    let chain = Arc::new(ScriptedChain::default());
    let kv = MemoryStore::with_entries([("walletAddress", PHRASE_ADDRESS), ("seedPhrase", PHRASE)]);
    let manager = WalletManager::new(test_config(), Arc::new(kv), chain).unwrap();

    let status = manager.status().await.unwrap();
    assert!(!status.has_wallet);
    assert!(status.legacy_record);
    assert_eq!(status.network, "sepolia");

    assert!(manager.migrate_legacy(PASSPHRASE).await.unwrap());
    let status = manager.status().await.unwrap();
    assert!(status.has_wallet);
    assert!(!status.legacy_record);
    assert_eq!(status.address.as_deref(), Some(PHRASE_ADDRESS));
}

#[tokio::test]
async fn test_invalid_transfer_makes_no_network_call() {
    let chain = Arc::new(ScriptedChain::default());
    let manager =
        WalletManager::new(usdc_config(), Arc::new(MemoryStore::new()), chain.clone()).unwrap();
    manager.import_wallet(PHRASE, PASSPHRASE).await.unwrap();

    let cases = [
        TransactionIntent::native("", "0.1"),
        TransactionIntent::native(RECIPIENT, ""),
        TransactionIntent::native(RECIPIENT, "0"),
        TransactionIntent::native(RECIPIENT, "-1"),
        TransactionIntent::native("0x1234", "0.1"),
        TransactionIntent::token(RECIPIENT, "1", "DAI"),
        TransactionIntent::native(RECIPIENT, "1_000"),
        TransactionIntent::native(RECIPIENT, "1.0000000000000000009"),
        TransactionIntent::token(RECIPIENT, "2.5000009", "USDC"),
    ];
    for intent in cases {
        let err = manager.send(intent, PASSPHRASE).await.unwrap_err();
        assert!(matches!(err, WalletError::ValidationError(_)), "unexpected error: {:?}", err);
    }
    assert_eq!(chain.calls(), 0);
}

#[tokio::test]
async fn test_send_without_wallet() {
    let chain = Arc::new(ScriptedChain::default());
    let (manager, _kv) = manager_with(chain.clone());
    let err = manager.send(TransactionIntent::native(RECIPIENT, "0.1"), PASSPHRASE).await.unwrap_err();
    assert!(matches!(err, WalletError::NoWallet));
    assert_eq!(chain.calls(), 0);
}

#[tokio::test]
async fn test_send_eth_goes_through_contract() {
    let chain = Arc::new(ScriptedChain::default());
    let (manager, _kv) = manager_with(chain.clone());
    manager.import_wallet(PHRASE, PASSPHRASE).await.unwrap();

    let receipt = manager.send(TransactionIntent::native(RECIPIENT, "0.5"), PASSPHRASE).await.unwrap();
    assert_eq!(receipt.status, TransactionStatus::Confirmed);

    let sent = chain.sent.lock();
    let (to, data, value) = &sent[0];
    assert_eq!(*to, manager.contract().address());
    assert_eq!(&data[..4], &selector_from_signature(SIG_TRANSFER_ETH));
    assert_eq!(*value, U256::exp10(17) * 5);
}

#[tokio::test]
async fn test_send_token_uses_token_decimals() {
    let chain = Arc::new(ScriptedChain::default());
    let manager =
        WalletManager::new(usdc_config(), Arc::new(MemoryStore::new()), chain.clone()).unwrap();
    manager.import_wallet(PHRASE, PASSPHRASE).await.unwrap();

    manager.send(TransactionIntent::token(RECIPIENT, "2.5", "usdc"), PASSPHRASE).await.unwrap();
    let sent = chain.sent.lock();
    let (_, data, value) = &sent[0];
    assert!(value.is_zero());
    // amount is the last ABI word
    assert_eq!(U256::from_big_endian(&data[68..100]), U256::from(2_500_000u64));
}

#[tokio::test]
async fn test_recovery_requires_registration() {
    let chain = Arc::new(ScriptedChain::default());
    let (manager, _kv) = manager_with(chain.clone());
    manager.import_wallet(PHRASE, PASSPHRASE).await.unwrap();

    let err = manager.initiate_recovery(PHRASE, PASSPHRASE).await.unwrap_err();
    assert!(matches!(err, WalletError::TransactionFailed(_)));

    manager.register(PASSPHRASE).await.unwrap();
    let receipt = manager.initiate_recovery(PHRASE, PASSPHRASE).await.unwrap();
    assert_eq!(receipt.status, TransactionStatus::Confirmed);

    let registered = chain.registered.lock();
    assert!(registered.contains(&seed_phrase_hash(PHRASE).unwrap().to_vec()));
}

#[tokio::test]
async fn test_recovery_rejects_empty_phrase_first() {
    let chain = Arc::new(ScriptedChain::default());
    let (manager, _kv) = manager_with(chain.clone());
    // No wallet either; the phrase check wins.
    let err = manager.initiate_recovery("   ", PASSPHRASE).await.unwrap_err();
    assert!(matches!(err, WalletError::ValidationError(_)));
    assert_eq!(chain.calls(), 0);
}

#[tokio::test]
async fn test_balance_failure_keeps_last_known() {
    let chain = Arc::new(ScriptedChain::with_balance("1.25"));
    let (manager, _kv) = manager_with(chain.clone());
    manager.import_wallet(PHRASE, PASSPHRASE).await.unwrap();
    assert_eq!(manager.cached_native_balance(), "0");

    let tokens = manager.refresh_balance().await.unwrap();
    assert_eq!(tokens[0].symbol, "ETH");
    assert_eq!(tokens[0].balance, "1.25");
    assert_eq!(tokens[0].price, "$0");

    chain.balance.lock().take();
    assert!(manager.refresh_balance().await.is_err());
    assert_eq!(manager.cached_native_balance(), "1.25");
}

#[tokio::test]
async fn test_refresh_balance_lists_configured_token() {
    let chain = Arc::new(ScriptedChain {
        balance: Mutex::new(Some("0.75".into())),
        call_word: Some(U256::from(12_345_670u64)),
        ..Default::default()
    });
    let manager =
        WalletManager::new(usdc_config(), Arc::new(MemoryStore::new()), chain.clone()).unwrap();
    manager.import_wallet(PHRASE, PASSPHRASE).await.unwrap();

    let tokens = manager.refresh_balance().await.unwrap();
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[1].symbol, "USDC");
    assert_eq!(tokens[1].name, "USD Coin");
    assert_eq!(tokens[1].balance, "12.34567");
    assert_eq!(tokens[1].icon, "usdc");
    assert_eq!(tokens[1].price, "$0");
    assert_eq!(*chain.calls_to.lock(), vec![USDC_ADDRESS.parse::<Address>().unwrap()]);
    assert_eq!(manager.cached_balance(), Some(tokens));
}

#[tokio::test]
async fn test_estimate_fee_in_ether() {
    let chain = Arc::new(ScriptedChain::default());
    let (manager, _kv) = manager_with(chain);
    assert_eq!(manager.estimate_fee(RECIPIENT, "1").await.unwrap(), "0.000021");
    assert!(matches!(
        manager.estimate_fee(RECIPIENT, "abc").await,
        Err(WalletError::ValidationError(_))
    ));
}

#[tokio::test]
async fn test_verify_network_detects_wrong_chain() {
    let chain = Arc::new(ScriptedChain { chain_id: Some(1), ..Default::default() });
    let (manager, _kv) = manager_with(chain);
    assert!(matches!(manager.verify_network().await, Err(WalletError::ConfigError(_))));

    let (manager, _kv) = manager_with(Arc::new(ScriptedChain::default()));
    assert!(manager.verify_network().await.is_ok());
}
