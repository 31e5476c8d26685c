use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::core::errors::WalletError;
use crate::core::wallet::create::DEFAULT_WORD_COUNT;
use crate::crypto::kdf::KdfParams;

/// Default DeWallet deployment on Sepolia.
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x608b7f1ef01600C33e34C585a85fAE8ECAfEC6D2";

/// Blockchain network configuration.
///
/// `rpc_url` must point at an endpoint that does not carry a provider access key
/// in the URL (a server-side proxy). Credentials for that proxy come from the
/// `DEWALLET_RPC_TOKEN` environment variable, never from this file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
    pub rpc_url: String,
    pub chain_id: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: "sepolia".to_string(),
            rpc_url: "https://rpc.sepolia.org".to_string(),
            chain_id: 11155111,
        }
    }
}

/// An ERC-20 token shown in the token list and accepted by `send --token`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenConfig {
    pub symbol: String,
    pub name: String,
    pub address: String,
    #[serde(default = "TokenConfig::default_decimals")]
    pub decimals: u32,
    #[serde(default)]
    pub icon: String,
}

impl TokenConfig {
    fn default_decimals() -> u32 {
        18
    }
}

/// Wallet configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    #[serde(default)]
    pub network: NetworkConfig,

    /// DeWallet contract all transfers and recoveries go through
    #[serde(default = "WalletConfig::default_contract_address")]
    pub contract_address: String,

    /// JSON file backing the wallet store
    #[serde(default = "WalletConfig::default_store_path")]
    pub store_path: PathBuf,

    /// Passphrase key derivation for secrets at rest
    #[serde(default)]
    pub kdf: KdfParams,

    /// Confirmations awaited after submitting a transaction
    #[serde(default = "WalletConfig::default_confirmations")]
    pub confirmations: usize,

    /// Mnemonic length for new wallets (12 or 24)
    #[serde(default = "WalletConfig::default_mnemonic_words")]
    pub mnemonic_words: usize,

    #[serde(default)]
    pub tokens: Vec<TokenConfig>,
}

impl WalletConfig {
    fn default_contract_address() -> String {
        DEFAULT_CONTRACT_ADDRESS.to_string()
    }
    fn default_store_path() -> PathBuf {
        PathBuf::from("./data/wallet.json")
    }
    fn default_confirmations() -> usize {
        1
    }
    fn default_mnemonic_words() -> usize {
        DEFAULT_WORD_COUNT
    }

    /// Load configuration from `CONFIG_PATH` (default `dewallet.toml`), then
    /// apply environment overrides. A missing file yields the defaults.
    pub fn load() -> Result<Self, WalletError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "dewallet.toml".to_string());
        let mut config = if Path::new(&config_path).exists() {
            Self::from_file(&config_path)?
        } else {
            warn!("Config file {} not found, using default configuration", config_path);
            Self::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, WalletError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            WalletError::ConfigError(format!("Failed to read {}: {}", path.as_ref().display(), e))
        })?;
        let config: WalletConfig = toml::from_str(&content)
            .map_err(|e| WalletError::ConfigError(format!("Invalid config: {}", e)))?;
        info!(
            "Loaded config from {} (network: {}, chain id: {})",
            path.as_ref().display(),
            config.network.name,
            config.network.chain_id
        );
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DEWALLET_RPC_URL") {
            self.network.rpc_url = url;
        }
        if let Ok(path) = std::env::var("DEWALLET_STORE") {
            self.store_path = PathBuf::from(path);
        }
        if let Ok(addr) = std::env::var("DEWALLET_CONTRACT") {
            self.contract_address = addr;
        }
    }

    pub fn validate(&self) -> Result<(), WalletError> {
        if self.mnemonic_words != 12 && self.mnemonic_words != 24 {
            return Err(WalletError::ConfigError(format!(
                "mnemonic_words must be 12 or 24, got {}",
                self.mnemonic_words
            )));
        }
        if self.confirmations == 0 {
            return Err(WalletError::ConfigError("confirmations must be at least 1".into()));
        }
        if looks_like_embedded_key(&self.network.rpc_url) {
            return Err(WalletError::ConfigError(
                "rpc_url appears to embed a provider access key; point it at a proxy and set DEWALLET_RPC_TOKEN instead".into(),
            ));
        }
        Ok(())
    }

    pub fn token(&self, symbol: &str) -> Option<&TokenConfig> {
        self.tokens.iter().find(|t| t.symbol.eq_ignore_ascii_case(symbol))
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            contract_address: Self::default_contract_address(),
            store_path: Self::default_store_path(),
            kdf: KdfParams::default(),
            confirmations: Self::default_confirmations(),
            mnemonic_words: Self::default_mnemonic_words(),
            tokens: Vec::new(),
        }
    }
}

/// Hosted providers put the project key in the URL path (`/v2/<key>`,
/// `/<token>/`) or in an `apikey` query parameter.
fn looks_like_embedded_key(rpc_url: &str) -> bool {
    let Ok(url) = reqwest::Url::parse(rpc_url) else {
        return false;
    };
    if url.query_pairs().any(|(k, _)| k.eq_ignore_ascii_case("apikey") || k.eq_ignore_ascii_case("key")) {
        return true;
    }
    let segments: Vec<&str> = url.path_segments().map(|s| s.collect()).unwrap_or_default();
    if let [version, key] = segments.as_slice() {
        if matches!(*version, "v2" | "v3") && key.len() >= 20 {
            return true;
        }
    }
    segments.iter().any(|segment| looks_like_token(segment))
}

/// Long opaque path segment mixing letters and digits.
fn looks_like_token(segment: &str) -> bool {
    segment.len() >= 24
        && segment.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        && segment.bytes().any(|b| b.is_ascii_digit())
        && segment.bytes().any(|b| b.is_ascii_alphabetic())
}
