//! Gatekeeping of wallet-only views and commands.

use tracing::debug;

use crate::core::errors::WalletError;
use crate::storage::WalletStore;

/// The wallet's views. `Home` is always reachable; the others need a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Send,
    Recovery,
}

impl Route {
    pub fn requires_wallet(self) -> bool {
        !matches!(self, Route::Home)
    }
}

/// Derives the session state purely from what the wallet store holds.
#[derive(Clone)]
pub struct SessionGuard {
    store: WalletStore,
}

impl SessionGuard {
    pub fn new(store: WalletStore) -> Self {
        Self { store }
    }

    pub async fn has_wallet(&self) -> Result<bool, WalletError> {
        self.store.exists().await
    }

    /// Where a request for `route` ends up: protected routes fall back to `Home`
    /// when there is no wallet.
    pub async fn resolve(&self, route: Route) -> Result<Route, WalletError> {
        if route.requires_wallet() && !self.has_wallet().await? {
            debug!(?route, "No wallet, redirecting to Home");
            return Ok(Route::Home);
        }
        Ok(route)
    }

    pub async fn require_wallet(&self) -> Result<(), WalletError> {
        if self.has_wallet().await? {
            Ok(())
        } else {
            Err(WalletError::NoWallet)
        }
    }
}
