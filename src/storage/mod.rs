//! Durable key-value storage for wallet material.
//!
//! The wallet never talks to a concrete backend; it is handed an
//! `Arc<dyn KeyValueStore>` so the same code runs against the JSON file used by
//! the binary and the in-memory map used in tests.

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;

pub mod file;
pub mod memory;
pub mod wallet_store;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use wallet_store::WalletStore;

/// A set of puts and deletes applied as one unit. Deletes run before puts, so a
/// batch that deletes and re-puts the same key ends with the new value.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteBatch {
    puts: Vec<(String, String)>,
    deletes: Vec<String>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.puts.push((key.into(), value.into()));
        self
    }

    pub fn delete(mut self, key: impl Into<String>) -> Self {
        self.deletes.push(key.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.puts.is_empty() && self.deletes.is_empty()
    }

    pub(crate) fn apply_to(self, map: &mut BTreeMap<String, String>) {
        for key in self.deletes {
            map.remove(&key);
        }
        for (key, value) in self.puts {
            map.insert(key, value);
        }
    }
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read several keys from one consistent snapshot. The result has one
    /// entry per requested key, in order.
    async fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>>;

    /// Apply every operation of `batch` or none of them.
    async fn write_batch(&self, batch: WriteBatch) -> Result<()>;

    /// Remove every key.
    async fn clear(&self) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get_many(&[key]).await?.pop().flatten())
    }
}
