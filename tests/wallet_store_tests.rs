//! Wallet records persisted through the JSON file store.

use std::sync::Arc;

use dewallet::core::domain::StoredWallet;
use dewallet::core::wallet::from_mnemonic;
use dewallet::crypto::KdfParams;
use dewallet::storage::wallet_store::{KEY_SEED_PHRASE, LEGACY_KEY_PRIVATE_KEY};
use dewallet::storage::{FileStore, KeyValueStore, WalletStore};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

const PASSPHRASE: &str = "correct-Horse-42-battery";
const PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

fn sealed_record() -> StoredWallet {
    let wallet = from_mnemonic(PHRASE).unwrap();
    StoredWallet::seal(&wallet, PASSPHRASE, &KdfParams::pbkdf2(1000)).unwrap()
}

#[tokio::test]
async fn test_record_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("wallet.json");

    let store = WalletStore::new(Arc::new(FileStore::new(&path)));
    assert!(!store.exists().await.unwrap());
    store.save(&sealed_record()).await.unwrap();

    let reopened = WalletStore::new(Arc::new(FileStore::new(&path)));
    assert!(reopened.exists().await.unwrap());
    let record = reopened.read().await.unwrap().expect("record present");
    assert_eq!(record.address, "0x9858EfFD232B4033E47d90003D41EC34EcaEda94");
    assert_eq!(record.seed_phrase(PASSPHRASE).unwrap().as_str(), PHRASE);
}

#[tokio::test]
async fn test_file_never_holds_plaintext() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wallet.json");
    let store = WalletStore::new(Arc::new(FileStore::new(&path)));
    store.save(&sealed_record()).await.unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(!contents.contains("abandon"));
    let json: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert!(json.get(KEY_SEED_PHRASE).is_some());
    assert!(json.get(LEGACY_KEY_PRIVATE_KEY).is_none());
}

#[cfg(unix)]
#[tokio::test]
async fn test_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempdir().unwrap();
    let path = dir.path().join("wallet.json");
    let store = WalletStore::new(Arc::new(FileStore::new(&path)));
    store.save(&sealed_record()).await.unwrap();
    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[tokio::test]
async fn test_legacy_file_is_migrated() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wallet.json");
    std::fs::write(
        &path,
        serde_json::json!({
            "walletAddress": "0x9858EfFD232B4033E47d90003D41EC34EcaEda94",
            "seedPhrase": PHRASE,
        })
        .to_string(),
    )
    .unwrap();

    let store = WalletStore::new(Arc::new(FileStore::new(&path)));
    assert!(store.has_legacy_record().await.unwrap());
    assert!(!store.exists().await.unwrap());

    assert!(store.migrate_legacy(PASSPHRASE, &KdfParams::pbkdf2(1000)).await.unwrap());
    assert!(store.exists().await.unwrap());
    assert!(!std::fs::read_to_string(&path).unwrap().contains("abandon"));

    // Second run has nothing to do.
    assert!(!store.migrate_legacy(PASSPHRASE, &KdfParams::pbkdf2(1000)).await.unwrap());
}

#[tokio::test]
async fn test_corrupt_file_is_storage_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wallet.json");
    std::fs::write(&path, "{not json").unwrap();
    let kv = FileStore::new(&path);
    assert!(kv.get("walletAddress").await.is_err());

    let store = WalletStore::new(Arc::new(kv));
    assert!(matches!(store.exists().await, Err(dewallet::WalletError::StorageError(_))));
}

#[tokio::test]
async fn test_clear_deletes_everything() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wallet.json");
    let store = WalletStore::new(Arc::new(FileStore::new(&path)));
    store.save(&sealed_record()).await.unwrap();
    store.clear().await.unwrap();
    assert!(!store.exists().await.unwrap());
    assert!(store.read().await.unwrap().is_none());
    assert!(!path.exists());
}
