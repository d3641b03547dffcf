//! Integration Tests for Cache Operations
//!
//! Exercises the public API end-to-end over a real on-disk store:
//! round-trips, TTL expiration, encryption, error surfacing, and
//! async/sync equivalence.

use std::fs;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tempfile::tempdir;

use expirable_cache::{
    AsyncCache, Cache, CacheConfig, CacheError, CryptoError, DiskStore, EncrypterDecrypter,
    KeychainEncrypter, Metadata, NoopEncrypter, Store,
};

// == Helper Functions ==

const TEST_BUDGET: u64 = 1024 * 1024;

fn open_cache(dir: &Path) -> Cache {
    Cache::open(CacheConfig::new(dir, TEST_BUDGET)).unwrap()
}

fn open_encrypted_cache(dir: &Path) -> Cache {
    Cache::open(CacheConfig::new(dir, TEST_BUDGET).with_encryption(true)).unwrap()
}

/// Reads the raw payload string of the single entry file under `dir`.
fn raw_payload_on_disk(dir: &Path) -> String {
    let entry_path = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .find(|p| p.extension().and_then(|e| e.to_str()) == Some("entry"))
        .expect("no entry file on disk");

    let json: serde_json::Value = serde_json::from_slice(&fs::read(entry_path).unwrap()).unwrap();
    json["payload"].as_str().unwrap().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Session {
    user: String,
    visits: u32,
    tags: Vec<String>,
}

fn sample_session() -> Session {
    Session {
        user: "ada".to_string(),
        visits: 17,
        tags: vec!["admin".to_string(), "beta".to_string()],
    }
}

// == Round-trip Tests ==

#[test]
fn test_typed_value_round_trip() {
    let dir = tempdir().unwrap();
    let cache = open_cache(dir.path());

    let session = sample_session();
    cache.put("session:ada", &session, None).unwrap();

    let retrieved: Option<Session> = cache.get("session:ada").unwrap();
    assert_eq!(retrieved, Some(session));
}

#[test]
fn test_values_survive_reopen() {
    let dir = tempdir().unwrap();
    {
        let cache = open_cache(dir.path());
        cache.put("session:ada", &sample_session(), None).unwrap();
    }

    let cache = open_cache(dir.path());
    let retrieved: Option<Session> = cache.get("session:ada").unwrap();
    assert_eq!(retrieved, Some(sample_session()));
}

// == TTL Tests ==

#[test]
fn test_entry_valid_before_deadline_gone_after() {
    let dir = tempdir().unwrap();
    let cache = open_cache(dir.path());

    cache.put("short", &"lived", Some(400)).unwrap();

    let before: Option<String> = cache.get("short").unwrap();
    assert_eq!(before.as_deref(), Some("lived"));

    sleep(Duration::from_millis(600));

    let after: Option<String> = cache.get("short").unwrap();
    assert_eq!(after, None);
}

#[test]
fn test_expired_get_removes_entry() {
    let dir = tempdir().unwrap();
    let cache = open_cache(dir.path());

    cache.put("short", &"lived", Some(50)).unwrap();
    sleep(Duration::from_millis(100));

    // The expired read itself reports the miss...
    assert_eq!(cache.get::<String>("short").unwrap(), None);
    // ...and has already removed the entry from the store
    assert!(!cache.contains("short").unwrap());
}

#[test]
fn test_contains_does_not_check_expiration() {
    let dir = tempdir().unwrap();
    let cache = open_cache(dir.path());

    cache.put("short", &"lived", Some(50)).unwrap();
    sleep(Duration::from_millis(100));

    // Expired but no read has evicted it yet: still present to the store
    assert!(cache.contains("short").unwrap());

    // A get folds the expiration into a miss and evicts
    assert_eq!(cache.get::<String>("short").unwrap(), None);
    assert!(!cache.contains("short").unwrap());
}

#[test]
fn test_default_ttl_is_unbounded() {
    let dir = tempdir().unwrap();
    let cache = open_cache(dir.path());

    cache.put("forever", &"value", None).unwrap();
    sleep(Duration::from_millis(200));

    let retrieved: Option<String> = cache.get("forever").unwrap();
    assert_eq!(retrieved.as_deref(), Some("value"));
}

// == Remove / Clear Tests ==

#[test]
fn test_remove_is_idempotent() {
    let dir = tempdir().unwrap();
    let cache = open_cache(dir.path());

    cache.put("key1", &"value1", None).unwrap();
    cache.remove("key1").unwrap();
    cache.remove("key1").unwrap();
    cache.remove("never-written").unwrap();

    assert_eq!(cache.get::<String>("key1").unwrap(), None);
}

#[test]
fn test_clear_empties_all() {
    let dir = tempdir().unwrap();
    let cache = open_cache(dir.path());

    cache.put("key1", &"value1", None).unwrap();
    cache.put("key2", &"value2", None).unwrap();

    cache.clear().unwrap();

    assert_eq!(cache.get::<String>("key1").unwrap(), None);
    assert_eq!(cache.get::<String>("key2").unwrap(), None);
}

// == Encryption Tests ==

#[test]
fn test_encrypted_payload_differs_but_reads_back() {
    let dir = tempdir().unwrap();
    let cache = open_encrypted_cache(dir.path());

    let session = sample_session();
    cache.put("secret", &session, None).unwrap();

    // Stored payload must not be the plain serialized bytes
    let plain = BASE64_STANDARD.encode(serde_json::to_vec(&session).unwrap());
    assert_ne!(raw_payload_on_disk(dir.path()), plain);

    // The read still round-trips
    let retrieved: Option<Session> = cache.get("secret").unwrap();
    assert_eq!(retrieved, Some(session));
}

#[test]
fn test_encrypted_values_survive_reopen() {
    let dir = tempdir().unwrap();
    {
        let cache = open_encrypted_cache(dir.path());
        cache.put("secret", &sample_session(), None).unwrap();
    }

    let cache = open_encrypted_cache(dir.path());
    let retrieved: Option<Session> = cache.get("secret").unwrap();
    assert_eq!(retrieved, Some(sample_session()));
}

#[test]
fn test_wrong_key_material_surfaces_decryption_error() {
    let store_dir = tempdir().unwrap();
    {
        let cache = open_encrypted_cache(store_dir.path());
        cache.put("secret", &"value", None).unwrap();
    }

    // Same store, foreign keychain: the read must error, not miss
    let foreign_keys = tempdir().unwrap();
    let store = DiskStore::open(store_dir.path(), 1, TEST_BUDGET).unwrap();
    let crypto = KeychainEncrypter::new(foreign_keys.path()).unwrap();
    let cache = Cache::new(Box::new(store), Box::new(crypto), false);

    let result = cache.get::<String>("secret");
    assert!(matches!(result, Err(CacheError::Decryption(_, _))));
}

#[test]
fn test_custom_encryption_capability_override() {
    /// Test capability that reverses the byte sequence both ways.
    struct ReversingEncrypter;

    impl EncrypterDecrypter for ReversingEncrypter {
        fn encrypt(&self, data: &[u8], _id: &str) -> Result<Vec<u8>, CryptoError> {
            Ok(data.iter().rev().copied().collect())
        }

        fn decrypt(&self, data: &[u8], _id: &str) -> Result<Vec<u8>, CryptoError> {
            Ok(data.iter().rev().copied().collect())
        }
    }

    let dir = tempdir().unwrap();
    let cache = Cache::open_with_encrypter(
        CacheConfig::new(dir.path(), TEST_BUDGET),
        Box::new(ReversingEncrypter),
    )
    .unwrap();

    cache.put("key", &"value", None).unwrap();

    // The stored payload is the reversed serialization, not the plain one
    let plain_bytes = serde_json::to_vec(&"value").unwrap();
    let reversed: Vec<u8> = plain_bytes.iter().rev().copied().collect();
    assert_eq!(raw_payload_on_disk(dir.path()), BASE64_STANDARD.encode(reversed));

    assert_eq!(cache.get::<String>("key").unwrap().as_deref(), Some("value"));
}

// == Error Surfacing Tests ==

#[test]
fn test_missing_eviction_time_is_malformed_metadata() {
    let dir = tempdir().unwrap();
    let store = DiskStore::open(dir.path(), 1, TEST_BUDGET).unwrap();

    // An entry written behind the cache layer's back, without a deadline
    let payload = BASE64_STANDARD.encode(serde_json::to_vec(&"value").unwrap());
    store.put("bad", payload, Metadata::new()).unwrap();

    let cache = Cache::new(Box::new(store), Box::new(NoopEncrypter), false);
    let result = cache.get::<String>("bad");
    assert!(matches!(result, Err(CacheError::MalformedMetadata(_, _))));
}

#[test]
fn test_absence_is_not_an_error() {
    let dir = tempdir().unwrap();
    let cache = open_cache(dir.path());

    assert_eq!(cache.get::<String>("never-written").unwrap(), None);
}

// == Async Tests ==

#[tokio::test]
async fn test_async_and_sync_forms_are_equivalent() {
    let dir = tempdir().unwrap();
    let cache = open_cache(dir.path());
    let async_cache = AsyncCache::new(cache.clone());

    // Written sync, read async
    cache.put("sync-written", &sample_session(), None).unwrap();
    let via_async: Option<Session> = async_cache.get("sync-written").await.unwrap();
    assert_eq!(via_async, Some(sample_session()));

    // Written async, read sync
    async_cache
        .put("async-written", sample_session(), None)
        .await
        .unwrap();
    let via_sync: Option<Session> = cache.get("async-written").unwrap();
    assert_eq!(via_sync, Some(sample_session()));

    // Removal through either form leaves the same store state
    async_cache.remove("sync-written").await.unwrap();
    assert!(!cache.contains("sync-written").unwrap());

    cache.remove("async-written").unwrap();
    let gone: Option<Session> = async_cache.get("async-written").await.unwrap();
    assert_eq!(gone, None);
}

#[tokio::test]
async fn test_async_ttl_expiration() {
    let dir = tempdir().unwrap();
    let async_cache = AsyncCache::new(open_cache(dir.path()));

    async_cache
        .put("short", "lived".to_string(), Some(50))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(async_cache.get::<String>("short").await.unwrap(), None);
}

#[tokio::test]
async fn test_callback_failure_path_delivers_error() {
    let store_dir = tempdir().unwrap();
    {
        let cache = open_encrypted_cache(store_dir.path());
        cache.put("secret", &"value", None).unwrap();
    }

    let foreign_keys = tempdir().unwrap();
    let store = DiskStore::open(store_dir.path(), 1, TEST_BUDGET).unwrap();
    let crypto = KeychainEncrypter::new(foreign_keys.path()).unwrap();
    let async_cache = AsyncCache::new(Cache::new(Box::new(store), Box::new(crypto), false));

    let (tx, rx) = tokio::sync::oneshot::channel::<CacheError>();
    async_cache
        .submit_get::<String, _, _>(
            "secret",
            |_| panic!("decryption failure must not look like a miss"),
            move |err| {
                let _ = tx.send(err);
            },
        )
        .await
        .unwrap();

    let err = rx.await.unwrap();
    assert!(matches!(err, CacheError::Decryption(_, _)));
}

// == Logging Smoke Test ==

#[test]
fn test_logging_enabled_operations_succeed() {
    tracing_subscriber::fmt()
        .with_env_filter("expirable_cache=debug")
        .try_init()
        .ok();

    let dir = tempdir().unwrap();
    let cache =
        Cache::open(CacheConfig::new(dir.path(), TEST_BUDGET).with_logging(true)).unwrap();

    cache.put("key1", &"value1", Some(50)).unwrap();
    assert_eq!(
        cache.get::<String>("key1").unwrap().as_deref(),
        Some("value1")
    );
    sleep(Duration::from_millis(100));
    assert_eq!(cache.get::<String>("key1").unwrap(), None);
    cache.remove("key1").unwrap();
    cache.clear().unwrap();
}
