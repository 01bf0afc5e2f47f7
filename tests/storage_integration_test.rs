//! Integration tests for the SQLite storage engine
//!
//! Covers code minting, resolution, visit registration and the rolling
//! statistics windows, including concurrent access and reopening a file
//! database.

use chrono::{DateTime, Duration, TimeZone, Utc};
use shortener::base62;
use shortener::models::{visit_key, Stats};
use shortener::storage::{SqliteStorage, Storage, StorageError, MAX_TRIES};
use std::collections::HashSet;
use std::sync::Arc;

/// Helper to create in-memory test storage
async fn create_sqlite_storage(code_length: u32) -> Arc<dyn Storage> {
    let storage = SqliteStorage::new("sqlite::memory:", 5, code_length)
        .await
        .unwrap();
    storage.init().await.unwrap();
    Arc::new(storage)
}

fn file_url(dir: &tempfile::TempDir) -> String {
    format!("sqlite://{}", dir.path().join("shortener.db").display())
}

fn fixed_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

#[tokio::test]
async fn test_set_get_round_trip() {
    let storage = create_sqlite_storage(7).await;

    for url in [
        "https://example.com",
        "https://example.org/a/b?c=d#e",
        "not even a url",
        "",
    ] {
        let code = storage.set(url).await.unwrap();
        assert!(!code.is_empty());
        assert_eq!(storage.get(&code).await.unwrap().as_deref(), Some(url));
    }
}

#[tokio::test]
async fn test_get_nonexistent_returns_none() {
    let storage = create_sqlite_storage(7).await;

    assert_eq!(storage.get("nonexistent").await.unwrap(), None);
    assert_eq!(storage.get("does-not-exist").await.unwrap(), None);
}

#[tokio::test]
async fn test_codes_are_unique() {
    let storage = create_sqlite_storage(7).await;

    let example = storage.set("https://example.com").await.unwrap();
    let different = storage.set("https://example.org").await.unwrap();
    let same = storage.set("https://example.com").await.unwrap();

    assert_ne!(example, different);
    assert_ne!(example, same);
    assert_ne!(different, same);

    assert_eq!(
        storage.get(&example).await.unwrap().as_deref(),
        Some("https://example.com")
    );
    assert_eq!(
        storage.get(&different).await.unwrap().as_deref(),
        Some("https://example.org")
    );
    assert_eq!(
        storage.get(&same).await.unwrap().as_deref(),
        Some("https://example.com")
    );
}

#[tokio::test]
async fn test_codes_respect_configured_length() {
    let storage = SqliteStorage::open("sqlite::memory:", 5, 3).await.unwrap();
    assert_eq!(storage.max_hash(), 62u64.pow(3) - 1);

    for _ in 0..100 {
        let code = storage.set("https://example.com").await.unwrap();
        assert!(code.len() <= 3, "code {code} is too long");

        let value = base62::decode(&code).expect("code should be valid base62");
        assert!(value <= storage.max_hash());
    }
}

#[tokio::test]
async fn test_hash_space_exhaustion() {
    // A zero-length code space holds exactly one code: "0"
    let storage = create_sqlite_storage(0).await;

    let code = storage.set("https://first.example").await.unwrap();
    assert_eq!(code, "0");

    match storage.set("https://second.example").await {
        Err(StorageError::HashExhausted { attempts }) => assert_eq!(attempts, MAX_TRIES),
        other => panic!("expected hash exhaustion, got {:?}", other),
    }

    // The failed attempt must not overwrite the existing mapping
    assert_eq!(
        storage.get("0").await.unwrap().as_deref(),
        Some("https://first.example")
    );
}

#[tokio::test]
async fn test_visit_stats_windows() {
    let storage = create_sqlite_storage(7).await;

    let hash = "example";
    let now = Utc::now();

    // more than a week ago: counts only towards total
    storage
        .visit_at(hash, now - Duration::days(365))
        .await
        .unwrap();
    assert_eq!(storage.stats(hash).await.unwrap(), Stats::new(0, 0, 1));

    // more than a day ago: counts towards week and total
    storage
        .visit_at(hash, now - Duration::days(3))
        .await
        .unwrap();
    assert_eq!(storage.stats(hash).await.unwrap(), Stats::new(0, 1, 2));

    // two visits sharing a timestamp
    storage.visit_at(hash, now).await.unwrap();
    storage.visit_at(hash, now).await.unwrap();
    assert_eq!(storage.stats(hash).await.unwrap(), Stats::new(2, 3, 4));

    storage.visit(hash).await.unwrap();
    assert_eq!(storage.stats(hash).await.unwrap(), Stats::new(3, 4, 5));
}

#[tokio::test]
async fn test_stats_at_fixed_instant() {
    let storage = create_sqlite_storage(7).await;
    let now = fixed_instant();

    storage
        .visit_at("code", now - Duration::days(1))
        .await
        .unwrap();
    storage
        .visit_at("code", now - Duration::days(7))
        .await
        .unwrap();
    storage
        .visit_at("code", now - Duration::days(8))
        .await
        .unwrap();
    // visits after the query instant still sort above the day cutoff
    storage
        .visit_at("code", now + Duration::hours(1))
        .await
        .unwrap();

    assert_eq!(
        storage.stats_at("code", now).await.unwrap(),
        Stats::new(2, 3, 4)
    );
    // a week later only the future visit is still inside the week window
    assert_eq!(
        storage
            .stats_at("code", now + Duration::days(7))
            .await
            .unwrap(),
        Stats::new(0, 1, 4)
    );
}

#[tokio::test]
async fn test_stats_for_unknown_code_are_zero() {
    let storage = create_sqlite_storage(7).await;

    assert_eq!(storage.stats("unknown").await.unwrap(), Stats::default());
    assert!(storage.visit_log("unknown").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_same_second_visits_are_coalesced() {
    let storage = create_sqlite_storage(7).await;
    let at = fixed_instant();

    storage.visit_at("code", at).await.unwrap();
    storage
        .visit_at("code", at + Duration::milliseconds(750))
        .await
        .unwrap();

    let log = storage.visit_log("code").await.unwrap();
    assert_eq!(log, vec![(visit_key(at), 2)]);

    storage
        .visit_at("code", at + Duration::seconds(1))
        .await
        .unwrap();

    let log = storage.visit_log("code").await.unwrap();
    assert_eq!(
        log,
        vec![
            (visit_key(at + Duration::seconds(1)), 1),
            (visit_key(at), 2),
        ]
    );
}

#[tokio::test]
async fn test_visit_logs_are_per_code() {
    let storage = create_sqlite_storage(7).await;
    let at = fixed_instant();

    storage.visit_at("a", at).await.unwrap();
    storage.visit_at("a", at).await.unwrap();
    storage.visit_at("b", at).await.unwrap();

    assert_eq!(storage.stats_at("a", at).await.unwrap().total, 2);
    assert_eq!(storage.stats_at("b", at).await.unwrap().total, 1);
}

#[tokio::test]
async fn test_init_is_idempotent() {
    let storage = create_sqlite_storage(7).await;

    let code = storage.set("https://example.com").await.unwrap();
    storage.init().await.unwrap();

    assert_eq!(
        storage.get(&code).await.unwrap().as_deref(),
        Some("https://example.com")
    );
}

#[tokio::test]
async fn test_concurrent_visits_same_second() {
    let dir = tempfile::tempdir().unwrap();
    let storage: Arc<dyn Storage> =
        Arc::new(SqliteStorage::open(&file_url(&dir), 5, 7).await.unwrap());
    let at = fixed_instant();

    let mut handles = vec![];
    for _ in 0..25 {
        let storage_clone = Arc::clone(&storage);
        handles.push(tokio::spawn(async move {
            storage_clone.visit_at("hot", at).await
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // No increment may be lost under contention
    assert_eq!(
        storage.visit_log("hot").await.unwrap(),
        vec![(visit_key(at), 25)]
    );
    storage.close().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_set_yields_distinct_codes() {
    let dir = tempfile::tempdir().unwrap();
    let storage: Arc<dyn Storage> =
        Arc::new(SqliteStorage::open(&file_url(&dir), 5, 7).await.unwrap());

    let mut handles = vec![];
    for i in 0..30 {
        let storage_clone = Arc::clone(&storage);
        handles.push(tokio::spawn(async move {
            let url = format!("https://example.com/{}", i);
            let code = storage_clone.set(&url).await.unwrap();
            (code, url)
        }));
    }

    let mut codes = HashSet::new();
    for handle in handles {
        let (code, url) = handle.await.unwrap();
        assert_eq!(storage.get(&code).await.unwrap(), Some(url));
        assert!(codes.insert(code), "duplicate code issued");
    }

    assert_eq!(codes.len(), 30);
    storage.close().await.unwrap();
}

#[tokio::test]
async fn test_data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let url = file_url(&dir);
    let at = fixed_instant();

    let code = {
        let storage = SqliteStorage::open(&url, 1, 7).await.unwrap();
        let code = storage.set("https://persisted.example").await.unwrap();
        storage.visit_at(&code, at).await.unwrap();
        storage.close().await.unwrap();
        code
    };

    let storage = SqliteStorage::open(&url, 1, 7).await.unwrap();
    assert_eq!(
        storage.get(&code).await.unwrap().as_deref(),
        Some("https://persisted.example")
    );
    assert_eq!(
        storage.stats_at(&code, at).await.unwrap(),
        Stats::new(1, 1, 1)
    );
    storage.close().await.unwrap();
}
