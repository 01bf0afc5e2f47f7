use crate::models::Stats;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// Every random candidate collided with an existing code. Retryable by
    /// issuing a fresh `set`.
    #[error("failed to create hash: {attempts} attempts collided")]
    HashExhausted { attempts: u32 },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Initialize the storage (create both namespaces if absent)
    async fn init(&self) -> Result<()>;

    /// Mint a fresh short code for `original_url` and persist the mapping
    async fn set(&self, original_url: &str) -> StorageResult<String>;

    /// Resolve a short code. `Ok(None)` when the code does not exist.
    async fn get(&self, short_code: &str) -> Result<Option<String>>;

    /// Record one visit at the current UTC second
    async fn visit(&self, short_code: &str) -> Result<()> {
        self.visit_at(short_code, Utc::now()).await
    }

    /// Record one visit at `at`, truncated to second resolution
    async fn visit_at(&self, short_code: &str, at: DateTime<Utc>) -> Result<()>;

    /// Rolling day/week/total counts relative to now
    async fn stats(&self, short_code: &str) -> Result<Stats> {
        self.stats_at(short_code, Utc::now()).await
    }

    /// Rolling day/week/total counts relative to `now`.
    /// All zeros when the code has no visit log.
    async fn stats_at(&self, short_code: &str, now: DateTime<Utc>) -> Result<Stats>;

    /// The visit log as `(visit_key, count)` pairs, newest first
    async fn visit_log(&self, short_code: &str) -> Result<Vec<(String, u64)>>;

    /// Release the underlying storage handle
    async fn close(&self) -> Result<()>;
}
