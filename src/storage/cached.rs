use crate::models::Stats;
use crate::storage::{Storage, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use std::sync::Arc;

/// Storage wrapper that caches resolved mappings in memory.
///
/// Mappings never change once created, so a cached hit stays valid for the
/// lifetime of the store. Misses are not cached since the code may be minted
/// later.
pub struct CachedStorage {
    /// Underlying storage implementation
    inner: Arc<dyn Storage>,
    /// short code -> original URL
    read_cache: Cache<String, String>,
}

impl CachedStorage {
    pub fn new(inner: Arc<dyn Storage>, max_cache_entries: u64) -> Self {
        let read_cache = Cache::builder().max_capacity(max_cache_entries).build();

        Self { inner, read_cache }
    }

    /// Number of cached mappings (approximate, moka updates lazily)
    pub fn cached_entries(&self) -> u64 {
        self.read_cache.entry_count()
    }
}

#[async_trait]
impl Storage for CachedStorage {
    async fn init(&self) -> Result<()> {
        self.inner.init().await
    }

    async fn set(&self, original_url: &str) -> StorageResult<String> {
        let short_code = self.inner.set(original_url).await?;

        self.read_cache
            .insert(short_code.clone(), original_url.to_string())
            .await;

        Ok(short_code)
    }

    async fn get(&self, short_code: &str) -> Result<Option<String>> {
        if let Some(url) = self.read_cache.get(short_code).await {
            return Ok(Some(url));
        }

        let url = self.inner.get(short_code).await?;
        if let Some(ref url) = url {
            self.read_cache
                .insert(short_code.to_string(), url.clone())
                .await;
        }

        Ok(url)
    }

    async fn visit_at(&self, short_code: &str, at: DateTime<Utc>) -> Result<()> {
        self.inner.visit_at(short_code, at).await
    }

    async fn stats_at(&self, short_code: &str, now: DateTime<Utc>) -> Result<Stats> {
        self.inner.stats_at(short_code, now).await
    }

    async fn visit_log(&self, short_code: &str) -> Result<Vec<(String, u64)>> {
        self.inner.visit_log(short_code).await
    }

    async fn close(&self) -> Result<()> {
        self.read_cache.invalidate_all();
        self.inner.close().await
    }
}
