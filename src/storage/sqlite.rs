use crate::analytics::StatsAggregator;
use crate::base62;
use crate::models::{visit_key, Stats, UrlMapping};
use crate::storage::{Storage, StorageError, StorageResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::RngExt;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Random candidates tried by `set` before giving up.
pub const MAX_TRIES: u32 = 3;

pub struct SqliteStorage {
    pool: Arc<SqlitePool>,
    /// Inclusive upper bound for random code picks (`62^len - 1`)
    max_hash: u64,
}

impl SqliteStorage {
    pub async fn new(database_url: &str, max_connections: u32, code_length: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid database url '{database_url}'"))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .context("failed to open database")?;

        Ok(Self {
            pool: Arc::new(pool),
            max_hash: base62::max_value_for_len(code_length),
        })
    }

    /// Connect and create both namespaces
    pub async fn open(database_url: &str, max_connections: u32, code_length: u32) -> Result<Self> {
        let storage = Self::new(database_url, max_connections, code_length).await?;
        storage.init().await.context("failed to init database")?;
        Ok(storage)
    }

    pub fn max_hash(&self) -> u64 {
        self.max_hash
    }

    fn random_code(&self) -> String {
        let n = rand::rng().random_range(0..=self.max_hash);
        base62::encode(n)
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS urls (
                short_code TEXT PRIMARY KEY NOT NULL,
                original_url TEXT NOT NULL
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await
        .context("failed to create urls table")?;

        // One row per (code, second); the primary key doubles as the ordered
        // per-code index used by the stats scan.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS visit_log (
                short_code TEXT NOT NULL,
                visited_at TEXT NOT NULL,
                visits INTEGER NOT NULL,
                PRIMARY KEY (short_code, visited_at)
            ) WITHOUT ROWID
            "#,
        )
        .execute(self.pool.as_ref())
        .await
        .context("failed to create visit_log table")?;

        Ok(())
    }

    async fn set(&self, original_url: &str) -> StorageResult<String> {
        let mut tx = self.pool.begin().await.context("failed to store url")?;

        for attempt in 1..=MAX_TRIES {
            let candidate = self.random_code();

            let result = sqlx::query(
                r#"
                INSERT INTO urls (short_code, original_url)
                VALUES (?, ?)
                ON CONFLICT(short_code) DO NOTHING
                "#,
            )
            .bind(&candidate)
            .bind(original_url)
            .execute(&mut *tx)
            .await
            .context("failed to store url")?;

            if result.rows_affected() == 1 {
                tx.commit().await.context("failed to store url")?;
                debug!(short_code = %candidate, attempt, "stored url");
                return Ok(candidate);
            }

            debug!(short_code = %candidate, attempt, "short code collision");
        }

        // Dropping the transaction rolls it back; nothing was written.
        Err(StorageError::HashExhausted {
            attempts: MAX_TRIES,
        })
    }

    async fn get(&self, short_code: &str) -> Result<Option<String>> {
        let mapping = sqlx::query_as::<_, UrlMapping>(
            r#"
            SELECT short_code, original_url
            FROM urls
            WHERE short_code = ?
            "#,
        )
        .bind(short_code)
        .fetch_optional(self.pool.as_ref())
        .await
        .context("failed to get URL")?;

        Ok(mapping.map(|m| m.original_url))
    }

    async fn visit_at(&self, short_code: &str, at: DateTime<Utc>) -> Result<()> {
        let key = visit_key(at);

        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to register visit")?;

        // The upsert reads the current counter under the write lock, so
        // concurrent visits within the same second never lose an increment.
        let visits = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO visit_log (short_code, visited_at, visits)
            VALUES (?, ?, 1)
            ON CONFLICT(short_code, visited_at) DO UPDATE SET visits = visits + 1
            RETURNING visits
            "#,
        )
        .bind(short_code)
        .bind(&key)
        .fetch_one(&mut *tx)
        .await
        .context("failed to update stats")?;

        tx.commit().await.context("failed to register visit")?;

        debug!(short_code, visited_at = %key, visits, "registered visit");
        Ok(())
    }

    async fn stats_at(&self, short_code: &str, now: DateTime<Utc>) -> Result<Stats> {
        let aggregator = StatsAggregator::at(now);
        let log = self
            .visit_log(short_code)
            .await
            .context("failed to gather stats")?;

        Ok(aggregator.aggregate(log))
    }

    async fn visit_log(&self, short_code: &str) -> Result<Vec<(String, u64)>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT visited_at, visits
            FROM visit_log
            WHERE short_code = ?
            ORDER BY visited_at DESC
            "#,
        )
        .bind(short_code)
        .fetch_all(self.pool.as_ref())
        .await
        .context("failed to read visit log")?;

        rows.into_iter()
            .map(|(visited_at, visits)| -> Result<(String, u64)> {
                let visits = u64::try_from(visits)
                    .with_context(|| format!("corrupt visit count at {visited_at}"))?;
                Ok((visited_at, visits))
            })
            .collect()
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}
