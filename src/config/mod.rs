use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::base62;

pub const DEFAULT_SHORT_CODE_LENGTH: u32 = 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub cache: CacheConfig,
    /// Length of generated short codes; picks are drawn from `[0, 62^len - 1]`
    pub short_code_max_length: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Resolve cache capacity; 0 disables the cache
    pub max_entries: u64,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = var("DATABASE_URL", "sqlite://./shortener.db");
        let max_connections = var("DATABASE_MAX_CONNECTIONS", "5")
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;
        if max_connections == 0 {
            bail!("DATABASE_MAX_CONNECTIONS must be at least 1");
        }

        let host = var("HOST", "0.0.0.0");
        let port = var("PORT", "8080")
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let short_code_max_length = var(
            "SHORT_CODE_MAX_LENGTH",
            &DEFAULT_SHORT_CODE_LENGTH.to_string(),
        )
        .parse::<u32>()
        .context("SHORT_CODE_MAX_LENGTH must be a positive integer")?;

        let max_len = base62::MAX_ENCODED_LEN as u32;
        if !(1..=max_len).contains(&short_code_max_length) {
            bail!("SHORT_CODE_MAX_LENGTH must be between 1 and {max_len}, got {short_code_max_length}");
        }

        let cache_max_entries = var("CACHE_MAX_ENTRIES", "10000")
            .parse::<u64>()
            .context("CACHE_MAX_ENTRIES must be a non-negative integer")?;

        Ok(Config {
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            server: ServerConfig { host, port },
            cache: CacheConfig {
                max_entries: cache_max_entries,
            },
            short_code_max_length,
        })
    }
}
