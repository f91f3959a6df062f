//! Service configuration.
//!
//! Everything comes from environment variables (a `.env` file is loaded first by
//! `main`). Unset variables fall back to defaults; set-but-invalid values are errors.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tracing::info;

use crate::hierarchy::TreeStrategy;

const DEFAULT_DATABASE_URL: &str = "sqlite:employees.db";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;

/// Connection settings for the employee store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    pub database: DatabaseConfig,
    pub tree_strategy: TreeStrategy,
}

impl ServiceConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR is not a valid socket address")?;

        let url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("DB_MAX_CONNECTIONS must be a positive integer, got {:?}", raw))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        if max_connections == 0 {
            anyhow::bail!("DB_MAX_CONNECTIONS must be at least 1");
        }

        let acquire_timeout_secs = match lookup("DB_ACQUIRE_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("DB_ACQUIRE_TIMEOUT_SECS must be an integer, got {:?}", raw))?,
            None => DEFAULT_ACQUIRE_TIMEOUT_SECS,
        };
        if acquire_timeout_secs == 0 {
            anyhow::bail!("DB_ACQUIRE_TIMEOUT_SECS must be at least 1");
        }

        let tree_strategy = match lookup("TREE_STRATEGY") {
            Some(raw) => raw.parse::<TreeStrategy>().map_err(anyhow::Error::msg)?,
            None => TreeStrategy::default(),
        };

        let config = Self {
            bind_addr,
            database: DatabaseConfig {
                url,
                max_connections,
                acquire_timeout_secs,
            },
            tree_strategy,
        };

        info!(
            "Config: bind_addr={}, database={}, tree_strategy={}",
            config.bind_addr, config.database.url, config.tree_strategy
        );
        Ok(config)
    }
}
