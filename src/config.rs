//! Service configuration
//!
//! Every flag can also be supplied through its environment variable
//! (loaded from `.env` first).

use crate::accounts::{MemoryAccountStore, SharedAccountStore, SqliteAccountStore};
use crate::auth::PasswordHasher;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Account store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
    /// Durable SQLite database file
    Sqlite,
    /// Process-local map; contents are lost on shutdown
    Memory,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "account-service")]
#[command(about = "Account registration, Basic-auth verification and profile management")]
pub struct Config {
    /// Address the HTTP server binds to
    #[arg(long, env = "ACCOUNT_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Account store backend
    #[arg(long, env = "ACCOUNT_BACKEND", value_enum, default_value_t = StoreBackend::Sqlite)]
    pub backend: StoreBackend,

    /// SQLite database path (sqlite backend only)
    #[arg(long, env = "ACCOUNT_DB_PATH", default_value = "accounts.db")]
    pub database_path: PathBuf,

    /// bcrypt work factor
    #[arg(
        long,
        env = "ACCOUNT_BCRYPT_COST",
        default_value_t = bcrypt::DEFAULT_COST,
        value_parser = clap::value_parser!(u32).range(4..=31)
    )]
    pub bcrypt_cost: u32,

    /// Upper bound on a single request, in seconds
    #[arg(
        long,
        env = "ACCOUNT_REQUEST_TIMEOUT_SECS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Construct the one store handle shared by every request
    pub fn build_store(&self) -> Result<SharedAccountStore> {
        let hasher = Arc::new(
            PasswordHasher::new(self.bcrypt_cost).context("Failed to initialize password hasher")?,
        );

        info!(cost = hasher.cost(), "Password hasher ready");

        let store: SharedAccountStore = match self.backend {
            StoreBackend::Sqlite => {
                let store = SqliteAccountStore::open(&self.database_path, hasher)?;
                info!(path = %self.database_path.display(), "Using SQLite account store");
                Arc::new(store)
            }
            StoreBackend::Memory => {
                warn!("Using in-memory account store; accounts are lost on shutdown");
                Arc::new(MemoryAccountStore::new(hasher))
            }
        };

        Ok(store)
    }
}
