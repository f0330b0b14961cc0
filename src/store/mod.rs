//! Durable credential storage.
//!
//! A single SQLite table holds the handful of agent identity fields that
//! survive app restarts. The key set is fixed at build time, and the auth
//! token is deliberately not among the keys: a bearer credential never
//! touches the device database.

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

use crate::error::{Error, Result};

/// The fixed set of persisted keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKey {
    AgentId,
    AgentName,
    AgentNo,
}

impl CredentialKey {
    pub const ALL: [CredentialKey; 3] = [
        CredentialKey::AgentId,
        CredentialKey::AgentName,
        CredentialKey::AgentNo,
    ];

    /// Storage key string; matches the layout the mobile app shipped with,
    /// so an upgraded install finds its existing identity.
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKey::AgentId => "agentId",
            CredentialKey::AgentName => "agentName",
            CredentialKey::AgentNo => "agentNo",
        }
    }
}

pub struct CredentialStore {
    pool: SqlitePool,
}

impl CredentialStore {
    /// Open (or create) the credential database under `data_dir`.
    pub async fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .map_err(|e| Error::storage(format!("Failed to create data directory: {e}")))?;

        let db_path = data_dir.join("credentials.db");
        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        info!("Opening credential store at {}", db_path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(2)
            .connect(&db_url)
            .await?;

        // Enable WAL mode for better concurrency
        sqlx::query("PRAGMA journal_mode = WAL")
            .execute(&pool)
            .await?;
        sqlx::query("PRAGMA synchronous = NORMAL")
            .execute(&pool)
            .await?;

        run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// Overwrite the value for `key`. Atomic per key.
    pub async fn put(&self, key: CredentialKey, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO credentials (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key.as_str())
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Absence is not an error: a missing key means the agent never logged
    /// in on this device, or logged out.
    pub async fn get(&self, key: CredentialKey) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM credentials WHERE key = ?")
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(value,)| value))
    }

    /// Idempotent; removing an absent key succeeds.
    pub async fn remove(&self, key: CredentialKey) -> Result<()> {
        sqlx::query("DELETE FROM credentials WHERE key = ?")
            .bind(key.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Execute a SQL migration file, properly handling comments
async fn execute_sql(pool: &SqlitePool, sql: &str) -> Result<()> {
    for statement in sql.split(';') {
        // Strip SQL comment lines (lines starting with --)
        let cleaned: String = statement
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let trimmed = cleaned.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }
    Ok(())
}

async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    execute_sql(pool, include_str!("../../migrations/001_credentials.sql")).await?;
    Ok(())
}
