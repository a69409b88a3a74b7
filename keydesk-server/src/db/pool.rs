//! Database connection pool management

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

/// Kept low for single-desk tooling.
const MAX_CONNECTIONS: u32 = 5;

/// Open the SQLite database at the given path, creating file and parent
/// directories if missing.
///
/// # Errors
///
/// Returns an error if the path is unusable or the database cannot be
/// opened.
pub async fn connect(path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", path.display()))
        .context("invalid database path")?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(options)
        .await
        .context("failed to open sqlite database")
}

/// Open an in-memory database (for testing).
///
/// A single never-reaped connection, so every statement sees the same
/// in-memory database.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .context("failed to open in-memory database")
}
