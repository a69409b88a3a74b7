//! Schema setup and first-run seeding

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::info;

/// Number of attendees seeded into an empty registry.
const SEED_COUNT: i64 = 224;

/// Create the attendees table if it does not exist.
pub async fn run(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS attendees (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            queue_number INTEGER NOT NULL UNIQUE,
            key_ready INTEGER NOT NULL DEFAULT 0,
            key_collected INTEGER NOT NULL DEFAULT 0,
            ready_timestamp TEXT
        );
    "#,
    )
    .execute(pool)
    .await
    .context("failed to create attendees table")?;

    info!("database migrations complete");
    Ok(())
}

/// Seed the registry with numbered attendees, only if the table is empty.
pub async fn seed_if_empty(pool: &SqlitePool) -> Result<()> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM attendees")
        .fetch_one(pool)
        .await
        .context("failed to count attendees")?;
    if count > 0 {
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    for n in 1..=SEED_COUNT {
        sqlx::query("INSERT INTO attendees (name, queue_number) VALUES (?, ?)")
            .bind(format!("Attendee {}", n))
            .bind(n)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await.context("failed to seed attendees")?;

    info!(count = SEED_COUNT, "seeded empty attendee registry");
    Ok(())
}
