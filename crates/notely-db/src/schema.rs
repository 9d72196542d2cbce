//! Table definitions.
//!
//! A note and its history live in one row; `ai_history` is a JSON array.
//! Deleting the row removes both.

use sqlx::SqlitePool;
use tracing::info;

use notely_core::{Error, Result};

pub const CREATE_NOTES_TABLE: &str = "CREATE TABLE IF NOT EXISTS notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    tag TEXT NOT NULL DEFAULT 'unclassified',
    type TEXT NOT NULL DEFAULT 'normal',
    prompt_target TEXT NOT NULL DEFAULT '',
    ai_history TEXT NOT NULL DEFAULT '[]'
)";

/// Create the schema if it does not exist yet.
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::query(CREATE_NOTES_TABLE)
        .execute(pool)
        .await
        .map_err(Error::Database)?;
    info!(
        subsystem = "db",
        component = "schema",
        op = "migrate",
        "Schema ready"
    );
    Ok(())
}
