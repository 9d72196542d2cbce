//! SQLite pool setup for the note store.

use std::str::FromStr;
use std::time::{Duration, Instant};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info, warn};

use notely_core::{Error, Result};

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;

/// Sizing and recycling of pooled SQLite connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    /// How long a caller waits for a free connection.
    pub acquire_timeout: Duration,
    /// `None` keeps idle connections open indefinitely.
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
            idle_timeout: Some(Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS)),
            max_lifetime: Some(Duration::from_secs(30 * 60)),
        }
    }
}

impl PoolConfig {
    /// A single connection that is never recycled.
    ///
    /// Each connection to `:memory:` opens a fresh empty database, so closing
    /// the only connection would lose every note.
    pub fn in_memory() -> Self {
        Self {
            max_connections: 1,
            min_connections: 1,
            idle_timeout: None,
            max_lifetime: None,
            ..Self::default()
        }
    }

    /// The configuration suited to `database_url`.
    pub fn for_url(database_url: &str) -> Self {
        if is_in_memory(database_url) {
            Self::in_memory()
        } else {
            Self::default()
        }
    }

    pub fn with_max_connections(self, max_connections: u32) -> Self {
        Self {
            max_connections,
            min_connections: self.min_connections.min(max_connections),
            ..self
        }
    }

    pub fn with_acquire_timeout(self, acquire_timeout: Duration) -> Self {
        Self {
            acquire_timeout,
            ..self
        }
    }
}

pub fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    create_pool_with_config(database_url, PoolConfig::for_url(database_url)).await
}

/// Open a pool, creating the database file when it does not exist yet.
pub async fn create_pool_with_config(database_url: &str, config: PoolConfig) -> Result<SqlitePool> {
    let start = Instant::now();

    let mut options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| Error::Config(format!("Invalid DATABASE_URL {}: {}", database_url, e)))?
        .create_if_missing(true)
        .foreign_keys(true);
    if !is_in_memory(database_url) {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .max_lifetime(config.max_lifetime)
        .connect_with(options)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = "db",
        component = "pool",
        op = "open",
        in_memory = is_in_memory(database_url),
        max_connections = config.max_connections,
        pool_size = pool.size(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Note database opened"
    );
    Ok(pool)
}

/// Emit the pool's size and idle count, warning when every connection is busy.
pub fn log_pool_metrics(pool: &SqlitePool) {
    let (size, idle) = (pool.size(), pool.num_idle());
    if size > 0 && idle == 0 {
        warn!(
            subsystem = "db",
            component = "pool",
            pool_size = size,
            "All pooled connections busy"
        );
    } else {
        debug!(
            subsystem = "db",
            component = "pool",
            pool_size = size,
            pool_idle = idle,
            "Pool status"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_for_url() {
        assert_eq!(PoolConfig::for_url("sqlite::memory:"), PoolConfig::in_memory());
        assert_eq!(PoolConfig::for_url("sqlite://notes.db?mode=rwc"), PoolConfig::default());

        let memory = PoolConfig::in_memory();
        assert_eq!(memory.max_connections, 1);
        assert!(memory.idle_timeout.is_none());
        assert!(memory.max_lifetime.is_none());
    }

    #[test]
    fn test_builders() {
        let config = PoolConfig::default()
            .with_max_connections(8)
            .with_acquire_timeout(Duration::from_secs(2));
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.acquire_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_is_in_memory() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://file:notes?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite://notes.db?mode=rwc"));
    }

    #[tokio::test]
    async fn test_create_pool_in_memory() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        let one: i64 = sqlx::query_scalar("SELECT 1").fetch_one(&pool).await.unwrap();
        assert_eq!(one, 1);
        log_pool_metrics(&pool);
    }
}
