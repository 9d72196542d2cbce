//! # notely-db
//!
//! SQLite database layer for the notely Note Store.
//!
//! This crate provides:
//! - Connection pool management
//! - Schema creation
//! - The note repository, including transactional history appends
//! - CSV export
//!
//! ## Example
//!
//! ```rust,ignore
//! use notely_db::{Database, NoteInput, NoteRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite://notes.db?mode=rwc").await?;
//!
//!     let note = db.notes.insert(NoteInput::new("Groceries", "eggs, milk")).await?;
//!
//!     println!("Created note: {}", note.id);
//!     Ok(())
//! }
//! ```
pub mod export;
pub mod notes;
pub mod pool;
pub mod schema;

// Re-export core types
pub use notely_core::*;

/// Escape LIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

pub use export::{notes_to_csv, CSV_HEADER};
pub use notes::SqliteNoteRepository;
pub use pool::{create_pool, create_pool_with_config, is_in_memory, log_pool_metrics, PoolConfig};
pub use schema::migrate;

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::SqlitePool,
    /// Note repository for CRUD and history operations.
    pub notes: SqliteNoteRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self {
            notes: SqliteNoteRepository::new(pool.clone()),
            pool,
        }
    }

    /// Connect to the given URL and make sure the schema exists.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        migrate(&pool).await?;
        log_pool_metrics(&pool);
        Ok(Self::new(pool))
    }

    /// In-memory database with the schema applied.
    pub async fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:").await
    }
}
