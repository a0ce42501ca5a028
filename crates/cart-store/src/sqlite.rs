//! SQLite persistence backend using rusqlite.
//!
//! This is the primary backend for mobile and desktop applications.
//! Uses WAL mode by default. Statements run on tokio's blocking pool so
//! callers on the async side are never stalled by disk I/O.
//!
//! # Example
//!
//! ```no_run
//! # async fn demo() -> Result<(), cart_store::SqliteError> {
//! use cart_store::{KeyValueStore, SqliteStore};
//!
//! let store = SqliteStore::open("cart.db")?;
//! store.set("@Cart", "[]").await?;
//!
//! let data = store.get("@Cart").await?;
//! assert_eq!(data.as_deref(), Some("[]"));
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use crate::traits::KeyValueStore;

/// SQLite configuration options.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// SQLite journal mode. Defaults to WAL.
    pub journal_mode: JournalMode,
    /// Busy timeout in milliseconds. Defaults to 5000.
    pub busy_timeout_ms: u32,
    /// SQLite page size. Defaults to 4096.
    pub page_size: u32,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            journal_mode: JournalMode::Wal,
            busy_timeout_ms: 5000,
            page_size: 4096,
        }
    }
}

/// SQLite journal mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalMode {
    /// Write-Ahead Logging. Allows concurrent reads during writes.
    Wal,
    /// Traditional rollback journal.
    Delete,
    /// In-memory journal (fastest, no crash recovery).
    Memory,
}

impl JournalMode {
    fn as_str(self) -> &'static str {
        match self {
            Self::Wal => "WAL",
            Self::Delete => "DELETE",
            Self::Memory => "MEMORY",
        }
    }
}

/// Error type for the SQLite backend.
#[derive(Debug, thiserror::Error)]
pub enum SqliteError {
    /// An error from rusqlite.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Lock poisoned.
    #[error("sqlite lock poisoned")]
    LockPoisoned,
    /// The blocking task running the statement panicked or was cancelled.
    #[error("sqlite task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// SQLite persistence backend.
///
/// Wraps a `rusqlite::Connection` behind a `Mutex` for safe shared access.
/// Creates the schema automatically on first open.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a SQLite database at the given path with default config.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SqliteError> {
        Self::open_with_config(path, SqliteConfig::default())
    }

    /// Open with custom configuration.
    pub fn open_with_config<P: AsRef<Path>>(
        path: P,
        config: SqliteConfig,
    ) -> Result<Self, SqliteError> {
        let conn = Connection::open(path)?;
        Self::init_connection(&conn, &config)?;
        Self::create_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database (useful for testing).
    pub fn open_in_memory() -> Result<Self, SqliteError> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(&conn, &SqliteConfig::default())?;
        Self::create_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn init_connection(conn: &Connection, config: &SqliteConfig) -> Result<(), SqliteError> {
        conn.execute_batch(&format!(
            "PRAGMA journal_mode = {};
             PRAGMA busy_timeout = {};
             PRAGMA page_size = {};
             PRAGMA synchronous = NORMAL;",
            config.journal_mode.as_str(),
            config.busy_timeout_ms,
            config.page_size,
        ))?;
        Ok(())
    }

    fn create_schema(conn: &Connection) -> Result<(), SqliteError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS cart_kv (
                key         TEXT PRIMARY KEY NOT NULL,
                value       TEXT NOT NULL,
                updated_at  INTEGER NOT NULL DEFAULT 0
            );",
        )?;
        Ok(())
    }

    fn now_ms() -> i64 {
        let millis = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        i64::try_from(millis).unwrap_or(i64::MAX)
    }

    /// Run a statement on the blocking pool with the connection locked.
    async fn run<F, R>(&self, f: F) -> Result<R, SqliteError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|_| SqliteError::LockPoisoned)?;
            f(&conn).map_err(SqliteError::from)
        })
        .await?
    }

    /// Get the database file size in bytes.
    pub async fn file_size(&self) -> Result<u64, SqliteError> {
        let bytes = self
            .run(|conn| {
                let page_count: i64 = conn.query_row("PRAGMA page_count", [], |row| row.get(0))?;
                let page_size: i64 = conn.query_row("PRAGMA page_size", [], |row| row.get(0))?;
                Ok(page_count * page_size)
            })
            .await?;
        Ok(u64::try_from(bytes).unwrap_or(0))
    }

    /// Get the current journal mode.
    pub async fn journal_mode(&self) -> Result<String, SqliteError> {
        self.run(|conn| conn.query_row("PRAGMA journal_mode", [], |row| row.get(0)))
            .await
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    type Error = SqliteError;

    async fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        let key = key.to_owned();
        self.run(move |conn| {
            conn.query_row(
                "SELECT value FROM cart_kv WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        let key = key.to_owned();
        let value = value.to_owned();
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO cart_kv (key, value, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(key)
                 DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, Self::now_ms()],
            )
        })
        .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), Self::Error> {
        let key = key.to_owned();
        self.run(move |conn| conn.execute("DELETE FROM cart_kv WHERE key = ?1", params![key]))
            .await?;
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, Self::Error> {
        self.run(|conn| {
            let mut stmt = conn.prepare("SELECT key FROM cart_kv ORDER BY key")?;
            let keys = stmt
                .query_map([], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?;
            Ok(keys)
        })
        .await
    }

    async fn contains(&self, key: &str) -> Result<bool, Self::Error> {
        let key = key.to_owned();
        let count: i64 = self
            .run(move |conn| {
                conn.query_row(
                    "SELECT COUNT(*) FROM cart_kv WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
            })
            .await?;
        Ok(count > 0)
    }
}
