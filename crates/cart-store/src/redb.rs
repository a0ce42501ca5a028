//! Pure-Rust key-value backend using [`redb`](https://docs.rs/redb).
//!
//! No C dependencies. Useful where SQLite can't be cross-compiled, or when
//! you want a fully Rust-native stack.
//!
//! Enable with `features = ["redb"]`.
//!
//! ```no_run
//! # async fn demo() -> Result<(), cart_store::RedbError> {
//! use cart_store::{KeyValueStore, RedbStore};
//!
//! let store = RedbStore::open("/tmp/cart.redb")?;
//! store.set("@Cart", "[]").await?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use ::redb::{Database, ReadableTable, TableDefinition};

use crate::traits::KeyValueStore;

const KV_TABLE: TableDefinition<&str, &str> = TableDefinition::new("cart_kv");

/// Errors returned by [`RedbStore`] operations.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct RedbError(String);

fn err(e: impl std::fmt::Display) -> RedbError {
    RedbError(e.to_string())
}

/// A pure-Rust persistence backend built on [`redb`].
///
/// Each operation runs in its own redb transaction on tokio's blocking
/// pool, so every write is atomic and durable once it returns.
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create a redb database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RedbError> {
        let db = Database::create(path).map_err(err)?;
        Self::with_database(db)
    }

    /// Create an in-memory redb database (for testing).
    pub fn open_in_memory() -> Result<Self, RedbError> {
        let backend = ::redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(err)?;
        Self::with_database(db)
    }

    fn with_database(db: Database) -> Result<Self, RedbError> {
        // Read transactions fail on tables that were never created.
        let txn = db.begin_write().map_err(err)?;
        txn.open_table(KV_TABLE).map_err(err)?;
        txn.commit().map_err(err)?;
        Ok(Self { db: Arc::new(db) })
    }

    async fn run<F, R>(&self, f: F) -> Result<R, RedbError>
    where
        F: FnOnce(&Database) -> Result<R, RedbError> + Send + 'static,
        R: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(err)?
    }
}

#[async_trait]
impl KeyValueStore for RedbStore {
    type Error = RedbError;

    async fn get(&self, key: &str) -> Result<Option<String>, RedbError> {
        let key = key.to_owned();
        self.run(move |db| {
            let txn = db.begin_read().map_err(err)?;
            let table = txn.open_table(KV_TABLE).map_err(err)?;
            let value = table
                .get(key.as_str())
                .map_err(err)?
                .map(|guard| guard.value().to_owned());
            Ok(value)
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), RedbError> {
        let key = key.to_owned();
        let value = value.to_owned();
        self.run(move |db| {
            let txn = db.begin_write().map_err(err)?;
            {
                let mut table = txn.open_table(KV_TABLE).map_err(err)?;
                table
                    .insert(key.as_str(), value.as_str())
                    .map_err(err)?;
            }
            txn.commit().map_err(err)
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), RedbError> {
        let key = key.to_owned();
        self.run(move |db| {
            let txn = db.begin_write().map_err(err)?;
            {
                let mut table = txn.open_table(KV_TABLE).map_err(err)?;
                table.remove(key.as_str()).map_err(err)?;
            }
            txn.commit().map_err(err)
        })
        .await
    }

    async fn keys(&self) -> Result<Vec<String>, RedbError> {
        self.run(|db| {
            let txn = db.begin_read().map_err(err)?;
            let table = txn.open_table(KV_TABLE).map_err(err)?;

            let mut keys = Vec::new();
            for item in table.iter().map_err(err)? {
                let (key_guard, _) = item.map_err(err)?;
                keys.push(key_guard.value().to_owned());
            }
            Ok(keys)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> RedbStore {
        RedbStore::open_in_memory().unwrap()
    }

    #[tokio::test]
    async fn set_get_remove() {
        let store = test_store();

        store.set("k1", "hello").await.unwrap();
        assert_eq!(store.get("k1").await.unwrap().as_deref(), Some("hello"));

        store.set("k1", "world").await.unwrap();
        assert_eq!(store.get("k1").await.unwrap().as_deref(), Some("world"));

        store.remove("k1").await.unwrap();
        assert_eq!(store.get("k1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let store = test_store();
        assert_eq!(store.get("nope").await.unwrap(), None);
        assert!(!store.contains("nope").await.unwrap());
        store.remove("nope").await.unwrap();
    }

    #[tokio::test]
    async fn keys_are_sorted() {
        let store = test_store();
        store.set("b", "2").await.unwrap();
        store.set("a", "1").await.unwrap();

        assert_eq!(store.keys().await.unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn reopen_file_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.redb");

        {
            let store = RedbStore::open(&path).unwrap();
            store.set("@Cart", "[]").await.unwrap();
        }

        let store = RedbStore::open(&path).unwrap();
        assert_eq!(store.get("@Cart").await.unwrap().as_deref(), Some("[]"));
    }
}
