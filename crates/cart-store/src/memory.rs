use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::traits::KeyValueStore;

/// In-memory storage backend.
///
/// All data is stored in a `BTreeMap`; nothing touches disk.
/// Ideal for testing and prototyping.
///
/// # Example
///
/// ```
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// use cart_store::{KeyValueStore, MemoryStore};
///
/// let store = MemoryStore::new();
/// store.set("@Cart", "[]").await.unwrap();
///
/// let data = store.get("@Cart").await.unwrap();
/// assert_eq!(data.as_deref(), Some("[]"));
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

/// Error type for the in-memory backend.
///
/// The map itself never fails; the only failure is a poisoned lock left
/// behind by a panicking writer.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// Lock poisoned.
    #[error("memory store lock poisoned")]
    LockPoisoned,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    pub fn len(&self) -> usize {
        self.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>, MemoryError> {
        self.entries.lock().map_err(|_| MemoryError::LockPoisoned)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    type Error = MemoryError;

    async fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.lock()?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), Self::Error> {
        self.lock()?.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, Self::Error> {
        Ok(self.lock()?.keys().cloned().collect())
    }

    async fn contains(&self, key: &str) -> Result<bool, Self::Error> {
        Ok(self.lock()?.contains_key(key))
    }
}
