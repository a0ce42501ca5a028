use std::sync::Arc;

use async_trait::async_trait;

/// Durable key-value storage the cart persists its snapshot into.
///
/// Every backend implements this trait. Values are opaque strings: the
/// store does not interpret the snapshot, it only keeps it under a key.
/// All operations are asynchronous and may suspend the caller.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Error type for this backend.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Retrieve the value stored under `key`.
    /// Returns `None` if the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Delete the value stored under `key`. Missing keys are not an error.
    async fn remove(&self, key: &str) -> Result<(), Self::Error>;

    /// List all keys, sorted.
    async fn keys(&self) -> Result<Vec<String>, Self::Error>;

    /// Check if a key exists.
    async fn contains(&self, key: &str) -> Result<bool, Self::Error> {
        Ok(self.get(key).await?.is_some())
    }
}

#[async_trait]
impl<S: KeyValueStore> KeyValueStore for Arc<S> {
    type Error = S::Error;

    async fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), Self::Error> {
        (**self).remove(key).await
    }

    async fn keys(&self) -> Result<Vec<String>, Self::Error> {
        (**self).keys().await
    }

    async fn contains(&self, key: &str) -> Result<bool, Self::Error> {
        (**self).contains(key).await
    }
}
