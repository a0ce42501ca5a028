//! The cart store: in-memory cart state mirrored into a [`KeyValueStore`].
//!
//! `CartStore` owns the cart for the lifetime of the session. It is
//! hydrated once from the persisted snapshot, then every mutation:
//!
//! 1. builds the next [`CartState`] and publishes it synchronously, so the
//!    next caller always sees it, and
//! 2. writes the full post-mutation snapshot through to storage.
//!
//! Storage is a mirror. If a write fails the in-memory cart stays
//! authoritative and the failure is retried, then logged.
//!
//! # Example
//!
//! ```
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! use cart_store::{CartStore, Change, MemoryStore, Product};
//!
//! let cart = CartStore::open(MemoryStore::new()).await;
//!
//! cart.add_to_cart(Product::new("A", "T", "u", 10.0).unwrap()).await;
//! assert_eq!(cart.increment("A").await, Change::Incremented { quantity: 2 });
//! assert_eq!(cart.products().get("A").unwrap().quantity(), 2);
//! assert!(cart.is_durable());
//! # });
//! ```

use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cart_kit::{CartState, Change, Product};
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

use crate::config::{CartStoreConfig, RetryPolicy};
use crate::error::PersistError;
use crate::snapshot;
use crate::traits::KeyValueStore;

/// How the store's initial state was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hydration {
    /// A snapshot was found and loaded.
    Restored {
        /// Number of line items loaded.
        items: usize,
    },
    /// No snapshot existed; the cart starts empty.
    Empty,
    /// A snapshot could not be read or parsed; the cart starts empty.
    Discarded {
        /// Why the snapshot was dropped.
        reason: String,
    },
}

/// A published version of the cart.
///
/// Cheap to clone: the items sit behind an `Arc` that is never mutated
/// once published. Dereferences to [`CartState`].
#[derive(Debug, Clone)]
pub struct CartView {
    revision: u64,
    items: Arc<CartState>,
}

impl CartView {
    /// Counter of in-memory changes; 0 right after hydration.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The line items of this version.
    pub fn items(&self) -> &Arc<CartState> {
        &self.items
    }
}

impl Deref for CartView {
    type Target = CartState;

    fn deref(&self) -> &CartState {
        &self.items
    }
}

/// Session-wide cart state with write-through persistence.
///
/// Obtained only through [`CartStore::open`] or [`CartStoreBuilder::hydrate`],
/// so hydration always happens before the first mutation.
pub struct CartStore<S: KeyValueStore> {
    backend: S,
    config: CartStoreConfig,
    view: watch::Sender<CartView>,
    /// Serializes snapshot writes.
    writes: Mutex<()>,
    /// Highest revision known to be in storage.
    persisted: AtomicU64,
    hydration: Hydration,
}

impl<S: KeyValueStore> fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("config", &self.config)
            .field("revision", &self.view.borrow().revision)
            .field("persisted", &self.persisted.load(Ordering::Relaxed))
            .field("hydration", &self.hydration)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`CartStore`] with custom configuration.
pub struct CartStoreBuilder<S: KeyValueStore> {
    backend: S,
    config: CartStoreConfig,
}

impl<S: KeyValueStore> CartStoreBuilder<S> {
    /// Replace the whole configuration.
    pub fn config(mut self, config: CartStoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the storage key of the snapshot.
    pub fn snapshot_key(mut self, key: impl Into<String>) -> Self {
        self.config.snapshot_key = key.into();
        self
    }

    /// Set how failed snapshot writes are retried.
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    /// Load the snapshot and build the store.
    ///
    /// A missing or unreadable snapshot yields an empty cart; hydration
    /// never fails.
    pub async fn hydrate(self) -> CartStore<S> {
        let (state, hydration) = load(&self.backend, &self.config.snapshot_key).await;
        let (view, _) = watch::channel(CartView {
            revision: 0,
            items: Arc::new(state),
        });

        CartStore {
            backend: self.backend,
            config: self.config,
            view,
            writes: Mutex::new(()),
            persisted: AtomicU64::new(0),
            hydration,
        }
    }
}

async fn load<S: KeyValueStore>(backend: &S, key: &str) -> (CartState, Hydration) {
    let raw = match backend.get(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key, "no cart snapshot found, starting empty");
            return (CartState::new(), Hydration::Empty);
        }
        Err(e) => {
            warn!(key, error = %e, "cart snapshot could not be read, starting empty");
            let reason = e.to_string();
            return (CartState::new(), Hydration::Discarded { reason });
        }
    };

    match snapshot::decode(&raw) {
        Ok(state) => {
            let items = state.len();
            info!(key, items, "cart hydrated from snapshot");
            (state, Hydration::Restored { items })
        }
        Err(e) => {
            warn!(key, error = %e, "discarding unreadable cart snapshot");
            let reason = e.to_string();
            (CartState::new(), Hydration::Discarded { reason })
        }
    }
}

impl<S: KeyValueStore> CartStore<S> {
    /// Hydrate a store with the default configuration.
    pub async fn open(backend: S) -> Self {
        Self::builder(backend).hydrate().await
    }

    /// Create a builder for advanced configuration.
    pub fn builder(backend: S) -> CartStoreBuilder<S> {
        CartStoreBuilder {
            backend,
            config: CartStoreConfig::default(),
        }
    }

    /// The current cart, read-only.
    pub fn products(&self) -> Arc<CartState> {
        Arc::clone(&self.view.borrow().items)
    }

    /// The current cart together with its revision.
    pub fn view(&self) -> CartView {
        self.view.borrow().clone()
    }

    /// Receive every published version of the cart.
    ///
    /// No-op mutations do not notify.
    pub fn subscribe(&self) -> watch::Receiver<CartView> {
        self.view.subscribe()
    }

    /// How the initial state was obtained.
    pub fn hydration(&self) -> &Hydration {
        &self.hydration
    }

    /// The active configuration.
    pub fn config(&self) -> &CartStoreConfig {
        &self.config
    }

    /// The underlying storage backend.
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Returns `true` if storage holds the latest in-memory version.
    ///
    /// Only writes made by this store count; a snapshot discarded during
    /// hydration is not rewritten until the first mutation or `flush`.
    pub fn is_durable(&self) -> bool {
        self.persisted.load(Ordering::Acquire) >= self.view.borrow().revision
    }

    /// Add a product, merging on id.
    ///
    /// An id already in the cart gains one unit and keeps its stored title,
    /// image and price.
    pub async fn add_to_cart(&self, product: Product) -> Change {
        let id = product.id().to_owned();
        self.mutate("add_to_cart", &id, move |state| state.add(product))
            .await
    }

    /// Add one unit to an existing line item. Unknown ids are a no-op.
    pub async fn increment(&self, id: &str) -> Change {
        self.mutate("increment", id, |state| state.increment(id))
            .await
    }

    /// Take one unit off a line item, removing it at zero. Unknown ids are
    /// a no-op.
    pub async fn decrement(&self, id: &str) -> Change {
        self.mutate("decrement", id, |state| state.decrement(id))
            .await
    }

    /// Empty the cart.
    pub async fn clear(&self) -> Change {
        self.mutate("clear", "*", CartState::clear).await
    }

    /// Write the current cart to storage if it is not there yet.
    ///
    /// This is the one place persistence failures reach the caller.
    pub async fn flush(&self) -> Result<(), PersistError<S::Error>> {
        if self.is_durable() {
            return Ok(());
        }
        self.persist(self.view()).await
    }

    async fn mutate<F>(&self, op: &'static str, id: &str, f: F) -> Change
    where
        F: FnOnce(&mut CartState) -> Change,
    {
        let (change, view) = self.apply(f);
        debug!(op, id, ?change, revision = view.revision, "cart mutated");

        // Unknown ids still write the unchanged snapshot.
        if let Err(e) = self.persist(view).await {
            error!(
                op,
                error = %e,
                "cart snapshot not persisted; in-memory cart stays authoritative"
            );
        }
        change
    }

    /// Apply `f` to the current cart and publish the result before
    /// returning, so no later caller can observe the pre-mutation state.
    fn apply<F>(&self, f: F) -> (Change, CartView)
    where
        F: FnOnce(&mut CartState) -> Change,
    {
        let mut change = Change::Unchanged;
        let mut published = None;

        self.view.send_if_modified(|view| {
            let mut next = CartState::clone(&view.items);
            change = f(&mut next);
            if change.is_modified() {
                view.revision += 1;
                view.items = Arc::new(next);
            }
            published = Some(view.clone());
            change.is_modified()
        });

        (change, published.unwrap_or_else(|| self.view()))
    }

    /// Write `view` through to storage.
    ///
    /// Writes are serialized. A view older than what storage already holds
    /// is dropped, so storage never goes back to a stale cart.
    async fn persist(&self, view: CartView) -> Result<(), PersistError<S::Error>> {
        let _gate = self.writes.lock().await;

        let persisted = self.persisted.load(Ordering::Acquire);
        if view.revision < persisted {
            debug!(
                revision = view.revision,
                persisted, "skipping superseded cart snapshot"
            );
            return Ok(());
        }

        let payload = snapshot::encode(&view.items)?;
        let key = self.config.snapshot_key.as_str();
        let attempts = self.config.retry.attempts();
        let mut attempt = 1;

        loop {
            match self.backend.set(key, &payload).await {
                Ok(()) => {
                    self.persisted.store(view.revision, Ordering::Release);
                    return Ok(());
                }
                Err(source) if attempt >= attempts => {
                    return Err(PersistError::Backend { attempts, source });
                }
                Err(e) => {
                    warn!(key, attempt, error = %e, "cart snapshot write failed");
                    self.config.retry.wait_before_retry(attempt).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    fn product(id: &str) -> Product {
        Product::new(id, "T", "u", 10.0).unwrap()
    }

    async fn stored(store: &CartStore<MemoryStore>) -> CartState {
        let raw = store.backend().get("@Cart").await.unwrap().unwrap();
        snapshot::decode(&raw).unwrap()
    }

    #[tokio::test]
    async fn starts_empty_without_snapshot() {
        let store = CartStore::open(MemoryStore::new()).await;
        assert!(store.products().is_empty());
        assert_eq!(store.hydration(), &Hydration::Empty);
        assert_eq!(store.view().revision(), 0);
    }

    #[tokio::test]
    async fn each_mutation_writes_post_mutation_state() {
        let store = CartStore::open(MemoryStore::new()).await;

        store.add_to_cart(product("A")).await;
        assert_eq!(stored(&store).await.get("A").unwrap().quantity(), 1);

        store.add_to_cart(product("A")).await;
        assert_eq!(stored(&store).await.get("A").unwrap().quantity(), 2);

        store.increment("A").await;
        assert_eq!(stored(&store).await.get("A").unwrap().quantity(), 3);

        store.decrement("A").await;
        assert_eq!(stored(&store).await.get("A").unwrap().quantity(), 2);
    }

    #[tokio::test]
    async fn noop_still_writes_snapshot() {
        let store = CartStore::open(MemoryStore::new()).await;
        assert!(!store.backend().contains("@Cart").await.unwrap());

        assert_eq!(store.decrement("Z").await, Change::Unchanged);
        assert_eq!(
            store.backend().get("@Cart").await.unwrap().as_deref(),
            Some("[]")
        );
        assert_eq!(store.view().revision(), 0);
    }

    #[tokio::test]
    async fn superseded_view_is_not_written() {
        let store = CartStore::open(MemoryStore::new()).await;

        store.add_to_cart(product("A")).await;
        let old = store.view();
        store.increment("A").await;

        store.persist(old).await.unwrap();
        assert_eq!(stored(&store).await.get("A").unwrap().quantity(), 2);
    }

    #[tokio::test]
    async fn published_views_are_not_aliased() {
        let store = CartStore::open(MemoryStore::new()).await;
        store.add_to_cart(product("A")).await;

        let before = store.products();
        store.add_to_cart(product("A")).await;

        assert_eq!(before.get("A").unwrap().quantity(), 1);
        assert_eq!(store.products().get("A").unwrap().quantity(), 2);
    }

    #[tokio::test]
    async fn subscribers_see_changes_but_not_noops() {
        let store = CartStore::open(MemoryStore::new()).await;
        let mut rx = store.subscribe();

        store.increment("Z").await;
        assert!(!rx.has_changed().unwrap());

        store.add_to_cart(product("A")).await;
        assert!(rx.has_changed().unwrap());
        let view = rx.borrow_and_update().clone();
        assert_eq!(view.revision(), 1);
        assert!(view.contains("A"));
    }

    #[tokio::test]
    async fn custom_snapshot_key() {
        let store = CartStore::builder(MemoryStore::new())
            .snapshot_key("@Cart:guest")
            .hydrate()
            .await;
        store.add_to_cart(product("A")).await;

        assert!(store.backend().contains("@Cart:guest").await.unwrap());
        assert!(!store.backend().contains("@Cart").await.unwrap());
    }

    #[tokio::test]
    async fn clear_persists_empty_cart() {
        let store = CartStore::open(MemoryStore::new()).await;
        store.add_to_cart(product("A")).await;
        store.add_to_cart(product("B")).await;

        assert_eq!(store.clear().await, Change::Cleared { removed: 2 });
        assert!(stored(&store).await.is_empty());
    }
}
