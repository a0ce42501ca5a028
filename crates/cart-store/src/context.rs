use std::fmt;
use std::sync::Arc;

use crate::error::UsageError;
use crate::store::CartStore;
use crate::traits::KeyValueStore;

/// Injectable handle to the session's cart.
///
/// Components receive a `CartContext` instead of reaching for a global.
/// A context that was never given a store refuses access with
/// [`UsageError::NotProvided`] rather than pretending the cart is empty.
///
/// # Example
///
/// ```
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// use cart_store::{CartContext, CartStore, MemoryStore, UsageError};
///
/// let missing: CartContext<MemoryStore> = CartContext::empty();
/// assert_eq!(missing.cart().err(), Some(UsageError::NotProvided));
///
/// let ctx = CartContext::from(CartStore::open(MemoryStore::new()).await);
/// assert!(ctx.cart().unwrap().products().is_empty());
/// # });
/// ```
pub struct CartContext<S: KeyValueStore> {
    store: Option<Arc<CartStore<S>>>,
}

impl<S: KeyValueStore> CartContext<S> {
    /// A context with no store behind it.
    pub fn empty() -> Self {
        Self { store: None }
    }

    /// A context sharing `store`.
    pub fn provide(store: Arc<CartStore<S>>) -> Self {
        Self { store: Some(store) }
    }

    /// Access the cart.
    pub fn cart(&self) -> Result<&Arc<CartStore<S>>, UsageError> {
        self.store.as_ref().ok_or(UsageError::NotProvided)
    }

    /// Returns `true` if a store was provided.
    pub fn is_provided(&self) -> bool {
        self.store.is_some()
    }
}

impl<S: KeyValueStore> From<CartStore<S>> for CartContext<S> {
    fn from(store: CartStore<S>) -> Self {
        Self::provide(Arc::new(store))
    }
}

impl<S: KeyValueStore> Default for CartContext<S> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<S: KeyValueStore> Clone for CartContext<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: KeyValueStore> fmt::Debug for CartContext<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartContext")
            .field("provided", &self.is_provided())
            .finish()
    }
}
