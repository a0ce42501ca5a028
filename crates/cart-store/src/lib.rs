//! # cart-store
//!
//! Persistent shopping-cart state for [`cart-kit`](cart_kit).
//!
//! [`CartStore`] holds the session's cart in memory, hydrates it once from a
//! snapshot at startup, and writes the full snapshot through to a
//! [`KeyValueStore`] after every mutation. Memory is authoritative: a failed
//! write is retried and logged, never surfaced to the code that mutated the
//! cart.
//!
//! ## Quick Start
//!
//! ```
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! use std::sync::Arc;
//! use cart_store::{CartStore, MemoryStore, Product};
//!
//! let storage = Arc::new(MemoryStore::new());
//!
//! let cart = CartStore::open(Arc::clone(&storage)).await;
//! let tee = Product::new("A", "T", "u", 10.0).unwrap();
//! cart.add_to_cart(tee.clone()).await;
//! cart.add_to_cart(tee).await;
//!
//! // A later session picks up where this one left off.
//! let restored = CartStore::open(storage).await;
//! assert_eq!(restored.products().get("A").unwrap().quantity(), 2);
//! # });
//! ```
//!
//! ## Backends
//!
//! | Backend | Feature flag | Use case |
//! |---------|-------------|----------|
//! | [`MemoryStore`] | *(always available)* | Testing, prototyping |
//! | `SqliteStore` | `sqlite` | Mobile, desktop |
//! | `RedbStore` | `redb` | Pure-Rust stack without C deps |

mod config;
mod context;
mod error;
mod memory;
#[cfg(feature = "redb")]
mod redb;
pub mod snapshot;
#[cfg(feature = "sqlite")]
mod sqlite;
mod store;
mod traits;

pub use cart_kit::{validate_price, CartItem, CartState, Change, InvalidPrice, Product};
pub use config::{CartStoreConfig, RetryPolicy};
pub use context::CartContext;
pub use error::{PersistError, UsageError};
pub use memory::{MemoryError, MemoryStore};
#[cfg(feature = "redb")]
pub use self::redb::{RedbError, RedbStore};
pub use snapshot::DEFAULT_SNAPSHOT_KEY;
#[cfg(feature = "sqlite")]
pub use sqlite::{JournalMode, SqliteConfig, SqliteError, SqliteStore};
pub use store::{CartStore, CartStoreBuilder, CartView, Hydration};
pub use traits::KeyValueStore;
