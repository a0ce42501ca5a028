//! # cart-kit
//!
//! Shopping-cart line items and the rules that mutate them.
//!
//! A cart is an ordered collection of [`CartItem`]s keyed by product id.
//! Three operations change it:
//!
//! - [`CartState::add`] merges on id: a product already in the cart gets its
//!   quantity bumped, a new one is appended with quantity 1.
//! - [`CartState::increment`] bumps an existing line item.
//! - [`CartState::decrement`] lowers an existing line item and removes it
//!   once its quantity would reach zero.
//!
//! Unknown ids are never an error: increment and decrement simply report
//! [`Change::Unchanged`].
//!
//! ## `no_std` Support
//!
//! This crate supports `no_std` environments with the `alloc` crate.
//! Disable the default `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! cart-kit = { version = "0.1", default-features = false }
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use cart_kit::prelude::*;
//!
//! let mut cart = CartState::new();
//! let tee = Product::new("A", "Tee", "https://img/a.png", 10.0)?;
//! cart.add(tee.clone());
//! cart.add(tee);
//!
//! assert_eq!(cart.get("A").unwrap().quantity(), 2);
//!
//! cart.decrement("A");
//! cart.decrement("A");
//! assert!(cart.is_empty());
//! # Ok::<(), cart_kit::InvalidPrice>(())
//! ```
//!
//! ## Serialization
//!
//! With the `serde` feature, [`CartState`] serializes as a plain array of
//! line items with the fields `id`, `title`, `image_url`, `price` and
//! `quantity`. `imageUrl` is accepted as an alias when reading.

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

mod item;
mod state;

pub mod prelude;

pub use item::{validate_price, CartItem, InvalidPrice, Product};
pub use state::{CartState, Change};
