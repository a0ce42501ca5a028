use alloc::vec::Vec;

use crate::{CartItem, Product};

/// What a single mutation did to a [`CartState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// A new line item was appended with quantity 1.
    Added,
    /// An existing line item gained a unit.
    Incremented {
        /// Quantity after the change.
        quantity: u32,
    },
    /// An existing line item lost a unit and is still in the cart.
    Decremented {
        /// Quantity after the change.
        quantity: u32,
    },
    /// The line item's last unit was taken out, so the item was removed.
    Removed,
    /// Every line item was dropped.
    Cleared {
        /// Number of line items that were in the cart.
        removed: usize,
    },
    /// Nothing changed; the collection is untouched.
    Unchanged,
}

impl Change {
    /// Returns `true` if the collection was modified.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// The cart: line items keyed uniquely by product id.
///
/// Every item held here has a quantity of at least 1 and no two items share
/// an id. Insertion order is kept for display but carries no meaning.
///
/// # Example
///
/// ```
/// use cart_kit::prelude::*;
///
/// let mut cart = CartState::new();
/// assert_eq!(cart.add(Product::new("A", "T", "u", 10.0)?), Change::Added);
/// assert_eq!(cart.increment("A"), Change::Incremented { quantity: 2 });
/// assert_eq!(cart.increment("Z"), Change::Unchanged);
/// assert_eq!(cart.total_quantity(), 2);
/// # Ok::<(), cart_kit::InvalidPrice>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct CartState {
    items: Vec<CartItem>,
}

impl CartState {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add a product, merging on id.
    ///
    /// If the id is already in the cart its quantity goes up by one and the
    /// stored title, image and price are kept as they were. Otherwise the
    /// product is appended with quantity 1.
    pub fn add(&mut self, product: Product) -> Change {
        match self.find_mut(product.id()) {
            Some(item) => item.bump(),
            None => {
                self.items.push(CartItem::from(product));
                Change::Added
            }
        }
    }

    /// Add one unit to an existing line item.
    ///
    /// Unknown ids are left alone; no item is fabricated. A quantity already
    /// at `u32::MAX` stays there and reports [`Change::Unchanged`].
    pub fn increment(&mut self, id: &str) -> Change {
        match self.find_mut(id) {
            Some(item) => item.bump(),
            None => Change::Unchanged,
        }
    }

    /// Take one unit off an existing line item.
    ///
    /// When the quantity would drop to zero the item is removed instead.
    /// Unknown ids are left alone.
    pub fn decrement(&mut self, id: &str) -> Change {
        let Some(index) = self.position(id) else {
            return Change::Unchanged;
        };

        let remaining = self
            .items
            .get(index)
            .map_or(0, |item| item.quantity.saturating_sub(1));

        if remaining == 0 {
            self.items.remove(index);
            return Change::Removed;
        }

        if let Some(item) = self.items.get_mut(index) {
            item.quantity = remaining;
        }
        Change::Decremented {
            quantity: remaining,
        }
    }

    /// Drop every line item.
    pub fn clear(&mut self) -> Change {
        let removed = self.items.len();
        self.items.clear();
        if removed == 0 {
            Change::Unchanged
        } else {
            Change::Cleared { removed }
        }
    }

    /// Look up a line item by product id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Check whether a product id is in the cart.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Number of distinct line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities across all line items.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Iterate over the line items in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CartItem> {
        self.items.iter()
    }

    /// The line items as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[CartItem] {
        &self.items
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| item.id() == id)
    }
}

impl<'a> IntoIterator for &'a CartState {
    type Item = &'a CartItem;
    type IntoIter = core::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for CartState {
    type Item = CartItem;
    type IntoIter = alloc::vec::IntoIter<CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str) -> Product {
        Product::new(id, "T", "u", 10.0).unwrap()
    }

    #[test]
    fn add_to_empty_cart() {
        let mut cart = CartState::new();
        assert_eq!(cart.add(product("A")), Change::Added);

        assert_eq!(cart.len(), 1);
        let item = cart.get("A").unwrap();
        assert_eq!(item.quantity(), 1);
        assert_eq!(item.price(), 10.0);
        assert_eq!(item.title(), "T");
        assert_eq!(item.image_url(), "u");
    }

    #[test]
    fn repeat_add_merges_and_keeps_first_fields() {
        let mut cart = CartState::new();
        cart.add(product("A"));

        let change = cart.add(Product::new("A", "Other title", "other.png", 99.0).unwrap());
        assert_eq!(change, Change::Incremented { quantity: 2 });

        assert_eq!(cart.len(), 1);
        let item = cart.get("A").unwrap();
        assert_eq!(item.quantity(), 2);
        assert_eq!(item.title(), "T");
        assert_eq!(item.image_url(), "u");
        assert_eq!(item.price(), 10.0);
    }

    #[test]
    fn increment_existing() {
        let mut cart = CartState::new();
        cart.add(product("A"));
        cart.add(product("A"));

        assert_eq!(cart.increment("A"), Change::Incremented { quantity: 3 });
        assert_eq!(cart.get("A").unwrap().quantity(), 3);
    }

    #[test]
    fn increment_unknown_is_noop() {
        let mut cart = CartState::new();
        cart.add(product("A"));
        let before = cart.clone();

        assert_eq!(cart.increment("Z"), Change::Unchanged);
        assert_eq!(cart, before);
        assert!(!cart.contains("Z"));
    }

    #[test]
    fn decrement_above_one() {
        let mut cart = CartState::new();
        cart.add(product("A"));
        cart.add(product("A"));

        assert_eq!(cart.decrement("A"), Change::Decremented { quantity: 1 });
        assert_eq!(cart.get("A").unwrap().quantity(), 1);
    }

    #[test]
    fn decrement_last_unit_removes_item() {
        let mut cart = CartState::new();
        cart.add(product("A"));
        cart.add(product("B"));

        assert_eq!(cart.decrement("A"), Change::Removed);
        assert!(!cart.contains("A"));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn decrement_unknown_is_noop() {
        let mut cart = CartState::new();
        cart.add(product("A"));
        let before = cart.clone();

        assert_eq!(cart.decrement("Z"), Change::Unchanged);
        assert_eq!(cart, before);
    }

    #[test]
    fn mutations_keep_position() {
        let mut cart = CartState::new();
        cart.add(product("A"));
        cart.add(product("B"));
        cart.add(product("C"));
        cart.increment("A");
        cart.decrement("A");

        let ids: Vec<&str> = cart.iter().map(CartItem::id).collect();
        assert_eq!(ids, ["A", "B", "C"]);
    }

    #[test]
    fn clear_reports_removed_count() {
        let mut cart = CartState::new();
        assert_eq!(cart.clear(), Change::Unchanged);

        cart.add(product("A"));
        cart.add(product("B"));
        assert_eq!(cart.clear(), Change::Cleared { removed: 2 });
        assert!(cart.is_empty());
    }

    #[test]
    fn increment_at_max_is_unchanged() {
        let mut cart = CartState::new();
        cart.add(product("A"));
        if let Some(item) = cart.find_mut("A") {
            item.quantity = u32::MAX;
        }

        assert_eq!(cart.increment("A"), Change::Unchanged);
        assert_eq!(cart.add(product("A")), Change::Unchanged);
        assert_eq!(cart.get("A").unwrap().quantity(), u32::MAX);

        assert_eq!(
            cart.decrement("A"),
            Change::Decremented { quantity: u32::MAX - 1 }
        );
        assert_eq!(
            cart.increment("A"),
            Change::Incremented { quantity: u32::MAX }
        );
    }

    #[test]
    fn total_quantity_sums_units() {
        let mut cart = CartState::new();
        cart.add(product("A"));
        cart.add(product("A"));
        cart.add(product("B"));
        assert_eq!(cart.total_quantity(), 3);
    }

    #[test]
    fn change_is_modified() {
        assert!(Change::Added.is_modified());
        assert!(Change::Removed.is_modified());
        assert!(!Change::Unchanged.is_modified());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_as_plain_array() {
        let mut cart = CartState::new();
        cart.add(product("A"));

        let json = serde_json::to_string(&cart).unwrap();
        assert!(json.starts_with('['));

        let back: CartState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cart);
    }
}
