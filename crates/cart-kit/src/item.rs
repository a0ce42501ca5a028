use alloc::string::String;
use core::fmt;

use crate::Change;

/// A unit price that cannot be stored.
///
/// Prices must be finite and not negative. JSON has no representation for
/// NaN or infinity, so such a price would not survive a snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidPrice(
    /// The rejected value.
    pub f64,
);

impl fmt::Display for InvalidPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid price {}: must be a finite number >= 0",
            self.0
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidPrice {}

/// Check that `price` is finite and not negative.
///
/// ```
/// use cart_kit::{validate_price, InvalidPrice};
///
/// assert_eq!(validate_price(19.5), Ok(19.5));
/// assert_eq!(validate_price(-1.0), Err(InvalidPrice(-1.0)));
/// assert!(validate_price(f64::INFINITY).is_err());
/// ```
pub fn validate_price(price: f64) -> Result<f64, InvalidPrice> {
    if price.is_finite() && price >= 0.0 {
        Ok(price)
    } else {
        Err(InvalidPrice(price))
    }
}

/// A product offered to the cart.
///
/// Carries everything a [`CartItem`] does except the quantity. Passing the
/// same `id` to [`CartState::add`](crate::CartState::add) twice merges into
/// one line item; the descriptive fields of the second product are ignored.
///
/// # Example
///
/// ```
/// use cart_kit::Product;
///
/// let tee = Product::new("sku-1", "Tee", "https://img/tee.png", 19.5).unwrap();
/// assert_eq!(tee.id(), "sku-1");
///
/// assert!(Product::new("sku-2", "Mug", "", f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    id: String,
    title: String,
    image_url: String,
    price: f64,
}

impl Product {
    /// Create a product descriptor.
    ///
    /// Fails if `price` is NaN, infinite or negative.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Result<Self, InvalidPrice> {
        Ok(Self {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price: validate_price(price)?,
        })
    }

    /// Opaque product identifier; the merge key.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Display image reference.
    #[must_use]
    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    /// Unit price.
    #[must_use]
    pub fn price(&self) -> f64 {
        self.price
    }
}

/// One distinct product in the cart together with its quantity.
///
/// The descriptive fields are fixed when the item is first added. Only the
/// owning [`CartState`](crate::CartState) changes the quantity, and it
/// removes the item instead of letting the quantity reach zero.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CartItem {
    id: String,
    title: String,
    #[cfg_attr(feature = "serde", serde(alias = "imageUrl"))]
    image_url: String,
    price: f64,
    pub(crate) quantity: u32,
}

impl CartItem {
    /// The product identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The display name captured when the item was added.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The display image reference captured when the item was added.
    #[must_use]
    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    /// The unit price captured when the item was added.
    #[must_use]
    pub fn price(&self) -> f64 {
        self.price
    }

    /// How many units of this product are in the cart.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

impl CartItem {
    /// Add one unit, saturating at `u32::MAX`.
    pub(crate) fn bump(&mut self) -> Change {
        match self.quantity.checked_add(1) {
            Some(quantity) => {
                self.quantity = quantity;
                Change::Incremented { quantity }
            }
            None => Change::Unchanged,
        }
    }
}

impl From<Product> for CartItem {
    /// A fresh line item with quantity 1.
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            title: product.title,
            image_url: product.image_url,
            price: product.price,
            quantity: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_product_starts_at_one() {
        let item = CartItem::from(Product::new("A", "T", "u", 10.0).unwrap());
        assert_eq!(item.id(), "A");
        assert_eq!(item.title(), "T");
        assert_eq!(item.image_url(), "u");
        assert_eq!(item.price(), 10.0);
        assert_eq!(item.quantity(), 1);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_field_names() {
        let item = CartItem::from(Product::new("A", "T", "u", 10.0).unwrap());
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "A",
                "title": "T",
                "image_url": "u",
                "price": 10.0,
                "quantity": 1
            })
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_accepts_camel_case_image_url() {
        let item: CartItem = serde_json::from_str(
            r#"{"id":"A","title":"T","imageUrl":"u","price":10,"quantity":3}"#,
        )
        .unwrap();
        assert_eq!(item.image_url(), "u");
        assert_eq!(item.quantity(), 3);
    }

    #[test]
    fn rejects_unstorable_prices() {
        for price in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, -0.01] {
            let err = Product::new("A", "T", "u", price).unwrap_err();
            assert!(err.0.is_nan() || err.0 == price);
        }
    }

    #[test]
    fn accepts_zero_and_positive_prices() {
        assert_eq!(Product::new("A", "T", "u", 0.0).unwrap().price(), 0.0);
        assert_eq!(Product::new("A", "T", "u", 10.5).unwrap().price(), 10.5);
    }
}
