//! The persisted snapshot format.
//!
//! A snapshot is the whole cart written as a JSON array of line items:
//!
//! ```json
//! [{"id":"A","title":"T","image_url":"u","price":10.0,"quantity":2}]
//! ```
//!
//! Decoding trusts the stored invariants; it does not re-check quantities or
//! id uniqueness.

use cart_kit::CartState;

/// Storage key the snapshot lives under unless configured otherwise.
pub const DEFAULT_SNAPSHOT_KEY: &str = "@Cart";

/// Serialize the cart into its snapshot text.
pub fn encode(state: &CartState) -> Result<String, serde_json::Error> {
    serde_json::to_string(state)
}

/// Parse snapshot text back into a cart.
pub fn decode(raw: &str) -> Result<CartState, serde_json::Error> {
    serde_json::from_str(raw)
}
