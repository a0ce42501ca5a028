//! Convenient re-exports for common usage.
//!
//! ```
//! use cart_kit::prelude::*;
//! ```

pub use crate::CartItem;
pub use crate::CartState;
pub use crate::InvalidPrice;
pub use crate::Change;
pub use crate::Product;
