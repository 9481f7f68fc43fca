//! Cart actions.

use crate::error::CartError;
use crate::providers::OrderId;
use crate::state::{CartItem, ItemKey, Money, ProductId};
use serde::{Deserialize, Serialize};

/// Input payload for adding a product to the cart.
///
/// Carries the catalog fields needed to create a line; the quantity of the
/// resulting line is managed by the cart itself (adds always step by one).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartItemInput {
    /// Product identifier
    pub product_id: ProductId,
    /// Display name
    pub name: String,
    /// Price per unit
    pub unit_price: Money,
    /// Opaque display reference
    pub image: String,
    /// Optional size variant
    pub size: Option<String>,
    /// Optional color variant
    pub color: Option<String>,
}

impl CartItemInput {
    /// The composite key this input resolves to
    #[must_use]
    pub fn key(&self) -> ItemKey {
        ItemKey {
            product_id: self.product_id.clone(),
            size: self.size.clone(),
            color: self.color.clone(),
        }
    }
}

/// All operations the cart responds to.
///
/// `SubmissionSucceeded` and `SubmissionFailed` are fed back by the
/// submission effect; external callers have no reason to send them directly
/// and stray instances are ignored with a warning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CartAction {
    /// Add a product; merges into an existing line with the same composite
    /// key by stepping its quantity by one
    AddItem(CartItemInput),
    /// Step the quantity of the line matching `key` up by one
    IncrementQuantity {
        /// Composite key of the line
        key: ItemKey,
    },
    /// Step the quantity of the line matching `key` down by one; at quantity
    /// one the line is removed entirely
    DecrementQuantity {
        /// Composite key of the line
        key: ItemKey,
    },
    /// Delete the line matching `key`
    RemoveItem {
        /// Composite key of the line
        key: ItemKey,
    },
    /// Tombstone the line matching `key` without deleting it
    MarkRemoved {
        /// Composite key of the line
        key: ItemKey,
    },
    /// Empty the cart and reset submission state
    ClearCart,
    /// Submit the lines matching `keys` as an order
    SubmitSelection {
        /// Composite keys of the selected lines
        keys: Vec<ItemKey>,
    },
    /// Fed back by the submission effect on success
    SubmissionSucceeded {
        /// Order identifier assigned by the remote service
        order_id: OrderId,
        /// The submitted lines as they left the cart, already tagged
        /// on-the-way
        submitted: Vec<CartItem>,
    },
    /// Fed back by the submission effect on failure
    SubmissionFailed {
        /// Why the submission failed
        error: CartError,
    },
}
