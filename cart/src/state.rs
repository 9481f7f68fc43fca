//! Cart state types.
//!
//! The cart is logically a mapping keyed by `(product, size, color)` with
//! insertion-order iteration. Totals are always derived by summation over the
//! live collection - there is no separately-mutated running counter, which
//! eliminates an entire class of drift bugs.

use crate::error::CartError;
use crate::providers::OrderId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Opaque product identifier, stable across sessions.
///
/// Not interpreted by the cart core; equality is all that matters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a new `ProductId` from a string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Money amount in cents (to avoid floating point issues)
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Zero amount
    pub const ZERO: Self = Self(0);

    /// Creates a new money amount from cents
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Creates a new money amount from dollars (converted to cents)
    #[must_use]
    pub const fn from_dollars(dollars: i64) -> Self {
        Self(dollars * 100)
    }

    /// Returns the value in cents
    #[must_use]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Multiplies a unit price by a quantity
    #[must_use]
    pub const fn times(self, quantity: u32) -> Self {
        Self(self.0 * quantity as i64)
    }

    /// Adds two amounts
    #[must_use]
    pub const fn plus(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl fmt::Display for Money {
    #[allow(clippy::cast_precision_loss)] // i64 to f64 precision loss is acceptable for display
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0 as f64 / 100.0)
    }
}

/// The composite key identifying a cart line uniquely.
///
/// No two items in the collection may share this tuple. All mutation
/// operations locate their target by it, never by a synthetic row id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    /// Product identifier
    pub product_id: ProductId,
    /// Optional size variant discriminator
    pub size: Option<String>,
    /// Optional color variant discriminator
    pub color: Option<String>,
}

impl ItemKey {
    /// Creates a key with no variant discriminators
    #[must_use]
    pub fn of(product_id: impl Into<String>) -> Self {
        Self {
            product_id: ProductId::new(product_id),
            size: None,
            color: None,
        }
    }

    /// Sets the size discriminator
    #[must_use]
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// Sets the color discriminator
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Lifecycle tag of a cart line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Live line, eligible for every mutation
    InCart,
    /// Included in a successfully submitted order; lines carry this status in
    /// the success action payload as they leave the collection
    OnTheWay,
    /// Tombstoned by `MarkRemoved`: logically removed but not deleted.
    /// When a tombstoned line should disappear from display is the caller's
    /// decision, not the cart core's.
    Removed,
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InCart => write!(f, "in_cart"),
            Self::OnTheWay => write!(f, "on_the_way"),
            Self::Removed => write!(f, "removed"),
        }
    }
}

/// A single line in the cart.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Composite identity of this line
    pub key: ItemKey,
    /// Display name (not used for identity)
    pub name: String,
    /// Price per unit at time of add; immutable once the line exists
    pub unit_price: Money,
    /// Opaque display reference (not used for identity)
    pub image: String,
    /// Units in the cart; always >= 1, a line never persists at quantity 0
    pub quantity: u32,
    /// Lifecycle tag
    pub status: ItemStatus,
}

impl CartItem {
    /// Calculates the total price for this line
    #[must_use]
    pub const fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// Status of the order-submission interaction.
///
/// Represented explicitly so overlapping submissions can be rejected instead
/// of racing: entry into submission is guarded by the `Submitting` variant.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum SubmissionStatus {
    /// No submission in progress
    #[default]
    Idle,
    /// A submission for these keys is in flight
    Submitting {
        /// Composite keys of the lines being submitted
        keys: Vec<ItemKey>,
    },
    /// The last submission succeeded
    Succeeded {
        /// Order identifier assigned by the remote service
        order_id: OrderId,
    },
    /// The last submission failed; the cart collection is unchanged so the
    /// caller may retry without re-selecting
    Failed {
        /// Why the submission failed
        error: CartError,
    },
}

/// State of the cart aggregate.
///
/// Created empty at session start and mutated only through
/// [`CartReducer`](crate::reducer::CartReducer) operations.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CartState {
    /// Cart lines in insertion order
    pub items: Vec<CartItem>,
    /// Submission state machine
    pub submission: SubmissionStatus,
    /// Last rejected operation (if any); rejections that cannot overwrite an
    /// in-flight `submission` are still observable here
    pub last_error: Option<CartError>,
}

impl CartState {
    /// Creates a new empty cart
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            submission: SubmissionStatus::Idle,
            last_error: None,
        }
    }

    /// Finds the position of the line matching `key`
    #[must_use]
    pub fn position(&self, key: &ItemKey) -> Option<usize> {
        self.items.iter().position(|item| item.key == *key)
    }

    /// Returns the line matching `key`, if any
    #[must_use]
    pub fn item(&self, key: &ItemKey) -> Option<&CartItem> {
        self.items.iter().find(|item| item.key == *key)
    }

    /// Total units across all lines
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Whole-cart total, derived by summation over the live collection
    #[must_use]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(
            self.items
                .iter()
                .map(|item| item.line_total().cents())
                .sum(),
        )
    }

    /// Subtotal over exactly the lines whose key is in `keys`.
    ///
    /// Pure read view; the empty selection yields zero and the full selection
    /// equals [`CartState::total_amount`].
    #[must_use]
    pub fn selection_subtotal(&self, keys: &HashSet<ItemKey>) -> Money {
        Money::from_cents(
            self.items
                .iter()
                .filter(|item| keys.contains(&item.key))
                .map(|item| item.line_total().cents())
                .sum(),
        )
    }

    /// All composite keys in the cart, in insertion order
    #[must_use]
    pub fn all_keys(&self) -> Vec<ItemKey> {
        self.items.iter().map(|item| item.key.clone()).collect()
    }

    /// Whether a submission is currently in flight
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        matches!(self.submission, SubmissionStatus::Submitting { .. })
    }
}

/// Select-all toggle over an externally-held selection set.
///
/// If every key is already selected, returns the empty selection; otherwise
/// returns the full key set. The selection itself is held by the caller, not
/// by [`CartState`] - it only interacts with submission identity.
#[must_use]
pub fn toggle_select_all(current: &HashSet<ItemKey>, all_keys: &[ItemKey]) -> HashSet<ItemKey> {
    if current.len() == all_keys.len() {
        HashSet::new()
    } else {
        all_keys.iter().cloned().collect()
    }
}
