//! # Cart Store
//!
//! The ordered collection of scanned items.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Store Operations                                │
//! │                                                                         │
//! │  Trigger                  Operation               Cart Change           │
//! │  ───────                  ─────────               ───────────           │
//! │                                                                         │
//! │  New known scan ─────────► add(item) ───────────► items.push(item)     │
//! │  "Add anyway" ───────────► add(placeholder) ────► items.push(item)     │
//! │                                                                         │
//! │  Toast / cart +/- ───────► increment/decrement ─► qty ± 1 (floor 1)    │
//! │                                                                         │
//! │  Quantity entry ─────────► set_quantity() ──────► qty = max(n, 1)      │
//! │                                                                         │
//! │  Swipe remove ───────────► remove(code) ────────► items.remove(i)      │
//! │                                                                         │
//! │  "Clear cart" ───────────► clear() ─────────────► items.clear()        │
//! │                                                                         │
//! │  NOTE: Scans never change quantity. A duplicate scan only toasts.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Items are unique by `code`
//! - Quantity is always ≥ 1, with no upper bound
//! - Items keep insertion order

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::CartItem;
use crate::validation::normalize_quantity;
use crate::CART_BADGE_MAX;

// =============================================================================
// Cart Store Trait
// =============================================================================

/// Interface of the cart collaborator.
///
/// The classifier reads through this trait; the session mutates through it.
pub trait CartStore {
    /// Appends a new item.
    ///
    /// Fails with `DuplicateCode` if the code is already present.
    fn add(&mut self, item: CartItem) -> CoreResult<()>;

    /// Sets an item's quantity. Values below 1 are clamped to 1.
    fn set_quantity(&mut self, code: &str, quantity: i64) -> CoreResult<u32>;

    /// Removes an item, returning it.
    fn remove(&mut self, code: &str) -> CoreResult<CartItem>;

    /// Removes every item.
    fn clear(&mut self);

    /// Returns the item for a code.
    fn get(&self, code: &str) -> Option<&CartItem>;

    /// Items in insertion order.
    fn items(&self) -> &[CartItem];

    /// Returns true if the code is in the cart.
    fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    /// Adds one unit.
    fn increment(&mut self, code: &str) -> CoreResult<u32> {
        let current = self
            .get(code)
            .map(|item| item.quantity)
            .ok_or_else(|| CoreError::NotInCart(code.to_string()))?;
        self.set_quantity(code, i64::from(current) + 1)
    }

    /// Removes one unit, stopping at 1.
    fn decrement(&mut self, code: &str) -> CoreResult<u32> {
        let current = self
            .get(code)
            .map(|item| item.quantity)
            .ok_or_else(|| CoreError::NotInCart(code.to_string()))?;
        self.set_quantity(code, i64::from(current) - 1)
    }

    /// Number of distinct codes.
    fn item_count(&self) -> usize {
        self.items().len()
    }

    /// Sum of all quantities.
    fn total_units(&self) -> u64 {
        self.items().iter().map(|i| u64::from(i.quantity)).sum()
    }
}

// =============================================================================
// In-memory Cart
// =============================================================================

/// The shopping cart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Display summary (badge + header).
    pub fn summary(&self) -> CartSummary {
        CartSummary::from(self)
    }

    fn position(&self, code: &str) -> CoreResult<usize> {
        self.items
            .iter()
            .position(|i| i.code == code)
            .ok_or_else(|| CoreError::NotInCart(code.to_string()))
    }
}

impl CartStore for Cart {
    fn add(&mut self, item: CartItem) -> CoreResult<()> {
        if self.contains(&item.code) {
            return Err(CoreError::DuplicateCode(item.code));
        }

        debug!(code = %item.code, "Cart item added");
        self.items.push(item);
        Ok(())
    }

    fn set_quantity(&mut self, code: &str, quantity: i64) -> CoreResult<u32> {
        let quantity = normalize_quantity(quantity)?;
        let idx = self.position(code)?;
        self.items[idx].quantity = quantity;
        Ok(quantity)
    }

    fn remove(&mut self, code: &str) -> CoreResult<CartItem> {
        let idx = self.position(code)?;
        Ok(self.items.remove(idx))
    }

    fn clear(&mut self) {
        self.items.clear();
    }

    fn get(&self, code: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.code == code)
    }

    fn items(&self) -> &[CartItem] {
        &self.items
    }
}

// =============================================================================
// Summary
// =============================================================================

/// Cart totals for the header and the floating cart button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartSummary {
    /// Distinct codes.
    pub item_count: usize,
    /// Sum of quantities.
    pub total_units: u64,
    /// Badge text; `None` when the cart is empty.
    pub badge: Option<String>,
}

impl From<&Cart> for CartSummary {
    fn from(cart: &Cart) -> Self {
        let item_count = cart.item_count();
        let badge = match item_count {
            0 => None,
            n if n > CART_BADGE_MAX => Some(format!("{}+", CART_BADGE_MAX)),
            n => Some(n.to_string()),
        };

        CartSummary {
            item_count,
            total_units: cart.total_units(),
            badge,
        }
    }
}
