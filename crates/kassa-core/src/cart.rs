//! # Cart
//!
//! The cart snapshot every pricing computation reads.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Action                 Method                  Effect                  │
//! │  ──────                 ──────                  ──────                  │
//! │  Scan / click product ► add_product()  ───────► push or qty += n        │
//! │  Change quantity ─────► update_quantity() ────► qty = n (0 removes)     │
//! │  Remove line ─────────► remove_line() ────────► line dropped            │
//! │  Build combo ─────────► replace_lines() ──────► whole list swapped      │
//! │  Sale completed ──────► clear() ──────────────► empty                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by `id` (adding an existing id increases quantity)
//! - Quantity is in `1..=MAX_ITEM_QUANTITY`
//! - At most `MAX_CART_LINES` lines

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CartLine, Product};
use crate::validation::validate_quantity;
use crate::{MAX_CART_LINES, MAX_ITEM_QUANTITY};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds a product or increases its quantity if already present.
    pub fn add_product(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        self.add_line(CartLine::from_product(product, quantity))
    }

    /// Adds a line, merging its quantity into an existing line with the same id.
    pub fn add_line(&mut self, line: CartLine) -> CoreResult<()> {
        validate_quantity(line.quantity)?;

        if let Some(existing) = self.lines.iter_mut().find(|l| l.id == line.id) {
            let new_qty = existing.quantity + line.quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            existing.quantity = new_qty;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        self.lines.push(line);
        Ok(())
    }

    /// Sets the quantity of a line. Quantity 0 removes it.
    pub fn update_quantity(&mut self, id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_line(id).map(|_| ());
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }
        validate_quantity(quantity)?;

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| CoreError::NotInCart(id.to_string()))?;
        line.quantity = quantity;
        Ok(())
    }

    /// Removes a line by id and returns it.
    pub fn remove_line(&mut self, id: &str) -> CoreResult<CartLine> {
        let index = self
            .lines
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| CoreError::NotInCart(id.to_string()))?;
        Ok(self.lines.remove(index))
    }

    /// Swaps in a whole new line list in one step and returns the old one.
    ///
    /// Used where several lines change together (combo insertion), so no
    /// reader can observe a half-applied change.
    pub fn replace_lines(&mut self, lines: Vec<CartLine>) -> CoreResult<Vec<CartLine>> {
        if lines.len() > MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }
        Ok(std::mem::replace(&mut self.lines, lines))
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    pub fn get(&self, id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Checks whether a product is in the cart, loose or inside a combo line.
    pub fn holds_product(&self, product_id: &str) -> bool {
        self.lines
            .iter()
            .any(|l| l.product_ids().any(|id| id == product_id))
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all line quantities.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of `price × quantity` over all lines.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Sum of `price × quantity` over lines in `category`.
    pub fn category_subtotal(&self, category: &str) -> Money {
        self.lines_in(category).map(CartLine::line_total).sum()
    }

    /// Summed quantity of lines in `category`.
    pub fn category_quantity(&self, category: &str) -> i64 {
        self.lines_in(category).map(|l| l.quantity).sum()
    }

    /// One unit price per unit in `category` (a line of qty 3 yields 3 entries).
    pub fn unit_prices_in(&self, category: &str) -> Vec<Money> {
        self.lines_in(category)
            .flat_map(|l| std::iter::repeat(l.price).take(l.quantity.max(0) as usize))
            .collect()
    }

    fn lines_in<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a CartLine> + 'a {
        self.lines.iter().filter(move |l| l.category == category)
    }
}

impl From<Vec<CartLine>> for Cart {
    /// Builds a cart snapshot from lines as-is, without merging.
    fn from(lines: Vec<CartLine>) -> Self {
        Cart { lines }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
