//! # Session State
//!
//! Everything a register mutates while it is open: the catalog with its
//! stock counts, the cart, the pricing engine and the sale log.
//!
//! ## Thread Safety
//! The whole session sits behind one `Arc<Mutex<T>>`, so:
//! 1. A pricing pass reads cart, rules and the applied promo code together
//! 2. A combo insertion is observed all at once
//! 3. A sale prices, counts usage, takes stock and clears the cart in one step
//!
//! ## Sale Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  complete_sale(card)                                                    │
//! │     │                                                                   │
//! │     ├── cart empty? ───────────────────────────► EmptyCart              │
//! │     ├── units per product (combo lines count    ► InsufficientStock     │
//! │     │   their constituents) > stock?                                    │
//! │     ├── price: subtotal - DiscountResult.total                          │
//! │     ├── engine.record_sale()   usage counts, promo cleared              │
//! │     ├── catalog.take_stock()                                            │
//! │     ├── transactions.push()                                             │
//! │     └── cart.clear()                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex};

use kassa_core::pricing::{DiscountResult, PricingEngine};
use kassa_core::{
    Cart, CartLine, Catalog, CoreError, CoreResult, Money, PaymentMethod, Transaction,
};
use tracing::{debug, info};

use crate::error::ApiError;

/// Result of a completed sale.
#[derive(Debug, Clone)]
pub struct CompletedSale {
    pub transaction: Transaction,
    pub subtotal: Money,
    pub discount: DiscountResult,
}

#[derive(Debug)]
pub struct PosSession {
    pub catalog: Catalog,
    pub cart: Cart,
    pub engine: PricingEngine,
    /// Append-only sale log, oldest first.
    pub transactions: Vec<Transaction>,
}

impl PosSession {
    pub fn new(catalog: Catalog, engine: PricingEngine) -> Self {
        PosSession {
            catalog,
            cart: Cart::new(),
            engine,
            transactions: Vec::new(),
        }
    }

    /// Subtotal and discount of the current cart.
    pub fn price_cart(&self) -> (Money, DiscountResult) {
        let subtotal = self.cart.subtotal();
        let discount = self.engine.get_total_discount(&self.cart, subtotal);
        (subtotal, discount)
    }

    /// Units of `product_id` the cart would sell, loose and inside combos.
    pub fn units_in_cart(&self, product_id: &str) -> i64 {
        self.cart
            .lines()
            .iter()
            .filter(|l| l.product_ids().any(|id| id == product_id))
            .map(|l| l.quantity)
            .sum()
    }

    fn ensure_stock(&self, product_id: &str, requested: i64) -> CoreResult<()> {
        let Some(product) = self.catalog.get(product_id) else {
            return Ok(());
        };
        if requested > product.stock {
            return Err(CoreError::InsufficientStock {
                product_id: product_id.to_string(),
                available: product.stock,
                requested,
            });
        }
        Ok(())
    }

    /// Adds a catalog product, refusing more units than are on hand.
    pub fn add_product(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        let product = self.catalog.require(product_id)?;
        self.ensure_stock(product_id, self.units_in_cart(product_id) + quantity)?;

        let product = product.clone();
        self.cart.add_product(&product, quantity)
    }

    /// Adds the product carrying `barcode`.
    pub fn add_by_barcode(&mut self, barcode: &str, quantity: i64) -> CoreResult<String> {
        let id = self
            .catalog
            .find_by_barcode(barcode)
            .map(|p| p.id.clone())
            .ok_or_else(|| CoreError::ProductNotFound(barcode.to_string()))?;
        self.add_product(&id, quantity)?;
        Ok(id)
    }

    /// Sets a line's quantity. Quantity 0 removes the line.
    pub fn update_quantity(&mut self, line_id: &str, quantity: i64) -> CoreResult<()> {
        let line = self
            .cart
            .get(line_id)
            .ok_or_else(|| CoreError::NotInCart(line_id.to_string()))?;

        if quantity > line.quantity {
            for product_id in line.product_ids() {
                let requested = self.units_in_cart(product_id) - line.quantity + quantity;
                self.ensure_stock(product_id, requested)?;
            }
        }

        self.cart.update_quantity(line_id, quantity)
    }

    /// Adds a combo as one line, refusing more constituent units than are on hand.
    ///
    /// With `replace_existing`, the loose lines the combo replaces do not
    /// count toward the demand.
    pub fn add_combo(&mut self, combo_id: &str, replace_existing: bool) -> CoreResult<CartLine> {
        let combo = self
            .engine
            .combo(combo_id)
            .ok_or_else(|| CoreError::ComboNotFound(combo_id.to_string()))?;

        for product_id in &combo.products {
            // sold-out constituents make the combo unavailable instead
            if !self.catalog.get(product_id).is_some_and(|p| p.is_in_stock()) {
                continue;
            }
            let replaced = match self.cart.get(product_id) {
                Some(line) if replace_existing && !line.is_combo => line.quantity,
                _ => 0,
            };
            self.ensure_stock(product_id, self.units_in_cart(product_id) - replaced + 1)?;
        }

        self.engine
            .add_combo_to_cart(combo_id, &mut self.cart, &self.catalog, replace_existing)
            .ok_or_else(|| CoreError::ComboUnavailable(combo_id.to_string()))
    }

    /// Units per catalog product the cart would sell, in cart order.
    fn stock_demand(&self) -> Vec<(String, i64)> {
        let mut demand: Vec<(String, i64)> = Vec::new();
        for line in self.cart.lines() {
            for id in line.product_ids() {
                if self.catalog.get(id).is_none() {
                    debug!(line_id = %line.id, product_id = id, "not a catalog product, stock not tracked");
                    continue;
                }
                match demand.iter_mut().find(|(seen, _)| seen == id) {
                    Some((_, units)) => *units += line.quantity,
                    None => demand.push((id.to_string(), line.quantity)),
                }
            }
        }
        demand
    }

    /// Records the cart as a sale.
    pub fn complete_sale(&mut self, payment_method: PaymentMethod) -> CoreResult<CompletedSale> {
        if self.cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let demand = self.stock_demand();
        for (id, units) in &demand {
            self.ensure_stock(id, *units)?;
        }

        let (subtotal, discount) = self.price_cart();
        let total = subtotal - discount.total;
        let transaction = Transaction::sale(
            self.cart.lines().to_vec(),
            total,
            discount.total,
            payment_method,
            self.engine.now(),
        );

        self.engine.record_sale(&discount);
        for (id, units) in &demand {
            self.catalog.take_stock(id, *units)?;
        }
        self.transactions.push(transaction.clone());
        self.cart.clear();

        info!(
            transaction_id = %transaction.id,
            %subtotal,
            discount = %discount.total,
            %total,
            %payment_method,
            "Sale completed"
        );

        Ok(CompletedSale {
            transaction,
            subtotal,
            discount,
        })
    }
}

// =============================================================================
// Shared State
// =============================================================================

/// Cloneable handle to the session, shared by every command.
#[derive(Debug, Clone)]
pub struct PosState {
    session: Arc<Mutex<PosSession>>,
}

impl PosState {
    pub fn new(session: PosSession) -> Self {
        PosState {
            session: Arc::new(Mutex::new(session)),
        }
    }

    /// Executes a function with read access to the session.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let lines = state.with_session(|s| s.cart.len())?;
    /// ```
    pub fn with_session<F, R>(&self, f: F) -> Result<R, ApiError>
    where
        F: FnOnce(&PosSession) -> R,
    {
        let session = self
            .session
            .lock()
            .map_err(|_| ApiError::internal("Session lock poisoned"))?;
        Ok(f(&session))
    }

    /// Executes a function with write access to the session.
    pub fn with_session_mut<F, R>(&self, f: F) -> Result<R, ApiError>
    where
        F: FnOnce(&mut PosSession) -> R,
    {
        let mut session = self
            .session
            .lock()
            .map_err(|_| ApiError::internal("Session lock poisoned"))?;
        Ok(f(&mut session))
    }
}
