//! # Cart Commands
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_to_cart / scan_barcode ──► line added or quantity increased        │
//! │  add_combo_to_cart ───────────► combo line (see pricing commands)       │
//! │  update_cart_item ────────────► quantity set (0 removes)                │
//! │  remove_from_cart ────────────► line dropped                            │
//! │  clear_cart ──────────────────► empty, applied promo code kept          │
//! │  complete_sale ───────────────► empty (see sale commands)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every command returns the whole cart with fresh totals, so the UI never
//! prices anything itself.

use kassa_core::{CartLine, CoreError, Money};
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::{PosSession, PosState};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
    pub line_count: usize,
    pub total_quantity: i64,
}

/// Cart response including items and totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartLine>,
    pub totals: CartTotals,
}

impl From<&PosSession> for CartResponse {
    fn from(session: &PosSession) -> Self {
        let (subtotal, discount) = session.price_cart();
        CartResponse {
            items: session.cart.lines().to_vec(),
            totals: CartTotals {
                subtotal,
                discount: discount.total,
                total: subtotal - discount.total,
                line_count: session.cart.len(),
                total_quantity: session.cart.total_quantity(),
            },
        }
    }
}

pub fn get_cart(state: &PosState) -> Result<CartResponse, ApiError> {
    debug!("get_cart command");
    state.with_session(|s| CartResponse::from(s))
}

/// Adds a product to the cart.
///
/// ## Behavior
/// - If product already in cart: quantity increases
/// - Price is frozen at the time of adding
/// - More units than are on hand: `INSUFFICIENT_STOCK`
///
/// ## Arguments
/// * `product_id` - Catalog product id
/// * `quantity` - Quantity to add (default: 1)
pub fn add_to_cart(
    state: &PosState,
    product_id: String,
    quantity: Option<i64>,
) -> Result<CartResponse, ApiError> {
    let quantity = quantity.unwrap_or(1);
    debug!(product_id = %product_id, quantity = %quantity, "add_to_cart command");

    state.with_session_mut(|s| {
        s.add_product(&product_id, quantity)?;
        Ok::<CartResponse, CoreError>(CartResponse::from(&*s))
    })?
    .map_err(ApiError::from)
}

/// Adds one unit of the product carrying `barcode`.
pub fn scan_barcode(state: &PosState, barcode: String) -> Result<CartResponse, ApiError> {
    debug!(barcode = %barcode, "scan_barcode command");

    state
        .with_session_mut(|s| match s.add_by_barcode(&barcode, 1) {
            Ok(_) => Ok(CartResponse::from(&*s)),
            Err(CoreError::ProductNotFound(_)) => {
                Err(ApiError::not_found("Product with barcode", &barcode))
            }
            Err(e) => Err(e.into()),
        })?
}

/// Updates the quantity of a cart line. Quantity 0 removes it.
pub fn update_cart_item(
    state: &PosState,
    line_id: String,
    quantity: i64,
) -> Result<CartResponse, ApiError> {
    debug!(line_id = %line_id, quantity = %quantity, "update_cart_item command");

    state.with_session_mut(|s| {
        s.update_quantity(&line_id, quantity)?;
        Ok::<CartResponse, CoreError>(CartResponse::from(&*s))
    })?
    .map_err(ApiError::from)
}

pub fn remove_from_cart(state: &PosState, line_id: String) -> Result<CartResponse, ApiError> {
    debug!(line_id = %line_id, "remove_from_cart command");

    state.with_session_mut(|s| {
        s.cart.remove_line(&line_id)?;
        Ok::<CartResponse, CoreError>(CartResponse::from(&*s))
    })?
    .map_err(ApiError::from)
}

pub fn clear_cart(state: &PosState) -> Result<CartResponse, ApiError> {
    debug!("clear_cart command");

    state.with_session_mut(|s| {
        s.cart.clear();
        CartResponse::from(&*s)
    })
}
