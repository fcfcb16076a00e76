//! # Sale Commands

use kassa_core::pricing::AppliedDiscount;
use kassa_core::{CartLine, Money, PaymentMethod, Transaction};
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::{CompletedSale, ConfigState, PosState};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptResponse {
    pub transaction_id: String,
    pub store_name: String,
    pub timestamp: String,
    pub items: Vec<CartLine>,
    pub subtotal: Money,
    pub discounts: Vec<AppliedDiscount>,
    pub discount_total: Money,
    pub total: Money,
    pub payment_method: PaymentMethod,
}

impl ReceiptResponse {
    fn new(sale: CompletedSale, config: &ConfigState) -> Self {
        let CompletedSale {
            transaction,
            subtotal,
            discount,
        } = sale;

        ReceiptResponse {
            transaction_id: transaction.id,
            store_name: config.store_name.clone(),
            timestamp: transaction.date.format("%Y-%m-%d %H:%M:%S").to_string(),
            items: transaction.items,
            subtotal,
            discounts: discount.discounts,
            discount_total: transaction.discount_total,
            total: transaction.total,
            payment_method: transaction.payment_method,
        }
    }
}

/// Completes the sale for the current cart.
///
/// ## Behavior
/// - Prices the cart, counts rule and promo code usage
/// - Takes stock for every product sold, combo constituents included
/// - Appends the transaction to the sale log and clears the cart
///
/// ## Arguments
/// * `payment_method` - `cash`, `card` or `transfer`
pub fn complete_sale(
    state: &PosState,
    config: &ConfigState,
    payment_method: String,
) -> Result<ReceiptResponse, ApiError> {
    debug!(payment_method = %payment_method, "complete_sale command");

    let method: PaymentMethod = payment_method
        .parse()
        .map_err(|e: kassa_core::ValidationError| ApiError::validation(e.to_string()))?;

    let sale = state.with_session_mut(|s| s.complete_sale(method))??;
    Ok(ReceiptResponse::new(sale, config))
}

/// Sale log, newest first.
pub fn list_transactions(state: &PosState) -> Result<Vec<Transaction>, ApiError> {
    debug!("list_transactions command");
    state.with_session(|s| s.transactions.iter().rev().cloned().collect())
}
