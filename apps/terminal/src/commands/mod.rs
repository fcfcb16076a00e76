//! # Commands Module
//!
//! Every operation the UI collaborator can invoke. Each command takes the
//! state it needs by reference, logs its entry at debug level and returns
//! `Result<T, ApiError>` with a camelCase DTO.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports)
//! ├── cart.rs     ◄─── Cart manipulation
//! ├── pricing.rs  ◄─── Cart pricing, promo codes, combos, recommendations
//! ├── admin.rs    ◄─── Discount / promo code / combo management, import/export
//! ├── sale.rs     ◄─── Sale completion and history
//! └── config.rs   ◄─── Configuration retrieval
//! ```
//!
//! ## State Injection
//! ```rust,ignore
//! // Only needs the session
//! fn get_cart(state: &PosState)
//!
//! // Needs both
//! fn complete_sale(state: &PosState, config: &ConfigState, ...)
//! ```

pub mod admin;
pub mod cart;
pub mod config;
pub mod pricing;
pub mod sale;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use kassa_core::pricing::PricingPolicy;
    use kassa_core::FixedClock;

    use crate::seed;
    use crate::state::PosState;

    /// Demo session pinned to Friday 2024-03-15 at `hour`:00.
    pub fn state_at(hour: u32) -> (PosState, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::at(2024, 3, 15, hour, 0).unwrap());
        let session = seed::demo_session(&PricingPolicy::default(), clock.clone()).unwrap();
        (PosState::new(session), clock)
    }

    pub fn state() -> PosState {
        state_at(10).0
    }
}
