//! # State Module
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────────────────────┐  ┌──────────────────────────┐    │
//! │  │   PosState                       │  │   ConfigState            │    │
//! │  │                                  │  │                          │    │
//! │  │   Arc<Mutex<PosSession>>         │  │   store id / name        │    │
//! │  │   ├── catalog (stock)            │  │   pricing policy         │    │
//! │  │   ├── cart                       │  │                          │    │
//! │  │   ├── PricingEngine              │  │                          │    │
//! │  │   └── transactions               │  │                          │    │
//! │  └──────────────────────────────────┘  └──────────────────────────┘    │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • PosState: one lock, every command takes it exactly once             │
//! │  • ConfigState: read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod session;

pub use config::ConfigState;
pub use session::{CompletedSale, PosSession, PosState};
