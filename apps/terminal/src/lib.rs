//! # Kassa Terminal Library
//!
//! The register's session shell around `kassa-core`: configuration,
//! logging, shared session state and the command functions a UI calls.
//!
//! ## Module Organization
//! ```text
//! kassa_terminal/
//! ├── lib.rs          ◄─── You are here (logging setup & demo run)
//! ├── config.rs       ◄─── terminal.toml + KASSA_* overrides
//! ├── error.rs        ◄─── TerminalError, ApiError
//! ├── seed.rs         ◄─── Demo catalog and pricing rules
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── session.rs  ◄─── PosSession / PosState (Arc<Mutex<_>>)
//! │   └── config.rs   ◄─── ConfigState (read-only)
//! └── commands/
//!     ├── mod.rs      ◄─── Command exports
//!     ├── cart.rs     ◄─── Cart manipulation
//!     ├── pricing.rs  ◄─── Pricing, promo codes, combos, recommendations
//!     ├── admin.rs    ◄─── Rule management, import/export
//!     ├── sale.rs     ◄─── Sale completion
//!     └── config.rs   ◄─── Configuration retrieval
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod seed;
pub mod state;

use std::path::PathBuf;
use std::sync::Arc;

use kassa_core::SystemClock;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::{TerminalConfig, CONFIG_PATH_ENV};
use state::{ConfigState, PosState};

/// Runs the terminal: loads config, seeds a session and rings up a demo sale.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Initialize Logging     RUST_LOG or "info,kassa=debug"               │
/// │  2. Load Configuration     KASSA_CONFIG or the platform config dir      │
/// │  3. Seed Session           demo catalog + rules, system clock           │
/// │  4. Demo Sale              each step's response printed as JSON         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    info!("Starting Kassa terminal");

    let config_path = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
    let config = TerminalConfig::load_or_default(config_path);
    info!(
        store_id = %config.store.id,
        stacking = %config.pricing.stacking,
        unknown_conditions = %config.pricing.unknown_conditions,
        "Configuration loaded"
    );

    let session = seed::demo_session(&config.pricing, Arc::new(SystemClock))?;
    let state = PosState::new(session);
    let config_state = ConfigState::from(&config);

    info!("State initialized");
    demo_sale(&state, &config_state)?;
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=kassa_core=trace` - Show per-condition evaluation
/// - Default: INFO, DEBUG for kassa crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kassa=debug"));

    // try_init: a second call (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_step<T: Serialize>(step: &str, value: &T) -> Result<(), serde_json::Error> {
    println!("# {}", step);
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn demo_sale(state: &PosState, config: &ConfigState) -> Result<(), Box<dyn std::error::Error>> {
    use commands::{cart, pricing, sale};

    print_step("add_to_cart cappuccino x2", &cart::add_to_cart(state, "cappuccino".into(), Some(2))?)?;
    print_step("get_available_combos", &pricing::get_available_combos(state)?)?;
    print_step(
        "add_combo_to_cart breakfast",
        &pricing::add_combo_to_cart(state, "breakfast".into(), true)?,
    )?;
    print_step("get_recommendations", &pricing::get_recommendations(state)?)?;
    print_step("apply_promocode SUMMER10", &pricing::apply_promocode(state, "SUMMER10".into())?)?;
    print_step("complete_sale card", &sale::complete_sale(state, config, "card".into())?)?;
    print_step("get_smart_recommendations", &pricing::get_smart_recommendations(state)?)?;
    Ok(())
}
