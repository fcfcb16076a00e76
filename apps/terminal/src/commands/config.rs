//! # Config Commands

use tracing::debug;

use crate::state::ConfigState;

/// Gets the terminal configuration (store, pricing policy).
pub fn get_config(config: &ConfigState) -> ConfigState {
    debug!("get_config command");
    config.clone()
}
