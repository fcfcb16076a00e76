//! # Terminal Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Defaults            TerminalConfig::default()                       │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  2. Config file         explicit path, KASSA_CONFIG, or                 │
//! │                         <config dir>/com.kassa.pos/terminal.toml        │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  3. Environment         KASSA_STORE_ID, KASSA_STACKING, ...             │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  4. validate()                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # terminal.toml
//! [store]
//! id = "store-001"
//! name = "Кофейня на Арбате"
//!
//! [pricing]
//! stacking = "legacy"          # legacy | exclude_best
//! unknown_conditions = "pass"  # pass | reject
//! max_recommendations = 3
//! smart_window_days = 7
//! ```

use kassa_core::pricing::PricingPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{TerminalError, TerminalResult};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "KASSA_CONFIG";

// =============================================================================
// Store Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Unique store identifier.
    pub id: String,

    /// Name printed on receipts.
    #[serde(default)]
    pub name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            id: "default-store".to_string(),
            name: "Default Store".to_string(),
        }
    }
}

// =============================================================================
// Terminal Configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalConfig {
    #[serde(default)]
    pub store: StoreConfig,

    /// Pricing engine tunables.
    #[serde(default)]
    pub pricing: PricingPolicy,
}

impl TerminalConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (terminal.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> TerminalResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading terminal config from file");
                config = Self::read_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load terminal config: {}. Using defaults.", e);
            Self::default()
        })
    }

    fn read_file(path: &Path) -> TerminalResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> TerminalResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| TerminalError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| TerminalError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)
            .map_err(|e| TerminalError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Terminal config saved");
        Ok(())
    }

    pub fn validate(&self) -> TerminalResult<()> {
        if self.store.id.trim().is_empty() {
            return Err(TerminalError::InvalidConfig("store.id must not be empty".into()));
        }

        self.pricing
            .validate()
            .map_err(|e| TerminalError::InvalidConfig(format!("pricing.{}", e)))
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies `KASSA_*` overrides read through `lookup`.
    ///
    /// Unparsable values are logged and ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(id) = lookup("KASSA_STORE_ID") {
            debug!(store_id = %id, "Overriding store ID from environment");
            self.store.id = id;
        }

        if let Some(name) = lookup("KASSA_STORE_NAME") {
            self.store.name = name;
        }

        if let Some(stacking) = lookup("KASSA_STACKING") {
            match stacking.parse() {
                Ok(parsed) => {
                    debug!(stacking = %stacking, "Overriding stacking policy from environment");
                    self.pricing.stacking = parsed;
                }
                Err(_) => warn!(stacking = %stacking, "Unknown stacking policy in environment"),
            }
        }

        if let Some(policy) = lookup("KASSA_UNKNOWN_CONDITIONS") {
            match policy.parse() {
                Ok(parsed) => self.pricing.unknown_conditions = parsed,
                Err(_) => warn!(policy = %policy, "Unknown condition policy in environment"),
            }
        }

        if let Some(max) = lookup("KASSA_MAX_RECOMMENDATIONS") {
            match max.parse::<usize>() {
                Ok(n) => self.pricing.max_recommendations = n,
                Err(_) => warn!(value = %max, "KASSA_MAX_RECOMMENDATIONS is not a number"),
            }
        }

        if let Some(days) = lookup("KASSA_SMART_WINDOW_DAYS") {
            match days.parse::<u32>() {
                Ok(n) => {
                    debug!(days = n, "Overriding smart recommendation window from environment");
                    self.pricing.smart_window_days = n;
                }
                Err(_) => warn!(value = %days, "KASSA_SMART_WINDOW_DAYS is not a number"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "kassa", "pos")
            .map(|dirs| dirs.config_dir().join("terminal.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kassa_core::pricing::{StackingPolicy, UnknownConditionPolicy};
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = TerminalConfig::default();
        assert_eq!(config.store.id, "default-store");
        assert_eq!(config.pricing.stacking, StackingPolicy::Legacy);
        assert_eq!(config.pricing.max_recommendations, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: TerminalConfig = toml::from_str(
            r#"
            [pricing]
            stacking = "exclude_best"
            "#,
        )
        .unwrap();

        assert_eq!(config.pricing.stacking, StackingPolicy::ExcludeBest);
        assert_eq!(config.pricing.smart_window_days, 7);
        assert_eq!(config.store, StoreConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let vars = env(&[
            ("KASSA_STORE_ID", "store-42"),
            ("KASSA_STACKING", "exclude-best"),
            ("KASSA_UNKNOWN_CONDITIONS", "reject"),
            ("KASSA_MAX_RECOMMENDATIONS", "5"),
            ("KASSA_SMART_WINDOW_DAYS", "not-a-number"),
        ]);

        let mut config = TerminalConfig::default();
        config.apply_overrides_from(|k| vars.get(k).cloned());

        assert_eq!(config.store.id, "store-42");
        assert_eq!(config.pricing.stacking, StackingPolicy::ExcludeBest);
        assert_eq!(config.pricing.unknown_conditions, UnknownConditionPolicy::Reject);
        assert_eq!(config.pricing.max_recommendations, 5);
        // unparsable values are ignored
        assert_eq!(config.pricing.smart_window_days, 7);
    }

    #[test]
    fn test_config_validation() {
        let mut config = TerminalConfig::default();
        config.store.id = "  ".into();
        assert!(matches!(config.validate(), Err(TerminalError::InvalidConfig(_))));

        let mut config = TerminalConfig::default();
        config.pricing.max_recommendations = 0;
        assert!(config.validate().is_err());

        let vars = env(&[("KASSA_SMART_WINDOW_DAYS", "1000000000")]);
        let mut config = TerminalConfig::default();
        config.apply_overrides_from(|k| vars.get(k).cloned());
        assert!(matches!(config.validate(), Err(TerminalError::InvalidConfig(_))));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("terminal.toml");

        let mut config = TerminalConfig::default();
        config.store.name = "Кофейня".into();
        config.pricing.stacking = StackingPolicy::ExcludeBest;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[store]"));
        assert!(contents.contains("stacking = \"exclude_best\""));

        let loaded = TerminalConfig::read_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_broken_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("terminal.toml");
        std::fs::write(&path, "[pricing\nstacking = ").unwrap();

        assert!(matches!(
            TerminalConfig::read_file(&path),
            Err(TerminalError::ConfigLoadFailed(_))
        ));
    }
}
