//! Configuration loading and typed config structures for the Bookleaf engine.
//!
//! The configuration lives in `bookleaf-config.yaml`. Every field has a
//! default matching the built-in economy constants, so an empty file (or no
//! file at all) yields a working engine.
//!
//! ```yaml
//! economy:
//!   starting_coins: 100
//!   coins_per_level: 50
//!   plant_price_step: 200
//! concurrency:
//!   max_conflict_retries: 3
//! plants:
//!   water_warning_hours: 6
//! logging:
//!   level: info
//! ```

use std::path::Path;

use chrono::TimeDelta;
use serde::Deserialize;

/// Environment variable that overrides `logging.level`.
pub const LOG_LEVEL_ENV: &str = "BOOKLEAF_LOG";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is out of range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Which value is wrong and why.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Coin grants and prices.
    #[serde(default)]
    pub economy: EconomyConfig,

    /// Optimistic-concurrency retry policy.
    #[serde(default)]
    pub concurrency: ConcurrencyConfig,

    /// Plant care reminders.
    #[serde(default)]
    pub plants: PlantsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `BOOKLEAF_LOG` overrides `logging.level` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.logging.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.plants.water_warning_hours < 0 {
            return Err(ConfigError::Invalid {
                reason: "plants.water_warning_hours must not be negative".to_owned(),
            });
        }
        if self.plants.warning_window().is_none() {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "plants.water_warning_hours {} is too large",
                    self.plants.water_warning_hours
                ),
            });
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Invalid {
                reason: "logging.level must not be empty".to_owned(),
            });
        }
        Ok(())
    }
}

/// Coin economy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EconomyConfig {
    /// Coins granted when the progression record is first created.
    #[serde(default = "default_starting_coins")]
    pub starting_coins: u64,

    /// Coins per level crossed, multiplied by the level reached.
    #[serde(default = "default_coins_per_level")]
    pub coins_per_level: u64,

    /// Surcharge added to every plant price per plant already bought.
    #[serde(default = "default_plant_price_step")]
    pub plant_price_step: u64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_coins: default_starting_coins(),
            coins_per_level: default_coins_per_level(),
            plant_price_step: default_plant_price_step(),
        }
    }
}

/// Conflict retry configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConcurrencyConfig {
    /// Extra attempts after a version conflict before surfacing it.
    #[serde(default = "default_max_conflict_retries")]
    pub max_conflict_retries: u32,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: default_max_conflict_retries(),
        }
    }
}

/// Plant care configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlantsConfig {
    /// How many hours before turning thirsty a plant is flagged for water.
    #[serde(default = "default_water_warning_hours")]
    pub water_warning_hours: i64,
}

impl PlantsConfig {
    /// The warning window as a duration, or `None` when the hour count does
    /// not fit in one.
    pub const fn warning_window(&self) -> Option<TimeDelta> {
        TimeDelta::try_hours(self.water_warning_hours)
    }
}

impl Default for PlantsConfig {
    fn default() -> Self {
        Self {
            water_warning_hours: default_water_warning_hours(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl LoggingConfig {
    /// Replace `level` with `BOOKLEAF_LOG` when that variable is set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(LOG_LEVEL_ENV) {
            self.level = val;
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_starting_coins() -> u64 {
    bookleaf_progression::STARTING_COINS
}

const fn default_coins_per_level() -> u64 {
    bookleaf_progression::COINS_PER_LEVEL
}

const fn default_plant_price_step() -> u64 {
    bookleaf_progression::PLANT_PRICE_STEP
}

const fn default_max_conflict_retries() -> u32 {
    3
}

const fn default_water_warning_hours() -> i64 {
    bookleaf_progression::WATER_WARNING_HOURS
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_economy_constants() {
        let config = EngineConfig::default();
        assert_eq!(config.economy.starting_coins, 100);
        assert_eq!(config.economy.coins_per_level, 50);
        assert_eq!(config.economy.plant_price_step, 200);
        assert_eq!(config.concurrency.max_conflict_retries, 3);
        assert_eq!(config.plants.water_warning_hours, 6);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
economy:
  starting_coins: 250
  coins_per_level: 75
  plant_price_step: 150
concurrency:
  max_conflict_retries: 5
plants:
  water_warning_hours: 12
";
        let config = EngineConfig::parse(yaml).unwrap();
        assert_eq!(config.economy.starting_coins, 250);
        assert_eq!(config.economy.coins_per_level, 75);
        assert_eq!(config.economy.plant_price_step, 150);
        assert_eq!(config.concurrency.max_conflict_retries, 5);
        assert_eq!(config.plants.water_warning_hours, 12);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = EngineConfig::parse("economy:\n  starting_coins: 0\n").unwrap();
        assert_eq!(config.economy.starting_coins, 0);
        assert_eq!(config.economy.coins_per_level, 50);
        assert_eq!(config.concurrency, ConcurrencyConfig::default());
    }

    #[test]
    fn empty_mapping_is_default() {
        let config = EngineConfig::parse("{}").unwrap();
        assert_eq!(config.economy, EconomyConfig::default());
        assert_eq!(config.plants, PlantsConfig::default());
    }

    #[test]
    fn negative_warning_window_rejected() {
        let result = EngineConfig::parse("plants:\n  water_warning_hours: -1\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn oversized_warning_window_rejected() {
        let result = EngineConfig::parse("plants:\n  water_warning_hours: 9000000000000\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn warning_window_converts_hours() {
        let config = EngineConfig::default();
        assert_eq!(config.plants.warning_window(), Some(TimeDelta::hours(6)));
    }

    #[test]
    fn malformed_yaml_rejected() {
        let result = EngineConfig::parse("economy: [not, a, mapping");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = EngineConfig::from_file(Path::new("/nonexistent/bookleaf-config.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
