//! Application configuration management.

use std::path::Path;

use serde::Deserialize;

use crate::types::Currency;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Share allocation settings.
    pub split: SplitConfig,
    /// Logging configuration.
    pub log: LogConfig,
}

/// Share allocation settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Currency used for new groups when none is given.
    pub default_currency: Currency,
    /// Which participant absorbs a rounding remainder.
    pub remainder_policy: RemainderPolicy,
}

/// Deterministic choice of the participant that absorbs a rounding remainder.
///
/// Even, percentage and shares splits can leave a few minor units over after
/// rounding each share; one participant receives them so the shares always
/// sum to the transaction total. Participants with zero weight are never
/// chosen, and a share is never pushed below zero: an overshoot larger than
/// the chosen share is taken back one minor unit at a time in policy order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainderPolicy {
    /// The participant with the largest weight, earliest in input order on ties.
    #[default]
    LargestWeight,
    /// The first participant in input order that carries weight.
    FirstParticipant,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "tally=info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(Path::new("config"))
    }

    /// Loads configuration from `dir/default`, `dir/{RUN_MODE}` and `TALLY__*` variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file or variable cannot be parsed.
    pub fn load_from(dir: &Path) -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::from(dir.join("default")).required(false))
            .add_source(config::File::from(dir.join(&run_mode)).required(false))
            .add_source(config::Environment::with_prefix("TALLY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
