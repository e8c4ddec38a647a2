//! Engine configuration.
//!
//! Loaded from TOML; every field has a default, so a partial file such as
//!
//! ```toml
//! account_size = "25000"
//!
//! [exit]
//! greed_limit_pct = 75.0
//! ```
//!
//! is accepted.

use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::analytics::DEFAULT_RISK_FREE_RATE;
use crate::error::ConfigError;
use crate::exit::ExitConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Account equity used for Kelly sizing.
    pub account_size: Decimal,
    /// Risk-free rate for spreads evaluated from the command line.
    pub risk_free_rate: f64,
    /// Exit thresholds.
    pub exit: ExitConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            account_size: Decimal::from(10_000),
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            exit: ExitConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.account_size <= Decimal::ZERO {
            return Err(ConfigError::Invalid(format!(
                "account_size must be positive, got {}",
                self.account_size
            )));
        }
        self.exit.validate()
    }
}
