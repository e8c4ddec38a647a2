//! Error types for the decision engine.
//!
//! Only precondition violations and configuration failures are errors.
//! Missing optional market data resolves to documented defaults and
//! degenerate numeric inputs resolve deterministically.

use rust_decimal::Decimal;
use thiserror::Error;

/// Caller contract violations for spread evaluation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpreadError {
    #[error("Invalid strikes: short strike {short} must be above long strike {long}")]
    InvalidStrikes { long: Decimal, short: Decimal },

    #[error("Invalid premium: {0} must be positive")]
    NonPositivePremium(Decimal),

    #[error("Invalid premium: {premium} must be below spread width {width}")]
    PremiumExceedsWidth { premium: Decimal, width: Decimal },

    #[error("Invalid underlying price: {0}")]
    InvalidPrice(Decimal),

    #[error("Invalid account size: {0}")]
    InvalidAccountSize(Decimal),
}

/// Configuration loading and validation failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
