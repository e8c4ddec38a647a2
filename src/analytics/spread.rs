//! Two-leg vertical spread definition.
//!
//! Both supported kinds are bullish verticals with `long_strike < short_strike`:
//! - Bull call debit spread: pay `premium`, worth the width above the short strike
//! - Bull put credit spread: collect `premium`, lose the width below the long strike
//!
//! A bull put credit spread has the same expiration buckets as a bull call
//! debit spread costing `width - credit`, so both are priced through that
//! effective debit.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::SpreadError;

/// Shares per contract.
pub const CONTRACT_MULTIPLIER: i64 = 100;

/// Risk-free rate applied when the caller does not supply one.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.05;

fn default_risk_free_rate() -> f64 {
    DEFAULT_RISK_FREE_RATE
}

/// Whether the spread is opened for a debit or a credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpreadKind {
    /// Bull call debit spread.
    #[default]
    Debit,
    /// Bull put credit spread.
    Credit,
}

impl SpreadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

/// Inputs for evaluating one vertical spread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadParameters {
    /// Debit or credit spread.
    #[serde(default)]
    pub kind: SpreadKind,
    /// Lower strike (bought).
    pub long_strike: Decimal,
    /// Upper strike (sold).
    pub short_strike: Decimal,
    /// Debit paid or credit received, per share.
    pub premium: Decimal,
    /// Current underlying price.
    pub current_price: Decimal,
    /// Calendar days to expiration.
    pub days_to_expiration: u32,
    /// Implied volatility as a decimal (0.30 = 30%).
    pub implied_volatility: f64,
    /// Risk-free rate as a decimal.
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
}

impl SpreadParameters {
    /// Bull call debit spread with the default risk-free rate.
    pub fn debit(
        long_strike: Decimal,
        short_strike: Decimal,
        debit: Decimal,
        current_price: Decimal,
        days_to_expiration: u32,
        implied_volatility: f64,
    ) -> Self {
        Self {
            kind: SpreadKind::Debit,
            long_strike,
            short_strike,
            premium: debit,
            current_price,
            days_to_expiration,
            implied_volatility,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
        }
    }

    /// Bull put credit spread with the default risk-free rate.
    pub fn credit(
        long_strike: Decimal,
        short_strike: Decimal,
        credit: Decimal,
        current_price: Decimal,
        days_to_expiration: u32,
        implied_volatility: f64,
    ) -> Self {
        Self {
            kind: SpreadKind::Credit,
            premium: credit,
            ..Self::debit(
                long_strike,
                short_strike,
                credit,
                current_price,
                days_to_expiration,
                implied_volatility,
            )
        }
    }

    pub fn with_risk_free_rate(mut self, rate: f64) -> Self {
        self.risk_free_rate = rate;
        self
    }

    /// Distance between the strikes.
    pub fn width(&self) -> Decimal {
        self.short_strike - self.long_strike
    }

    /// Check caller preconditions. Violations indicate an upstream data bug.
    pub fn validate(&self) -> Result<(), SpreadError> {
        if self.short_strike <= self.long_strike {
            return Err(SpreadError::InvalidStrikes {
                long: self.long_strike,
                short: self.short_strike,
            });
        }
        if self.premium <= Decimal::ZERO {
            return Err(SpreadError::NonPositivePremium(self.premium));
        }
        let width = self.width();
        if self.premium >= width {
            return Err(SpreadError::PremiumExceedsWidth {
                premium: self.premium,
                width,
            });
        }
        if self.current_price <= Decimal::ZERO {
            return Err(SpreadError::InvalidPrice(self.current_price));
        }
        Ok(())
    }

    /// Per-share capital at risk, i.e. the debit of the equivalent bull call spread.
    pub fn effective_debit(&self) -> Decimal {
        match self.kind {
            SpreadKind::Debit => self.premium,
            SpreadKind::Credit => self.width() - self.premium,
        }
    }

    /// Expiration value of the bullish vertical at `price`, per share:
    /// zero below the long strike, the width above the short strike,
    /// linear in between.
    pub fn value_at_expiration(&self, price: Decimal) -> Decimal {
        (price - self.long_strike).max(Decimal::ZERO).min(self.width())
    }

    /// P&L per contract if the underlying settles at `price`.
    pub fn pnl_at_expiration(&self, price: Decimal) -> Decimal {
        (self.value_at_expiration(price) - self.effective_debit()) * Decimal::from(CONTRACT_MULTIPLIER)
    }

    /// Break-even underlying price at expiration.
    pub fn breakeven_price(&self) -> Decimal {
        self.long_strike + self.effective_debit()
    }

    /// Distance from the current price down to the short strike, in percent.
    pub fn cushion_pct(&self) -> f64 {
        let price = self.current_price.to_f64().unwrap_or(0.0);
        let short = self.short_strike.to_f64().unwrap_or(0.0);
        if price > 0.0 {
            (price - short) / price * 100.0
        } else {
            0.0
        }
    }
}
