//! Market context snapshot.

use serde::{Deserialize, Serialize};

/// Coarse risk-appetite classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketRegime {
    RiskOn,
    RiskOff,
    Neutral,
    Volatile,
}

impl MarketRegime {
    pub fn description(&self) -> &'static str {
        match self {
            Self::RiskOn => "Risk-on",
            Self::RiskOff => "Risk-off",
            Self::Neutral => "Neutral",
            Self::Volatile => "Volatile",
        }
    }
}

/// Direction of the broad market (SPY).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpyTrend {
    Bullish,
    Bearish,
    Neutral,
}

/// VIX level bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VixLevel {
    /// VIX < 15.
    Low,
    /// VIX 15-20.
    Normal,
    /// VIX 20-25.
    Elevated,
    /// VIX >= 25.
    High,
}

impl VixLevel {
    /// Bucket a raw VIX print.
    pub fn from_vix(vix: f64) -> Self {
        if vix < 15.0 {
            Self::Low
        } else if vix < 20.0 {
            Self::Normal
        } else if vix < 25.0 {
            Self::Elevated
        } else {
            Self::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::Elevated => "elevated",
            Self::High => "high",
        }
    }
}

/// Regime snapshot supplied by the regime classifier. Read-only here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketContext {
    pub regime: MarketRegime,
    pub spy_trend: SpyTrend,
    pub vix: f64,
    pub vix_level: VixLevel,
}

impl MarketContext {
    pub fn new(regime: MarketRegime, spy_trend: SpyTrend, vix: f64) -> Self {
        Self {
            regime,
            spy_trend,
            vix,
            vix_level: VixLevel::from_vix(vix),
        }
    }
}
