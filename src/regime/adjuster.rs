//! Regime-driven entry threshold adjustments.
//!
//! Four independent rules, each additive:
//! - Trend: bullish SPY widens the RSI ceiling, bearish tightens both ends
//! - Volatility: high/elevated VIX raises the IV ceiling, low VIX lowers it
//! - Pullback: a red day on the ticker widens the RSI ceiling
//! - Volatile regime: relaxes the cushion floor by one point
//!
//! Every rule that fires leaves an `AdjustmentReason`; the totals are the
//! sum of the reasons' deltas.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::signals::ScanResult;

use super::context::{MarketContext, MarketRegime, SpyTrend, VixLevel};

/// Identifies which rule produced an adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentRule {
    Trend,
    Volatility,
    Pullback,
    RegimeVolatility,
}

/// Signed deltas applied to the four entry thresholds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdDelta {
    pub rsi_low: f64,
    pub rsi_high: f64,
    pub iv: f64,
    pub cushion: f64,
}

impl ThresholdDelta {
    fn rsi_high(delta: f64) -> Self {
        Self {
            rsi_high: delta,
            ..Default::default()
        }
    }
}

/// One fired rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentReason {
    pub rule: AdjustmentRule,
    pub delta: ThresholdDelta,
    pub text: String,
}

/// Net adjustments for one ticker evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamicAdjustments {
    pub rsi_low_adjust: f64,
    pub rsi_high_adjust: f64,
    pub iv_adjust: f64,
    pub cushion_adjust: f64,
    pub reasons: Vec<AdjustmentReason>,
}

impl DynamicAdjustments {
    fn push(&mut self, rule: AdjustmentRule, delta: ThresholdDelta, text: String) {
        self.rsi_low_adjust += delta.rsi_low;
        self.rsi_high_adjust += delta.rsi_high;
        self.iv_adjust += delta.iv;
        self.cushion_adjust += delta.cushion;
        self.reasons.push(AdjustmentReason { rule, delta, text });
    }

    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }

    /// Human-readable reason lines, in rule order.
    pub fn reason_texts(&self) -> Vec<&str> {
        self.reasons.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Compute threshold adjustments. Without a context nothing is adjusted.
pub fn adjust(scan: &ScanResult, context: Option<&MarketContext>) -> DynamicAdjustments {
    let mut adj = DynamicAdjustments::default();
    let Some(ctx) = context else {
        return adj;
    };

    match ctx.spy_trend {
        SpyTrend::Bullish => adj.push(
            AdjustmentRule::Trend,
            ThresholdDelta::rsi_high(5.0),
            "SPY bullish: RSI ceiling +5".to_string(),
        ),
        SpyTrend::Bearish => adj.push(
            AdjustmentRule::Trend,
            ThresholdDelta {
                rsi_low: -3.0,
                rsi_high: -5.0,
                ..Default::default()
            },
            "SPY bearish: RSI ceiling -5, floor -3".to_string(),
        ),
        SpyTrend::Neutral => {}
    }

    let iv_delta = if ctx.vix_level == VixLevel::High || ctx.vix > 25.0 {
        Some((15.0, "high"))
    } else if ctx.vix_level == VixLevel::Elevated || ctx.vix > 20.0 {
        Some((8.0, "elevated"))
    } else if ctx.vix_level == VixLevel::Low || ctx.vix < 15.0 {
        Some((-5.0, "low"))
    } else {
        None
    };
    if let Some((delta, label)) = iv_delta {
        adj.push(
            AdjustmentRule::Volatility,
            ThresholdDelta {
                iv: delta,
                ..Default::default()
            },
            format!("VIX {:.1} {}: IV ceiling {:+}", ctx.vix, label, delta),
        );
    }

    if let Some(change) = scan.change_pct {
        let pullback = if change <= -3.0 {
            Some(8.0)
        } else if change <= -1.5 {
            Some(4.0)
        } else {
            None
        };
        if let Some(delta) = pullback {
            adj.push(
                AdjustmentRule::Pullback,
                ThresholdDelta::rsi_high(delta),
                format!("{} down {:.1}% today: RSI ceiling {:+}", scan.ticker, change.abs(), delta),
            );
        }
    }

    if ctx.regime == MarketRegime::Volatile {
        adj.push(
            AdjustmentRule::RegimeVolatility,
            ThresholdDelta {
                cushion: -1.0,
                ..Default::default()
            },
            "Volatile regime: cushion floor -1".to_string(),
        );
    }

    if !adj.is_empty() {
        debug!(
            ticker = %scan.ticker,
            rsi_low = adj.rsi_low_adjust,
            rsi_high = adj.rsi_high_adjust,
            iv = adj.iv_adjust,
            cushion = adj.cushion_adjust,
            "Applied dynamic threshold adjustments"
        );
    }

    adj
}
