//! Market regime context and threshold adjustment.
//!
//! The regime snapshot is produced elsewhere once per scan cycle:
//! - Regime: risk-on, risk-off, neutral, volatile
//! - SPY trend: bullish, bearish, neutral
//! - VIX print and its level bucket
//!
//! The adjuster maps that snapshot onto additive entry-threshold deltas.

pub mod adjuster;
pub mod context;

pub use adjuster::{adjust, AdjustmentReason, AdjustmentRule, DynamicAdjustments, ThresholdDelta};
pub use context::{MarketContext, MarketRegime, SpyTrend, VixLevel};
