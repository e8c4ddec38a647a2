//! Exit recommendations for open spreads.
//!
//! Recomputed from current profit, DTE and cushion on every call:
//! - Profit capture against greed limit, target and minimum acceptable
//! - DTE against forced exit and gamma risk zone
//! - Pin risk (cushion) inside the final days before expiration

pub mod recommendation;

pub use recommendation::{
    profit_captured_pct, recommend_exit, DteStatus, ExitAction, ExitConfig, ExitRecommendation,
    PinRiskStatus, PositionSnapshot, ProfitStatus, Urgency,
};
