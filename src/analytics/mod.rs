//! Spread analytics module.
//!
//! Provides:
//! - Spread parameters and payoff (debit and credit verticals)
//! - Expected value, fair value edge, Kelly sizing and quality grading
//! - Deterministic what-if price scenarios

pub mod expected_value;
pub mod scenario;
pub mod spread;

pub use expected_value::{evaluate_spread, ExpectedValueResult, SpreadQuality};
pub use scenario::{default_scenarios, run_scenarios, Scenario, ScenarioResult};
pub use spread::{SpreadKind, SpreadParameters, CONTRACT_MULTIPLIER, DEFAULT_RISK_FREE_RATE};
