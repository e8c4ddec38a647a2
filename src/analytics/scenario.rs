//! What-if price scenarios at expiration.
//!
//! Deterministic payoff under fixed percentage moves of the underlying, with
//! no probability weighting. Meant to be read next to the expected value
//! output as a sanity check.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::spread::{SpreadParameters, CONTRACT_MULTIPLIER};

/// A named percentage move of the underlying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    /// Fractional move, e.g. -0.05 for a 5% drop.
    pub pct_move: f64,
}

impl Scenario {
    pub fn new(name: &str, pct_move: f64) -> Self {
        Self {
            name: name.to_string(),
            pct_move,
        }
    }
}

/// Outcome of one scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub pct_move: f64,
    /// Underlying price after the move.
    pub new_price: Decimal,
    /// Spread value per share at expiration.
    pub spread_value: Decimal,
    /// P&L per contract.
    pub pnl: Decimal,
    /// P&L as percent of capital at risk.
    pub pnl_pct: f64,
}

/// The standard ladder: -15% to +15% in 5% steps.
pub fn default_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new("Down 15%", -0.15),
        Scenario::new("Down 10%", -0.10),
        Scenario::new("Down 5%", -0.05),
        Scenario::new("Unchanged", 0.0),
        Scenario::new("Up 5%", 0.05),
        Scenario::new("Up 10%", 0.10),
        Scenario::new("Up 15%", 0.15),
    ]
}

/// Run scenarios in order. An empty list runs the default ladder.
pub fn run_scenarios(params: &SpreadParameters, scenarios: &[Scenario]) -> Vec<ScenarioResult> {
    let defaults;
    let scenarios = if scenarios.is_empty() {
        defaults = default_scenarios();
        &defaults
    } else {
        scenarios
    };

    let risk = params.effective_debit() * Decimal::from(CONTRACT_MULTIPLIER);
    let risk_f64 = risk.to_f64().unwrap_or(0.0);

    scenarios
        .iter()
        .map(|scenario| {
            let pct_move = Decimal::from_f64(scenario.pct_move).unwrap_or(Decimal::ZERO);
            let new_price = params.current_price * (Decimal::ONE + pct_move);
            let spread_value = params.value_at_expiration(new_price);
            let pnl = params.pnl_at_expiration(new_price);
            let pnl_pct = if risk_f64 > 0.0 {
                pnl.to_f64().unwrap_or(0.0) / risk_f64 * 100.0
            } else {
                0.0
            };

            ScenarioResult {
                name: scenario.name.clone(),
                pct_move: scenario.pct_move,
                new_price,
                spread_value,
                pnl,
                pnl_pct,
            }
        })
        .collect()
}
