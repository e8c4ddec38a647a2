//! Kelly criterion position sizing.
//!
//! f* = (p·b − (1 − p)) / b, clamped to [0, 1], where `b` is the win/loss
//! payoff ratio. Sizing uses half of f* and never suggests fewer than one
//! contract; whether to take the trade at all is the quality grade's job.

use serde::{Deserialize, Serialize};

/// Kelly sizing for a single spread.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KellySizing {
    /// Win/loss payoff ratio |max profit / max loss|.
    pub payoff_ratio: f64,
    /// Full Kelly fraction in [0, 1].
    pub fraction: f64,
    /// Half Kelly fraction actually used for sizing.
    pub half_fraction: f64,
    /// Suggested contracts (at least 1).
    pub contracts: i64,
}

impl KellySizing {
    /// Size a trade from win probability and per-contract payoffs.
    ///
    /// # Arguments
    /// * `win_probability` - Probability of profit
    /// * `max_profit` - Max profit per contract (dollars)
    /// * `max_loss` - Max loss per contract (dollars, sign ignored)
    /// * `account_size` - Account equity (dollars)
    pub fn calculate(win_probability: f64, max_profit: f64, max_loss: f64, account_size: f64) -> Self {
        let payoff_ratio = if max_loss != 0.0 {
            (max_profit / max_loss).abs()
        } else {
            0.0
        };
        let fraction = kelly_fraction(win_probability, payoff_ratio);
        let half_fraction = fraction / 2.0;

        Self {
            payoff_ratio,
            fraction,
            half_fraction,
            contracts: size_contracts(account_size, half_fraction, max_loss.abs()),
        }
    }
}

/// Full Kelly fraction, clamped to [0, 1].
pub fn kelly_fraction(win_probability: f64, payoff_ratio: f64) -> f64 {
    if payoff_ratio <= 0.0 || !payoff_ratio.is_finite() {
        return 0.0;
    }
    let raw = (win_probability * payoff_ratio - (1.0 - win_probability)) / payoff_ratio;
    if raw.is_nan() {
        return 0.0;
    }
    raw.clamp(0.0, 1.0)
}

/// Contracts affordable with `fraction` of the account at `max_loss_per_contract` risk each.
pub fn size_contracts(account_size: f64, fraction: f64, max_loss_per_contract: f64) -> i64 {
    if max_loss_per_contract <= 0.0 {
        return 1;
    }
    let raw = (account_size * fraction / max_loss_per_contract).floor();
    if raw.is_finite() {
        (raw as i64).max(1)
    } else {
        1
    }
}
