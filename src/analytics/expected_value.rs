//! Expected value engine for vertical spreads.
//!
//! Splits the expiration distribution into three buckets using the
//! probability of finishing above each strike:
//! - Max profit: above the short strike
//! - Partial: between the strikes, valued at the midpoint of max profit and max loss
//! - Max loss: below the long strike
//!
//! Probability of profit counts half of the partial bucket as a win. Both
//! simplifications are deliberate; the quality thresholds are tuned to them.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SpreadError;
use crate::pricing::probability_above_strike;
use crate::risk::KellySizing;

use super::spread::{SpreadKind, SpreadParameters, CONTRACT_MULTIPLIER};

/// Qualitative grade of a spread, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpreadQuality {
    Excellent,
    Good,
    Marginal,
    Poor,
}

impl SpreadQuality {
    /// Grade from the three headline numbers. First match wins:
    /// - EXCELLENT: EV > 0, PoP >= 65%, edge > 5%
    /// - GOOD: EV > 0, PoP >= 55%
    /// - MARGINAL: EV > -$20, PoP >= 50%
    /// - POOR: everything else
    pub fn grade(expected_value: f64, probability_of_profit: f64, edge_pct: f64) -> (Self, Vec<String>) {
        let pop_pct = probability_of_profit * 100.0;

        if expected_value > 0.0 && probability_of_profit >= 0.65 && edge_pct > 5.0 {
            return (
                Self::Excellent,
                vec![
                    format!("Positive EV of ${:.2} per contract", expected_value),
                    format!("High probability of profit ({:.1}%)", pop_pct),
                    format!("Priced {:.1}% below fair value", edge_pct),
                ],
            );
        }

        if expected_value > 0.0 && probability_of_profit >= 0.55 {
            let mut reasons = vec![
                format!("Positive EV of ${:.2} per contract", expected_value),
                format!("Probability of profit {:.1}% (>= 55%)", pop_pct),
            ];
            if edge_pct <= 5.0 {
                reasons.push(format!("Edge of {:.1}% is at or below 5%", edge_pct));
            } else {
                reasons.push(format!(
                    "Probability of profit {:.1}% below 65% for an excellent grade",
                    pop_pct
                ));
            }
            return (Self::Good, reasons);
        }

        if expected_value > -20.0 && probability_of_profit >= 0.5 {
            return (
                Self::Marginal,
                vec![
                    format!("EV of ${:.2} per contract is near breakeven", expected_value),
                    format!("Probability of profit {:.1}% (>= 50%)", pop_pct),
                    format!("Edge of {:.1}% vs fair value", edge_pct),
                ],
            );
        }

        let mut reasons = Vec::new();
        if expected_value <= -20.0 {
            reasons.push(format!("Negative EV of ${:.2} per contract", expected_value));
        }
        if probability_of_profit < 0.5 {
            reasons.push(format!("Probability of profit only {:.1}%", pop_pct));
        }
        if reasons.is_empty() {
            reasons.push(format!(
                "EV ${:.2} with {:.1}% probability of profit misses every grade",
                expected_value, pop_pct
            ));
        }
        (Self::Poor, reasons)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "EXCELLENT",
            Self::Good => "GOOD",
            Self::Marginal => "MARGINAL",
            Self::Poor => "POOR",
        }
    }
}

impl std::fmt::Display for SpreadQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Expected value analysis of a single spread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedValueResult {
    pub kind: SpreadKind,
    /// Strike width.
    pub width: Decimal,
    /// Max profit per contract.
    pub max_profit: Decimal,
    /// Max loss per contract (non-positive).
    pub max_loss: Decimal,
    /// Underlying price at which the spread breaks even at expiration.
    pub breakeven_price: Decimal,
    /// Distance from current price to the short strike, in percent.
    pub cushion_pct: f64,

    pub prob_above_short: f64,
    pub prob_above_long: f64,
    pub prob_max_profit: f64,
    pub prob_partial: f64,
    pub prob_max_loss: f64,
    /// Max profit bucket plus half of the partial bucket.
    pub probability_of_profit: f64,

    /// Probability-weighted gains per contract.
    pub expected_win: f64,
    /// Probability-weighted losses per contract (non-positive).
    pub expected_loss: f64,
    /// Expected P&L per contract.
    pub expected_value: f64,
    /// Expected value as percent of capital at risk.
    pub expected_value_pct: f64,

    /// Probability-implied fair debit (debit spreads) or fair credit (credit spreads), per share.
    pub fair_premium: f64,
    /// Percent by which the actual premium beats fair value. Positive is favorable.
    pub edge_pct: f64,

    pub kelly_fraction: f64,
    pub half_kelly: f64,
    pub suggested_contracts: i64,

    pub quality: SpreadQuality,
    pub reasons: Vec<String>,
}

/// Evaluate a vertical spread.
///
/// `account_size` only affects `suggested_contracts`. Returns an error when
/// the parameters violate the spread preconditions rather than producing a
/// meaningless result.
pub fn evaluate_spread(
    params: &SpreadParameters,
    account_size: Decimal,
) -> Result<ExpectedValueResult, SpreadError> {
    params.validate()?;
    if account_size <= Decimal::ZERO {
        return Err(SpreadError::InvalidAccountSize(account_size));
    }

    let multiplier = Decimal::from(CONTRACT_MULTIPLIER);
    let width = params.width();
    let cost = params.effective_debit();

    let max_profit = (width - cost) * multiplier;
    let max_loss = -cost * multiplier;
    let breakeven_price = params.breakeven_price();
    let cushion_pct = params.cushion_pct();

    let spot = params.current_price.to_f64().unwrap_or(0.0);
    let long = params.long_strike.to_f64().unwrap_or(0.0);
    let short = params.short_strike.to_f64().unwrap_or(0.0);
    let width_f64 = width.to_f64().unwrap_or(0.0);
    let cost_f64 = cost.to_f64().unwrap_or(0.0);
    let premium_f64 = params.premium.to_f64().unwrap_or(0.0);
    let max_profit_f64 = max_profit.to_f64().unwrap_or(0.0);
    let max_loss_f64 = max_loss.to_f64().unwrap_or(0.0);

    let dte = params.days_to_expiration;
    let vol = params.implied_volatility;
    let rate = params.risk_free_rate;
    let prob_above_short = probability_above_strike(spot, short, dte, vol, rate);
    let prob_above_long = probability_above_strike(spot, long, dte, vol, rate);

    let prob_max_profit = prob_above_short;
    let prob_max_loss = 1.0 - prob_above_long;
    let prob_partial = prob_above_long - prob_above_short;

    let avg_partial = (max_profit_f64 + max_loss_f64) / 2.0;
    let partial_ev = prob_partial * avg_partial;
    let expected_win = prob_max_profit * max_profit_f64 + partial_ev.max(0.0);
    let expected_loss = prob_max_loss * max_loss_f64 + partial_ev.min(0.0);
    let expected_value = expected_win + expected_loss;
    let expected_value_pct = if max_loss_f64 != 0.0 {
        expected_value / max_loss_f64.abs() * 100.0
    } else {
        0.0
    };

    let probability_of_profit = (prob_max_profit + 0.5 * prob_partial).clamp(0.0, 1.0);

    let fair_debit = (prob_max_profit * width_f64 + 0.5 * prob_partial * width_f64).max(0.0);
    let (fair_premium, edge_pct) = match params.kind {
        SpreadKind::Debit => (fair_debit, (fair_debit - cost_f64) / cost_f64 * 100.0),
        SpreadKind::Credit => {
            let fair_credit = (width_f64 - fair_debit).max(0.0);
            (fair_credit, (premium_f64 - fair_credit) / premium_f64 * 100.0)
        }
    };

    let account = account_size.to_f64().unwrap_or(0.0);
    let sizing = KellySizing::calculate(probability_of_profit, max_profit_f64, max_loss_f64, account);

    let (quality, mut reasons) = SpreadQuality::grade(expected_value, probability_of_profit, edge_pct);
    if prob_above_long < prob_above_short {
        reasons.push(format!(
            "Inconsistent strike probabilities: P(above long) {:.4} < P(above short) {:.4}",
            prob_above_long, prob_above_short
        ));
    }

    debug!(
        kind = params.kind.as_str(),
        expected_value,
        probability_of_profit,
        edge_pct,
        quality = quality.as_str(),
        "Evaluated spread"
    );

    Ok(ExpectedValueResult {
        kind: params.kind,
        width,
        max_profit,
        max_loss,
        breakeven_price,
        cushion_pct,
        prob_above_short,
        prob_above_long,
        prob_max_profit,
        prob_partial,
        prob_max_loss,
        probability_of_profit,
        expected_win,
        expected_loss,
        expected_value,
        expected_value_pct,
        fair_premium,
        edge_pct,
        kelly_fraction: sizing.fraction,
        half_kelly: sizing.half_fraction,
        suggested_contracts: sizing.contracts,
        quality,
        reasons,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rust_decimal_macros::dec;

    fn itm_call_spread() -> SpreadParameters {
        SpreadParameters::debit(dec!(95), dec!(100), dec!(3.80), dec!(105), 30, 0.30)
    }

    #[test]
    fn test_deep_itm_example() {
        let result = evaluate_spread(&itm_call_spread(), dec!(10_000)).unwrap();

        assert_eq!(result.width, dec!(5));
        assert_eq!(result.max_profit, dec!(120));
        assert_eq!(result.max_loss, dec!(-380));
        assert_eq!(result.breakeven_price, dec!(98.80));
        assert_relative_eq!(result.cushion_pct, 4.7619, epsilon = 1e-3);

        assert_relative_eq!(result.prob_max_profit, 0.7164, epsilon = 1e-3);
        assert_relative_eq!(result.prob_above_long, 0.8787, epsilon = 1e-3);
        assert_relative_eq!(result.expected_value, 18.76, epsilon = 0.05);
        assert_relative_eq!(result.probability_of_profit, 0.7975, epsilon = 1e-3);
        assert_relative_eq!(result.fair_premium, 3.9876, epsilon = 1e-3);
        assert_relative_eq!(result.edge_pct, 4.937, epsilon = 0.01);

        // Positive EV and high PoP, but edge just under 5%
        assert_eq!(result.quality, SpreadQuality::Good);
        assert_relative_eq!(result.kelly_fraction, 0.1563, epsilon = 1e-3);
        assert_eq!(result.suggested_contracts, 2);
    }

    #[test]
    fn test_buckets_sum_to_one() {
        for &(price, vol, dte) in &[
            (dec!(90), 0.2, 10u32),
            (dec!(97), 0.5, 45),
            (dec!(100), 0.35, 1),
            (dec!(130), 0.9, 200),
            (dec!(98), 0.3, 0),
        ] {
            let mut params = itm_call_spread();
            params.current_price = price;
            params.implied_volatility = vol;
            params.days_to_expiration = dte;
            let r = evaluate_spread(&params, dec!(25_000)).unwrap();

            assert!(r.prob_above_long >= r.prob_above_short);
            assert_relative_eq!(
                r.prob_max_profit + r.prob_partial + r.prob_max_loss,
                1.0,
                epsilon = 1e-12
            );
            assert!((0.0..=1.0).contains(&r.kelly_fraction));
            assert!(r.suggested_contracts >= 1);
            assert!(r.max_loss <= Decimal::ZERO);
            assert!(!r.reasons.is_empty());
            assert_relative_eq!(r.expected_win + r.expected_loss, r.expected_value, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_far_otm_is_poor() {
        let params = SpreadParameters::debit(dec!(120), dec!(125), dec!(2.00), dec!(100), 14, 0.25);
        let r = evaluate_spread(&params, dec!(10_000)).unwrap();
        assert_eq!(r.quality, SpreadQuality::Poor);
        assert_eq!(r.kelly_fraction, 0.0);
        assert_eq!(r.suggested_contracts, 1);
        assert!(r.edge_pct < 0.0);
    }

    #[test]
    fn test_credit_spread_evaluation() {
        // Bull put 440/445 for $1.25 with SPY at 460
        let params = SpreadParameters::credit(dec!(440), dec!(445), dec!(1.25), dec!(460), 35, 0.18);
        let r = evaluate_spread(&params, dec!(50_000)).unwrap();

        assert_eq!(r.kind, SpreadKind::Credit);
        assert_eq!(r.max_profit, dec!(125));
        assert_eq!(r.max_loss, dec!(-375));
        assert_eq!(r.breakeven_price, dec!(443.75));
        assert!(r.prob_max_profit > 0.7);
        // Fair credit and edge are consistent with each other
        assert_relative_eq!(r.edge_pct, (1.25 - r.fair_premium) / 1.25 * 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_grade_is_pure_in_headline_numbers() {
        let a = SpreadQuality::grade(12.5, 0.6, 3.0);
        let b = SpreadQuality::grade(12.5, 0.6, 3.0);
        assert_eq!(a, b);
        assert_eq!(a.0, SpreadQuality::Good);
    }

    #[test]
    fn test_grade_table() {
        assert_eq!(SpreadQuality::grade(10.0, 0.70, 6.0).0, SpreadQuality::Excellent);
        assert_eq!(SpreadQuality::grade(10.0, 0.70, 5.0).0, SpreadQuality::Good);
        assert_eq!(SpreadQuality::grade(10.0, 0.56, 20.0).0, SpreadQuality::Good);
        assert_eq!(SpreadQuality::grade(-10.0, 0.52, 0.0).0, SpreadQuality::Marginal);
        assert_eq!(SpreadQuality::grade(-20.0, 0.52, 0.0).0, SpreadQuality::Poor);
        assert_eq!(SpreadQuality::grade(5.0, 0.40, 0.0).0, SpreadQuality::Poor);

        let (_, reasons) = SpreadQuality::grade(10.0, 0.60, 12.0);
        assert_eq!(reasons[2], "Probability of profit 60.0% below 65% for an excellent grade");

        let (_, reasons) = SpreadQuality::grade(-50.0, 0.30, -10.0);
        assert_eq!(reasons.len(), 2);
        assert!(reasons[0].contains("-50.00"));
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        let mut params = itm_call_spread();
        params.short_strike = dec!(90);
        assert!(evaluate_spread(&params, dec!(10_000)).is_err());

        assert_eq!(
            evaluate_spread(&itm_call_spread(), dec!(0)).unwrap_err(),
            SpreadError::InvalidAccountSize(dec!(0))
        );
    }

    #[test]
    fn test_premium_equal_to_width_is_rejected() {
        let mut params = itm_call_spread();
        params.premium = dec!(5);
        assert_eq!(
            evaluate_spread(&params, dec!(10_000)).unwrap_err(),
            SpreadError::PremiumExceedsWidth {
                premium: dec!(5),
                width: dec!(5)
            }
        );

        // One cent under the width is still a valid, if hopeless, spread
        params.premium = dec!(4.99);
        let r = evaluate_spread(&params, dec!(10_000)).unwrap();
        assert_eq!(r.max_profit, dec!(1));
        assert_eq!(r.suggested_contracts, 1);
        assert!(r.edge_pct < 0.0);
    }

    #[test]
    fn test_account_size_only_moves_contracts() {
        let small = evaluate_spread(&itm_call_spread(), dec!(10_000)).unwrap();
        let large = evaluate_spread(&itm_call_spread(), dec!(100_000)).unwrap();
        assert_eq!(small.expected_value, large.expected_value);
        assert_eq!(small.quality, large.quality);
        assert!(large.suggested_contracts > small.suggested_contracts);
    }
}
