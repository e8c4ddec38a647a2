//! Layered exit rule resolution.
//!
//! Three independent checks classify the position, then a fixed precedence
//! picks the action (first match wins):
//! 1. DTE at or below forced exit -> CLOSE / IMMEDIATE
//! 2. Pin risk exit -> CLOSE / IMMEDIATE
//! 3. Profit at or above greed limit -> CLOSE / IMMEDIATE
//! 4. Profit target, gamma zone or pin warning -> SOON (CLOSE unless only pin warning)
//! 5. Otherwise HOLD / NORMAL

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::analytics::SpreadKind;
use crate::error::ConfigError;

/// Exit thresholds owned by the position config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExitConfig {
    /// Close immediately at or above this profit capture (%).
    pub greed_limit_pct: f64,
    /// Close soon at or above this profit capture (%).
    pub target_pct: f64,
    /// Profit capture (%) at which closing becomes acceptable.
    pub min_acceptable_pct: f64,
    /// Must close at or below this DTE.
    pub forced_exit_dte: i32,
    /// Gamma risk warning at or below this DTE.
    pub gamma_risk_zone_dte: i32,
    /// Pin risk is only checked at or below this DTE.
    pub pin_risk_dte_threshold: i32,
    /// Close immediately when cushion (%) is at or below this inside the pin window.
    pub cushion_exit_pct: f64,
    /// Warn when cushion (%) is at or below this inside the pin window.
    pub cushion_warning_pct: f64,
}

impl Default for ExitConfig {
    fn default() -> Self {
        Self {
            greed_limit_pct: 80.0,
            target_pct: 50.0,
            min_acceptable_pct: 25.0,
            forced_exit_dte: 5,
            gamma_risk_zone_dte: 21,
            pin_risk_dte_threshold: 7,
            cushion_exit_pct: 2.0,
            cushion_warning_pct: 5.0,
        }
    }
}

impl ExitConfig {
    /// Reject threshold orderings that would make tiers unreachable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_acceptable_pct <= self.target_pct && self.target_pct <= self.greed_limit_pct) {
            return Err(ConfigError::Invalid(format!(
                "profit tiers must satisfy min_acceptable ({}) <= target ({}) <= greed_limit ({})",
                self.min_acceptable_pct, self.target_pct, self.greed_limit_pct
            )));
        }
        if self.forced_exit_dte > self.gamma_risk_zone_dte {
            return Err(ConfigError::Invalid(format!(
                "forced_exit_dte ({}) must not exceed gamma_risk_zone_dte ({})",
                self.forced_exit_dte, self.gamma_risk_zone_dte
            )));
        }
        if self.cushion_exit_pct > self.cushion_warning_pct {
            return Err(ConfigError::Invalid(format!(
                "cushion_exit_pct ({}) must not exceed cushion_warning_pct ({})",
                self.cushion_exit_pct, self.cushion_warning_pct
            )));
        }
        Ok(())
    }
}

/// Current state of an open spread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub ticker: String,
    /// Share of max profit captured so far (%).
    pub profit_captured_pct: f64,
    /// Days to expiration; negative once expired.
    pub dte: i32,
    /// Distance from price to the short strike (%).
    pub cushion_pct: f64,
    #[serde(default)]
    pub earnings_date: Option<NaiveDate>,
}

impl PositionSnapshot {
    pub fn recommend(&self, config: &ExitConfig) -> ExitRecommendation {
        recommend_exit(self.profit_captured_pct, self.dte, self.cushion_pct, config)
    }
}

/// Share of max profit captured, in percent.
///
/// # Arguments
/// * `entry_premium` - Debit paid or credit received per share
/// * `current_value` - Current spread mark per share (value for debit, cost to close for credit)
/// * `width` - Strike width
/// * `kind` - Debit or credit spread
pub fn profit_captured_pct(
    entry_premium: Decimal,
    current_value: Decimal,
    width: Decimal,
    kind: SpreadKind,
) -> f64 {
    let (captured, max_profit) = match kind {
        SpreadKind::Debit => (current_value - entry_premium, width - entry_premium),
        SpreadKind::Credit => (entry_premium - current_value, entry_premium),
    };
    if max_profit <= Decimal::ZERO {
        return 0.0;
    }
    let captured = captured.to_f64().unwrap_or(0.0);
    let max_profit = max_profit.to_f64().unwrap_or(1.0);
    captured / max_profit * 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitAction {
    Close,
    Hold,
    Monitor,
}

/// Ordered so that `Immediate > Soon > Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Urgency {
    Normal,
    Soon,
    Immediate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfitStatus {
    GreedLimit,
    Target,
    Acceptable,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DteStatus {
    Forced,
    Warning,
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PinRiskStatus {
    Exit,
    Warning,
    Ok,
    /// Outside the pin risk window.
    NotEvaluated,
}

/// Resolved exit advice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitRecommendation {
    pub action: ExitAction,
    pub urgency: Urgency,
    /// Most severe first; never empty.
    pub reasons: Vec<String>,
    pub profit_status: ProfitStatus,
    pub dte_status: DteStatus,
    pub pin_risk_status: PinRiskStatus,
}

impl ExitRecommendation {
    pub fn is_close(&self) -> bool {
        self.action == ExitAction::Close
    }
}

// Severity used to order accumulated reasons.
const SEV_FORCED: u8 = 5;
const SEV_PIN_EXIT: u8 = 4;
const SEV_GREED: u8 = 3;
const SEV_WARNING: u8 = 2;
const SEV_INFO: u8 = 1;

/// Recommend an exit action for an open spread.
pub fn recommend_exit(
    profit_captured_pct: f64,
    dte: i32,
    cushion_pct: f64,
    config: &ExitConfig,
) -> ExitRecommendation {
    let mut reasons: Vec<(u8, String)> = Vec::new();

    let profit_status = if profit_captured_pct >= config.greed_limit_pct {
        reasons.push((
            SEV_GREED,
            format!(
                "Profit {:.1}% ≥ greed limit {:.0}%",
                profit_captured_pct, config.greed_limit_pct
            ),
        ));
        ProfitStatus::GreedLimit
    } else if profit_captured_pct >= config.target_pct {
        reasons.push((
            SEV_WARNING,
            format!("Profit {:.1}% ≥ target {:.0}%", profit_captured_pct, config.target_pct),
        ));
        ProfitStatus::Target
    } else if profit_captured_pct >= config.min_acceptable_pct {
        reasons.push((
            SEV_INFO,
            format!(
                "Profit {:.1}% ≥ minimum acceptable {:.0}%",
                profit_captured_pct, config.min_acceptable_pct
            ),
        ));
        ProfitStatus::Acceptable
    } else {
        ProfitStatus::Below
    };

    let dte_status = if dte <= config.forced_exit_dte {
        reasons.push((
            SEV_FORCED,
            format!("{} DTE ≤ forced exit {} DTE", dte, config.forced_exit_dte),
        ));
        DteStatus::Forced
    } else if dte <= config.gamma_risk_zone_dte {
        reasons.push((
            SEV_WARNING,
            format!("{} DTE in gamma risk zone (≤ {})", dte, config.gamma_risk_zone_dte),
        ));
        DteStatus::Warning
    } else {
        DteStatus::Ok
    };

    let pin_risk_status = if dte > config.pin_risk_dte_threshold {
        PinRiskStatus::NotEvaluated
    } else if cushion_pct <= config.cushion_exit_pct {
        reasons.push((
            SEV_PIN_EXIT,
            format!(
                "Pin risk: cushion {:.1}% ≤ {:.1}% with {} DTE",
                cushion_pct, config.cushion_exit_pct, dte
            ),
        ));
        PinRiskStatus::Exit
    } else if cushion_pct <= config.cushion_warning_pct {
        reasons.push((
            SEV_WARNING,
            format!(
                "Pin risk warning: cushion {:.1}% ≤ {:.1}% with {} DTE",
                cushion_pct, config.cushion_warning_pct, dte
            ),
        ));
        PinRiskStatus::Warning
    } else {
        PinRiskStatus::Ok
    };

    // Stable sort keeps check order within a severity.
    reasons.sort_by(|a, b| b.0.cmp(&a.0));
    let ordered: Vec<String> = reasons.into_iter().map(|(_, text)| text).collect();

    let immediate = dte_status == DteStatus::Forced
        || pin_risk_status == PinRiskStatus::Exit
        || profit_status == ProfitStatus::GreedLimit;
    let profit_close = profit_status == ProfitStatus::Target;
    let dte_warning = dte_status == DteStatus::Warning;
    let pin_warning = pin_risk_status == PinRiskStatus::Warning;

    let (action, urgency, reasons) = if immediate {
        (ExitAction::Close, Urgency::Immediate, ordered)
    } else if profit_close || dte_warning || pin_warning {
        let action = if profit_close || dte_warning {
            ExitAction::Close
        } else {
            ExitAction::Monitor
        };
        (action, Urgency::Soon, ordered)
    } else {
        (
            ExitAction::Hold,
            Urgency::Normal,
            vec!["Within normal parameters".to_string()],
        )
    };

    ExitRecommendation {
        action,
        urgency,
        reasons,
        profit_status,
        dte_status,
        pin_risk_status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn config() -> ExitConfig {
        ExitConfig::default()
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut c = config();
        c.target_pct = 90.0;
        assert!(c.validate().is_err());

        let mut c = config();
        c.forced_exit_dte = 30;
        assert!(c.validate().is_err());

        let mut c = config();
        c.cushion_exit_pct = 6.0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_greed_limit_closes_regardless() {
        for &(dte, cushion) in &[(60, 20.0), (14, 3.0), (6, 10.0)] {
            let rec = recommend_exit(85.0, dte, cushion, &config());
            assert_eq!(rec.action, ExitAction::Close);
            assert_eq!(rec.urgency, Urgency::Immediate);
            assert!(rec.reasons.iter().any(|r| r.contains("greed limit")));
        }
    }

    #[test]
    fn test_forced_dte_dominates() {
        for &(profit, cushion) in &[(-40.0, 20.0), (10.0, 0.5), (95.0, 8.0)] {
            let rec = recommend_exit(profit, 3, cushion, &config());
            assert_eq!(rec.action, ExitAction::Close);
            assert_eq!(rec.urgency, Urgency::Immediate);
            assert_eq!(rec.dte_status, DteStatus::Forced);
            assert!(rec.reasons[0].contains("forced exit"));
        }
    }

    #[test]
    fn test_pin_risk_exit() {
        let rec = recommend_exit(10.0, 6, 1.5, &config());
        assert_eq!(rec.action, ExitAction::Close);
        assert_eq!(rec.urgency, Urgency::Immediate);
        assert_eq!(rec.pin_risk_status, PinRiskStatus::Exit);
        assert!(rec.reasons[0].starts_with("Pin risk"));
        // Gamma zone warning is still reported behind it
        assert!(rec.reasons.iter().any(|r| r.contains("gamma risk zone")));
    }

    #[test]
    fn test_pin_risk_ignored_outside_window() {
        let rec = recommend_exit(10.0, 30, 0.5, &config());
        assert_eq!(rec.pin_risk_status, PinRiskStatus::NotEvaluated);
        assert_eq!(rec.action, ExitAction::Hold);
    }

    #[test]
    fn test_target_closes_soon() {
        let rec = recommend_exit(55.0, 40, 10.0, &config());
        assert_eq!(rec.action, ExitAction::Close);
        assert_eq!(rec.urgency, Urgency::Soon);
        assert_eq!(rec.reasons, vec!["Profit 55.0% ≥ target 50%".to_string()]);
    }

    #[test]
    fn test_gamma_zone_closes_soon_with_all_reasons() {
        let rec = recommend_exit(30.0, 14, 10.0, &config());
        assert_eq!(rec.action, ExitAction::Close);
        assert_eq!(rec.urgency, Urgency::Soon);
        assert_eq!(rec.reasons.len(), 2);
        assert!(rec.reasons[0].contains("gamma risk zone"));
        assert!(rec.reasons[1].contains("minimum acceptable"));
    }

    #[test]
    fn test_pin_warning_alone_monitors() {
        let mut c = config();
        c.gamma_risk_zone_dte = 5;
        c.forced_exit_dte = 2;
        let rec = recommend_exit(10.0, 6, 4.0, &c);
        assert_eq!(rec.action, ExitAction::Monitor);
        assert_eq!(rec.urgency, Urgency::Soon);
        assert_eq!(rec.pin_risk_status, PinRiskStatus::Warning);
    }

    #[test]
    fn test_normal_hold() {
        let rec = recommend_exit(30.0, 40, 10.0, &config());
        assert_eq!(rec.action, ExitAction::Hold);
        assert_eq!(rec.urgency, Urgency::Normal);
        assert_eq!(rec.reasons, vec!["Within normal parameters".to_string()]);
        assert_eq!(rec.profit_status, ProfitStatus::Acceptable);
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        let c = config();

        let rec = recommend_exit(80.0, 40, 10.0, &c);
        assert_eq!(rec.profit_status, ProfitStatus::GreedLimit);
        assert_eq!((rec.action, rec.urgency), (ExitAction::Close, Urgency::Immediate));

        let rec = recommend_exit(50.0, 40, 10.0, &c);
        assert_eq!(rec.profit_status, ProfitStatus::Target);
        assert_eq!((rec.action, rec.urgency), (ExitAction::Close, Urgency::Soon));

        assert_eq!(recommend_exit(25.0, 40, 10.0, &c).profit_status, ProfitStatus::Acceptable);
        assert_eq!(recommend_exit(24.9, 40, 10.0, &c).profit_status, ProfitStatus::Below);

        let rec = recommend_exit(10.0, 5, 10.0, &c);
        assert_eq!(rec.dte_status, DteStatus::Forced);
        assert_eq!((rec.action, rec.urgency), (ExitAction::Close, Urgency::Immediate));
        assert_eq!(recommend_exit(10.0, 21, 10.0, &c).dte_status, DteStatus::Warning);
        assert_eq!(recommend_exit(10.0, 22, 10.0, &c).dte_status, DteStatus::Ok);
    }

    #[test]
    fn test_pin_risk_window_edges() {
        let c = config();

        let rec = recommend_exit(10.0, 7, 2.0, &c);
        assert_eq!(rec.pin_risk_status, PinRiskStatus::Exit);
        assert_eq!((rec.action, rec.urgency), (ExitAction::Close, Urgency::Immediate));

        assert_eq!(recommend_exit(10.0, 7, 5.0, &c).pin_risk_status, PinRiskStatus::Warning);
        assert_eq!(recommend_exit(10.0, 7, 5.1, &c).pin_risk_status, PinRiskStatus::Ok);

        // One day outside the window the cushion is not checked at all
        assert_eq!(recommend_exit(10.0, 8, 2.0, &c).pin_risk_status, PinRiskStatus::NotEvaluated);
    }

    #[test]
    fn test_snapshot_delegates() {
        let snap = PositionSnapshot {
            ticker: "QQQ".to_string(),
            profit_captured_pct: 85.0,
            dte: 30,
            cushion_pct: 6.0,
            earnings_date: None,
        };
        assert!(snap.recommend(&config()).is_close());
    }

    #[test]
    fn test_profit_captured_debit() {
        // Paid 2.00 on a 5-wide; now worth 3.50 -> 1.50 of 3.00 max
        let pct = profit_captured_pct(dec!(2.00), dec!(3.50), dec!(5), SpreadKind::Debit);
        assert!((pct - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_profit_captured_credit() {
        // Collected 1.20; costs 0.30 to close -> 75% captured
        let pct = profit_captured_pct(dec!(1.20), dec!(0.30), dec!(5), SpreadKind::Credit);
        assert!((pct - 75.0).abs() < 1e-9);
        assert_eq!(profit_captured_pct(dec!(5), dec!(5), dec!(5), SpreadKind::Debit), 0.0);
    }
}
