//! Risk alerts for open spreads.
//!
//! Earnings proximity outranks price risk; an open spread with an earnings
//! report inside the blackout window gets an earnings warning even when
//! cushion and DTE are also flagged.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::Value;

use crate::exit::PositionSnapshot;

use super::entry::{AlertDecision, AlertType, Priority, CUSHION_RISK_PCT, DTE_RISK_DAYS};
use super::types::{earnings_within, EARNINGS_BLACKOUT_DAYS};

/// Check an open position for earnings, cushion and expiration risk.
/// Returns `None` when nothing needs attention.
pub fn evaluate_position_risk(position: &PositionSnapshot, as_of: NaiveDate) -> Option<AlertDecision> {
    let mut payload = BTreeMap::new();
    payload.insert("ticker".to_string(), Value::String(position.ticker.clone()));
    payload.insert("cushion_pct".to_string(), Value::from(position.cushion_pct));
    payload.insert("dte".to_string(), Value::from(position.dte));

    if earnings_within(as_of, position.earnings_date, EARNINGS_BLACKOUT_DAYS) {
        let days = position
            .earnings_date
            .map(|d| (d - as_of).num_days())
            .unwrap_or_default();
        return Some(AlertDecision {
            trigger: true,
            alert_type: AlertType::EarningsWarning,
            priority: Priority::High,
            reason: format!("{} reports earnings in {} days", position.ticker, days),
            payload,
        });
    }

    let mut reasons = Vec::new();
    let mut priority = None;
    if position.cushion_pct < CUSHION_RISK_PCT {
        reasons.push(format!("cushion {:.1}% below {:.0}%", position.cushion_pct, CUSHION_RISK_PCT));
        priority = Some(Priority::High);
    }
    if position.dte < DTE_RISK_DAYS as i32 {
        reasons.push(format!("{} DTE below {}", position.dte, DTE_RISK_DAYS));
        priority = priority.or(Some(Priority::Medium));
    }

    priority.map(|priority| AlertDecision {
        trigger: true,
        alert_type: AlertType::PositionRisk,
        priority,
        reason: reasons.join(", "),
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn position(cushion_pct: f64, dte: i32) -> PositionSnapshot {
        PositionSnapshot {
            ticker: "AAPL".to_string(),
            profit_captured_pct: 20.0,
            dte,
            cushion_pct,
            earnings_date: None,
        }
    }

    #[test]
    fn test_healthy_position_is_quiet() {
        assert!(evaluate_position_risk(&position(9.0, 20), today()).is_none());
    }

    #[test]
    fn test_thin_cushion_is_high() {
        let alert = evaluate_position_risk(&position(3.2, 20), today()).unwrap();
        assert_eq!(alert.alert_type, AlertType::PositionRisk);
        assert_eq!(alert.priority, Priority::High);
        assert_eq!(alert.reason, "cushion 3.2% below 5%");
    }

    #[test]
    fn test_short_dte_is_medium() {
        let alert = evaluate_position_risk(&position(9.0, 4), today()).unwrap();
        assert_eq!(alert.priority, Priority::Medium);
        assert_eq!(alert.reason, "4 DTE below 5");
    }

    #[test]
    fn test_earnings_outranks_price_risk() {
        let mut pos = position(2.0, 2);
        pos.earnings_date = Some(today() + chrono::Duration::days(5));
        let alert = evaluate_position_risk(&pos, today()).unwrap();
        assert_eq!(alert.alert_type, AlertType::EarningsWarning);
        assert_eq!(alert.priority, Priority::High);
        assert!(alert.reason.contains("5 days"));
    }
}
