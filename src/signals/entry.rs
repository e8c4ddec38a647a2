//! Entry decision evaluator.
//!
//! 1. Fold regime adjustments into the watchlist thresholds, inside hard rails
//! 2. Run five gates: RSI band, IV ceiling, 200-day MA, cushion floor, grade minimum
//! 3. Trigger only if every gate passes and no earnings report is within 7 days
//!
//! Side-effect free: cooldowns, delivery and persistence belong to the caller.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::regime::{adjust, DynamicAdjustments, MarketContext};

use super::grade::LetterGrade;
use super::types::{ScanResult, WatchlistCriteria};

/// Lowest effective RSI floor any adjustment can produce.
pub const RSI_LOW_FLOOR: f64 = 15.0;
/// Highest effective RSI ceiling any adjustment can produce.
pub const RSI_HIGH_CEILING: f64 = 80.0;
/// Lowest effective cushion floor any adjustment can produce.
pub const CUSHION_FLOOR: f64 = 3.0;
/// Cushion below which an open spread is flagged.
pub const CUSHION_RISK_PCT: f64 = 5.0;
/// DTE below which an open spread is flagged.
pub const DTE_RISK_DAYS: u32 = 5;

/// Kind of alert produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    EntrySignal,
    PositionRisk,
    EarningsWarning,
}

/// Alert priority. Ordered so that `High > Medium > Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Entry priority from the setup grade: A-family high, C-family low.
    pub fn from_grade(grade: Option<LetterGrade>) -> Self {
        match grade {
            Some(g) if g.is_a_family() => Self::High,
            Some(g) if g.is_c_family() => Self::Low,
            _ => Self::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

/// The five entry gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
    RsiInBuyZone,
    IvBelowThreshold,
    AboveMa200,
    CushionAboveMin,
    GradeMetMin,
}

/// Missing measurements never block an entry: absent data passes the gate.
fn passes_or_absent<T>(measurement: Option<T>, check: impl FnOnce(T) -> bool) -> bool {
    measurement.map_or(true, check)
}

/// Effective thresholds and gate outcomes for one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertCriteria {
    pub effective_rsi_low: f64,
    pub effective_rsi_high: f64,
    /// IV percentile ceiling after adjustment, if one is configured.
    pub effective_iv_threshold: Option<f64>,
    pub effective_min_cushion: f64,
    pub min_grade: Option<LetterGrade>,

    pub rsi_in_buy_zone: bool,
    pub iv_below_threshold: bool,
    pub above_ma200: bool,
    pub cushion_above_min: bool,
    pub grade_met_min: bool,

    pub earnings_within_7_days: bool,
    pub cushion_below_5_percent: bool,
    pub dte_below_5_days: bool,
}

impl AlertCriteria {
    /// Apply adjustments to watchlist thresholds and run every gate.
    pub fn compute(scan: &ScanResult, criteria: &WatchlistCriteria, adj: &DynamicAdjustments) -> Self {
        let effective_rsi_low = (criteria.target_rsi_low + adj.rsi_low_adjust).max(RSI_LOW_FLOOR);
        let effective_rsi_high = (criteria.target_rsi_high + adj.rsi_high_adjust).min(RSI_HIGH_CEILING);
        let effective_iv_threshold = criteria
            .iv_percentile_min
            .map(|ceiling| (ceiling + adj.iv_adjust).clamp(0.0, 100.0));
        let effective_min_cushion = (criteria.min_cushion_pct + adj.cushion_adjust).max(CUSHION_FLOOR);

        let rsi_in_buy_zone = passes_or_absent(scan.rsi, |rsi| {
            rsi >= effective_rsi_low && rsi <= effective_rsi_high
        });
        let iv_below_threshold = passes_or_absent(effective_iv_threshold, |ceiling| {
            passes_or_absent(scan.iv_percentile, |iv| iv <= ceiling)
        });
        let above_ma200 = passes_or_absent(scan.above_ma200, |above| above);
        let cushion_above_min = passes_or_absent(scan.cushion_pct, |c| c >= effective_min_cushion);
        let grade_met_min = LetterGrade::rank_of(scan.grade) >= LetterGrade::rank_of(criteria.min_grade);

        Self {
            effective_rsi_low,
            effective_rsi_high,
            effective_iv_threshold,
            effective_min_cushion,
            min_grade: criteria.min_grade,
            rsi_in_buy_zone,
            iv_below_threshold,
            above_ma200,
            cushion_above_min,
            grade_met_min,
            earnings_within_7_days: scan.earnings_within_blackout(),
            cushion_below_5_percent: scan.cushion_pct.map_or(false, |c| c < CUSHION_RISK_PCT),
            dte_below_5_days: scan.dte.map_or(false, |d| d < DTE_RISK_DAYS),
        }
    }

    pub fn passes(&self, gate: Gate) -> bool {
        match gate {
            Gate::RsiInBuyZone => self.rsi_in_buy_zone,
            Gate::IvBelowThreshold => self.iv_below_threshold,
            Gate::AboveMa200 => self.above_ma200,
            Gate::CushionAboveMin => self.cushion_above_min,
            Gate::GradeMetMin => self.grade_met_min,
        }
    }

    /// Gates that failed, in evaluation order.
    pub fn failing_gates(&self) -> Vec<Gate> {
        [
            Gate::RsiInBuyZone,
            Gate::IvBelowThreshold,
            Gate::AboveMa200,
            Gate::CushionAboveMin,
            Gate::GradeMetMin,
        ]
        .into_iter()
        .filter(|gate| !self.passes(*gate))
        .collect()
    }

    pub fn all_gates_pass(&self) -> bool {
        self.failing_gates().is_empty()
    }
}

/// Outcome of an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertDecision {
    pub trigger: bool,
    pub alert_type: AlertType,
    pub priority: Priority,
    pub reason: String,
    /// Opaque details for downstream consumers.
    pub payload: BTreeMap<String, Value>,
}

/// Rejection text for a failed gate, carrying the measured value.
fn gate_failure(gate: Gate, scan: &ScanResult, c: &AlertCriteria) -> String {
    match gate {
        Gate::RsiInBuyZone => format!(
            "RSI {:.1} outside {:.0}-{:.0}",
            scan.rsi.unwrap_or_default(),
            c.effective_rsi_low,
            c.effective_rsi_high
        ),
        Gate::IvBelowThreshold => format!(
            "IV {:.0}% above {:.0}%",
            scan.iv_percentile.unwrap_or_default(),
            c.effective_iv_threshold.unwrap_or_default()
        ),
        Gate::AboveMa200 => "below 200-day MA".to_string(),
        Gate::CushionAboveMin => format!(
            "cushion {:.1}% below {:.1}%",
            scan.cushion_pct.unwrap_or_default(),
            c.effective_min_cushion
        ),
        Gate::GradeMetMin => format!(
            "grade {} below {}",
            scan.grade.map_or("unknown", |g| g.as_str()),
            c.min_grade.map_or("none", |g| g.as_str())
        ),
    }
}

/// Metric summary for a triggered entry: RSI, IV, cushion, grade, in that order.
fn entry_summary(scan: &ScanResult) -> String {
    let mut parts = Vec::new();
    if let Some(rsi) = scan.rsi {
        parts.push(format!("RSI {:.1}", rsi));
    }
    if let Some(iv) = scan.iv_percentile {
        parts.push(format!("IV {:.0}%", iv));
    }
    if let Some(cushion) = scan.cushion_pct {
        parts.push(format!("cushion {:.1}%", cushion));
    }
    if let Some(grade) = scan.grade {
        parts.push(format!("grade {}", grade));
    }
    if parts.is_empty() {
        "All entry criteria met".to_string()
    } else {
        parts.join(", ")
    }
}

fn build_payload(scan: &ScanResult, criteria: &AlertCriteria, adj: &DynamicAdjustments) -> BTreeMap<String, Value> {
    let mut payload = BTreeMap::new();
    payload.insert("ticker".to_string(), Value::String(scan.ticker.clone()));
    payload.insert("price".to_string(), Value::String(scan.price.to_string()));
    if let Ok(value) = serde_json::to_value(criteria) {
        payload.insert("criteria".to_string(), value);
    }
    if let Ok(value) = serde_json::to_value(adj) {
        payload.insert("adjustments".to_string(), value);
    }
    payload
}

/// Evaluate whether a scan result warrants an entry alert.
pub fn evaluate_entry(
    scan: &ScanResult,
    criteria: &WatchlistCriteria,
    context: Option<&MarketContext>,
) -> AlertDecision {
    let adj = adjust(scan, context);
    let alert_criteria = AlertCriteria::compute(scan, criteria, &adj);

    let failing = alert_criteria.failing_gates();
    let trigger = failing.is_empty() && !alert_criteria.earnings_within_7_days;

    let (priority, reason) = if trigger {
        (Priority::from_grade(scan.grade), entry_summary(scan))
    } else {
        let mut rejections: Vec<String> = failing
            .iter()
            .map(|gate| gate_failure(*gate, scan, &alert_criteria))
            .collect();
        if alert_criteria.earnings_within_7_days {
            rejections.push("earnings within 7 days".to_string());
        }
        (Priority::Low, rejections.join(", "))
    };

    debug!(
        ticker = %scan.ticker,
        trigger,
        priority = priority.as_str(),
        reason = %reason,
        "Evaluated entry"
    );

    AlertDecision {
        trigger,
        alert_type: AlertType::EntrySignal,
        priority,
        reason,
        payload: build_payload(scan, &alert_criteria, &adj),
    }
}
