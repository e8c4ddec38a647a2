//! Parallel watchlist scoring.
//!
//! Each ticker is evaluated independently on the rayon pool. A spread that
//! violates its preconditions skips only that ticker. Ordering is applied
//! after every result is collected.

use std::cmp::Ordering;

use rayon::prelude::*;
use serde::{Deserialize, Serialize, Serializer};
use tracing::{info, warn};

use crate::analytics::{evaluate_spread, ExpectedValueResult, SpreadParameters};
use crate::config::EngineConfig;
use crate::error::SpreadError;
use crate::regime::MarketContext;
use crate::signals::{evaluate_entry, AlertDecision, ScanResult, WatchlistCriteria};

/// One watchlist ticker to score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistItem {
    pub scan: ScanResult,
    #[serde(default)]
    pub criteria: WatchlistCriteria,
    /// Candidate spread, when one was selected for this ticker.
    #[serde(default)]
    pub spread: Option<SpreadParameters>,
}

/// Scored ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredSignal {
    pub ticker: String,
    pub decision: AlertDecision,
    pub expected_value: Option<ExpectedValueResult>,
}

/// Ticker dropped from the batch.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedTicker {
    pub ticker: String,
    /// Serialized as its display message.
    #[serde(serialize_with = "serialize_error")]
    pub error: SpreadError,
}

fn serialize_error<S: Serializer>(error: &SpreadError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Result of a batch scan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// Triggered first, then by priority (high first), then by ticker.
    pub signals: Vec<ScoredSignal>,
    pub skipped: Vec<SkippedTicker>,
}

impl BatchReport {
    pub fn triggered(&self) -> impl Iterator<Item = &ScoredSignal> {
        self.signals.iter().filter(|s| s.decision.trigger)
    }
}

fn score_item(
    item: &WatchlistItem,
    context: Option<&MarketContext>,
    config: &EngineConfig,
) -> Result<ScoredSignal, SpreadError> {
    let expected_value = item
        .spread
        .as_ref()
        .map(|spread| evaluate_spread(spread, config.account_size))
        .transpose()?;

    Ok(ScoredSignal {
        ticker: item.scan.ticker.clone(),
        decision: evaluate_entry(&item.scan, &item.criteria, context),
        expected_value,
    })
}

fn signal_order(a: &ScoredSignal, b: &ScoredSignal) -> Ordering {
    b.decision
        .trigger
        .cmp(&a.decision.trigger)
        .then_with(|| b.decision.priority.cmp(&a.decision.priority))
        .then_with(|| a.ticker.cmp(&b.ticker))
}

/// Score every watchlist item against the same market context.
pub fn scan_watchlist(
    items: &[WatchlistItem],
    context: Option<&MarketContext>,
    config: &EngineConfig,
) -> BatchReport {
    let results: Vec<(String, Result<ScoredSignal, SpreadError>)> = items
        .par_iter()
        .map(|item| (item.scan.ticker.clone(), score_item(item, context, config)))
        .collect();

    let mut report = BatchReport::default();
    for (ticker, result) in results {
        match result {
            Ok(signal) => report.signals.push(signal),
            Err(error) => {
                warn!(ticker = %ticker, error = %error, "Skipping ticker with invalid spread");
                report.skipped.push(SkippedTicker { ticker, error });
            }
        }
    }
    report.signals.sort_by(signal_order);

    info!(
        "Scanned {} tickers: {} triggered, {} skipped",
        items.len(),
        report.triggered().count(),
        report.skipped.len()
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regime::{MarketRegime, SpyTrend};
    use crate::signals::{LetterGrade, Priority};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn item(ticker: &str, rsi: f64, grade: LetterGrade) -> WatchlistItem {
        let scan = ScanResult {
            rsi: Some(rsi),
            grade: Some(grade),
            cushion_pct: Some(7.0),
            ..ScanResult::new(ticker, NaiveDate::from_ymd_opt(2024, 2, 5).unwrap(), dec!(100))
        };
        WatchlistItem {
            scan,
            criteria: WatchlistCriteria {
                min_grade: Some(LetterGrade::C),
                ..Default::default()
            },
            spread: Some(SpreadParameters::debit(dec!(95), dec!(100), dec!(2.50), dec!(100), 30, 0.30)),
        }
    }

    #[test]
    fn test_batch_orders_by_priority_then_ticker() {
        let items = vec![
            item("ZZZ", 50.0, LetterGrade::A),
            item("CCC", 50.0, LetterGrade::C),
            item("BBB", 50.0, LetterGrade::B),
            item("AAA", 50.0, LetterGrade::APlus),
            item("NOPE", 90.0, LetterGrade::A),
        ];
        let report = scan_watchlist(&items, None, &EngineConfig::default());

        let order: Vec<&str> = report.signals.iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(order, vec!["AAA", "ZZZ", "BBB", "CCC", "NOPE"]);
        assert_eq!(report.triggered().count(), 4);
        assert_eq!(report.signals[0].decision.priority, Priority::High);
        assert!(report.signals[0].expected_value.is_some());
    }

    #[test]
    fn test_bad_spread_skips_only_that_ticker() {
        let mut bad = item("BAD", 50.0, LetterGrade::A);
        if let Some(spread) = bad.spread.as_mut() {
            spread.premium = dec!(0);
        }
        let items = vec![item("GOOD", 50.0, LetterGrade::A), bad];
        let report = scan_watchlist(&items, None, &EngineConfig::default());

        assert_eq!(report.signals.len(), 1);
        assert_eq!(report.signals[0].ticker, "GOOD");
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].ticker, "BAD");
        assert_eq!(report.skipped[0].error, SpreadError::NonPositivePremium(dec!(0)));
    }

    #[test]
    fn test_premium_at_width_skips_ticker() {
        let mut wide = item("WIDE", 50.0, LetterGrade::A);
        if let Some(spread) = wide.spread.as_mut() {
            spread.premium = dec!(5);
        }
        let report = scan_watchlist(&[wide], None, &EngineConfig::default());
        assert!(report.signals.is_empty());
        assert!(matches!(
            report.skipped[0].error,
            SpreadError::PremiumExceedsWidth { .. }
        ));
    }

    #[test]
    fn test_report_serializes_skipped_error_as_message() {
        let mut bad = item("BAD", 50.0, LetterGrade::A);
        if let Some(spread) = bad.spread.as_mut() {
            spread.premium = dec!(0);
        }
        let report = scan_watchlist(&[item("GOOD", 50.0, LetterGrade::A), bad], None, &EngineConfig::default());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["signals"][0]["ticker"], "GOOD");
        assert_eq!(json["signals"][0]["decision"]["priority"], "HIGH");
        assert_eq!(json["skipped"][0]["ticker"], "BAD");
        assert_eq!(json["skipped"][0]["error"], "Invalid premium: 0 must be positive");
    }

    #[test]
    fn test_context_applies_to_every_item() {
        let ctx = MarketContext::new(MarketRegime::RiskOn, SpyTrend::Bullish, 17.0);
        let items = vec![item("AAA", 63.0, LetterGrade::A), item("BBB", 63.0, LetterGrade::B)];

        assert_eq!(scan_watchlist(&items, None, &EngineConfig::default()).triggered().count(), 0);
        assert_eq!(scan_watchlist(&items, Some(&ctx), &EngineConfig::default()).triggered().count(), 2);
    }

    #[test]
    fn test_items_without_spread() {
        let mut it = item("NOSPREAD", 50.0, LetterGrade::B);
        it.spread = None;
        let report = scan_watchlist(&[it], None, &EngineConfig::default());
        assert!(report.signals[0].expected_value.is_none());
        assert!(report.signals[0].decision.trigger);
    }
}
