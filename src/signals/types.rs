//! Scan inputs for entry evaluation.
//!
//! Every market measurement is optional. A measurement the data provider
//! could not supply never blocks an entry on its own.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::grade::{self, LetterGrade};

/// Days ahead within which an earnings report blocks entries.
pub const EARNINGS_BLACKOUT_DAYS: i64 = 7;

/// One ticker's scan snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub ticker: String,
    /// Date the scan was taken; earnings proximity is measured from here.
    pub scan_date: NaiveDate,
    /// Last underlying price.
    pub price: Decimal,
    /// Daily change in percent (-2.5 = down 2.5%).
    #[serde(default)]
    pub change_pct: Option<f64>,
    /// 14-day RSI.
    #[serde(default)]
    pub rsi: Option<f64>,
    /// IV percentile, 0-100.
    #[serde(default)]
    pub iv_percentile: Option<f64>,
    /// Whether price is above the 200-day moving average.
    #[serde(default)]
    pub above_ma200: Option<bool>,
    /// Cushion to the candidate spread's short strike, in percent.
    #[serde(default)]
    pub cushion_pct: Option<f64>,
    /// Setup grade. Unrecognized letters deserialize as unknown.
    #[serde(default, deserialize_with = "grade::deserialize_lenient")]
    pub grade: Option<LetterGrade>,
    /// Next earnings report, if scheduled.
    #[serde(default)]
    pub earnings_date: Option<NaiveDate>,
    /// Days to expiration of the candidate spread.
    #[serde(default)]
    pub dte: Option<u32>,
}

impl ScanResult {
    /// A scan with no measurements.
    pub fn new(ticker: &str, scan_date: NaiveDate, price: Decimal) -> Self {
        Self {
            ticker: ticker.to_string(),
            scan_date,
            price,
            change_pct: None,
            rsi: None,
            iv_percentile: None,
            above_ma200: None,
            cushion_pct: None,
            grade: None,
            earnings_date: None,
            dte: None,
        }
    }

    pub fn earnings_within_blackout(&self) -> bool {
        earnings_within(self.scan_date, self.earnings_date, EARNINGS_BLACKOUT_DAYS)
    }
}

/// Whether `earnings` falls between `as_of` and `as_of + days`, inclusive.
/// Unknown or past earnings dates never count.
pub fn earnings_within(as_of: NaiveDate, earnings: Option<NaiveDate>, days: i64) -> bool {
    earnings
        .map(|date| {
            let ahead = (date - as_of).num_days();
            (0..=days).contains(&ahead)
        })
        .unwrap_or(false)
}

/// Per-ticker entry thresholds owned by the watchlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchlistCriteria {
    /// Lower bound of the RSI buy zone.
    pub target_rsi_low: f64,
    /// Upper bound of the RSI buy zone.
    pub target_rsi_high: f64,
    /// Minimum cushion to the short strike, in percent.
    pub min_cushion_pct: f64,
    /// IV percentile ceiling for entries. No ceiling when absent.
    #[serde(default)]
    pub iv_percentile_min: Option<f64>,
    /// Minimum setup grade. Any grade passes when absent.
    #[serde(default, deserialize_with = "grade::deserialize_lenient")]
    pub min_grade: Option<LetterGrade>,
}

impl Default for WatchlistCriteria {
    fn default() -> Self {
        Self {
            target_rsi_low: 40.0,
            target_rsi_high: 60.0,
            min_cushion_pct: 5.0,
            iv_percentile_min: None,
            min_grade: Some(LetterGrade::B),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn test_earnings_window() {
        assert!(earnings_within(day(1), Some(day(1)), 7));
        assert!(earnings_within(day(1), Some(day(8)), 7));
        assert!(!earnings_within(day(1), Some(day(9)), 7));
        assert!(!earnings_within(day(10), Some(day(9)), 7));
        assert!(!earnings_within(day(1), None, 7));
    }

    #[test]
    fn test_scan_deserializes_with_missing_fields() {
        let json = r#"{
            "ticker": "AMD",
            "scan_date": "2024-05-01",
            "price": "162.40",
            "rsi": 48.5,
            "grade": "B+"
        }"#;
        let scan: ScanResult = serde_json::from_str(json).unwrap();
        assert_eq!(scan.ticker, "AMD");
        assert_eq!(scan.price, dec!(162.40));
        assert_eq!(scan.rsi, Some(48.5));
        assert_eq!(scan.grade, Some(LetterGrade::BPlus));
        assert_eq!(scan.iv_percentile, None);
        assert_eq!(scan.above_ma200, None);
        assert!(!scan.earnings_within_blackout());
    }

    #[test]
    fn test_unknown_grade_deserializes_as_none() {
        let json = r#"{"ticker":"X","scan_date":"2024-05-01","price":"10","grade":"Z"}"#;
        let scan: ScanResult = serde_json::from_str(json).unwrap();
        assert_eq!(scan.grade, None);
    }
}
