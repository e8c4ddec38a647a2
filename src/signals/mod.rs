//! Entry signal evaluation.
//!
//! Provides:
//! - Letter grade ordinal
//! - Scan result and per-ticker watchlist criteria
//! - Regime-adjusted multi-gate entry decision
//! - Risk alerts for open positions

pub mod entry;
pub mod grade;
pub mod position_risk;
pub mod types;

pub use entry::{evaluate_entry, AlertCriteria, AlertDecision, AlertType, Gate, Priority};
pub use grade::LetterGrade;
pub use position_risk::evaluate_position_risk;
pub use types::{ScanResult, WatchlistCriteria};
