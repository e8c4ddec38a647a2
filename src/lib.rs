pub mod analytics;
pub mod batch;
pub mod config;
pub mod error;
pub mod exit;
pub mod pricing;
pub mod regime;
pub mod risk;
pub mod signals;

// Re-export commonly used types
pub use analytics::{evaluate_spread, run_scenarios, ExpectedValueResult, ScenarioResult, SpreadKind, SpreadParameters, SpreadQuality};
pub use batch::{scan_watchlist, BatchReport, ScoredSignal, WatchlistItem};
pub use config::EngineConfig;
pub use error::{ConfigError, SpreadError};
pub use exit::{recommend_exit, ExitAction, ExitConfig, ExitRecommendation, PositionSnapshot, Urgency};
pub use pricing::{probability_above_strike, probability_below_strike};
pub use regime::{adjust, DynamicAdjustments, MarketContext, MarketRegime, SpyTrend, VixLevel};
pub use risk::KellySizing;
pub use signals::{evaluate_entry, evaluate_position_risk, AlertDecision, AlertType, LetterGrade, Priority, ScanResult, WatchlistCriteria};
