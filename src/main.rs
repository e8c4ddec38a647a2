//! Spread Signals CLI
//!
//! # Usage
//!
//! ```bash
//! # Expected value of a 95/100 bull call spread bought for 3.80
//! spread-signals ev --long 95 --short 100 --premium 3.80 --price 105 --dte 30 --iv 0.30
//!
//! # Same strikes as a bull put credit spread
//! spread-signals ev --long 95 --short 100 --premium 1.20 --price 105 --dte 30 --iv 0.30 --credit
//!
//! # What-if price ladder
//! spread-signals scenarios --long 95 --short 100 --premium 3.80 --price 105 --dte 30 --iv 0.30
//!
//! # Exit advice for an open position
//! spread-signals exit --profit 55 --dte 12 --cushion 6 --config config/default.toml
//!
//! # Score a watchlist batch
//! spread-signals scan --input watchlist.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Deserialize;

use spread_signals::analytics::{default_scenarios, run_scenarios};
use spread_signals::{
    evaluate_spread, recommend_exit, scan_watchlist, EngineConfig, MarketContext, SpreadKind,
    SpreadParameters, WatchlistItem,
};

const SEPARATOR: &str = "============================================================";

#[derive(Parser)]
#[command(name = "spread-signals")]
#[command(about = "Vertical spread expected value, entry signals and exit advice")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Engine configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct SpreadArgs {
    /// Lower strike
    #[arg(long)]
    long: Decimal,

    /// Higher strike
    #[arg(long)]
    short: Decimal,

    /// Debit paid, or credit received with --credit
    #[arg(long)]
    premium: Decimal,

    /// Current underlying price
    #[arg(long)]
    price: Decimal,

    /// Calendar days to expiration
    #[arg(long)]
    dte: u32,

    /// Implied volatility as a decimal (0.30 = 30%)
    #[arg(long)]
    iv: f64,

    /// Treat as a bull put credit spread
    #[arg(long)]
    credit: bool,
}

impl SpreadArgs {
    fn to_params(&self, risk_free_rate: f64) -> SpreadParameters {
        SpreadParameters {
            kind: if self.credit { SpreadKind::Credit } else { SpreadKind::Debit },
            long_strike: self.long,
            short_strike: self.short,
            premium: self.premium,
            current_price: self.price,
            days_to_expiration: self.dte,
            implied_volatility: self.iv,
            risk_free_rate,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate expected value and sizing for one spread
    Ev {
        #[command(flatten)]
        spread: SpreadArgs,

        /// Account size for Kelly sizing (overrides config)
        #[arg(long)]
        account: Option<Decimal>,
    },

    /// Print the what-if price ladder for one spread
    Scenarios {
        #[command(flatten)]
        spread: SpreadArgs,
    },

    /// Recommend an exit action for an open spread
    Exit {
        /// Percent of max profit captured
        #[arg(long, allow_hyphen_values = true)]
        profit: f64,

        /// Days to expiration
        #[arg(long)]
        dte: i32,

        /// Cushion to the short strike, in percent
        #[arg(long, allow_hyphen_values = true)]
        cushion: f64,
    },

    /// Score a watchlist batch from a JSON file
    Scan {
        /// JSON file with optional "context" and an "items" array
        #[arg(short, long)]
        input: PathBuf,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Deserialize)]
struct ScanInput {
    #[serde(default)]
    context: Option<MarketContext>,
    items: Vec<WatchlistItem>,
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn cmd_ev(spread: &SpreadArgs, account: Option<Decimal>, config: &EngineConfig) -> Result<()> {
    let params = spread.to_params(config.risk_free_rate);
    let account_size = account.unwrap_or(config.account_size);
    let ev = evaluate_spread(&params, account_size).context("Invalid spread")?;

    println!("{}", SEPARATOR);
    println!(
        "{} {}/{} @ {} (underlying {}, {} DTE, IV {:.0}%)",
        params.kind.as_str(),
        params.long_strike,
        params.short_strike,
        params.premium,
        params.current_price,
        params.days_to_expiration,
        params.implied_volatility * 100.0
    );
    println!("{}", SEPARATOR);
    println!("  Max profit:        ${}", ev.max_profit);
    println!("  Max loss:          ${}", ev.max_loss);
    println!("  Breakeven:         {}", ev.breakeven_price);
    println!("  Cushion:           {:+.2}%", ev.cushion_pct);
    println!("  P(max profit):     {:.1}%", ev.prob_max_profit * 100.0);
    println!("  P(partial):        {:.1}%", ev.prob_partial * 100.0);
    println!("  P(max loss):       {:.1}%", ev.prob_max_loss * 100.0);
    println!("  P(profit):         {:.1}%", ev.probability_of_profit * 100.0);
    println!("  Expected value:    ${:.2} ({:+.1}%)", ev.expected_value, ev.expected_value_pct);
    println!("  Fair premium:      {:.4}", ev.fair_premium);
    println!("  Edge:              {:+.2}%", ev.edge_pct);
    println!("  Kelly:             {:.4} (half {:.4})", ev.kelly_fraction, ev.half_kelly);
    println!("  Contracts:         {} on ${}", ev.suggested_contracts, account_size);
    println!("  Quality:           {}", ev.quality);
    for reason in &ev.reasons {
        println!("    - {}", reason);
    }
    Ok(())
}

fn cmd_scenarios(spread: &SpreadArgs, config: &EngineConfig) -> Result<()> {
    let params = spread.to_params(config.risk_free_rate);
    params.validate().context("Invalid spread")?;

    println!("{:<14} {:>8} {:>10} {:>8} {:>10} {:>9}", "Scenario", "Move", "Price", "Value", "P&L", "P&L %");
    for result in run_scenarios(&params, &default_scenarios()) {
        println!(
            "{:<14} {:>+7.1}% {:>10.2} {:>8.2} {:>10.2} {:>+8.1}%",
            result.name,
            result.pct_move * 100.0,
            result.new_price,
            result.spread_value,
            result.pnl,
            result.pnl_pct
        );
    }
    Ok(())
}

fn cmd_exit(profit: f64, dte: i32, cushion: f64, config: &EngineConfig) -> Result<()> {
    let rec = recommend_exit(profit, dte, cushion, &config.exit);

    println!("Action:   {:?}", rec.action);
    println!("Urgency:  {:?}", rec.urgency);
    println!(
        "Status:   profit {:?}, DTE {:?}, pin risk {:?}",
        rec.profit_status, rec.dte_status, rec.pin_risk_status
    );
    for reason in &rec.reasons {
        println!("  - {}", reason);
    }
    Ok(())
}

fn cmd_scan(input: &Path, json: bool, config: &EngineConfig) -> Result<()> {
    let content = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let batch: ScanInput = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", input.display()))?;

    let report = scan_watchlist(&batch.items, batch.context.as_ref(), config);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", SEPARATOR);
    println!("Triggered signals");
    println!("{}", SEPARATOR);
    for signal in report.triggered() {
        let ev = signal
            .expected_value
            .as_ref()
            .map(|ev| format!(" | EV ${:.2}, {}", ev.expected_value, ev.quality))
            .unwrap_or_default();
        println!(
            "  [{}] {}: {}{}",
            signal.decision.priority.as_str(),
            signal.ticker,
            signal.decision.reason,
            ev
        );
    }

    let quiet: Vec<_> = report.signals.iter().filter(|s| !s.decision.trigger).collect();
    if !quiet.is_empty() {
        println!("\nNo entry");
        for signal in quiet {
            println!("  {}: {}", signal.ticker, signal.decision.reason);
        }
    }

    if !report.skipped.is_empty() {
        println!("\nSkipped");
        for skipped in &report.skipped {
            println!("  {}: {}", skipped.ticker, skipped.error);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("spread_signals=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Ev { spread, account } => cmd_ev(&spread, account, &config)?,
        Commands::Scenarios { spread } => cmd_scenarios(&spread, &config)?,
        Commands::Exit {
            profit,
            dte,
            cushion,
        } => cmd_exit(profit, dte, cushion, &config)?,
        Commands::Scan { input, json } => cmd_scan(&input, json, &config)?,
    }

    Ok(())
}
