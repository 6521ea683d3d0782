//! DCA Ladder Calculator
//!
//! Plans a dollar-cost-averaging buy ladder below a local high and derives
//! the weighted average entry, take-profit target and break-even trim.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use dca_ladder::export::{export_json, read_csv, write_csv};
use dca_ladder::ladder::{LadderCalculator, LadderResult, TrimPlan};
use dca_ladder::report::{format_amount, format_table, round, LadderReport, CURRENCY_DP};
use dca_ladder::LadderConfig;

/// DCA buy-ladder calculator CLI.
#[derive(Parser)]
#[command(name = "dca-ladder")]
#[command(about = "Plan DCA entries, weighted average and take-profit for a leveraged ETF", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the ladder and print the table and summary
    Calc {
        #[command(flatten)]
        ladder: LadderArgs,

        /// Print JSON instead of the text report
        #[arg(long)]
        json: bool,
    },

    /// Compute the ladder and write it as CSV
    Export {
        #[command(flatten)]
        ladder: LadderArgs,

        /// Output file (default: <symbol>_entry_points.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a previously exported CSV
    Inspect {
        /// CSV file to read
        path: PathBuf,
    },

    /// Show the effective configuration
    Config {
        #[command(flatten)]
        ladder: LadderArgs,
    },
}

/// Ladder parameters. Unset values fall back to the built-in defaults.
#[derive(Args, Debug, Clone)]
struct LadderArgs {
    /// Ticker symbol
    #[arg(long, env = "DCA_SYMBOL")]
    symbol: Option<String>,

    /// Local high price the ladder starts from
    #[arg(long, env = "DCA_LOCAL_HIGH")]
    local_high: Option<f64>,

    /// Total portfolio value
    #[arg(short, long, env = "DCA_PORTFOLIO")]
    portfolio: Option<f64>,

    /// Share of the portfolio for this ladder (0-100)
    #[arg(short, long, env = "DCA_ALLOCATED_PCT")]
    allocated_pct: Option<f64>,

    /// Pullback per rung in percent, comma-separated (relative to previous rung)
    #[arg(short, long, env = "DCA_DROPS", allow_hyphen_values = true)]
    drops: Option<String>,

    /// Allocation per rung in percent of the allocated value, comma-separated
    #[arg(short = 'w', long, env = "DCA_ALLOCATIONS")]
    allocations: Option<String>,

    /// Share of the portfolio to trim at break-even (0-100)
    #[arg(short, long, env = "DCA_TRIM_PCT")]
    trim_pct: Option<f64>,

    /// Take-profit as a multiple of the weighted average
    #[arg(long, env = "DCA_TAKE_PROFIT")]
    take_profit: Option<f64>,
}

impl LadderArgs {
    fn into_config(self) -> LadderConfig {
        let defaults = LadderConfig::default();
        LadderConfig {
            symbol: self.symbol.unwrap_or(defaults.symbol),
            local_high: self.local_high.unwrap_or(defaults.local_high),
            portfolio_total: self.portfolio.unwrap_or(defaults.portfolio_total),
            allocated_pct: self.allocated_pct.unwrap_or(defaults.allocated_pct),
            drops: self.drops.unwrap_or(defaults.drops),
            allocations: self.allocations.unwrap_or(defaults.allocations),
            trim_pct: self.trim_pct.unwrap_or(defaults.trim_pct),
            take_profit_multiplier: self.take_profit.unwrap_or(defaults.take_profit_multiplier),
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // RUST_LOG directives take precedence over --log-level
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(log_level).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Calc { ladder, json } => {
            let config = ladder.into_config();
            let result = run_ladder(&config)?;
            let trim = TrimPlan::new(config.portfolio_total, config.trim_pct, &result);

            if let Err(e) = result.require_average() {
                warn!(error = %e, "Take-profit and trim trigger are undefined");
            }

            if json {
                println!("{}", export_json(&config.symbol, &result, trim)?);
            } else {
                println!("{}", LadderReport::new(&config, result, trim));
            }
        }

        Commands::Export { ladder, output } => {
            let config = ladder.into_config();
            let result = run_ladder(&config)?;
            let path = output.unwrap_or_else(|| PathBuf::from(config.csv_file_name()));

            write_csv(&path, &result)?;
            info!(path = %path.display(), rungs = result.len(), "CSV exported");
            println!("Wrote {} rungs to {}", result.len(), path.display());
        }

        Commands::Inspect { path } => {
            let rows = read_csv(&path)?;
            println!("\n{} ({} rungs)\n", path.display(), rows.len());
            print!("{}", format_table(&rows));
        }

        Commands::Config { ladder } => {
            let config = ladder.into_config();
            print!("{}", describe_config(&config)?);
        }
    }

    Ok(())
}

/// Validate and parse the configuration, then render it for the `config` command.
fn describe_config(config: &LadderConfig) -> Result<String> {
    let input = config.strategy_input().context("Invalid configuration")?;

    let mut out = String::from("\n=== Ladder Configuration ===\n\n");
    out += &format!("Symbol:               {}\n", config.symbol);
    out += &format!("Local High:           {:.4}\n", config.local_high);
    out += &format!("Portfolio:            {}\n", format_amount(round(config.portfolio_total, CURRENCY_DP)));
    out += &format!("Allocated:            {:.2}%\n", config.allocated_pct);
    out += &format!("Allocated Value:      {}\n", format_amount(round(input.allocated_value, CURRENCY_DP)));
    out += &format!("Drops (%):            {}\n", config.drops);
    out += &format!("Allocations (%):      {}\n", config.allocations);
    out += &format!("Rungs:                {}\n", input.drops.len());
    out += &format!("Take-Profit Multiple: {}\n", config.take_profit_multiplier);
    out += &format!("Trim at Break-even:   {:.2}%\n", config.trim_pct);
    out += &format!("CSV File:             {}\n", config.csv_file_name());
    Ok(out)
}

/// Parse the configuration and compute the ladder.
fn run_ladder(config: &LadderConfig) -> Result<LadderResult> {
    let input = config.strategy_input().context("Invalid ladder input")?;

    info!(
        symbol = %config.symbol,
        local_high = input.local_high,
        allocated = input.allocated_value,
        rungs = input.drops.len(),
        "Computing ladder"
    );

    LadderCalculator::new(config.take_profit_multiplier)
        .compute(&input)
        .context("Ladder computation failed")
}
