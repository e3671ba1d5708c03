//! GridMarginAnalyzer - Main Entry Point
//!
//! Runs one margin analysis over the configured terminal and prints the
//! account info and the run report as sentinel-framed JSON on stdout.

use anyhow::{Context, Result};
use clap::Parser;
use rust_decimal::Decimal;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use grid_margin_analyzer::config::{load_config, AppConfig};
use grid_margin_analyzer::{
    frame_json, AnalysisError, AnalysisOrchestrator, Frame, RunParameters, SimulatedTerminal,
    TerminalSession, TradingTerminal,
};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error); overrides settings.log_level
    #[arg(long)]
    log_level: Option<String>,

    /// Starting lot size before any adjustment
    #[arg(long)]
    initial_lot: Option<Decimal>,

    /// Grid distance in points
    #[arg(long)]
    distance: Option<u32>,

    /// Number of grid trades
    #[arg(long)]
    trades_no: Option<u32>,

    /// Capital reference amount
    #[arg(long)]
    capital: Option<Decimal>,

    /// Lower edge of the margin/capital band
    #[arg(long)]
    min_ratio: Option<Decimal>,

    /// Upper edge of the margin/capital band
    #[arg(long)]
    max_ratio: Option<Decimal>,

    /// Only print account info and exit
    #[arg(long)]
    account_only: bool,
}

impl Args {
    /// Apply command-line overrides on top of configured parameters
    fn run_parameters(&self, configured: RunParameters) -> RunParameters {
        RunParameters {
            initial_lot: self.initial_lot.unwrap_or(configured.initial_lot),
            distance: self.distance.unwrap_or(configured.distance),
            trades_no: self.trades_no.unwrap_or(configured.trades_no),
            capital: self.capital.unwrap_or(configured.capital),
            min_ratio: self.min_ratio.unwrap_or(configured.min_ratio),
            max_ratio: self.max_ratio.unwrap_or(configured.max_ratio),
        }
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let config = load_config(Some(&args.config))
        .with_context(|| format!("loading configuration from {}", args.config))?;

    // Initialize logging
    let log_level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.settings.log_level.clone());
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting GridMarginAnalyzer");
    info!("Configuration file: {}", args.config);

    run(&args, config)
}

/// Print the account, then unless `--account-only` run the analysis
///
/// Run parameters are only validated when the analysis actually runs.
fn run(args: &Args, config: AppConfig) -> Result<()> {
    let session = TerminalSession::open(SimulatedTerminal::new(config.terminal))?;
    let account = session
        .account_info()
        .ok_or(AnalysisError::AccountUnavailable)?;
    println!("Account currency: {}", account.currency);
    println!("{}", frame_json(Frame::AccountInfo, &account)?);

    if args.account_only {
        return Ok(());
    }

    let params = args.run_parameters(config.run);
    params.validate()?;

    info!(
        "Parameters: initial_lot={}, distance={}, trades_no={}, capital={}, min_ratio={}, max_ratio={}",
        params.initial_lot,
        params.distance,
        params.trades_no,
        params.capital,
        params.min_ratio,
        params.max_ratio
    );

    let report = AnalysisOrchestrator::new(&*session, &*session, account.currency.as_str())
        .run(&params);
    println!("{}", frame_json(Frame::AnalysisResults, &report)?);

    info!("Analysis complete!");
    Ok(())
}
