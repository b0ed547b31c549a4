//! Fairvalue CLI - Command line interface for the valuation engine.
//!
//! Every command prints a JSON `ApiResponse` envelope on stdout.

use clap::{Parser, Subcommand};
use fairvalue_core::{
    calculate_buy_zone, calculate_metrics, calculate_portfolio_metrics, calculate_sell_zone,
    config, constants::DEFAULT_BASE_CURRENCY, detect_alerts, value_positions, Alert, ApiResponse,
    Position, RateProvider, RateTable, Result,
};
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fairvalue")]
#[command(about = "Expected value, Kelly sizing and buy/sell zones for a stock portfolio")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate metrics for every position in a JSON file
    Metrics {
        /// JSON file containing an array of positions
        #[arg(short, long)]
        file: PathBuf,
        /// Raise alerts when EV moves by more than this many percentage points
        /// from the expected_value stored in the file
        #[arg(short, long)]
        alert_threshold: Option<f64>,
    },
    /// Calculate metrics and aggregate them into portfolio statistics
    Portfolio {
        /// JSON file containing an array of positions
        #[arg(short, long)]
        file: PathBuf,
        /// Exchange rates file (defaults to ~/.fairvalue/rates.json)
        #[arg(short, long)]
        rates: Option<PathBuf>,
        /// Base currency the rates are quoted against
        #[arg(short, long, default_value = DEFAULT_BASE_CURRENCY)]
        base: String,
    },
    /// Buy zone for explicit inputs
    BuyZone {
        #[command(flatten)]
        args: ZoneArgs,
    },
    /// Sell zone for explicit inputs
    SellZone {
        #[command(flatten)]
        args: ZoneArgs,
    },
}

#[derive(clap::Args)]
struct ZoneArgs {
    /// Stock symbol
    #[arg(short, long)]
    ticker: String,
    /// Fair value estimate
    #[arg(short, long, allow_hyphen_values = true)]
    fair_value: f64,
    /// Probability of the upside scenario (0 to 1)
    #[arg(short, long, default_value = "0.65", allow_hyphen_values = true)]
    probability: f64,
    /// Downside scenario in percent (negative)
    #[arg(short, long, allow_hyphen_values = true)]
    downside: f64,
    /// Current market price
    #[arg(short = 'c', long, default_value = "0", allow_hyphen_values = true)]
    price: f64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let output = match cli.command {
        Commands::Metrics {
            file,
            alert_threshold,
        } => render(handle_metrics(&file, alert_threshold)),
        Commands::Portfolio { file, rates, base } => render(handle_portfolio(&file, rates, &base)),
        Commands::BuyZone { args } => render(calculate_buy_zone(
            &args.ticker,
            args.fair_value,
            args.probability,
            args.downside,
            args.price,
        )),
        Commands::SellZone { args } => render(calculate_sell_zone(
            &args.ticker,
            args.fair_value,
            args.probability,
            args.downside,
            args.price,
        )),
    };

    println!("{}", output);
}

fn render<T: Serialize>(result: Result<T>) -> String {
    let rendered = match result {
        Ok(data) => serde_json::to_string_pretty(&ApiResponse::ok(data)),
        Err(e) => {
            tracing::error!("{}", e);
            serde_json::to_string_pretty(&ApiResponse::<()>::err(e.to_string()))
        }
    };
    rendered.unwrap_or_else(|e| fallback_envelope(&e.to_string()))
}

fn fallback_envelope(error: &str) -> String {
    json!({ "ok": false, "error": error }).to_string()
}

fn read_positions(path: &Path) -> Result<Vec<Position>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn load_positions(path: &Path) -> Result<Vec<Position>> {
    let mut positions = read_positions(path)?;
    positions.iter_mut().for_each(calculate_metrics);
    Ok(positions)
}

/// Recalculate every position, raising alerts against the EV it arrived with.
fn recalculate_with_alerts(positions: &mut [Position], threshold_ev: f64) -> Vec<Alert> {
    positions
        .iter_mut()
        .flat_map(|position| {
            let previous_ev = position.expected_value;
            calculate_metrics(position);
            detect_alerts(previous_ev, position, threshold_ev)
        })
        .collect()
}

fn handle_metrics(file: &Path, alert_threshold: Option<f64>) -> Result<serde_json::Value> {
    match alert_threshold {
        Some(threshold) => {
            let mut positions = read_positions(file)?;
            let alerts = recalculate_with_alerts(&mut positions, threshold);
            Ok(json!({ "positions": positions, "alerts": alerts }))
        }
        None => {
            let positions = load_positions(file)?;
            Ok(json!({ "positions": positions }))
        }
    }
}

fn handle_portfolio(file: &Path, rates: Option<PathBuf>, base: &str) -> Result<serde_json::Value> {
    let positions = load_positions(file)?;
    let rates_path = rates.unwrap_or_else(config::default_rates_path);
    let table = RateTable::load(base, &rates_path)?;
    let fx_rates = table.rates_map();

    let summary = calculate_portfolio_metrics(&positions, &fx_rates);
    let valuations = value_positions(&positions, &fx_rates, &summary);

    Ok(json!({
        "base_currency": table.base_currency(),
        "summary": summary,
        "valuations": valuations,
        "positions": positions,
    }))
}
