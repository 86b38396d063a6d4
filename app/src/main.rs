// In app/src/main.rs

use std::fs;
use std::path::{Path, PathBuf};

use analytics::Metrics;
use anyhow::{Context, Result};
use app_config::Settings;
use backtester::{BacktestRecord, BacktestSettings, Backtester};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use core_types::{OptionType, PriceSeries, StrategyConfig};
use options::{ChainContext, CoveredCall, OptionChainRow, OptionParams, Straddle};
use rayon::prelude::*;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;

mod analyzer;
mod optimizer;
mod tracing_layer;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "Signal backtesting, tail risk and option analytics.")]
struct Cli {
    /// Directory holding base.toml and the per-environment overlays.
    #[arg(long, global = true, default_value = "config")]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Backtests one strategy, or every configured strategy, over a price file.
    Backtest {
        /// JSON array of daily bars ({date, open, high, low, close, volume}).
        #[arg(short, long)]
        prices: PathBuf,

        /// Strategy to run; every strategy in the configuration runs when omitted.
        #[arg(short, long)]
        strategy: Option<String>,

        /// Strategy parameters as inline TOML, e.g. "short_window = 10".
        #[arg(long, requires = "strategy")]
        params: Option<String>,

        #[arg(long)]
        capital: Option<f64>,

        #[arg(long)]
        commission_per_trade: Option<f64>,

        #[arg(long)]
        commission_pct: Option<f64>,

        /// Include the per-day records in the output.
        #[arg(long)]
        records: bool,
    },

    /// Runs a parameter grid search and ranks the runs by Sharpe ratio.
    Optimize {
        #[arg(short, long)]
        prices: PathBuf,

        /// Optimizer job file; defaults to optimizer.toml in the config directory.
        #[arg(long)]
        job: Option<PathBuf>,

        /// Number of ranked runs to print.
        #[arg(long, default_value_t = 10)]
        top: usize,
    },

    /// Prices an option and reports its Greeks.
    Greeks {
        #[command(flatten)]
        option: OptionArgs,

        #[arg(long)]
        volatility: f64,

        /// Comma-separated spot prices for a price/delta/gamma sweep.
        #[arg(long, value_delimiter = ',')]
        sweep: Vec<f64>,
    },

    /// Solves for the volatility implied by an option price.
    ImpliedVol {
        #[command(flatten)]
        option: OptionArgs,

        /// Observed option price.
        #[arg(long)]
        price: f64,
    },

    /// Backtests a covered call over a price file.
    CoveredCall {
        #[arg(short, long)]
        prices: PathBuf,

        #[arg(long)]
        strike: f64,

        /// Premium received per share.
        #[arg(long)]
        premium: f64,

        #[arg(long)]
        capital: Option<f64>,

        #[arg(long, default_value_t = 1)]
        shares: u32,

        #[arg(long)]
        entry: Option<NaiveDate>,

        #[arg(long)]
        expiry: Option<NaiveDate>,
    },

    /// Backtests a long straddle over a price file.
    Straddle {
        #[arg(short, long)]
        prices: PathBuf,

        #[arg(long)]
        strike: f64,

        #[arg(long, default_value_t = 0.0)]
        premium_call: f64,

        #[arg(long, default_value_t = 0.0)]
        premium_put: f64,

        #[arg(long)]
        capital: Option<f64>,

        #[arg(long, default_value_t = 1)]
        contracts: u32,

        #[arg(long)]
        entry: Option<NaiveDate>,

        #[arg(long)]
        expiry: Option<NaiveDate>,
    },

    /// Adds implied volatility and Greeks to every row of an option chain.
    Chain {
        /// JSON array of rows ({strike, last_price, bid, ask, volume, open_interest}).
        #[arg(short, long)]
        chain: PathBuf,

        #[arg(long)]
        spot: f64,

        /// Calendar days until the chain's expiry.
        #[arg(long)]
        days: f64,

        #[arg(long)]
        rate: Option<f64>,

        #[arg(long, default_value = "call")]
        kind: OptionType,
    },
}

/// Contract terms shared by the single-option commands.
#[derive(clap::Args, Debug)]
struct OptionArgs {
    #[arg(long)]
    spot: f64,

    #[arg(long)]
    strike: f64,

    /// Calendar days until expiry.
    #[arg(long)]
    days: f64,

    /// Annual risk-free rate; defaults to the configured rate.
    #[arg(long)]
    rate: Option<f64>,

    #[arg(long, default_value = "call")]
    kind: OptionType,
}

impl OptionArgs {
    fn params(&self, settings: &Settings, volatility: f64) -> OptionParams {
        OptionParams::new(
            self.spot,
            self.strike,
            self.days / 365.0,
            self.rate.unwrap_or(settings.options.risk_free_rate),
            volatility,
        )
    }
}

#[derive(Serialize)]
struct BacktestReport<'a> {
    strategy: &'a str,
    params: &'a toml::Value,
    metrics: Metrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    records: Option<Vec<BacktestRecord>>,
}

// --- Main Application Entry Point ---

fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    // Parse command-line arguments.
    let cli = Cli::parse();

    let settings = app_config::load_settings_from(&cli.config_dir)?;
    tracing_layer::init(&settings.app.log_level)?;
    rayon::ThreadPoolBuilder::new()
        .num_threads(settings.app.worker_threads)
        .build_global()
        .context("Failed to build Rayon thread pool")?;

    tracing::info!(environment = %settings.app.environment, "Starting atlas-quant");

    // Match on the parsed command and call the appropriate handler.
    match cli.command {
        Commands::Backtest {
            prices,
            strategy,
            params,
            capital,
            commission_per_trade,
            commission_pct,
            records,
        } => {
            let backtest = BacktestSettings {
                capital: capital.unwrap_or(settings.backtest.capital),
                commission_per_trade: commission_per_trade.unwrap_or(settings.backtest.commission_per_trade),
                commission_pct: commission_pct.unwrap_or(settings.backtest.commission_pct),
                periods_per_year: settings.backtest.periods_per_year,
            };
            handle_backtest(&settings, &prices, strategy, params, backtest, records)?;
        }
        Commands::Optimize { prices, job, top } => {
            let job = job.unwrap_or_else(|| cli.config_dir.join("optimizer.toml"));
            handle_optimize(&settings, &prices, &job, top)?;
        }
        Commands::Greeks {
            option,
            volatility,
            sweep,
        } => {
            let params = option.params(&settings, volatility);
            let mut report = json!({
                "kind": option.kind,
                "params": params,
                "greeks": params.greeks(option.kind),
            });
            if !sweep.is_empty() {
                report["sensitivity"] = json!(params.sensitivity(option.kind, &sweep));
            }
            print_json(&report)?;
        }
        Commands::ImpliedVol { option, price } => {
            let params = option.params(&settings, settings.options.fallback_volatility);
            let implied = options::implied_volatility(price, &params, option.kind);
            if implied.is_nan() {
                tracing::warn!(price, "No volatility in the search bracket reproduces this price.");
            }
            print_json(&json!({
                "kind": option.kind,
                "market_price": price,
                "implied_volatility": implied,
            }))?;
        }
        Commands::CoveredCall {
            prices,
            strike,
            premium,
            capital,
            shares,
            entry,
            expiry,
        } => {
            let series: PriceSeries = read_json(&prices)?;
            let strategy = CoveredCall {
                strike,
                premium,
                capital: capital.unwrap_or(settings.backtest.capital),
                shares,
                entry,
                expiry,
            };
            let (curve, metrics) = strategy.backtest(&series)?;
            print_json(&json!({ "metrics": metrics, "equity_curve": curve }))?;
        }
        Commands::Straddle {
            prices,
            strike,
            premium_call,
            premium_put,
            capital,
            contracts,
            entry,
            expiry,
        } => {
            let series: PriceSeries = read_json(&prices)?;
            let strategy = Straddle {
                strike,
                premium_call,
                premium_put,
                capital: capital.unwrap_or(settings.backtest.capital),
                contracts,
                entry,
                expiry,
            };
            let (curve, metrics) = strategy.backtest(&series)?;
            print_json(&json!({ "metrics": metrics, "equity_curve": curve }))?;
        }
        Commands::Chain {
            chain,
            spot,
            days,
            rate,
            kind,
        } => {
            let rows: Vec<OptionChainRow> = read_json(&chain)?;
            let context = ChainContext {
                spot,
                time_to_expiry: days / 365.0,
                rate: rate.unwrap_or(settings.options.risk_free_rate),
                kind,
                fallback_volatility: settings.options.fallback_volatility,
            };
            print_json(&options::analyze_chain(&rows, &context))?;
        }
    }

    tracing::info!("atlas-quant has finished successfully.");

    Ok(())
}

// --- "Backtest" Subcommand Logic ---

fn handle_backtest(
    settings: &Settings,
    prices: &Path,
    strategy: Option<String>,
    params: Option<String>,
    backtest: BacktestSettings,
    include_records: bool,
) -> Result<()> {
    let series: PriceSeries = read_json(prices)?;
    tracing::info!(rows = series.len(), path = %prices.display(), "Price series loaded.");

    let configs = match strategy {
        Some(name) => {
            let params = match params {
                Some(src) => toml::Value::Table(
                    src.parse::<toml::Table>()
                        .context("Failed to parse --params as TOML")?,
                ),
                None => toml::Value::Table(toml::Table::new()),
            };
            vec![StrategyConfig::new(name, params)]
        }
        None => settings.strategies.clone(),
    };
    if configs.is_empty() {
        anyhow::bail!("Cannot run: no strategy requested and none are configured in settings.");
    }

    let backtester = Backtester::new(backtest);
    // Strategies are independent of each other.
    let reports = configs
        .par_iter()
        .map(|config| -> Result<BacktestReport> {
            let signal = strategies::generate(config, &series)
                .with_context(|| format!("Failed to build strategy '{}'", config.name))?;
            let (result, metrics) = backtester.run(&series, &signal)?;
            Ok(BacktestReport {
                strategy: &config.name,
                params: &config.params,
                metrics,
                records: include_records.then_some(result.records),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    print_json(&reports)
}

// --- "Optimize" Subcommand Logic ---

fn handle_optimize(settings: &Settings, prices: &Path, job: &Path, top: usize) -> Result<()> {
    let series: PriceSeries = read_json(prices)?;
    let optimizer_config = optimizer::load_optimizer_config(job)?;
    let param_sets = optimizer::generate_parameter_sets(&optimizer_config)?;
    tracing::info!(
        job = %optimizer_config.job.name,
        strategy = %optimizer_config.job.strategy,
        tasks = param_sets.len(),
        "Generated parameter sets."
    );

    let backtester = Backtester::new(settings.backtest);
    let results = optimizer::run_optimization(&series, &backtester, &param_sets, settings.app.worker_threads)?;
    let mut ranked = analyzer::rank_results(results, optimizer_config.job.min_trades);
    ranked.truncate(top);

    print_json(&json!({
        "job": optimizer_config.job.name,
        "strategy": optimizer_config.job.strategy,
        "tasks": param_sets.len(),
        "ranked": ranked,
    }))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
