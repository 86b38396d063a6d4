// In app/src/optimizer.rs

use std::fs;
use std::path::Path;

use analytics::Metrics;
use anyhow::{Context, Result};
use backtester::Backtester;
use core_types::{PriceSeries, StrategyConfig};
use itertools::Itertools;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use toml::Value;

// --- Structs for deserializing optimizer.toml ---

#[derive(Deserialize, Debug)]
pub struct OptimizerConfig {
    pub job: JobSettings,
    /// One entry per strategy parameter: a fixed value or a `{ start, end, step }` range.
    #[serde(default)]
    pub params: toml::Table,
}

#[derive(Deserialize, Debug)]
pub struct JobSettings {
    pub name: String,
    pub strategy: String,
    /// Runs with fewer executed trades are left out of the ranking.
    #[serde(default)]
    pub min_trades: u32,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)] // Allows serde to try parsing as one variant, then the next
enum ParamValue {
    IntRange { start: i64, end: i64, step: Option<i64> },
    FloatRange { start: f64, end: f64, step: Option<f64> },
    Fixed(Value),
}

impl ParamValue {
    /// Every value of the (inclusive) range, or the fixed value on its own.
    fn expand(&self) -> Result<Vec<Value>> {
        let values: Vec<Value> = match self {
            ParamValue::IntRange { start, end, step } => {
                let step = step.unwrap_or(1);
                anyhow::ensure!(step > 0, "range step must be positive, got {step}");
                (*start..=*end).step_by(step as usize).map(Value::Integer).collect()
            }
            ParamValue::FloatRange { start, end, step } => {
                let step = step.unwrap_or(1.0);
                anyhow::ensure!(step > 0.0, "range step must be positive, got {step}");
                if end < start {
                    Vec::new()
                } else {
                    // Tolerate accumulated rounding so the end point is kept.
                    let count = ((end - start) / step + 1e-9).floor() as usize;
                    (0..=count).map(|i| Value::Float(start + i as f64 * step)).collect()
                }
            }
            ParamValue::Fixed(value) => vec![value.clone()],
        };
        anyhow::ensure!(!values.is_empty(), "range produces no values");
        Ok(values)
    }
}

/// The outcome of one parameter set.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationResult {
    pub task_id: usize,
    pub params: Value,
    pub metrics: Metrics,
}

// --- Public API for the Optimizer Module ---

pub fn load_optimizer_config(path: impl AsRef<Path>) -> Result<OptimizerConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Expands the job's parameter table into one strategy config per combination.
pub fn generate_parameter_sets(config: &OptimizerConfig) -> Result<Vec<StrategyConfig>> {
    // Fail early on an unknown strategy rather than once per task.
    strategies::create_strategy(&StrategyConfig::with_defaults(&config.job.strategy))?;

    let keys: Vec<&String> = config.params.keys().collect();
    let axes = config
        .params
        .iter()
        .map(|(key, value)| {
            let param: ParamValue = value
                .clone()
                .try_into()
                .with_context(|| format!("Invalid optimizer parameter '{key}'"))?;
            param.expand().with_context(|| format!("Invalid optimizer parameter '{key}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    if axes.is_empty() {
        return Ok(vec![StrategyConfig::with_defaults(&config.job.strategy)]);
    }

    let sets = axes
        .into_iter()
        .multi_cartesian_product()
        .map(|combination| {
            let table: toml::Table = keys
                .iter()
                .map(|key| key.to_string())
                .zip(combination)
                .collect();
            StrategyConfig::new(config.job.strategy.clone(), Value::Table(table))
        })
        .collect();
    Ok(sets)
}

/// The main parallel engine for running an optimization job.
///
/// Each parameter set is an independent task; a task that fails is logged and skipped.
/// Results come back in task order.
pub fn run_optimization(
    series: &PriceSeries,
    backtester: &Backtester,
    param_sets: &[StrategyConfig],
    worker_threads: usize,
) -> Result<Vec<OptimizationResult>> {
    tracing::info!(cores = worker_threads, tasks = param_sets.len(), "Configuring Rayon thread pool.");
    let pool = ThreadPoolBuilder::new()
        .num_threads(worker_threads)
        .build()
        .context("Failed to build Rayon thread pool")?;

    let results = pool.install(|| {
        param_sets
            .par_iter()
            .enumerate()
            .filter_map(|(task_id, config)| match run_single_backtest(series, backtester, config) {
                Ok(metrics) => Some(OptimizationResult {
                    task_id,
                    params: config.params.clone(),
                    metrics,
                }),
                Err(e) => {
                    tracing::error!(task_id, error = %e, "A single backtest run failed.");
                    None
                }
            })
            .collect()
    });
    Ok(results)
}

fn run_single_backtest(series: &PriceSeries, backtester: &Backtester, config: &StrategyConfig) -> Result<Metrics> {
    let signal = strategies::generate(config, series)?;
    let (_, metrics) = backtester.run(series, &signal)?;
    Ok(metrics)
}
