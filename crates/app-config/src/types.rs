// In crates/app-config/src/types.rs

use serde::Deserialize;

use backtester::BacktestSettings;
use core_types::StrategyConfig;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Settings {
    /// The application's general settings.
    #[serde(default)]
    pub app: AppSettings,
    /// Capital and cost model used by every signal backtest unless overridden on the command line.
    #[serde(default)]
    pub backtest: BacktestSettings,
    #[serde(default)]
    pub options: OptionDefaults,
    /// Strategies run by `backtest` when no single strategy is requested.
    #[serde(default)]
    pub strategies: Vec<StrategyConfig>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    pub log_level: String,
    /// Size of the worker pool used by the optimizer and chain analysis.
    pub worker_threads: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_level: "info".to_string(),
            worker_threads: 4,
        }
    }
}

/// Market assumptions for option pricing.
#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(default)]
pub struct OptionDefaults {
    pub risk_free_rate: f64,
    /// Volatility used for the Greeks of chain rows whose implied volatility is undefined.
    pub fallback_volatility: f64,
}

impl Default for OptionDefaults {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.05,
            fallback_volatility: 0.2,
        }
    }
}
