// In crates/backtester/src/types.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Capital and cost model of a backtest run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestSettings {
    pub capital: f64,
    /// Flat currency cost charged on every executed position change.
    pub commission_per_trade: f64,
    /// Proportional cost applied to the approximate traded notional.
    pub commission_pct: f64,
    pub periods_per_year: u32,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self {
            capital: 10_000.0,
            commission_per_trade: 0.0,
            commission_pct: 0.0,
            periods_per_year: 252,
        }
    }
}

/// One simulated trading day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestRecord {
    pub date: NaiveDate,
    pub close: f64,
    /// The desired position produced by the strategy for this day.
    pub signal: u8,
    /// Close-to-close return of the underlying.
    #[serde(rename = "return")]
    pub ret: f64,
    /// Position actually held over this day: the previous day's signal.
    pub executed_exposure: f64,
    /// Gross return before costs.
    pub strategy_return: f64,
    /// True when a position change is executed on this day.
    pub trade_flag: bool,
    /// Absolute currency cost of the executed change.
    pub trade_cost: f64,
    pub net_return: f64,
    pub equity: f64,
}

/// The per-day output of a backtest, in date order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub records: Vec<BacktestRecord>,
}

impl BacktestResult {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn net_returns(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.net_return).collect()
    }

    pub fn equity(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.equity).collect()
    }
}
