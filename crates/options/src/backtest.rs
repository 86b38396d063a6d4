// In crates/options/src/backtest.rs

//! Single-position option strategy backtests over a price history.
//!
//! Neither strategy models option time value: the covered call ignores the short call
//! until it settles at expiry, and the straddle is marked at intrinsic value every day.

use analytics::{AnalyticsEngine, EquitySummary};
use chrono::NaiveDate;
use core_types::{Error, PriceSeries, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One day of an option strategy's equity curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionEquityPoint {
    pub date: NaiveDate,
    pub close: f64,
    pub equity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_intrinsic: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put_intrinsic: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionStrategyMetrics {
    #[serde(flatten)]
    pub summary: EquitySummary,
    pub n_trades: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_premium_received: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_payoff_at_expiry: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_premium_paid: Option<f64>,
}

/// Long `shares` of the underlying with one short call per share, unrolled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoveredCall {
    pub strike: f64,
    /// Premium received per share.
    pub premium: f64,
    #[serde(default = "default_capital")]
    pub capital: f64,
    #[serde(default = "default_quantity")]
    pub shares: u32,
    /// Defaults to the first trading date; otherwise resolved to the nearest one.
    #[serde(default)]
    pub entry: Option<NaiveDate>,
    /// Defaults to the last trading date; otherwise resolved to the nearest one.
    #[serde(default)]
    pub expiry: Option<NaiveDate>,
}

/// `contracts` long calls plus `contracts` long puts at the same strike.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Straddle {
    pub strike: f64,
    #[serde(default)]
    pub premium_call: f64,
    #[serde(default)]
    pub premium_put: f64,
    #[serde(default = "default_capital")]
    pub capital: f64,
    #[serde(default = "default_quantity")]
    pub contracts: u32,
    #[serde(default)]
    pub entry: Option<NaiveDate>,
    #[serde(default)]
    pub expiry: Option<NaiveDate>,
}

fn default_capital() -> f64 {
    10_000.0
}

fn default_quantity() -> u32 {
    1
}

impl CoveredCall {
    pub fn new(strike: f64, premium: f64) -> Self {
        Self {
            strike,
            premium,
            capital: default_capital(),
            shares: default_quantity(),
            entry: None,
            expiry: None,
        }
    }

    pub fn backtest(&self, series: &PriceSeries) -> Result<(Vec<OptionEquityPoint>, OptionStrategyMetrics)> {
        validate(series, self.capital)?;
        let (entry_idx, expiry_idx) = resolve_window(series, self.entry, self.expiry);
        let bars = series.bars();
        let shares = f64::from(self.shares);

        let entry_price = bars[entry_idx].close;
        let cash = self.capital - shares * entry_price + shares * self.premium;
        let payoff = (bars[expiry_idx].close - self.strike).max(0.0) * shares;
        let settled_cash = cash - payoff;
        debug!(entry_price, cash, payoff, "Covered call positions opened and settled.");

        let curve: Vec<OptionEquityPoint> = bars
            .iter()
            .enumerate()
            .map(|(idx, bar)| {
                let balance = if idx >= expiry_idx { settled_cash } else { cash };
                OptionEquityPoint {
                    date: bar.date,
                    close: bar.close,
                    equity: shares * bar.close + balance,
                    call_intrinsic: None,
                    put_intrinsic: None,
                }
            })
            .collect();

        let metrics = OptionStrategyMetrics {
            summary: summarize(self.capital, &curve),
            n_trades: 1,
            total_premium_received: Some(shares * self.premium),
            option_payoff_at_expiry: Some(payoff),
            total_premium_paid: None,
        };
        info!(
            final_equity = metrics.summary.final_equity,
            max_drawdown = metrics.summary.max_drawdown,
            "Covered call backtest finished."
        );
        Ok((curve, metrics))
    }
}

impl Straddle {
    pub fn new(strike: f64, premium_call: f64, premium_put: f64) -> Self {
        Self {
            strike,
            premium_call,
            premium_put,
            capital: default_capital(),
            contracts: default_quantity(),
            entry: None,
            expiry: None,
        }
    }

    pub fn backtest(&self, series: &PriceSeries) -> Result<(Vec<OptionEquityPoint>, OptionStrategyMetrics)> {
        validate(series, self.capital)?;
        // Intrinsic marking applies to every date, whatever the window.
        let (entry_idx, expiry_idx) = resolve_window(series, self.entry, self.expiry);
        debug!(
            entry = %series.bars()[entry_idx].date,
            expiry = %series.bars()[expiry_idx].date,
            "Straddle window resolved."
        );
        let contracts = f64::from(self.contracts);

        let total_premium = contracts * (self.premium_call + self.premium_put);
        let cash = self.capital - total_premium;

        let curve: Vec<OptionEquityPoint> = series
            .iter()
            .map(|bar| {
                let call_intrinsic = (bar.close - self.strike).max(0.0);
                let put_intrinsic = (self.strike - bar.close).max(0.0);
                OptionEquityPoint {
                    date: bar.date,
                    close: bar.close,
                    equity: cash + contracts * (call_intrinsic + put_intrinsic),
                    call_intrinsic: Some(call_intrinsic),
                    put_intrinsic: Some(put_intrinsic),
                }
            })
            .collect();

        let metrics = OptionStrategyMetrics {
            summary: summarize(self.capital, &curve),
            n_trades: 1,
            total_premium_received: None,
            option_payoff_at_expiry: None,
            total_premium_paid: Some(total_premium),
        };
        info!(
            final_equity = metrics.summary.final_equity,
            total_premium,
            "Straddle backtest finished."
        );
        Ok((curve, metrics))
    }
}

/// Runs a covered call with explicit parameters.
pub fn backtest_covered_call(
    series: &PriceSeries,
    strike: f64,
    premium: f64,
    capital: f64,
    shares: u32,
    entry: Option<NaiveDate>,
    expiry: Option<NaiveDate>,
) -> Result<(Vec<OptionEquityPoint>, OptionStrategyMetrics)> {
    CoveredCall {
        strike,
        premium,
        capital,
        shares,
        entry,
        expiry,
    }
    .backtest(series)
}

/// Runs a long straddle with explicit parameters.
#[allow(clippy::too_many_arguments)]
pub fn backtest_straddle(
    series: &PriceSeries,
    strike: f64,
    premium_call: f64,
    premium_put: f64,
    capital: f64,
    contracts: u32,
    entry: Option<NaiveDate>,
    expiry: Option<NaiveDate>,
) -> Result<(Vec<OptionEquityPoint>, OptionStrategyMetrics)> {
    Straddle {
        strike,
        premium_call,
        premium_put,
        capital,
        contracts,
        entry,
        expiry,
    }
    .backtest(series)
}

fn validate(series: &PriceSeries, capital: f64) -> Result<()> {
    if series.is_empty() {
        return Err(Error::Validation("price series is empty".to_string()));
    }
    if let Some(bar) = series.iter().find(|b| !b.close.is_finite()) {
        return Err(Error::Validation(format!("missing close price on {}", bar.date)));
    }
    if !(capital.is_finite() && capital > 0.0) {
        return Err(Error::Validation(format!(
            "starting capital must be positive, got {capital}"
        )));
    }
    Ok(())
}

/// Row indices of the entry and expiry dates, snapped to the nearest trading date.
///
/// The two are independent: an expiry that resolves before the entry is kept as is.
/// The series must be non-empty.
fn resolve_window(series: &PriceSeries, entry: Option<NaiveDate>, expiry: Option<NaiveDate>) -> (usize, usize) {
    let last = series.len() - 1;
    let entry_idx = entry.and_then(|d| series.nearest_index(d)).unwrap_or(0);
    let expiry_idx = expiry.and_then(|d| series.nearest_index(d)).unwrap_or(last);
    (entry_idx, expiry_idx)
}

fn summarize(capital: f64, curve: &[OptionEquityPoint]) -> EquitySummary {
    let equity: Vec<f64> = curve.iter().map(|p| p.equity).collect();
    AnalyticsEngine::default().summarize(capital, &equity)
}
