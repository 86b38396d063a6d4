// In crates/backtester/src/lib.rs

pub mod types;

use analytics::{AnalyticsEngine, Metrics};
use core_types::{Error, PriceSeries, Result, Signal};
use tracing::{debug, info, warn};

pub use types::{BacktestRecord, BacktestResult, BacktestSettings};

/// Confidence level of the tail-risk figures attached to every run.
pub const TAIL_CONFIDENCE: f64 = 0.95;

/// The engine for running vectorised signal backtests.
///
/// Execution lags the signal by one full period: the position decided at the close of
/// day `t` is held over day `t + 1`, and its trade cost is charged on `t + 1`. Costs are
/// approximated against starting capital (traded notional = capital x |position change|)
/// and subtracted from that day's return.
#[derive(Debug, Clone, Copy, Default)]
pub struct Backtester {
    settings: BacktestSettings,
}

impl Backtester {
    pub fn new(settings: BacktestSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &BacktestSettings {
        &self.settings
    }

    /// Simulates `signal` over `series` and derives the run's metrics.
    ///
    /// Fails with a validation error, before any computation, when the series is empty,
    /// the signal does not line up with it one-to-one, or a close price is missing.
    pub fn run(&self, series: &PriceSeries, signal: &Signal) -> Result<(BacktestResult, Metrics)> {
        self.validate(series, signal)?;

        let capital = self.settings.capital;
        info!(
            rows = series.len(),
            capital,
            commission_per_trade = self.settings.commission_per_trade,
            commission_pct = self.settings.commission_pct,
            "Starting backtest."
        );

        let signals = signal.values();
        let mut records = Vec::with_capacity(series.len());
        let mut growth = 1.0;

        for (t, bar) in series.iter().enumerate() {
            let ret = if t == 0 {
                0.0
            } else {
                let prev_close = series.bars()[t - 1].close;
                (bar.close - prev_close) / prev_close
            };

            let executed_exposure = if t == 0 { 0.0 } else { f64::from(signals[t - 1]) };
            let strategy_return = ret * executed_exposure;

            // The change desired on day t-1 is the one executed on day t.
            let executed_change = if t < 2 {
                0.0
            } else {
                f64::from(signals[t - 1]) - f64::from(signals[t - 2])
            };
            let trade_size = executed_change.abs();
            let trade_flag = trade_size > 0.0;
            let trade_value = capital * trade_size;

            let trade_cost = if trade_flag { self.settings.commission_per_trade } else { 0.0 }
                + self.settings.commission_pct * trade_value;
            let cost_return = trade_cost / capital;
            let net_return = strategy_return - cost_return;

            growth *= 1.0 + net_return;

            records.push(BacktestRecord {
                date: bar.date,
                close: bar.close,
                signal: signals[t],
                ret,
                executed_exposure,
                strategy_return,
                trade_flag,
                trade_cost,
                net_return,
                equity: capital * growth,
            });
        }

        let result = BacktestResult { records };
        let metrics = self.metrics(&result);

        info!(
            final_equity = metrics.final_equity,
            total_return_pct = metrics.total_return_pct,
            max_drawdown = metrics.max_drawdown,
            n_trades = metrics.n_trades,
            "Backtest finished."
        );

        Ok((result, metrics))
    }

    fn metrics(&self, result: &BacktestResult) -> Metrics {
        let analytics = AnalyticsEngine::new(self.settings.periods_per_year);
        let equity = result.equity();
        let net_returns = result.net_returns();

        let summary = analytics.summarize(self.settings.capital, &equity);
        let annualized_vol = analytics.annualized_volatility(&net_returns);

        let sample: Vec<f64> = net_returns.iter().copied().filter(|r| !r.is_nan()).collect();
        let (var_95, cvar_95) = match risk::tail_risk(&sample, TAIL_CONFIDENCE) {
            Ok(tail) => (tail.value_at_risk, tail.conditional_value_at_risk),
            Err(e) => {
                warn!(error = %e, "Tail-risk estimation failed; reporting NaN.");
                (f64::NAN, f64::NAN)
            }
        };

        let n_trades = result.records.iter().filter(|r| r.trade_flag).count() as u32;
        let total_commission_paid = result.records.iter().map(|r| r.trade_cost).sum();
        debug!(n_trades, total_commission_paid, "Trade costs aggregated.");

        Metrics {
            final_equity: summary.final_equity,
            total_return: summary.total_return,
            total_return_pct: summary.total_return_pct,
            max_drawdown: summary.max_drawdown,
            annualized_vol,
            approx_annual_return: analytics
                .approx_annual_return(summary.total_return_pct, result.len()),
            sharpe: analytics.sharpe_ratio(&net_returns),
            n_trades,
            total_commission_paid,
            var_95,
            cvar_95,
        }
    }

    fn validate(&self, series: &PriceSeries, signal: &Signal) -> Result<()> {
        if series.is_empty() {
            return Err(Error::Validation("price series is empty".to_string()));
        }
        if signal.len() != series.len() {
            return Err(Error::Validation(format!(
                "signal has {} values but the price series has {} rows",
                signal.len(),
                series.len()
            )));
        }
        if let Some(bar) = series.iter().find(|b| !b.close.is_finite()) {
            return Err(Error::Validation(format!("missing close price on {}", bar.date)));
        }
        if !(self.settings.capital.is_finite() && self.settings.capital > 0.0) {
            return Err(Error::Validation(format!(
                "starting capital must be positive, got {}",
                self.settings.capital
            )));
        }
        if self.settings.periods_per_year == 0 {
            return Err(Error::Validation("periods_per_year must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Runs a single backtest with explicit capital and cost parameters.
pub fn run_backtest(
    series: &PriceSeries,
    signal: &Signal,
    capital: f64,
    commission_per_trade: f64,
    commission_pct: f64,
    periods_per_year: u32,
) -> Result<(BacktestResult, Metrics)> {
    Backtester::new(BacktestSettings {
        capital,
        commission_per_trade,
        commission_pct,
        periods_per_year,
    })
    .run(series, signal)
}
