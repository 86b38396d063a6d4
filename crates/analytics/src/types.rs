// In crates/analytics/src/types.rs

use serde::{Deserialize, Serialize};

/// Return and drawdown figures shared by every equity-curve based backtest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct EquitySummary {
    pub final_equity: f64,
    /// Absolute P&L in currency.
    pub total_return: f64,
    pub total_return_pct: f64,
    /// Most negative peak-to-trough decline as a fraction (always <= 0).
    pub max_drawdown: f64,
}

/// The scalar performance record of a signal-driven backtest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub final_equity: f64,
    pub total_return: f64,
    pub total_return_pct: f64,
    pub max_drawdown: f64,
    pub annualized_vol: f64,
    pub approx_annual_return: f64,
    /// NaN when the net return series has zero volatility.
    pub sharpe: f64,
    pub n_trades: u32,
    pub total_commission_paid: f64,
    #[serde(rename = "VaR_95")]
    pub var_95: f64,
    #[serde(rename = "CVaR_95")]
    pub cvar_95: f64,
}
