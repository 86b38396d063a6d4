// In crates/analytics/src/engine.rs

use crate::types::EquitySummary;

/// The engine responsible for deriving performance statistics from an equity curve
/// and its period returns.
#[derive(Debug, Clone, Copy)]
pub struct AnalyticsEngine {
    periods_per_year: u32,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new(252)
    }
}

impl AnalyticsEngine {
    pub fn new(periods_per_year: u32) -> Self {
        Self { periods_per_year }
    }

    pub fn periods_per_year(&self) -> u32 {
        self.periods_per_year
    }

    /// Final equity, absolute and relative return, and max drawdown of `equity`.
    pub fn summarize(&self, initial_capital: f64, equity: &[f64]) -> EquitySummary {
        let final_equity = equity.last().copied().unwrap_or(initial_capital);
        EquitySummary {
            final_equity,
            total_return: final_equity - initial_capital,
            total_return_pct: final_equity / initial_capital - 1.0,
            max_drawdown: max_drawdown(equity),
        }
    }

    /// Sample standard deviation of `returns` scaled by `sqrt(periods_per_year)`.
    pub fn annualized_volatility(&self, returns: &[f64]) -> f64 {
        sample_std(returns) * (self.periods_per_year as f64).sqrt()
    }

    /// Geometric annualisation of a total return observed over `periods` rows.
    pub fn approx_annual_return(&self, total_return_pct: f64, periods: usize) -> f64 {
        if periods == 0 {
            return 0.0;
        }
        (1.0 + total_return_pct).powf(self.periods_per_year as f64 / periods as f64) - 1.0
    }

    /// Annualised mean over annualised volatility, risk-free rate taken as zero.
    ///
    /// NaN when the volatility is zero or undefined.
    pub fn sharpe_ratio(&self, returns: &[f64]) -> f64 {
        let vol = self.annualized_volatility(returns);
        if vol > 0.0 {
            mean(returns) * self.periods_per_year as f64 / vol
        } else {
            f64::NAN
        }
    }
}

/// Percentage decline of each equity value from its running peak.
///
/// A zero peak yields a drawdown of 0 for that row.
pub fn drawdown_series(equity: &[f64]) -> Vec<f64> {
    let mut running_max = f64::NEG_INFINITY;
    equity
        .iter()
        .map(|value| {
            running_max = running_max.max(*value);
            if running_max == 0.0 {
                0.0
            } else {
                (value - running_max) / running_max
            }
        })
        .collect()
}

/// The most negative value of [`drawdown_series`], or 0 for a non-decreasing curve.
pub fn max_drawdown(equity: &[f64]) -> f64 {
    drawdown_series(equity).into_iter().fold(0.0, f64::min)
}

/// Arithmetic mean, skipping NaN values. NaN for an empty sample.
pub fn mean(values: &[f64]) -> f64 {
    let (sum, count) = finite_sum(values);
    if count == 0 {
        return f64::NAN;
    }
    sum / count as f64
}

/// Standard deviation with one delta degree of freedom, skipping NaN values.
///
/// NaN for fewer than two observations.
pub fn sample_std(values: &[f64]) -> f64 {
    let (sum, count) = finite_sum(values);
    if count < 2 {
        return f64::NAN;
    }
    let avg = sum / count as f64;
    let squares: f64 = values
        .iter()
        .filter(|v| !v.is_nan())
        .map(|v| (v - avg).powi(2))
        .sum();
    (squares / (count - 1) as f64).sqrt()
}

fn finite_sum(values: &[f64]) -> (f64, usize) {
    values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0), |(sum, count), v| (sum + v, count + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drawdown_tracks_running_peak() {
        let equity = [100.0, 110.0, 99.0, 120.0, 90.0];
        let dd = drawdown_series(&equity);
        assert_eq!(dd[0], 0.0);
        assert_eq!(dd[1], 0.0);
        assert!((dd[2] - (-0.1)).abs() < 1e-12);
        assert_eq!(dd[3], 0.0);
        assert!((dd[4] - (-0.25)).abs() < 1e-12);
        assert!((max_drawdown(&equity) - (-0.25)).abs() < 1e-12);
    }

    #[test]
    fn non_decreasing_curve_has_zero_drawdown() {
        assert_eq!(max_drawdown(&[100.0, 100.0, 101.0, 150.0]), 0.0);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn sample_std_uses_one_degree_of_freedom() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert!((sample_std(&values) - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!(sample_std(&[1.0]).is_nan());
        assert!((mean(&[1.0, f64::NAN, 3.0]) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn sharpe_is_nan_without_volatility() {
        let engine = AnalyticsEngine::default();
        assert!(engine.sharpe_ratio(&[0.0, 0.0, 0.0]).is_nan());
        assert_eq!(engine.annualized_volatility(&[0.01, 0.01]), 0.0);
    }

    #[test]
    fn summarize_reports_returns_relative_to_capital() {
        let engine = AnalyticsEngine::new(252);
        let summary = engine.summarize(1000.0, &[1000.0, 1100.0, 1050.0]);
        assert_eq!(summary.final_equity, 1050.0);
        assert_eq!(summary.total_return, 50.0);
        assert!((summary.total_return_pct - 0.05).abs() < 1e-12);
        assert!((summary.max_drawdown - (1050.0 / 1100.0 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn annualisation_is_geometric() {
        let engine = AnalyticsEngine::new(4);
        assert!((engine.approx_annual_return(0.1, 2) - 0.21).abs() < 1e-12);
        assert_eq!(engine.approx_annual_return(0.1, 0), 0.0);
    }
}
