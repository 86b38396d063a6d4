// In app/src/analyzer.rs

use std::cmp::Ordering;

use serde::Serialize;

use crate::optimizer::OptimizationResult;

#[derive(Debug, Serialize)]
pub struct RankedReport {
    pub rank: usize,
    #[serde(flatten)]
    pub result: OptimizationResult,
}

/// Ranks optimization results by Sharpe ratio, best first.
///
/// Runs with fewer than `min_trades` trades are dropped. Runs with an undefined Sharpe
/// ratio sort after every defined one; ties keep task order.
pub fn rank_results(results: Vec<OptimizationResult>, min_trades: u32) -> Vec<RankedReport> {
    let total_reports = results.len();

    let mut passing: Vec<OptimizationResult> = results
        .into_iter()
        .filter(|r| r.metrics.n_trades >= min_trades)
        .collect();

    tracing::info!(
        total_reports,
        passing_reports = passing.len(),
        "Finished scoring reports."
    );

    passing.sort_by(|a, b| by_sharpe_desc(a.metrics.sharpe, b.metrics.sharpe));

    passing
        .into_iter()
        .enumerate()
        .map(|(idx, result)| RankedReport { rank: idx + 1, result })
        .collect()
}

fn by_sharpe_desc(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => b.total_cmp(&a),
        (a_nan, b_nan) => a_nan.cmp(&b_nan),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::Metrics;

    fn result(task_id: usize, sharpe: f64, n_trades: u32) -> OptimizationResult {
        OptimizationResult {
            task_id,
            params: toml::Value::Table(toml::Table::new()),
            metrics: Metrics {
                final_equity: 10_000.0,
                total_return: 0.0,
                total_return_pct: 0.0,
                max_drawdown: 0.0,
                annualized_vol: 0.1,
                approx_annual_return: 0.0,
                sharpe,
                n_trades,
                total_commission_paid: 0.0,
                var_95: 0.0,
                cvar_95: 0.0,
            },
        }
    }

    #[test]
    fn sorts_best_sharpe_first_with_nan_last() {
        let ranked = rank_results(
            vec![
                result(0, 0.5, 4),
                result(1, f64::NAN, 4),
                result(2, 1.5, 4),
                result(3, -0.2, 4),
                result(4, 0.5, 4),
            ],
            0,
        );
        let order: Vec<usize> = ranked.iter().map(|r| r.result.task_id).collect();
        assert_eq!(order, vec![2, 0, 4, 3, 1]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[4].rank, 5);
    }

    #[test]
    fn drops_runs_below_the_trade_threshold() {
        let ranked = rank_results(vec![result(0, 2.0, 1), result(1, 1.0, 6)], 2);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].result.task_id, 1);
    }
}
