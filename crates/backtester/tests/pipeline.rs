// In crates/backtester/tests/pipeline.rs

use backtester::{BacktestSettings, Backtester, run_backtest};
use chrono::NaiveDate;
use core_types::{PriceSeries, Signal, StrategyConfig};

fn trending_series() -> PriceSeries {
    let closes: Vec<f64> = (0..120)
        .map(|i| {
            let t = i as f64;
            100.0 + 0.3 * t + 6.0 * (t / 7.0).sin()
        })
        .collect();
    PriceSeries::from_closes(NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(), &closes)
}

#[test]
fn every_registered_strategy_backtests_cleanly() {
    let series = trending_series();
    let backtester = Backtester::new(BacktestSettings {
        commission_per_trade: 1.0,
        commission_pct: 0.0005,
        ..BacktestSettings::default()
    });

    for name in strategies::factory::STRATEGY_NAMES {
        let signal = strategies::generate(&StrategyConfig::with_defaults(name), &series).unwrap();
        let (result, metrics) = backtester.run(&series, &signal).unwrap();

        assert_eq!(result.len(), series.len(), "{name}");
        assert!(metrics.max_drawdown <= 0.0, "{name}");
        assert!(metrics.total_commission_paid >= 0.0, "{name}");

        let compounded = result
            .records
            .iter()
            .fold(10_000.0, |equity, r| equity * (1.0 + r.net_return));
        assert!((compounded - metrics.final_equity).abs() < 1e-9, "{name}");
    }
}

#[test]
fn buy_and_hold_never_pays_commission() {
    let series = trending_series();
    let signal = strategies::generate(&StrategyConfig::with_defaults("buy_and_hold"), &series).unwrap();
    let (result, metrics) = run_backtest(&series, &signal, 10_000.0, 10.0, 0.01, 252).unwrap();

    assert_eq!(metrics.n_trades, 0);
    assert_eq!(metrics.total_commission_paid, 0.0);
    let first = series.first().unwrap().close;
    let last = series.last().unwrap().close;
    assert!((result.records.last().unwrap().equity - 10_000.0 * last / first).abs() < 1e-6);
}

#[test]
fn costs_only_lower_equity() {
    let series = trending_series();
    let signal = strategies::generate(&StrategyConfig::with_defaults("momentum"), &series).unwrap();

    let (_, free) = run_backtest(&series, &signal, 10_000.0, 0.0, 0.0, 252).unwrap();
    let (_, costly) = run_backtest(&series, &signal, 10_000.0, 2.0, 0.001, 252).unwrap();

    assert_eq!(free.n_trades, costly.n_trades);
    if costly.n_trades > 0 {
        assert!(costly.final_equity < free.final_equity);
    }
}

#[test]
fn results_serialize_with_report_field_names() {
    let series = trending_series();
    let (result, metrics) = Backtester::default().run(&series, &Signal::long(series.len())).unwrap();

    let metrics_json = serde_json::to_value(metrics).unwrap();
    assert!(metrics_json.get("VaR_95").is_some());
    assert!(metrics_json.get("CVaR_95").is_some());

    let record_json = serde_json::to_value(result.records[1]).unwrap();
    assert!(record_json.get("return").is_some());
    assert_eq!(record_json["executed_exposure"], 1.0);
}
