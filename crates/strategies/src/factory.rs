// In crates/strategies/src/factory.rs

use anyhow::Result;
use core_types::{PriceSeries, Signal, StrategyConfig};

use crate::buy_and_hold::BuyAndHold;
use crate::ema_crossover::EmaCrossover;
use crate::momentum::Momentum;
use crate::rsi::RsiReversion;
use crate::sma_crossover::SmaCrossover;
use crate::types::{EmaCrossoverSettings, MomentumSettings, RsiSettings, SmaCrossoverSettings};
use crate::Strategy;

/// Every name accepted by [`create_strategy`].
pub const STRATEGY_NAMES: [&str; 5] = ["sma_crossover", "ema_crossover", "momentum", "rsi", "buy_and_hold"];

/// Instantiates the strategy named in `config`, deserializing its `params` table into
/// that strategy's settings. Absent parameters take their defaults.
pub fn create_strategy(config: &StrategyConfig) -> Result<Box<dyn Strategy + Send + Sync>> {
    let strategy: Box<dyn Strategy + Send + Sync> = match config.name.as_str() {
        "sma_crossover" => {
            let settings: SmaCrossoverSettings = config.params.clone().try_into()?;
            Box::new(SmaCrossover::new(settings)?)
        }
        "ema_crossover" => {
            let settings: EmaCrossoverSettings = config.params.clone().try_into()?;
            Box::new(EmaCrossover::new(settings)?)
        }
        "momentum" => {
            let settings: MomentumSettings = config.params.clone().try_into()?;
            Box::new(Momentum::new(settings)?)
        }
        "rsi" => {
            let settings: RsiSettings = config.params.clone().try_into()?;
            Box::new(RsiReversion::new(settings)?)
        }
        "buy_and_hold" => Box::new(BuyAndHold::new()),
        unknown => anyhow::bail!(
            "Attempted to create unknown strategy: {} (expected one of {:?})",
            unknown,
            STRATEGY_NAMES
        ),
    };
    Ok(strategy)
}

/// Generates the signal of the strategy described by `config` over `series`.
pub fn generate(config: &StrategyConfig, series: &PriceSeries) -> Result<Signal> {
    Ok(create_strategy(config)?.generate(series))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn params(src: &str) -> toml::Value {
        toml::Value::Table(src.parse::<toml::Table>().unwrap())
    }

    #[test]
    fn builds_every_registered_strategy_with_defaults() {
        for name in STRATEGY_NAMES {
            let strategy = create_strategy(&StrategyConfig::with_defaults(name)).unwrap();
            assert_eq!(strategy.name(), name);
        }
    }

    #[test]
    fn params_override_defaults() {
        let config = StrategyConfig::new("sma_crossover", params("short_window = 2\nlong_window = 3"));
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let series = PriceSeries::from_closes(start, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(generate(&config, &series).unwrap().values(), &[0, 0, 1, 1]);
    }

    #[test]
    fn rejects_unknown_names_and_bad_params() {
        assert!(create_strategy(&StrategyConfig::with_defaults("supertrend")).is_err());
        let zero = StrategyConfig::new("momentum", params("lookback = 0"));
        assert!(create_strategy(&zero).is_err());
        let wrong_type = StrategyConfig::new("rsi", params("period = \"fourteen\""));
        assert!(create_strategy(&wrong_type).is_err());
    }
}
