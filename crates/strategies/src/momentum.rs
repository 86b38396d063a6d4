// In crates/strategies/src/momentum.rs

use core_types::{PriceSeries, Signal};

use crate::indicators::pct_change;
use crate::types::MomentumSettings;
use crate::{Error, Result, Strategy};

/// N-period momentum: long when the close has risen more than `threshold` over `lookback` bars.
#[derive(Debug, Clone)]
pub struct Momentum {
    settings: MomentumSettings,
}

impl Momentum {
    pub fn new(settings: MomentumSettings) -> Result<Self> {
        if settings.lookback == 0 {
            return Err(Error::InvalidParameters(
                "momentum lookback must be at least 1".to_string(),
            ));
        }
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &MomentumSettings {
        &self.settings
    }
}

impl Strategy for Momentum {
    fn name(&self) -> &'static str {
        "momentum"
    }

    fn generate(&self, series: &PriceSeries) -> Signal {
        let change = pct_change(&series.closes(), self.settings.lookback).unwrap_or_default();
        Signal::from_flags(change.iter().map(|m| *m > self.settings.threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::from_closes(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), closes)
    }

    #[test]
    fn lookback_rows_are_flat() {
        let strategy = Momentum::new(MomentumSettings {
            lookback: 2,
            threshold: 0.0,
        })
        .unwrap();
        let signal = strategy.generate(&series(&[100.0, 90.0, 101.0, 89.0, 89.0]));
        // changes: [-, -, +1%, -1.1%, -11.9%]
        assert_eq!(signal.values(), &[0, 0, 1, 0, 0]);
    }

    #[test]
    fn threshold_is_strict() {
        let strategy = Momentum::new(MomentumSettings {
            lookback: 1,
            threshold: 0.5,
        })
        .unwrap();
        let signal = strategy.generate(&series(&[2.0, 3.0, 6.0]));
        // changes: [-, 0.5, 1.0]
        assert_eq!(signal.values(), &[0, 0, 1]);
    }
}
