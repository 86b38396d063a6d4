// In crates/strategies/src/ema_crossover.rs

use core_types::{PriceSeries, Signal};

use crate::indicators::ewm_span;
use crate::types::EmaCrossoverSettings;
use crate::{Error, Result, Strategy};

/// Long while the short EMA of close sits above the long EMA.
///
/// Both averages use the recursive form seeded with the first close, so they are defined
/// from the first row and start out equal (flat).
#[derive(Debug, Clone)]
pub struct EmaCrossover {
    settings: EmaCrossoverSettings,
}

impl EmaCrossover {
    pub fn new(settings: EmaCrossoverSettings) -> Result<Self> {
        if settings.short_window == 0 || settings.long_window == 0 {
            return Err(Error::InvalidParameters(format!(
                "EMA spans must be at least 1 (short={}, long={})",
                settings.short_window, settings.long_window
            )));
        }
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &EmaCrossoverSettings {
        &self.settings
    }
}

impl Strategy for EmaCrossover {
    fn name(&self) -> &'static str {
        "ema_crossover"
    }

    fn generate(&self, series: &PriceSeries) -> Signal {
        let closes = series.closes();
        let short = ewm_span(&closes, self.settings.short_window).unwrap_or_default();
        let long = ewm_span(&closes, self.settings.long_window).unwrap_or_default();

        Signal::from_flags(short.iter().zip(&long).map(|(s, l)| s > l))
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
    fn rising_prices_turn_long_after_first_row() {
        let strategy = EmaCrossover::new(EmaCrossoverSettings {
            short_window: 3,
            long_window: 7,
        })
        .unwrap();
        let signal = strategy.generate(&series(&[10.0, 11.0, 12.0, 13.0]));
        assert_eq!(signal.values(), &[0, 1, 1, 1]);
    }

    #[test]
    fn falling_prices_stay_flat() {
        let strategy = EmaCrossover::new(EmaCrossoverSettings::default()).unwrap();
        let signal = strategy.generate(&series(&[13.0, 12.0, 11.0, 10.0]));
        assert_eq!(signal.values(), &[0, 0, 0, 0]);
    }
}
