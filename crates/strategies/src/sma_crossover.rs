// In crates/strategies/src/sma_crossover.rs

use core_types::{PriceSeries, Signal};

use crate::indicators::rolling_mean;
use crate::types::SmaCrossoverSettings;
use crate::{Error, Result, Strategy};

/// Long while the short simple moving average of close sits above the long one.
#[derive(Debug, Clone)]
pub struct SmaCrossover {
    settings: SmaCrossoverSettings,
}

impl SmaCrossover {
    /// Creates a new `SmaCrossover` strategy instance from its settings.
    pub fn new(settings: SmaCrossoverSettings) -> Result<Self> {
        if settings.short_window == 0 || settings.long_window == 0 {
            return Err(Error::InvalidParameters(format!(
                "SMA windows must be at least 1 (short={}, long={})",
                settings.short_window, settings.long_window
            )));
        }
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &SmaCrossoverSettings {
        &self.settings
    }
}

impl Strategy for SmaCrossover {
    fn name(&self) -> &'static str {
        "sma_crossover"
    }

    fn generate(&self, series: &PriceSeries) -> Signal {
        let closes = series.closes();
        // Windows were validated in `new`, so the indicator cannot fail here.
        let short = rolling_mean(&closes, self.settings.short_window).unwrap_or_default();
        let long = rolling_mean(&closes, self.settings.long_window).unwrap_or_default();

        // NaN comparisons are false, so warm-up rows come out flat.
        Signal::from_flags(short.iter().zip(&long).map(|(s, l)| s > l))
    }
}
