// In crates/strategies/src/rsi.rs

use core_types::{PriceSeries, Signal};

use crate::indicators::{diff, wilder_average};
use crate::types::RsiSettings;
use crate::{Error, Result, Strategy};

/// RSI value used wherever the ratio of average gain to average loss is undefined.
pub const NEUTRAL_RSI: f64 = 50.0;

/// Long-only RSI mean reversion: long on bars where RSI is at or below `oversold`.
#[derive(Debug, Clone)]
pub struct RsiReversion {
    settings: RsiSettings,
}

impl RsiReversion {
    pub fn new(settings: RsiSettings) -> Result<Self> {
        if settings.period == 0 {
            return Err(Error::InvalidParameters(
                "RSI period must be at least 1".to_string(),
            ));
        }
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &RsiSettings {
        &self.settings
    }

    /// Wilder RSI of `closes`, with [`NEUTRAL_RSI`] where the average loss is zero or undefined.
    pub fn rsi(&self, closes: &[f64]) -> Vec<f64> {
        let deltas = diff(closes);
        let gains: Vec<f64> = deltas.iter().map(|d| clip(*d, |d| d.max(0.0))).collect();
        let losses: Vec<f64> = deltas.iter().map(|d| clip(*d, |d| -d.min(0.0))).collect();

        let avg_gain = wilder_average(&gains, self.settings.period).unwrap_or_default();
        let avg_loss = wilder_average(&losses, self.settings.period).unwrap_or_default();

        avg_gain
            .iter()
            .zip(&avg_loss)
            .map(|(gain, loss)| {
                if *loss == 0.0 {
                    return NEUTRAL_RSI;
                }
                let rsi = 100.0 - 100.0 / (1.0 + gain / loss);
                if rsi.is_nan() { NEUTRAL_RSI } else { rsi }
            })
            .collect()
    }
}

// Applies `f` while keeping NaN as NaN (f64::max/min would swallow it).
fn clip(value: f64, f: impl Fn(f64) -> f64) -> f64 {
    if value.is_nan() { value } else { f(value) }
}

impl Strategy for RsiReversion {
    fn name(&self) -> &'static str {
        "rsi"
    }

    fn generate(&self, series: &PriceSeries) -> Signal {
        let rsi = self.rsi(&series.closes());
        Signal::from_flags(rsi.iter().map(|r| *r <= self.settings.oversold))
    }
}
