// In crates/strategies/src/types.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SmaCrossoverSettings {
    pub short_window: usize,
    pub long_window: usize,
}

impl Default for SmaCrossoverSettings {
    fn default() -> Self {
        Self {
            short_window: 20,
            long_window: 50,
        }
    }
}

/// Windows are EMA spans: the smoothing factor is `2 / (span + 1)`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EmaCrossoverSettings {
    pub short_window: usize,
    pub long_window: usize,
}

impl Default for EmaCrossoverSettings {
    fn default() -> Self {
        Self {
            short_window: 12,
            long_window: 26,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MomentumSettings {
    pub lookback: usize,
    pub threshold: f64,
}

impl Default for MomentumSettings {
    fn default() -> Self {
        Self {
            lookback: 20,
            threshold: 0.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RsiSettings {
    pub period: usize,
    pub oversold: f64,
    // Carried for reporting; exits come from the backtest's exposure, not the signal.
    pub overbought: f64,
}

impl Default for RsiSettings {
    fn default() -> Self {
        Self {
            period: 14,
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}
