// In crates/strategies/src/buy_and_hold.rs

use core_types::{PriceSeries, Signal};

use crate::Strategy;

/// Long on every bar that carries a close price.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuyAndHold;

impl BuyAndHold {
    pub fn new() -> Self {
        Self
    }
}

impl Strategy for BuyAndHold {
    fn name(&self) -> &'static str {
        "buy_and_hold"
    }

    fn generate(&self, series: &PriceSeries) -> Signal {
        Signal::from_flags(series.iter().map(|bar| !bar.close.is_nan()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn long_wherever_close_exists() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let series = PriceSeries::from_closes(start, &[1.0, f64::NAN, 3.0]);
        assert_eq!(BuyAndHold.generate(&series).values(), &[1, 0, 1]);
    }
}
