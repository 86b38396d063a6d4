// In crates/strategies/src/indicators.rs

//! Column-wise indicator helpers. Each takes a slice of closes and returns a new vector
//! of the same length, with `NAN` marking rows where the indicator is undefined.

use ta::Next;

use crate::{Error, Result};

/// Simple moving average over a full `window`; the first `window - 1` rows are NaN.
///
/// Any NaN inside a window makes that row NaN.
pub fn rolling_mean(values: &[f64], window: usize) -> Result<Vec<f64>> {
    check_period("window", window)?;
    let mut out = vec![f64::NAN; values.len()];
    for (end, slot) in out.iter_mut().enumerate().skip(window - 1) {
        let sum: f64 = values[end + 1 - window..=end].iter().sum();
        *slot = sum / window as f64;
    }
    Ok(out)
}

/// Recursive EMA with smoothing factor `2 / (span + 1)`, seeded with the first observed value.
///
/// Leading NaNs stay NaN. See [`RecursiveEwm`] for NaNs after the seed.
pub fn ewm_span(values: &[f64], span: usize) -> Result<Vec<f64>> {
    check_period("span", span)?;
    Ok(recursive_average(values, RecursiveEwm::new(2.0 / (span as f64 + 1.0))))
}

/// Wilder smoothing, i.e. a recursive EMA with smoothing factor `1 / period`.
pub fn wilder_average(values: &[f64], period: usize) -> Result<Vec<f64>> {
    check_period("period", period)?;
    Ok(recursive_average(values, RecursiveEwm::new(1.0 / period as f64)))
}

/// Unadjusted exponentially weighted mean, fed one row at a time.
///
/// Each observation is blended as `(w·prev + α·x) / (w + α)`, where the weight `w` of
/// the previous average is `1 − α` and shrinks by another `1 − α` for every NaN row
/// since the last observation. A NaN row leaves the output unchanged.
#[derive(Debug, Clone)]
pub struct RecursiveEwm {
    alpha: f64,
    current: f64,
    old_weight: f64,
}

impl RecursiveEwm {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            current: f64::NAN,
            old_weight: 1.0,
        }
    }
}

impl Next<f64> for RecursiveEwm {
    type Output = f64;

    fn next(&mut self, input: f64) -> f64 {
        let observed = !input.is_nan();
        if self.current.is_nan() {
            if observed {
                self.current = input;
            }
            return self.current;
        }
        self.old_weight *= 1.0 - self.alpha;
        if observed {
            if self.current != input {
                self.current =
                    (self.old_weight * self.current + self.alpha * input) / (self.old_weight + self.alpha);
            }
            self.old_weight = 1.0;
        }
        self.current
    }
}

/// Percent change against the value `periods` rows earlier; the first `periods` rows are NaN.
pub fn pct_change(values: &[f64], periods: usize) -> Result<Vec<f64>> {
    check_period("lookback", periods)?;
    let mut out = vec![f64::NAN; values.len()];
    for idx in periods..values.len() {
        out[idx] = values[idx] / values[idx - periods] - 1.0;
    }
    Ok(out)
}

/// First difference; row 0 is NaN.
pub fn diff(values: &[f64]) -> Vec<f64> {
    std::iter::once(f64::NAN)
        .chain(values.windows(2).map(|w| w[1] - w[0]))
        .take(values.len())
        .collect()
}

fn recursive_average(values: &[f64], mut ewm: RecursiveEwm) -> Vec<f64> {
    values.iter().map(|value| ewm.next(*value)).collect()
}

fn check_period(label: &str, period: usize) -> Result<()> {
    if period == 0 {
        return Err(invalid(label, period));
    }
    Ok(())
}

fn invalid(label: &str, period: usize) -> Error {
    Error::InvalidParameters(format!("{label} must be at least 1, got {period}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn rolling_mean_leaves_warm_up_undefined() {
        let sma = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 3).unwrap();
        assert!(sma[0].is_nan() && sma[1].is_nan());
        assert!(close(sma[2], 2.0));
        assert!(close(sma[3], 3.0));
        assert!(rolling_mean(&[1.0], 0).is_err());
    }

    #[test]
    fn ewm_is_seeded_with_first_value() {
        // span 3 => alpha 0.5
        let ema = ewm_span(&[10.0, 20.0, 20.0], 3).unwrap();
        assert!(close(ema[0], 10.0));
        assert!(close(ema[1], 15.0));
        assert!(close(ema[2], 17.5));
    }

    #[test]
    fn wilder_average_uses_one_over_period() {
        // period 4 => alpha 0.25
        let avg = wilder_average(&[f64::NAN, 4.0, 0.0, 8.0], 4).unwrap();
        assert!(avg[0].is_nan());
        assert!(close(avg[1], 4.0));
        assert!(close(avg[2], 3.0));
        assert!(close(avg[3], 4.25));
    }

    #[test]
    fn nan_after_seed_decays_the_old_weight() {
        let ema = ewm_span(&[10.0, f64::NAN, 20.0], 3).unwrap();
        assert_eq!(ema[1], 10.0);
        // (0.25 * 10 + 0.5 * 20) / 0.75
        assert_eq!(ema[2], 16.666666666666668);

        let ema = ewm_span(&[10.0, f64::NAN, f64::NAN, 20.0, 20.0], 3).unwrap();
        assert_eq!(ema, vec![10.0, 10.0, 10.0, 18.0, 19.0]);
    }

    #[test]
    fn ewm_pins_unadjusted_values_exactly() {
        let closes = [101.3, 102.7, 100.9, 103.4, 104.1, 103.8, 105.6, 104.9];
        let ema = ewm_span(&closes, 5).unwrap();
        assert_eq!(
            ema,
            vec![
                101.3,
                101.76666666666668,
                101.47777777777779,
                102.11851851851854,
                102.77901234567904,
                103.11934156378602,
                103.94622770919068,
                104.26415180612713,
            ]
        );
        let ema = ewm_span(&closes, 7).unwrap();
        assert_eq!(ema[1], 101.64999999999999);
        assert_eq!(ema[7], 103.85780029296873);
    }

    #[test]
    fn pct_change_and_diff() {
        let pct = pct_change(&[100.0, 110.0, 121.0], 1).unwrap();
        assert!(pct[0].is_nan());
        assert!(close(pct[1], 0.1));
        assert!(close(pct[2], 0.1));
        let d = diff(&[1.0, 4.0, 2.0]);
        assert!(d[0].is_nan());
        assert_eq!(&d[1..], &[3.0, -2.0]);
        assert!(diff(&[]).is_empty());
    }
}
