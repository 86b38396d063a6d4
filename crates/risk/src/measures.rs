// In crates/risk/src/measures.rs

//! Tail-risk statistics over a sample of realised returns.
//!
//! Both measures are reported as positive loss magnitudes for a typical loss-skewed
//! sample: a VaR of `0.02` means "the 5% worst days lose at least 2%".

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// VaR and CVaR evaluated at the same confidence level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TailRisk {
    pub confidence: f64,
    pub value_at_risk: f64,
    pub conditional_value_at_risk: f64,
}

/// The `q`-th percentile (0..=100) of `sample` using linear interpolation between
/// closest ranks, the same convention as numpy's default `percentile`.
pub fn percentile(sample: &[f64], q: f64) -> Result<f64> {
    validate(sample)?;
    if !(0.0..=100.0).contains(&q) {
        return Err(Error::InvalidParameters(format!(
            "percentile must be within [0, 100], got {q}"
        )));
    }

    let mut sorted = sample.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let last = sorted.len() - 1;
    let virtual_index = (q / 100.0) * last as f64;
    let previous = (virtual_index.floor() as usize).min(last);
    let next = (previous + 1).min(last);
    let gamma = virtual_index - previous as f64;

    Ok(lerp(sorted[previous], sorted[next], gamma))
}

/// Historical Value-at-Risk: the negated lower-tail percentile at `(1 - confidence)`.
pub fn value_at_risk(sample: &[f64], confidence: f64) -> Result<f64> {
    validate_confidence(confidence)?;
    Ok(-percentile(sample, (1.0 - confidence) * 100.0)?)
}

/// Conditional VaR: the negated mean of every observation at or beyond the VaR threshold.
///
/// Returns `0.0` when no observation reaches the threshold.
pub fn conditional_value_at_risk(sample: &[f64], confidence: f64) -> Result<f64> {
    let var = value_at_risk(sample, confidence)?;
    let threshold = -var;

    let (sum, count) = sample
        .iter()
        .filter(|r| **r <= threshold)
        .fold((0.0, 0usize), |(sum, count), r| (sum + r, count + 1));

    if count == 0 {
        return Ok(0.0);
    }
    Ok(-(sum / count as f64))
}

/// Alias of [`conditional_value_at_risk`].
pub fn expected_shortfall(sample: &[f64], confidence: f64) -> Result<f64> {
    conditional_value_at_risk(sample, confidence)
}

pub fn tail_risk(sample: &[f64], confidence: f64) -> Result<TailRisk> {
    Ok(TailRisk {
        confidence,
        value_at_risk: value_at_risk(sample, confidence)?,
        conditional_value_at_risk: conditional_value_at_risk(sample, confidence)?,
    })
}

fn validate(sample: &[f64]) -> Result<()> {
    if sample.is_empty() {
        return Err(Error::EmptySample);
    }
    if let Some(index) = sample.iter().position(|r| r.is_nan()) {
        return Err(Error::NonNumeric { index });
    }
    Ok(())
}

fn validate_confidence(confidence: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&confidence) {
        return Err(Error::InvalidParameters(format!(
            "confidence must be within [0, 1], got {confidence}"
        )));
    }
    Ok(())
}

// Interpolates from the nearer endpoint.
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    let diff = b - a;
    if t >= 0.5 { b - diff * (1.0 - t) } else { a + diff * t }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: [f64; 10] = [0.01, -0.02, 0.03, -0.05, 0.004, -0.01, 0.02, -0.03, 0.0, 0.015];

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn percentile_interpolates_linearly() {
        assert!(close(percentile(&SAMPLE, 0.0).unwrap(), -0.05));
        assert!(close(percentile(&SAMPLE, 100.0).unwrap(), 0.03));
        // Sorted: [-0.05, -0.03, -0.02, -0.01, 0.0, 0.004, 0.01, 0.015, 0.02, 0.03]
        assert!(close(percentile(&SAMPLE, 50.0).unwrap(), 0.002));
        assert!(close(percentile(&[4.0], 37.0).unwrap(), 4.0));
    }

    #[test]
    fn var_is_negated_lower_percentile() {
        assert!(close(value_at_risk(&SAMPLE, 0.95).unwrap(), 0.041));
        assert!(close(value_at_risk(&SAMPLE, 0.90).unwrap(), 0.032));
    }

    #[test]
    fn cvar_averages_the_tail() {
        assert!(close(conditional_value_at_risk(&SAMPLE, 0.95).unwrap(), 0.05));
        let wide = conditional_value_at_risk(&SAMPLE, 0.70).unwrap();
        // VaR(70%) = 0.013; observations at or below -0.013 are -0.05, -0.03, -0.02.
        assert!(close(wide, (0.05 + 0.03 + 0.02) / 3.0));
        assert_eq!(expected_shortfall(&SAMPLE, 0.70).unwrap(), wide);
    }

    #[test]
    fn cvar_is_at_least_var() {
        for confidence in [0.5, 0.8, 0.9, 0.95, 0.99] {
            let risk = tail_risk(&SAMPLE, confidence).unwrap();
            assert!(risk.conditional_value_at_risk >= risk.value_at_risk - 1e-15);
        }
    }

    #[test]
    fn zero_confidence_uses_whole_sample() {
        let sample = [0.01, 0.02, 0.03];
        assert!(close(value_at_risk(&sample, 0.0).unwrap(), -0.03));
        assert!(close(conditional_value_at_risk(&sample, 0.0).unwrap(), -0.02));
    }

    #[test]
    fn rejects_empty_and_nan_samples() {
        assert_eq!(value_at_risk(&[], 0.95), Err(Error::EmptySample));
        assert_eq!(
            conditional_value_at_risk(&[0.01, f64::NAN], 0.95),
            Err(Error::NonNumeric { index: 1 })
        );
        assert!(matches!(
            value_at_risk(&SAMPLE, 1.5),
            Err(Error::InvalidParameters(_))
        ));
    }
}
