// In crates/options/src/chain.rs

use core_types::OptionType;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::black_scholes::OptionParams;
use crate::implied::implied_volatility;

/// Volatility used for the Greeks of a row whose implied volatility cannot be found.
pub const DEFAULT_FALLBACK_VOLATILITY: f64 = 0.2;

/// One quoted contract of an option chain for a single expiry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionChainRow {
    pub strike: f64,
    pub last_price: f64,
    #[serde(default)]
    pub bid: f64,
    #[serde(default)]
    pub ask: f64,
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub open_interest: f64,
}

/// Market inputs shared by every row of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChainContext {
    pub spot: f64,
    /// Years until the chain's expiry.
    pub time_to_expiry: f64,
    pub rate: f64,
    pub kind: OptionType,
    #[serde(default = "default_fallback_volatility")]
    pub fallback_volatility: f64,
}

fn default_fallback_volatility() -> f64 {
    DEFAULT_FALLBACK_VOLATILITY
}

/// A chain row extended with its implied volatility and Greeks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChainAnalysis {
    #[serde(flatten)]
    pub row: OptionChainRow,
    /// NaN when the last price is not attainable within the volatility bracket.
    pub implied_volatility: f64,
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
}

/// Derives implied volatility and Greeks for every row with a positive strike and a
/// finite last price. Rows are independent and evaluated in parallel; output order
/// follows input order.
pub fn analyze_chain(rows: &[OptionChainRow], context: &ChainContext) -> Vec<ChainAnalysis> {
    let analysed: Vec<ChainAnalysis> = rows
        .par_iter()
        .filter(|row| row.strike > 0.0 && row.last_price.is_finite())
        .map(|row| analyze_row(row, context))
        .collect();

    debug!(
        rows = rows.len(),
        kept = analysed.len(),
        unresolved = analysed.iter().filter(|a| a.implied_volatility.is_nan()).count(),
        kind = %context.kind,
        "Option chain analysed."
    );
    analysed
}

fn analyze_row(row: &OptionChainRow, context: &ChainContext) -> ChainAnalysis {
    let params = OptionParams::new(
        context.spot,
        row.strike,
        context.time_to_expiry,
        context.rate,
        context.fallback_volatility,
    );
    let iv = implied_volatility(row.last_price, &params, context.kind);
    let at = if iv.is_nan() { params } else { params.with_volatility(iv) };

    ChainAnalysis {
        row: *row,
        implied_volatility: iv,
        delta: at.delta(context.kind),
        gamma: at.gamma(),
        theta: at.theta(context.kind),
        vega: at.vega(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(kind: OptionType) -> ChainContext {
        ChainContext {
            spot: 100.0,
            time_to_expiry: 0.25,
            rate: 0.04,
            kind,
            fallback_volatility: DEFAULT_FALLBACK_VOLATILITY,
        }
    }

    fn quote(strike: f64, last_price: f64) -> OptionChainRow {
        OptionChainRow {
            strike,
            last_price,
            bid: last_price - 0.05,
            ask: last_price + 0.05,
            volume: 10.0,
            open_interest: 100.0,
        }
    }

    #[test]
    fn recovers_volatility_per_row_in_order() {
        let ctx = context(OptionType::Call);
        let strikes = [90.0, 100.0, 110.0];
        let rows: Vec<OptionChainRow> = strikes
            .iter()
            .map(|k| {
                let price = OptionParams::new(100.0, *k, 0.25, 0.04, 0.3).call_price();
                quote(*k, price)
            })
            .collect();

        let analysis = analyze_chain(&rows, &ctx);
        assert_eq!(analysis.len(), 3);
        for (a, k) in analysis.iter().zip(strikes) {
            assert_eq!(a.row.strike, k);
            assert!((a.implied_volatility - 0.3).abs() < 1e-6);
            let expected = OptionParams::new(100.0, k, 0.25, 0.04, 0.3);
            assert!((a.delta - expected.delta(OptionType::Call)).abs() < 1e-6);
        }
    }

    #[test]
    fn drops_non_positive_strikes() {
        let rows = [quote(0.0, 1.0), quote(-5.0, 1.0), quote(100.0, 4.0)];
        let analysis = analyze_chain(&rows, &context(OptionType::Put));
        assert_eq!(analysis.len(), 1);
        assert_eq!(analysis[0].row.strike, 100.0);
    }

    #[test]
    fn unresolvable_quotes_use_fallback_volatility() {
        // A put can never be worth more than the discounted strike.
        let rows = [quote(100.0, 500.0)];
        let ctx = context(OptionType::Put);
        let analysis = analyze_chain(&rows, &ctx);
        assert!(analysis[0].implied_volatility.is_nan());

        let fallback = OptionParams::new(100.0, 100.0, 0.25, 0.04, DEFAULT_FALLBACK_VOLATILITY);
        assert_eq!(analysis[0].gamma, fallback.gamma());
        assert_eq!(analysis[0].vega, fallback.vega());
    }

    #[test]
    fn context_defaults_the_fallback_volatility() {
        let ctx: ChainContext = serde_json::from_str(
            r#"{"spot": 100.0, "time_to_expiry": 0.5, "rate": 0.01, "kind": "call"}"#,
        )
        .unwrap();
        assert_eq!(ctx.fallback_volatility, DEFAULT_FALLBACK_VOLATILITY);
        assert_eq!(ctx.kind, OptionType::Call);
    }
}
