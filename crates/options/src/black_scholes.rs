// In crates/options/src/black_scholes.rs

//! Black-Scholes-Merton pricing of European options.
//!
//! Call = S·Φ(d1) − K·e^(−rT)·Φ(d2)
//! Put  = K·e^(−rT)·Φ(−d2) − S·Φ(−d1)
//!
//! where d1 = [ln(S/K) + (r + σ²/2)T] / (σ√T) and d2 = d1 − σ√T.
//!
//! Every quantity has an explicit branch for an expired option (T ≤ 0) or a degenerate
//! volatility (σ ≤ 0), so nothing here ever fails or divides by zero.

use std::f64::consts::{PI, SQRT_2};

use core_types::OptionType;
use serde::{Deserialize, Serialize};

/// Inputs of a single European option valuation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionParams {
    /// Current price of the underlying.
    pub spot: f64,
    pub strike: f64,
    /// Time to expiry in years (30 days = 30/365).
    pub time_to_expiry: f64,
    /// Annual risk-free rate (0.05 = 5%).
    pub rate: f64,
    /// Annualised volatility (0.25 = 25%).
    pub volatility: f64,
}

/// Price and sensitivities of one option, as reported by [`OptionParams::greeks`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    pub price: f64,
    pub delta: f64,
    pub gamma: f64,
    /// Per 1-percentage-point change in volatility.
    pub vega: f64,
    /// Per calendar day.
    pub theta: f64,
    /// Per 1-percentage-point change in the rate.
    pub rho: f64,
    /// Elasticity: percentage price change per 1% move in the underlying.
    pub lambda: f64,
}

/// One row of a spot-price sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub spot: f64,
    pub price: f64,
    pub delta: f64,
    pub gamma: f64,
}

impl OptionParams {
    pub fn new(spot: f64, strike: f64, time_to_expiry: f64, rate: f64, volatility: f64) -> Self {
        Self {
            spot,
            strike,
            time_to_expiry,
            rate,
            volatility,
        }
    }

    pub fn with_volatility(self, volatility: f64) -> Self {
        Self { volatility, ..self }
    }

    pub fn with_spot(self, spot: f64) -> Self {
        Self { spot, ..self }
    }

    fn is_degenerate(&self) -> bool {
        self.time_to_expiry <= 0.0 || self.volatility <= 0.0
    }

    fn discount(&self) -> f64 {
        (-self.rate * self.time_to_expiry).exp()
    }

    pub fn d1(&self) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        ((self.spot / self.strike).ln()
            + (self.rate + 0.5 * self.volatility.powi(2)) * self.time_to_expiry)
            / (self.volatility * self.time_to_expiry.sqrt())
    }

    pub fn d2(&self) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        self.d1() - self.volatility * self.time_to_expiry.sqrt()
    }

    pub fn call_price(&self) -> f64 {
        if self.time_to_expiry <= 0.0 {
            return (self.spot - self.strike).max(0.0);
        }
        if self.volatility <= 0.0 {
            return (self.spot - self.strike * self.discount()).max(0.0);
        }
        let call = self.spot * norm_cdf(self.d1()) - self.strike * self.discount() * norm_cdf(self.d2());
        call.max(0.0)
    }

    pub fn put_price(&self) -> f64 {
        if self.time_to_expiry <= 0.0 {
            return (self.strike - self.spot).max(0.0);
        }
        if self.volatility <= 0.0 {
            return (self.strike * self.discount() - self.spot).max(0.0);
        }
        let put = self.strike * self.discount() * norm_cdf(-self.d2()) - self.spot * norm_cdf(-self.d1());
        put.max(0.0)
    }

    pub fn price(&self, kind: OptionType) -> f64 {
        match kind {
            OptionType::Call => self.call_price(),
            OptionType::Put => self.put_price(),
        }
    }

    pub fn delta(&self, kind: OptionType) -> f64 {
        if self.is_degenerate() {
            let in_the_money_call = self.spot > self.strike;
            return match (kind, in_the_money_call) {
                (OptionType::Call, true) => 1.0,
                (OptionType::Call, false) => 0.0,
                (OptionType::Put, true) => 0.0,
                (OptionType::Put, false) => -1.0,
            };
        }
        match kind {
            OptionType::Call => norm_cdf(self.d1()),
            OptionType::Put => norm_cdf(self.d1()) - 1.0,
        }
    }

    /// Identical for calls and puts.
    pub fn gamma(&self) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        norm_pdf(self.d1()) / (self.spot * self.volatility * self.time_to_expiry.sqrt())
    }

    /// Identical for calls and puts.
    pub fn vega(&self) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        self.spot * norm_pdf(self.d1()) * self.time_to_expiry.sqrt() / 100.0
    }

    pub fn theta(&self, kind: OptionType) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        let decay = -self.spot * norm_pdf(self.d1()) * self.volatility
            / (2.0 * self.time_to_expiry.sqrt());
        let carry = self.rate * self.strike * self.discount();
        let annual = match kind {
            OptionType::Call => decay - carry * norm_cdf(self.d2()),
            OptionType::Put => decay + carry * norm_cdf(-self.d2()),
        };
        annual / 365.0
    }

    pub fn rho(&self, kind: OptionType) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        let scale = self.strike * self.time_to_expiry * self.discount() / 100.0;
        match kind {
            OptionType::Call => scale * norm_cdf(self.d2()),
            OptionType::Put => -scale * norm_cdf(-self.d2()),
        }
    }

    /// `delta · S / price`, or 0 for a worthless option.
    pub fn lambda(&self, kind: OptionType) -> f64 {
        let price = self.price(kind);
        if price <= 0.0 {
            return 0.0;
        }
        self.delta(kind) * self.spot / price
    }

    pub fn greeks(&self, kind: OptionType) -> Greeks {
        Greeks {
            price: self.price(kind),
            delta: self.delta(kind),
            gamma: self.gamma(),
            vega: self.vega(),
            theta: self.theta(kind),
            rho: self.rho(kind),
            lambda: self.lambda(kind),
        }
    }

    /// Price, delta and gamma re-evaluated at each spot in `spots`, all else held fixed.
    pub fn sensitivity(&self, kind: OptionType, spots: &[f64]) -> Vec<SensitivityPoint> {
        spots
            .iter()
            .map(|&spot| {
                let shifted = self.with_spot(spot);
                SensitivityPoint {
                    spot,
                    price: shifted.price(kind),
                    delta: shifted.delta(kind),
                    gamma: shifted.gamma(),
                }
            })
            .collect()
    }
}

/// Standard normal CDF, via the C math library's `erfc` so that deep tails keep full precision.
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * libm::erfc(-x / SQRT_2)
}

/// Standard normal density.
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    fn reference() -> OptionParams {
        OptionParams::new(150.0, 140.0, 30.0 / 365.0, 0.05, 0.25)
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < TOL,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn reference_prices_and_greeks() {
        let p = reference();
        assert_close(p.d1(), 1.055783823627249);
        assert_close(p.d2(), 0.9841110512421245);

        let call = p.greeks(OptionType::Call);
        assert_close(call.price, 11.405082770549555);
        assert_close(call.delta, 0.8544665048286108);
        assert_close(call.gamma, 0.021252744875593404);
        assert_close(call.vega, 0.09825755336318868);
        assert_close(call.theta, -0.056935838050243055);
        assert_close(call.rho, 0.09597114489348664);
        assert_close(call.lambda, 11.237969798452918);

        let put = p.greeks(OptionType::Put);
        assert_close(put.price, 0.8309208975381424);
        assert_close(put.delta, -0.14553349517138925);
        assert_close(put.gamma, call.gamma);
        assert_close(put.vega, call.vega);
        assert_close(put.theta, -0.03783640816983366);
        assert_close(put.rho, -0.018625434388969745);
        assert_close(put.lambda, -26.27208479217037);
    }

    #[test]
    fn put_call_parity_holds() {
        for (spot, strike, t, r, vol) in [
            (150.0, 140.0, 30.0 / 365.0, 0.05, 0.25),
            (100.0, 100.0, 1.0, 0.0, 0.2),
            (80.0, 120.0, 2.0, 0.03, 0.6),
            (50.0, 45.0, 0.01, 0.1, 1.5),
        ] {
            let p = OptionParams::new(spot, strike, t, r, vol);
            let parity = spot - strike * (-r * t).exp();
            assert!((p.call_price() - p.put_price() - parity).abs() < 1e-6);
        }
    }

    #[test]
    fn deltas_and_gamma_stay_in_range() {
        for spot in [10.0, 60.0, 99.0, 100.0, 101.0, 140.0, 400.0] {
            for vol in [0.05, 0.3, 1.2] {
                let p = OptionParams::new(spot, 100.0, 0.5, 0.02, vol);
                let call = p.delta(OptionType::Call);
                let put = p.delta(OptionType::Put);
                assert!((0.0..=1.0).contains(&call));
                assert!((-1.0..=0.0).contains(&put));
                assert!(p.gamma() >= 0.0);
            }
        }
    }

    #[test]
    fn expired_option_is_worth_intrinsic() {
        let p = OptionParams::new(110.0, 100.0, 0.0, 0.05, 0.3);
        assert_eq!(p.d1(), 0.0);
        assert_eq!(p.call_price(), 10.0);
        assert_eq!(p.put_price(), 0.0);
        assert_eq!(p.delta(OptionType::Call), 1.0);
        assert_eq!(p.delta(OptionType::Put), 0.0);
        assert_eq!(p.gamma(), 0.0);
        assert_eq!(p.theta(OptionType::Call), 0.0);
        assert_eq!(p.lambda(OptionType::Put), 0.0);
        assert_close(p.lambda(OptionType::Call), 11.0);
    }

    #[test]
    fn zero_volatility_discounts_the_strike() {
        let p = OptionParams::new(100.0, 100.0, 1.0, 0.05, 0.0);
        assert_close(p.call_price(), 100.0 - 100.0 * (-0.05f64).exp());
        assert_eq!(p.put_price(), 0.0);
        // At the money counts as out of the money for the boundary deltas.
        assert_eq!(p.delta(OptionType::Call), 0.0);
        assert_eq!(p.delta(OptionType::Put), -1.0);
        assert_eq!(p.vega(), 0.0);
        assert_eq!(p.rho(OptionType::Call), 0.0);
    }

    #[test]
    fn sensitivity_sweeps_spot_only() {
        let p = reference();
        let sweep = p.sensitivity(OptionType::Call, &[130.0, 150.0, 170.0]);
        assert_eq!(sweep.len(), 3);
        assert_close(sweep[1].price, p.call_price());
        assert!(sweep[0].price < sweep[1].price && sweep[1].price < sweep[2].price);
        assert!(sweep[0].delta < sweep[2].delta);
    }

    #[test]
    fn normal_helpers() {
        assert_close(norm_cdf(0.0), 0.5);
        assert_close(norm_cdf(1.0) + norm_cdf(-1.0), 1.0);
        assert_close(norm_pdf(0.0), 1.0 / (2.0 * PI).sqrt());
    }

    #[test]
    fn normal_cdf_is_accurate_to_machine_precision() {
        let d1 = reference().d1();
        assert!((norm_cdf(d1) - 0.8544665048286108).abs() < 1e-15);
        assert!((norm_cdf(-d1) - 0.14553349517138922).abs() < 1e-15);
        assert!((norm_cdf(-8.0) - 6.220960574271819e-16).abs() < 1e-26);
        assert!((reference().put_price() - 0.8309208975381424).abs() < 1e-13);
    }
}
