// In crates/options/src/implied.rs

//! Implied volatility by Brent's method over a fixed volatility bracket.

use core_types::OptionType;
use tracing::trace;

use crate::black_scholes::OptionParams;

/// Lower end of the volatility search bracket.
pub const MIN_VOLATILITY: f64 = 0.001;
/// Upper end of the volatility search bracket.
pub const MAX_VOLATILITY: f64 = 5.0;

const MAX_ITERATIONS: usize = 100;
const X_TOLERANCE: f64 = 2e-12;
const R_TOLERANCE: f64 = 4.0 * f64::EPSILON;

/// The volatility at which the model price of `params` (its own `volatility` is ignored)
/// equals `market_price`.
///
/// Returns `NaN` when the price is not bracketed by [`MIN_VOLATILITY`, `MAX_VOLATILITY`]
/// or the solver does not converge, so a single bad quote never aborts a batch.
pub fn implied_volatility(market_price: f64, params: &OptionParams, kind: OptionType) -> f64 {
    if !market_price.is_finite() {
        return f64::NAN;
    }
    let objective = |sigma: f64| params.with_volatility(sigma).price(kind) - market_price;
    match brent(objective, MIN_VOLATILITY, MAX_VOLATILITY) {
        Some(sigma) => sigma,
        None => {
            trace!(market_price, strike = params.strike, %kind, "Implied volatility not found.");
            f64::NAN
        }
    }
}

/// Brent root finder with inverse quadratic extrapolation, falling back to bisection.
///
/// `None` when `f(a)` and `f(b)` share a sign or the iteration budget runs out.
fn brent(f: impl Fn(f64) -> f64, a: f64, b: f64) -> Option<f64> {
    let (mut xpre, mut xcur) = (a, b);
    let (mut fpre, mut fcur) = (f(xpre), f(xcur));
    let (mut xblk, mut fblk) = (0.0, 0.0);
    let (mut spre, mut scur) = (0.0, 0.0);

    if fpre.is_nan() || fcur.is_nan() {
        return None;
    }
    if fpre == 0.0 {
        return Some(xpre);
    }
    if fcur == 0.0 {
        return Some(xcur);
    }
    if fpre.is_sign_negative() == fcur.is_sign_negative() {
        return None;
    }

    for _ in 0..MAX_ITERATIONS {
        if fpre != 0.0 && fcur != 0.0 && fpre.is_sign_negative() != fcur.is_sign_negative() {
            xblk = xpre;
            fblk = fpre;
            spre = xcur - xpre;
            scur = spre;
        }
        if fblk.abs() < fcur.abs() {
            xpre = xcur;
            xcur = xblk;
            xblk = xpre;
            fpre = fcur;
            fcur = fblk;
            fblk = fpre;
        }

        let delta = (X_TOLERANCE + R_TOLERANCE * xcur.abs()) / 2.0;
        let sbis = (xblk - xcur) / 2.0;
        if fcur == 0.0 || sbis.abs() < delta {
            return Some(xcur);
        }

        if spre.abs() > delta && fcur.abs() < fpre.abs() {
            let stry = if xpre == xblk {
                // Secant step.
                -fcur * (xcur - xpre) / (fcur - fpre)
            } else {
                let dpre = (fpre - fcur) / (xpre - xcur);
                let dblk = (fblk - fcur) / (xblk - xcur);
                -fcur * (fblk * dblk - fpre * dpre) / (dblk * dpre * (fblk - fpre))
            };
            if 2.0 * stry.abs() < spre.abs().min(3.0 * sbis.abs() - delta) {
                spre = scur;
                scur = stry;
            } else {
                spre = sbis;
                scur = sbis;
            }
        } else {
            spre = sbis;
            scur = sbis;
        }

        xpre = xcur;
        fpre = fcur;
        if scur.abs() > delta {
            xcur += scur;
        } else {
            xcur += if sbis > 0.0 { delta } else { -delta };
        }
        fcur = f(xcur);
    }
    None
}
