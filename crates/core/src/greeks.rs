//! Black-Scholes greeks for listed equity options.
//!
//! Pure functions of (spot, strike, time-to-expiry, rate, volatility).
//! Degenerate inputs (`t <= 0` or `sigma <= 0`) return 0.0 for every greek
//! rather than NaN, so expiry-day evaluation never poisons downstream sums.

use std::f64::consts::{PI, SQRT_2};

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::market::{Greeks, OptionRight};

/// Default annualized risk-free rate used when the caller has no better input.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.05;

/// Standard normal cumulative distribution function.
#[must_use]
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + libm::erf(x / SQRT_2))
}

/// Standard normal probability density function.
#[must_use]
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// (d1, d2) of the Black-Scholes formula, or `None` for degenerate inputs.
fn d1_d2(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> Option<(f64, f64)> {
    if t <= 0.0 || sigma <= 0.0 || s <= 0.0 || k <= 0.0 {
        return None;
    }
    let sqrt_t = t.sqrt();
    let d1 = ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / (sigma * sqrt_t);
    Some((d1, d1 - sigma * sqrt_t))
}

/// Call delta: Φ(d1).
#[must_use]
pub fn call_delta(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> f64 {
    match d1_d2(s, k, t, r, sigma) {
        Some((d1, _)) => norm_cdf(d1),
        None => 0.0,
    }
}

/// Put delta: Φ(d1) − 1. Equal to `call_delta − 1` for identical inputs.
#[must_use]
pub fn put_delta(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> f64 {
    match d1_d2(s, k, t, r, sigma) {
        Some((d1, _)) => norm_cdf(d1) - 1.0,
        None => 0.0,
    }
}

/// Gamma, identical for calls and puts: φ(d1) / (S·σ·√T).
#[must_use]
pub fn gamma(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> f64 {
    match d1_d2(s, k, t, r, sigma) {
        Some((d1, _)) => norm_pdf(d1) / (s * sigma * t.sqrt()),
        None => 0.0,
    }
}

/// Vega per one-point change in IV expressed as a percentage: S·φ(d1)·√T / 100.
#[must_use]
pub fn vega(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> f64 {
    match d1_d2(s, k, t, r, sigma) {
        Some((d1, _)) => s * norm_pdf(d1) * t.sqrt() / 100.0,
        None => 0.0,
    }
}

/// Call theta, per calendar day.
#[must_use]
pub fn call_theta(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> f64 {
    match d1_d2(s, k, t, r, sigma) {
        Some((d1, d2)) => {
            let term1 = -s * norm_pdf(d1) * sigma / (2.0 * t.sqrt());
            let term2 = -r * k * (-r * t).exp() * norm_cdf(d2);
            (term1 + term2) / 365.0
        }
        None => 0.0,
    }
}

/// Put theta, per calendar day.
#[must_use]
pub fn put_theta(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> f64 {
    match d1_d2(s, k, t, r, sigma) {
        Some((d1, d2)) => {
            let term1 = -s * norm_pdf(d1) * sigma / (2.0 * t.sqrt());
            let term2 = r * k * (-r * t).exp() * norm_cdf(-d2);
            (term1 + term2) / 365.0
        }
        None => 0.0,
    }
}

/// Black-Scholes call value. Degenerate inputs fall back to intrinsic value.
#[must_use]
pub fn call_price(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> f64 {
    match d1_d2(s, k, t, r, sigma) {
        Some((d1, d2)) => s * norm_cdf(d1) - k * (-r * t).exp() * norm_cdf(d2),
        None => (s - k).max(0.0),
    }
}

/// Black-Scholes put value. Degenerate inputs fall back to intrinsic value.
#[must_use]
pub fn put_price(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> f64 {
    match d1_d2(s, k, t, r, sigma) {
        Some((d1, d2)) => k * (-r * t).exp() * norm_cdf(-d2) - s * norm_cdf(-d1),
        None => (k - s).max(0.0),
    }
}

/// All greeks for one side of the chain at once.
#[must_use]
pub fn snapshot(s: f64, k: f64, t: f64, r: f64, sigma: f64, right: OptionRight) -> Greeks {
    let (delta, theta) = match right {
        OptionRight::Call => (call_delta(s, k, t, r, sigma), call_theta(s, k, t, r, sigma)),
        OptionRight::Put => (put_delta(s, k, t, r, sigma), put_theta(s, k, t, r, sigma)),
    };
    Greeks {
        delta,
        gamma: gamma(s, k, t, r, sigma),
        theta,
        vega: vega(s, k, t, r, sigma),
    }
}

/// Time to expiry in years, floored at roughly one hour so same-day
/// contracts keep a nonzero clock until they actually expire.
#[must_use]
pub fn years_to_expiry(expiry: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let seconds = (expiry - now).num_seconds() as f64;
    (seconds / (365.25 * 24.0 * 3600.0)).max(0.0001)
}

/// Rough IV estimate from an observed option price.
///
/// Uses the ATM approximation `price ≈ S·σ·√(T/2π)` solved for σ and clamped
/// to [0.10, 2.0]; unusable prices fall back to a 30% default.
#[must_use]
pub fn estimate_iv(option_price: f64, s: f64, t: f64) -> f64 {
    if option_price > 0.0 && s > 0.0 && t > 0.0 {
        (option_price / (s * t.sqrt()) * (2.0 * PI).sqrt()).clamp(0.10, 2.0)
    } else {
        0.30
    }
}

/// Greeks plus estimated IV for a contract observed in the market.
///
/// Decimal inputs are the engine's money types; the math itself runs in f64
/// because greeks are analytics, not accounting.
#[must_use]
pub fn contract_greeks(
    underlying_price: Decimal,
    strike: Decimal,
    expiry: DateTime<Utc>,
    option_price: Decimal,
    right: OptionRight,
    now: DateTime<Utc>,
) -> (Greeks, f64) {
    let s = underlying_price.to_f64().unwrap_or(0.0);
    let k = strike.to_f64().unwrap_or(0.0);
    let px = option_price.to_f64().unwrap_or(0.0);
    let t = years_to_expiry(expiry, now);
    let iv = estimate_iv(px, s, t);
    (snapshot(s, k, t, DEFAULT_RISK_FREE_RATE, iv, right), iv)
}
