//! Strike-finish probabilities.
//!
//! `P(S_T > K) = N(d2)` where
//! - d1 = (ln(S/K) + (r + σ²/2)·T) / (σ·√T)
//! - d2 = d1 − σ·√T
//!
//! The normal CDF uses the Abramowitz & Stegun 7.1.26 rational
//! approximation of erf (|error| < 1.5e-7), so no statistics crate is
//! needed at runtime.

/// Calendar days per year used to annualize DTE.
pub const DAYS_PER_YEAR: f64 = 365.0;

// Abramowitz & Stegun 7.1.26 coefficients.
const ERF_P: f64 = 0.327_591_1;
const ERF_A1: f64 = 0.254_829_592;
const ERF_A2: f64 = -0.284_496_736;
const ERF_A3: f64 = 1.421_413_741;
const ERF_A4: f64 = -1.453_152_027;
const ERF_A5: f64 = 1.061_405_429;

/// Error function approximation, valid for all real x.
fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + ERF_P * x);
    let poly = ((((ERF_A5 * t + ERF_A4) * t + ERF_A3) * t + ERF_A2) * t + ERF_A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// Standard normal CDF.
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Probability that the underlying finishes above `strike` at expiration.
///
/// # Arguments
/// * `spot` - Current underlying price
/// * `strike` - Strike to clear
/// * `days_to_expiration` - Calendar days remaining
/// * `volatility` - Implied volatility as a decimal (0.30 = 30%)
/// * `rate` - Risk-free rate as a decimal
///
/// Expired contracts and zero volatility carry no uncertainty, so they
/// resolve to the exact comparison `spot > strike`. A non-positive strike
/// is always cleared.
pub fn probability_above_strike(
    spot: f64,
    strike: f64,
    days_to_expiration: u32,
    volatility: f64,
    rate: f64,
) -> f64 {
    if strike <= 0.0 {
        return 1.0;
    }

    let time = days_to_expiration as f64 / DAYS_PER_YEAR;
    if time <= 0.0 || volatility <= 0.0 || spot <= 0.0 {
        return if spot > strike { 1.0 } else { 0.0 };
    }

    let vol_sqrt_t = volatility * time.sqrt();
    let d1 = ((spot / strike).ln() + (rate + 0.5 * volatility * volatility) * time) / vol_sqrt_t;
    let d2 = d1 - vol_sqrt_t;

    let p = norm_cdf(d2);
    if p.is_nan() {
        // Only reachable through non-finite inputs.
        return if spot > strike { 1.0 } else { 0.0 };
    }
    p.clamp(0.0, 1.0)
}

/// Probability that the underlying finishes at or below `strike`.
pub fn probability_below_strike(
    spot: f64,
    strike: f64,
    days_to_expiration: u32,
    volatility: f64,
    rate: f64,
) -> f64 {
    1.0 - probability_above_strike(spot, strike, days_to_expiration, volatility, rate)
}
