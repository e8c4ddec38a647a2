//! Closed-form probability model.
//!
//! Risk-neutral odds that the underlying finishes above or below a strike
//! at expiration, from the Black-Scholes d2 term.

pub mod probability;

pub use probability::{norm_cdf, probability_above_strike, probability_below_strike};
