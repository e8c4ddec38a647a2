//! Risk management module.
//!
//! Provides:
//! - Kelly criterion bet fraction
//! - Half-Kelly contract sizing against account size

pub mod kelly;

pub use kelly::{kelly_fraction, size_contracts, KellySizing};
