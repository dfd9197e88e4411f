//! Per-leg risk sensitivities (Black-Scholes delta, gamma and vega).

pub mod calculator;

pub use calculator::{Greeks, GreeksCalculator};
