//! Black-Scholes Greeks for a single option leg.
//!
//! Conventions:
//! - Delta: per unit of underlying, in (-1, 1)
//! - Gamma: per unit of underlying, same for calls and puts
//! - Vega: per 1 volatility point (raw vega / 100), same for calls and puts
//!
//! Premiums from [`GreeksCalculator::price`] give the payoff diagram a
//! reference for what a leg is worth today.
//!
//! Zero time or zero volatility collapses to the deterministic limit: delta
//! is 0 or +/-1 depending on forward moneyness, gamma and vega are 0.

use serde::{Deserialize, Serialize};
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

use crate::data::OptionType;

/// First- and second-order sensitivities of one leg or of the portfolio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    pub vega: f64,
}

impl Greeks {
    pub fn new(delta: f64, gamma: f64, vega: f64) -> Self {
        Self { delta, gamma, vega }
    }

    /// Multiply every sensitivity by a position size.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            delta: self.delta * factor,
            gamma: self.gamma * factor,
            vega: self.vega * factor,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.delta.is_finite() && self.gamma.is_finite() && self.vega.is_finite()
    }
}

/// Black-Scholes calculator for per-leg Greeks.
#[derive(Debug, Clone, Copy)]
pub struct GreeksCalculator {
    /// Risk-free interest rate
    pub rate: f64,
    /// Dividend yield
    pub dividend: f64,
}

impl Default for GreeksCalculator {
    fn default() -> Self {
        Self {
            rate: 0.0,
            dividend: 0.0,
        }
    }
}

impl GreeksCalculator {
    pub fn new(rate: f64, dividend: f64) -> Self {
        Self { rate, dividend }
    }

    /// Delta, gamma and vega for one leg.
    ///
    /// `side` is +1 for call-like and -1 for put-like legs. Callers floor
    /// `time` to a positive minimum and reject negative volatility before
    /// calling.
    pub fn compute_greeks(&self, spot: f64, vol: f64, strike: f64, time: f64, side: i8) -> Greeks {
        let opt_type = if side < 0 { OptionType::Put } else { OptionType::Call };
        if time <= 0.0 || vol <= 0.0 {
            return Greeks::new(self.limit_delta(spot, strike, time.max(0.0), opt_type), 0.0, 0.0);
        }

        let sqrt_t = time.sqrt();
        let d1 = ((spot / strike).ln() + (self.rate - self.dividend + 0.5 * vol * vol) * time)
            / (vol * sqrt_t);
        let carry = (-self.dividend * time).exp();
        let density = Self::standard_normal().map(|n| n.pdf(d1)).unwrap_or(0.0);
        let cumulative = Self::standard_normal().map(|n| n.cdf(d1)).unwrap_or(0.5);

        let delta = match opt_type {
            OptionType::Call => carry * cumulative,
            OptionType::Put => carry * (cumulative - 1.0),
        };

        Greeks {
            delta,
            gamma: carry * density / (spot * vol * sqrt_t),
            // per volatility point
            vega: spot * carry * density * sqrt_t / 100.0,
        }
    }

    /// Black-Scholes premium for one leg, in the same units as `spot`.
    ///
    /// Zero time or zero volatility gives the discounted forward intrinsic value.
    pub fn price(&self, spot: f64, vol: f64, strike: f64, time: f64, side: i8) -> f64 {
        let time = time.max(0.0);
        let spot_pv = spot * (-self.dividend * time).exp();
        let strike_pv = strike * (-self.rate * time).exp();
        let call = side >= 0;

        if time <= 0.0 || vol <= 0.0 {
            let intrinsic = if call { spot_pv - strike_pv } else { strike_pv - spot_pv };
            return intrinsic.max(0.0);
        }

        let sqrt_t = time.sqrt();
        let d1 = ((spot / strike).ln() + (self.rate - self.dividend + 0.5 * vol * vol) * time)
            / (vol * sqrt_t);
        let d2 = d1 - vol * sqrt_t;
        let cdf = |x: f64| Self::standard_normal().map(|n| n.cdf(x)).unwrap_or(0.5);

        if call {
            spot_pv * cdf(d1) - strike_pv * cdf(d2)
        } else {
            strike_pv * cdf(-d2) - spot_pv * cdf(-d1)
        }
    }

    /// Delta once no optionality is left: the leg is either fully in or out
    /// of the money on a forward basis.
    fn limit_delta(&self, spot: f64, strike: f64, time: f64, opt_type: OptionType) -> f64 {
        let forward = spot * ((self.rate - self.dividend) * time).exp();
        let carry = (-self.dividend * time).exp();
        match opt_type {
            OptionType::Call if forward > strike => carry,
            OptionType::Put if forward < strike => -carry,
            _ => 0.0,
        }
    }

    fn standard_normal() -> Option<Normal> {
        Normal::new(0.0, 1.0).ok()
    }
}
