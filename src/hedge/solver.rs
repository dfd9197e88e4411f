//! Neutral portfolio weights.
//!
//! Given the Greeks of the picked position ("Portfolio") and of two option
//! legs, find position sizes on option A, option B and the underlying so the
//! combined book is delta, gamma and vega neutral:
//!
//! ```text
//! | dA  dB  1 |   | wA |     | T.delta |
//! | gA  gB  0 | * | wB | = - | T.gamma |
//! | vA  vB  0 |   | wS |     | T.vega  |
//! ```
//!
//! `T` is the portfolio exposure: its Greeks scaled by the target amount and,
//! under [`SignConvention::Exposure`], by the position sign. Shares carry a
//! delta of one and no gamma or vega, so the options absorb gamma and vega
//! and the shares absorb whatever delta is left.
//!
//! Leg Greeks enter the system per held unit (see [`HedgeSolver::leg_exposure`]):
//! a weight of 2 on a short leg means two more short contracts.
//!
//! Black-Scholes ties vega to gamma (`vega = gamma * S^2 * vol * T / 100`), so
//! the gamma and vega rows are proportional when both legs share one implied
//! volatility. Equal volatilities therefore come out singular. Volatilities
//! that differ only slightly give a regular but ill-conditioned system, and
//! weights grow like `1 / (volB - volA)`; they still neutralize the book.
//! [`SolverConfig::pivot_tolerance`] sets where singular begins.
//!
//! A weight sum of exactly zero means "cannot be solved".

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::linalg;
use crate::data::{OptionType, PositionSide};
use crate::greeks::Greeks;

/// How the position sign enters the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignConvention {
    /// A short position flips the exposure being hedged, and a short leg
    /// flips the Greeks it contributes.
    #[default]
    Exposure,
    /// Long/Short only labels the position and legs; the system always
    /// hedges a long exposure with long contracts.
    DisplayOnly,
}

/// Greeks of the portfolio and of both option legs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HedgeGreeks {
    pub portfolio: Greeks,
    pub option_a: Greeks,
    pub option_b: Greeks,
}

/// Neutral weights on each instrument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HedgeWeights {
    pub option_a: f64,
    pub option_b: f64,
    pub shares: f64,
    /// True when the system has no unique solution. The weights are then
    /// the first feasible solution, not necessarily the best one.
    pub is_singular: bool,
}

impl HedgeWeights {
    fn unsolvable(is_singular: bool) -> Self {
        Self {
            is_singular,
            ..Default::default()
        }
    }

    pub fn total(&self) -> f64 {
        self.option_a + self.option_b + self.shares
    }

    /// False for the all-zero "cannot be solved" outcome.
    pub fn is_solvable(&self) -> bool {
        self.total() != 0.0
    }
}

/// Solver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Relative pivot size below which the system is treated as singular.
    pub pivot_tolerance: f64,
    /// How the position sign enters the system.
    pub sign_convention: SignConvention,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            pivot_tolerance: 1e-9,
            sign_convention: SignConvention::Exposure,
        }
    }
}

/// Hedge-weight solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct HedgeSolver {
    config: SolverConfig,
}

impl HedgeSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Exposure the hedge has to offset.
    ///
    /// `leg_side` is the option side the portfolio Greeks were computed for
    /// and orients the portfolio delta: positive for calls, negative for puts.
    pub fn target_exposure(
        &self,
        target_amount: f64,
        leg_side: OptionType,
        portfolio: &Greeks,
        position_sign: PositionSide,
    ) -> Greeks {
        let sign = match self.config.sign_convention {
            SignConvention::Exposure => position_sign.sign(),
            SignConvention::DisplayOnly => 1.0,
        };
        let oriented = Greeks {
            delta: portfolio.delta.abs() * f64::from(leg_side.side()),
            ..*portfolio
        };
        oriented.scaled(sign * target_amount)
    }

    /// Greeks of one held unit of a leg.
    ///
    /// Under [`SignConvention::Exposure`] a short leg carries the negated
    /// per-contract Greeks, so weights come out in units of the held
    /// position. Under [`SignConvention::DisplayOnly`] legs are always
    /// treated as long contracts.
    pub fn leg_exposure(&self, per_contract: &Greeks, side: PositionSide) -> Greeks {
        match self.config.sign_convention {
            SignConvention::Exposure => per_contract.scaled(side.sign()),
            SignConvention::DisplayOnly => *per_contract,
        }
    }

    /// Weights on option A, option B and shares that neutralize the portfolio.
    pub fn calc_hedge(
        &self,
        target_amount: f64,
        leg_side: OptionType,
        greeks: &HedgeGreeks,
        position_sign: PositionSide,
    ) -> HedgeWeights {
        let target = self.target_exposure(target_amount, leg_side, &greeks.portfolio, position_sign);
        let a = greeks.option_a;
        let b = greeks.option_b;

        if !(target.is_finite() && a.is_finite() && b.is_finite()) {
            warn!("Non-finite Greeks passed to hedge solver");
            return HedgeWeights::unsolvable(false);
        }

        let matrix = [
            [a.delta, b.delta, 1.0],
            [a.gamma, b.gamma, 0.0],
            [a.vega, b.vega, 0.0],
        ];
        let rhs = [-target.delta, -target.gamma, -target.vega];

        let solution = linalg::solve(matrix, rhs, self.config.pivot_tolerance);
        let is_singular = solution.is_singular();

        if !solution.consistent {
            warn!(rank = solution.rank, "Hedge system is inconsistent, no neutral weights exist");
            return HedgeWeights::unsolvable(is_singular);
        }

        if is_singular {
            warn!(
                rank = solution.rank,
                "Hedge system is singular, returning first feasible solution"
            );
        }

        let [option_a, option_b, shares] = solution.values;
        debug!(option_a, option_b, shares, is_singular, "Solved hedge weights");

        HedgeWeights {
            option_a,
            option_b,
            shares,
            is_singular,
        }
    }
}
