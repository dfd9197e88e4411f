//! Hedge-weight solving.
//!
//! Provides:
//! - Neutral weights for two option legs plus the underlying
//! - Singular/inconsistent system detection

pub mod linalg;
pub mod solver;

pub use solver::{HedgeGreeks, HedgeSolver, HedgeWeights, SignConvention, SolverConfig};
