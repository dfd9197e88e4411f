//! Options hedging calculator.
//!
//! Neutralizes the delta, gamma and vega of a single option position using
//! two further options and the underlying:
//! - `greeks`: Black-Scholes delta, gamma and vega per leg
//! - `hedge`: neutral weights for Option A, Option B and shares
//! - `session`: the pick/add/rmv/sop/plot state machine
//! - `data`: option chains and the providers serving them
//! - `render` and `cli`: terminal output and the interactive prompt

pub mod cli;
pub mod config;
pub mod data;
pub mod greeks;
pub mod hedge;
pub mod render;
pub mod session;

// Re-export commonly used types
pub use config::{ConfigError, HedgeConfig, PricingConfig};
pub use data::{JsonChainProvider, MarketDataProvider, MarketSnapshot, OptionQuote, OptionType, OptionsChain, PositionSide};
pub use greeks::{Greeks, GreeksCalculator};
pub use hedge::{HedgeGreeks, HedgeSolver, HedgeWeights, SignConvention, SolverConfig};
pub use session::{HedgeSession, Leg, LegSlots, SessionConfig, SessionError, SessionState, Slot};
