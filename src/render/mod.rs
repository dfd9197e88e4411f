//! Text rendering for tables and payoff diagrams.
//!
//! The session hands over data only; everything that decides how it looks
//! on a terminal lives here.

pub mod payoff;
pub mod table;

pub use payoff::{leg_payoff, PayoffDiagram, PayoffPoint, RenderConfig};
pub use table::{fmt_num, render_table};
