//! Interactive prompt for a hedge session.

pub mod commands;
pub mod controller;

pub use commands::{remove_targets, ReplCommand, ReplLine};
pub use controller::{HedgeController, Outcome};
