use rust_decimal::Decimal;
use thiserror::Error;

use super::slots::Slot;
use crate::data::{MarketDataError, OptionType};

/// Errors reported by hedge session commands. None of them change session state.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Please set the Underlying Asset Position by using the 'pick' command.")]
    NoPosition,

    #[error("The functionality only accepts two options. Therefore, please remove an option with 'rmv' before continuing.")]
    SlotsFull,

    #[error("Please add Options by using the 'add' command.")]
    NoLegs,

    #[error("Neutral weights need both Option A and Option B. Please add another option with 'add'.")]
    IncompleteHedge,

    #[error("Strike {strike} is not available for {option_type}s. Use 'list' to see available strikes.")]
    StrikeNotFound { strike: Decimal, option_type: OptionType },

    #[error("Please use a valid index: {identifier} is out of range, {available} {option_type}s are listed.")]
    InvalidIdentifier {
        identifier: usize,
        option_type: OptionType,
        available: usize,
    },

    #[error("{0} is not an option.")]
    UnknownSlot(String),

    #[error("{0} holds no option.")]
    SlotEmpty(Slot),

    #[error("Amount must be positive, got {0}")]
    InvalidAmount(f64),

    #[error("Implied volatility at strike {strike} must be non-negative, got {implied_volatility}")]
    InvalidVolatility { strike: Decimal, implied_volatility: f64 },

    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),
}
