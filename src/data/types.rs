//! Core data types for the hedge calculator.
//!
//! Option chains are kept the way a market-data feed hands them over:
//! one list of calls and one list of puts for a single expiration, each
//! ordered by ascending strike. Prices and strikes stay in `Decimal` so
//! strike lookups compare exactly; volatilities are plain `f64`.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Option type (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "C" | "CALL" => Some(Self::Call),
            "P" | "PUT" => Some(Self::Put),
            _ => None,
        }
    }

    /// Side multiplier used by the Greeks formulas: +1 for calls, -1 for puts.
    pub fn side(&self) -> i8 {
        match self {
            Self::Call => 1,
            Self::Put => -1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Call => "Call",
            Self::Put => "Put",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a position is held long or short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "L" | "LONG" => Some(Self::Long),
            "S" | "SHORT" => Some(Self::Short),
            _ => None,
        }
    }

    /// +1 for long, -1 for short.
    pub fn sign(&self) -> f64 {
        match self {
            Self::Long => 1.0,
            Self::Short => -1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Long => "Long",
            Self::Short => "Short",
        }
    }
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of an option chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionQuote {
    /// Strike price
    pub strike: Decimal,

    /// Implied volatility as a fraction (0.25 = 25%)
    pub implied_volatility: f64,

    /// Last traded price
    #[serde(default)]
    pub last_price: Decimal,
}

impl OptionQuote {
    pub fn new(strike: Decimal, implied_volatility: f64, last_price: Decimal) -> Self {
        Self {
            strike,
            implied_volatility,
            last_price,
        }
    }

    /// Strike as `f64` for the pricing formulas.
    pub fn strike_f64(&self) -> f64 {
        self.strike.try_into().unwrap_or(0.0)
    }
}

/// All calls and puts for a single expiration date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionsChain {
    /// Expiration date for this chain
    pub expiration: NaiveDate,

    /// Calls ordered by ascending strike
    #[serde(default)]
    pub calls: Vec<OptionQuote>,

    /// Puts ordered by ascending strike
    #[serde(default)]
    pub puts: Vec<OptionQuote>,
}

impl OptionsChain {
    /// Create a chain, sorting both sides by ascending strike.
    pub fn new(expiration: NaiveDate, mut calls: Vec<OptionQuote>, mut puts: Vec<OptionQuote>) -> Self {
        calls.sort_by(|a, b| a.strike.cmp(&b.strike));
        puts.sort_by(|a, b| a.strike.cmp(&b.strike));
        Self {
            expiration,
            calls,
            puts,
        }
    }

    /// Quotes for one side of the chain.
    pub fn side(&self, option_type: OptionType) -> &[OptionQuote] {
        match option_type {
            OptionType::Call => &self.calls,
            OptionType::Put => &self.puts,
        }
    }

    /// Quote at a chain index (the identifier shown by `list`).
    pub fn quote_at(&self, option_type: OptionType, index: usize) -> Option<&OptionQuote> {
        self.side(option_type).get(index)
    }

    /// Find a quote with exactly this strike.
    pub fn quote_at_strike(&self, option_type: OptionType, strike: Decimal) -> Option<&OptionQuote> {
        self.side(option_type).iter().find(|q| q.strike == strike)
    }

    /// Number of identifiers `list` shows (the longer of the two sides).
    pub fn max_len(&self) -> usize {
        self.calls.len().max(self.puts.len())
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty() && self.puts.is_empty()
    }
}

/// Market data for one ticker and expiration, fetched once per session.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSnapshot {
    /// Underlying symbol (e.g., "SPY")
    pub ticker: String,

    /// Current underlying price
    pub spot_price: Decimal,

    /// Option chain for the session's expiration
    pub chain: OptionsChain,
}

impl MarketSnapshot {
    pub fn new(ticker: &str, spot_price: Decimal, chain: OptionsChain) -> Self {
        Self {
            ticker: ticker.to_uppercase(),
            spot_price,
            chain,
        }
    }

    pub fn spot_f64(&self) -> f64 {
        self.spot_price.try_into().unwrap_or(0.0)
    }

    pub fn expiration(&self) -> NaiveDate {
        self.chain.expiration
    }
}
