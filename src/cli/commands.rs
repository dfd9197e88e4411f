//! Command grammar for the interactive prompt.
//!
//! Each input line is parsed on its own, the first word naming the command:
//!
//! ```text
//! list
//! pick 450 Short Put --amount 1000
//! add 3 --put --short
//! rmv Option A
//! rmv --all
//! sop
//! plot
//! ```

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use crate::data::{OptionType, PositionSide};
use crate::session::{RemoveTarget, SessionError, Slot};

#[derive(Debug, Parser)]
#[command(multicall = true, disable_help_subcommand = true)]
pub struct ReplLine {
    #[command(subcommand)]
    pub command: ReplCommand,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum ReplCommand {
    /// Show the available strike prices for calls and puts
    List,

    /// Pick the underlying asset position
    Pick {
        /// Strike of the position, as listed
        strike: Decimal,

        /// Long or Short
        #[arg(value_parser = parse_position_side)]
        side: PositionSide,

        /// Call or Put
        #[arg(value_parser = parse_option_type)]
        option_side: OptionType,

        /// Number of contracts held (default from config)
        #[arg(short, long)]
        amount: Option<f64>,
    },

    /// Add an option to the list of options
    Add {
        /// Identifier shown by `list`
        identifier: usize,

        /// Use the put side instead of calls
        #[arg(short, long)]
        put: bool,

        /// Short the option instead of going long
        #[arg(short, long)]
        short: bool,
    },

    /// Remove an option from the list of options
    Rmv {
        /// Slot names, e.g. "Option A"
        #[arg(required_unless_present = "all")]
        names: Vec<String>,

        /// Remove every option
        #[arg(short, long)]
        all: bool,
    },

    /// Show selected options and neutral portfolio weights
    Sop,

    /// Show the option payoff diagram
    Plot,

    /// Show the session status and available commands
    Help,

    /// Leave the hedge session
    #[command(alias = "exit")]
    Quit,
}

impl ReplCommand {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse_line(line: &str) -> Option<Result<Self, clap::Error>> {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            return None;
        }
        Some(ReplLine::try_parse_from(words).map(|l| l.command))
    }
}

fn parse_position_side(s: &str) -> Result<PositionSide, String> {
    PositionSide::from_str(s).ok_or_else(|| format!("expected Long or Short, got '{}'", s))
}

fn parse_option_type(s: &str) -> Result<OptionType, String> {
    OptionType::from_str(s).ok_or_else(|| format!("expected Call or Put, got '{}'", s))
}

/// Turn `rmv` words into removal targets.
///
/// A bare "Option" joins with the word after it, so `rmv Option A Option B`
/// names two slots. "all" anywhere removes everything.
pub fn remove_targets(names: &[String], all: bool) -> Result<Vec<RemoveTarget>, SessionError> {
    if all || names.iter().any(|n| n.eq_ignore_ascii_case("all")) {
        return Ok(vec![RemoveTarget::All]);
    }

    let mut targets = Vec::new();
    let mut words = names.iter().peekable();
    while let Some(word) = words.next() {
        let name = if word.eq_ignore_ascii_case("option") {
            match words.next() {
                Some(letter) => format!("{} {}", word, letter),
                None => word.clone(),
            }
        } else {
            word.clone()
        };
        let slot = Slot::from_name(&name).ok_or(SessionError::UnknownSlot(name))?;
        let target = RemoveTarget::Slot(slot);
        if !targets.contains(&target) {
            targets.push(target);
        }
    }
    Ok(targets)
}
