//! Prompt dispatcher: runs one command against the session and renders the result.

use tracing::debug;

use super::commands::{remove_targets, ReplCommand};
use crate::data::{OptionType, PositionSide};
use crate::greeks::Greeks;
use crate::hedge::{HedgeWeights, SignConvention};
use crate::render::{fmt_num, render_table};
use crate::session::{HedgeSession, RemoveTarget, SessionError, SessionState, Slot, SlotEntry};

const SINGULAR_WARNING: &str = "Warning\n\
    The selected combination of options yields multiple solutions.\n\
    This is the first feasible solution, possibly not the best one.\n";

const SECOND_LEG_HINT: &str = "Add a second option with the 'add' command to solve the weights.\n";

const UNSOLVABLE_MESSAGE: &str = "Due to there being multiple solutions (Singular Matrix) the current \
    options combination can not be solved. Please input different options.\n";

/// What the prompt loop should do after a line.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Print this and read the next line.
    Output(String),
    Quit,
}

/// Drives a [`HedgeSession`] from text commands.
pub struct HedgeController {
    session: HedgeSession,
}

impl HedgeController {
    pub fn new(session: HedgeSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &HedgeSession {
        &self.session
    }

    /// Handle one input line. Errors are rendered as output; state is untouched by them.
    pub fn handle_line(&mut self, line: &str) -> Outcome {
        let command = match ReplCommand::parse_line(line) {
            None => return Outcome::Output(String::new()),
            Some(Ok(command)) => command,
            Some(Err(err)) => return Outcome::Output(err.to_string()),
        };

        if command == ReplCommand::Quit {
            return Outcome::Quit;
        }

        debug!(?command, "Executing command");
        match self.execute(command) {
            Ok(out) => Outcome::Output(out),
            Err(err) => Outcome::Output(format!("{}\n", err)),
        }
    }

    fn execute(&mut self, command: ReplCommand) -> Result<String, SessionError> {
        match command {
            ReplCommand::List => Ok(self.list_view()),
            ReplCommand::Pick {
                strike,
                side,
                option_side,
                amount,
            } => {
                let greeks = self.session.pick(strike, side, option_side, amount)?;
                let label = self
                    .session
                    .underlying()
                    .map(|u| u.label())
                    .unwrap_or_default();
                let mut out = format!("Underlying Asset Position: {}\n", label);
                out.push_str(&greeks_table(Some("Portfolio"), &greeks, &[]));
                Ok(out)
            }
            ReplCommand::Add {
                identifier,
                put,
                short,
            } => {
                let kind = if put { OptionType::Put } else { OptionType::Call };
                let side = if short { PositionSide::Short } else { PositionSide::Long };
                let added = self.session.add(kind, side, identifier)?;

                let mut out = String::new();
                if let Some(entry) = self.session.legs().get(added.slot) {
                    let extra = [
                        ("Implied Volatility", fmt_num(entry.leg.implied_volatility, 4)),
                        ("Strike Price", entry.leg.strike.to_string()),
                        ("Model Price", fmt_num(self.session.leg_price(&entry.leg), 4)),
                        ("Last Price", entry.leg.cost.to_string()),
                    ];
                    out.push_str(&greeks_table(Some(added.slot.name()), &added.greeks, &extra));
                }
                out.push_str(&self.positions_view());
                if self.session.state() == SessionState::TwoLegs {
                    out.push_str(&weights_view(&self.session.solve_hedge()?, self.sign_convention()));
                }
                Ok(out)
            }
            ReplCommand::Rmv { names, all } => {
                let targets = remove_targets(&names, all)?;
                if self.session.legs().is_empty() {
                    return Err(SessionError::NoLegs);
                }
                for target in &targets {
                    if let RemoveTarget::Slot(slot) = target {
                        if self.session.legs().get(*slot).is_none() {
                            return Err(SessionError::SlotEmpty(*slot));
                        }
                    }
                }

                let mut removed: Vec<Slot> = Vec::new();
                for target in targets {
                    removed.extend(self.session.rmv(target)?);
                }
                let names: Vec<&str> = removed.iter().map(|s| s.name()).collect();
                let mut out = format!("Removed {}.\n", names.join(", "));
                if !self.session.legs().is_empty() {
                    out.push_str(&self.positions_view());
                }
                Ok(out)
            }
            ReplCommand::Sop => {
                let report = self.session.sop()?;
                let mut out = self.positions_view();
                match report.weights {
                    Some(weights) => out.push_str(&weights_view(&weights, self.sign_convention())),
                    None => out.push_str(SECOND_LEG_HINT),
                }
                Ok(out)
            }
            ReplCommand::Plot => Ok(self.session.payoff()?.render()),
            ReplCommand::Help => Ok(self.help_view()),
            ReplCommand::Quit => Ok(String::new()),
        }
    }

    fn sign_convention(&self) -> SignConvention {
        self.session.config().solver.sign_convention
    }

    fn list_view(&self) -> String {
        let dash = || "-".to_string();
        let rows: Vec<Vec<String>> = self
            .session
            .list()
            .into_iter()
            .map(|row| {
                vec![
                    row.identifier.to_string(),
                    row.call.map(|s| s.to_string()).unwrap_or_else(dash),
                    row.put.map(|s| s.to_string()).unwrap_or_else(dash),
                ]
            })
            .collect();
        render_table(
            Some("Available Calls and Puts"),
            &["Identifier", "Calls", "Puts"],
            &rows,
        )
    }

    fn positions_view(&self) -> String {
        let rows: Vec<Vec<String>> = self
            .session
            .legs()
            .iter()
            .map(|(slot, SlotEntry { leg, .. })| {
                vec![
                    slot.name().to_string(),
                    leg.kind.to_string(),
                    leg.side.to_string(),
                    leg.strike.to_string(),
                    fmt_num(leg.implied_volatility, 4),
                ]
            })
            .collect();
        render_table(
            Some("Current Option Positions"),
            &["", "Type", "Hold", "Strike", "Implied Volatility"],
            &rows,
        )
    }

    fn help_view(&self) -> String {
        let session = &self.session;
        let position = session
            .underlying()
            .map(|u| u.label())
            .unwrap_or_else(|| "None".to_string());

        let mut out = format!(
            "Ticker: {}\nExpiry: {}\n\n    pick          pick the underlying asset position\n\nUnderlying Asset Position: {}\n\n",
            session.ticker(),
            session.expiration(),
            position
        );
        out.push_str("    list          show the available strike prices for calls and puts\n");

        let state = session.state();
        if state != SessionState::Empty {
            out.push_str("    add           add an option to the list of options\n");
        }
        if matches!(state, SessionState::OneLeg | SessionState::TwoLegs) {
            out.push_str("    rmv           remove an option from the list of options\n");
            out.push_str("    sop           show selected options and neutral portfolio weights\n");
            out.push_str("    plot          show the option payoff diagram\n");
        }
        out.push_str("    quit          leave the hedge menu\n");
        out
    }
}

fn greeks_table(title: Option<&str>, greeks: &Greeks, extra: &[(&str, String)]) -> String {
    let mut rows = vec![
        vec!["Delta".to_string(), fmt_num(greeks.delta, 4)],
        vec!["Gamma".to_string(), fmt_num(greeks.gamma, 4)],
        vec!["Vega".to_string(), fmt_num(greeks.vega, 4)],
    ];
    rows.extend(extra.iter().map(|(k, v)| vec![k.to_string(), v.clone()]));
    render_table(title, &["", "Positions"], &rows)
}

fn weights_view(weights: &HedgeWeights, convention: SignConvention) -> String {
    if !weights.is_solvable() {
        return UNSOLVABLE_MESSAGE.to_string();
    }
    let units = match convention {
        SignConvention::Exposure => "Units: contracts of each option as held (Long/Short), shares of the underlying.\n",
        SignConvention::DisplayOnly => "Units: long contracts of each option, shares of the underlying.\n",
    };
    let rows = vec![
        vec!["Weight Option A".to_string(), fmt_num(weights.option_a, 4)],
        vec!["Weight Option B".to_string(), fmt_num(weights.option_b, 4)],
        vec!["Weight Shares".to_string(), fmt_num(weights.shares, 4)],
    ];
    let mut out = render_table(Some("Neutral Portfolio Weights"), &["", "Positions"], &rows);
    out.push_str(units);
    if weights.is_singular {
        out.push_str(SINGULAR_WARNING);
    }
    out
}
