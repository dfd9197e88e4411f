//! Hedge session state machine.
//!
//! States, by what has been populated:
//! 1. Empty: nothing picked yet
//! 2. PositionPicked: underlying position and its ("Portfolio") Greeks
//! 3. OneLeg: one option slot filled
//! 4. TwoLegs: both slots filled, neutral weights available
//!
//! `rmv` walks back down to PositionPicked but never clears the position.
//! A later `pick` replaces the position and its Greeks and keeps the legs.

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::SessionError;
use super::slots::{Leg, LegSlots, Slot, SlotEntry};
use crate::config::HedgeConfig;
use crate::data::{MarketDataProvider, MarketSnapshot, OptionType, OptionsChain, PositionSide};
use crate::greeks::{Greeks, GreeksCalculator};
use crate::hedge::{HedgeGreeks, HedgeSolver, HedgeWeights};
use crate::render::PayoffDiagram;

/// Session behaviour settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Amount used by `pick` when none is given.
    pub default_amount: f64,
    /// Maintain completion choices for an interactive front end.
    pub completion: bool,
    /// Strike step for the generated `pick` choices.
    pub pick_strike_step: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_amount: 1000.0,
            completion: true,
            pick_strike_step: 5,
        }
    }
}

/// Coarse session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Empty,
    PositionPicked,
    OneLeg,
    TwoLegs,
}

/// The position being hedged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderlyingPosition {
    pub side: PositionSide,
    /// Option side the reference strike is valued as.
    pub option_side: OptionType,
    pub amount: f64,
    pub strike: Decimal,
    pub implied_volatility: f64,
}

impl UnderlyingPosition {
    pub fn sign(&self) -> f64 {
        self.side.sign()
    }

    /// e.g. "Short Put 1000 @ 150"
    pub fn label(&self) -> String {
        format!("{} {} {} @ {}", self.side, self.option_side, self.amount, self.strike)
    }
}

/// What removing legs should target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveTarget {
    Slot(Slot),
    All,
}

impl RemoveTarget {
    /// Parse "Option A", "Option B" or "all".
    pub fn parse(s: &str) -> Result<Self, SessionError> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        Slot::from_name(s)
            .map(Self::Slot)
            .ok_or_else(|| SessionError::UnknownSlot(s.trim().to_string()))
    }
}

/// Result of a successful `add`.
#[derive(Debug, Clone, PartialEq)]
pub struct AddOutcome {
    pub slot: Slot,
    pub greeks: Greeks,
}

/// One line of the `list` table.
#[derive(Debug, Clone, PartialEq)]
pub struct StrikeRow {
    pub identifier: usize,
    pub call: Option<Decimal>,
    pub put: Option<Decimal>,
}

/// Legs and, when both slots are filled, neutral weights.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub legs: Vec<(Slot, Leg)>,
    pub weights: Option<HedgeWeights>,
}

/// Completion choices for an interactive front end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionChoices {
    /// "<strike> <Long|Short> <Call|Put>" combinations for `pick`.
    pub pick: Vec<String>,
    /// Valid `add` identifiers are `0..add_identifiers`.
    pub add_identifiers: usize,
    /// Slots `rmv` can currently clear.
    pub rmv: Vec<Slot>,
}

/// Interactive hedging session over one ticker and expiration.
pub struct HedgeSession {
    config: HedgeConfig,
    calculator: GreeksCalculator,
    solver: HedgeSolver,
    market: MarketSnapshot,
    valuation_date: NaiveDate,
    underlying: Option<UnderlyingPosition>,
    portfolio_greeks: Option<Greeks>,
    legs: LegSlots,
    choices: SessionChoices,
}

impl HedgeSession {
    /// Create a session over already fetched market data, valued today.
    pub fn new(market: MarketSnapshot, config: HedgeConfig) -> Self {
        let mut session = Self {
            calculator: config.pricing.calculator(),
            solver: HedgeSolver::new(config.solver),
            config,
            market,
            valuation_date: Local::now().date_naive(),
            underlying: None,
            portfolio_greeks: None,
            legs: LegSlots::new(),
            choices: SessionChoices::default(),
        };
        session.init_choices();
        session
    }

    /// Fetch market data once and start a session.
    pub fn open(
        provider: &dyn MarketDataProvider,
        ticker: &str,
        expiration: NaiveDate,
        config: HedgeConfig,
    ) -> Result<Self, SessionError> {
        let market = provider.snapshot(ticker, expiration)?;
        info!(
            ticker = %market.ticker,
            %expiration,
            spot = %market.spot_price,
            calls = market.chain.calls.len(),
            puts = market.chain.puts.len(),
            "Opened hedge session"
        );
        Ok(Self::new(market, config))
    }

    /// Value the session as of a fixed date instead of today.
    pub fn with_valuation_date(mut self, date: NaiveDate) -> Self {
        self.valuation_date = date;
        self
    }

    pub fn ticker(&self) -> &str {
        &self.market.ticker
    }

    pub fn expiration(&self) -> NaiveDate {
        self.market.expiration()
    }

    pub fn spot_price(&self) -> Decimal {
        self.market.spot_price
    }

    pub fn chain(&self) -> &OptionsChain {
        &self.market.chain
    }

    pub fn config(&self) -> &HedgeConfig {
        &self.config
    }

    pub fn underlying(&self) -> Option<&UnderlyingPosition> {
        self.underlying.as_ref()
    }

    pub fn portfolio_greeks(&self) -> Option<&Greeks> {
        self.portfolio_greeks.as_ref()
    }

    pub fn legs(&self) -> &LegSlots {
        &self.legs
    }

    pub fn choices(&self) -> &SessionChoices {
        &self.choices
    }

    pub fn state(&self) -> SessionState {
        if self.portfolio_greeks.is_none() {
            return SessionState::Empty;
        }
        match self.legs.len() {
            0 => SessionState::PositionPicked,
            1 => SessionState::OneLeg,
            _ => SessionState::TwoLegs,
        }
    }

    /// Days to expiry counting today, floored at `min_days_to_expiry`.
    pub fn days_to_expiry(&self) -> f64 {
        let days = (self.expiration() - self.valuation_date).num_days() + 1;
        let days = days as f64;
        if days <= 0.0 {
            self.config.pricing.min_days_to_expiry
        } else {
            days.max(self.config.pricing.min_days_to_expiry)
        }
    }

    pub fn time_to_expiry_years(&self) -> f64 {
        self.days_to_expiry() / 365.0
    }

    fn compute_greeks(&self, strike: f64, implied_volatility: f64, option_type: OptionType) -> Greeks {
        self.calculator.compute_greeks(
            self.market.spot_f64(),
            implied_volatility,
            strike,
            self.time_to_expiry_years(),
            option_type.side(),
        )
    }

    /// Model premium of one contract of `leg`, for comparison with its last price.
    pub fn leg_price(&self, leg: &Leg) -> f64 {
        self.calculator.price(
            self.market.spot_f64(),
            leg.implied_volatility,
            leg.strike_f64(),
            self.time_to_expiry_years(),
            leg.kind.side(),
        )
    }

    /// Strikes by identifier, calls and puts side by side.
    pub fn list(&self) -> Vec<StrikeRow> {
        let chain = self.chain();
        (0..chain.max_len())
            .map(|i| StrikeRow {
                identifier: i,
                call: chain.calls.get(i).map(|q| q.strike),
                put: chain.puts.get(i).map(|q| q.strike),
            })
            .collect()
    }

    /// Set the underlying position and compute its Greeks.
    ///
    /// The strike must exist on the `option_side` of the chain; its implied
    /// volatility values the position.
    pub fn pick(
        &mut self,
        strike: Decimal,
        side: PositionSide,
        option_side: OptionType,
        amount: Option<f64>,
    ) -> Result<Greeks, SessionError> {
        let amount = amount.unwrap_or(self.config.session.default_amount);
        if !(amount > 0.0 && amount.is_finite()) {
            return Err(SessionError::InvalidAmount(amount));
        }

        let quote = self
            .chain()
            .quote_at_strike(option_side, strike)
            .ok_or(SessionError::StrikeNotFound {
                strike,
                option_type: option_side,
            })?;
        let implied_volatility = quote.implied_volatility;
        let strike_f64 = quote.strike_f64();
        if implied_volatility < 0.0 {
            return Err(SessionError::InvalidVolatility {
                strike,
                implied_volatility,
            });
        }

        let greeks = self.compute_greeks(strike_f64, implied_volatility, option_side);
        let position = UnderlyingPosition {
            side,
            option_side,
            amount,
            strike,
            implied_volatility,
        };

        info!(
            position = %position.label(),
            delta = greeks.delta,
            gamma = greeks.gamma,
            vega = greeks.vega,
            "Picked underlying position"
        );

        self.underlying = Some(position);
        self.portfolio_greeks = Some(greeks);
        self.refresh_choices();
        Ok(greeks)
    }

    /// Add the chain quote at `identifier` as a leg.
    pub fn add(
        &mut self,
        kind: OptionType,
        side: PositionSide,
        identifier: usize,
    ) -> Result<AddOutcome, SessionError> {
        if self.portfolio_greeks.is_none() {
            return Err(SessionError::NoPosition);
        }

        let quotes = self.chain().side(kind);
        let quote = quotes.get(identifier).ok_or(SessionError::InvalidIdentifier {
            identifier,
            option_type: kind,
            available: quotes.len(),
        })?;

        let leg = Leg::new(kind, side, quote.strike, quote.implied_volatility, quote.last_price);
        self.add_leg(leg)
    }

    /// Compute a leg's Greeks and store it in the first empty slot.
    pub fn add_leg(&mut self, leg: Leg) -> Result<AddOutcome, SessionError> {
        if self.portfolio_greeks.is_none() {
            return Err(SessionError::NoPosition);
        }
        if self.legs.is_full() {
            return Err(SessionError::SlotsFull);
        }
        if leg.implied_volatility < 0.0 {
            return Err(SessionError::InvalidVolatility {
                strike: leg.strike,
                implied_volatility: leg.implied_volatility,
            });
        }

        let greeks = self.compute_greeks(leg.strike_f64(), leg.implied_volatility, leg.kind);
        let description = format!("{} {} {}", leg.side, leg.kind, leg.strike);
        let slot = self
            .legs
            .insert(SlotEntry { leg, greeks })
            .map_err(|_| SessionError::SlotsFull)?;

        info!(
            %slot,
            leg = %description,
            delta = greeks.delta,
            gamma = greeks.gamma,
            vega = greeks.vega,
            "Added option"
        );

        self.refresh_choices();
        Ok(AddOutcome { slot, greeks })
    }

    /// Remove one slot's leg, or both.
    pub fn rmv(&mut self, target: RemoveTarget) -> Result<Vec<Slot>, SessionError> {
        if self.legs.is_empty() {
            return Err(SessionError::NoLegs);
        }

        let removed = match target {
            RemoveTarget::All => self.legs.clear(),
            RemoveTarget::Slot(slot) => match self.legs.remove(slot) {
                Some(_) => vec![slot],
                None => return Err(SessionError::SlotEmpty(slot)),
            },
        };

        info!(?removed, remaining = self.legs.len(), "Removed options");
        self.refresh_choices();
        Ok(removed)
    }

    /// Neutral weights for the current position and both legs, in units of
    /// each held leg (see [`HedgeSolver::leg_exposure`]).
    pub fn solve_hedge(&self) -> Result<HedgeWeights, SessionError> {
        let (position, portfolio) = match (&self.underlying, &self.portfolio_greeks) {
            (Some(position), Some(greeks)) => (position, *greeks),
            _ => return Err(SessionError::NoPosition),
        };
        let (a, b) = match (self.legs.option_a(), self.legs.option_b()) {
            (Some(a), Some(b)) => (a, b),
            _ => return Err(SessionError::IncompleteHedge),
        };

        let greeks = HedgeGreeks {
            portfolio,
            option_a: self.solver.leg_exposure(&a.greeks, a.leg.side),
            option_b: self.solver.leg_exposure(&b.greeks, b.leg.side),
        };
        let weights = self
            .solver
            .calc_hedge(position.amount, position.option_side, &greeks, position.side);

        if !weights.is_solvable() {
            warn!("Current option combination cannot be neutralized");
        } else {
            debug!(?weights, "Neutral weights");
        }
        Ok(weights)
    }

    /// Current legs, plus weights when both slots are filled.
    pub fn sop(&self) -> Result<SessionReport, SessionError> {
        if self.legs.is_empty() {
            return Err(SessionError::NoLegs);
        }
        let legs = self.legs.iter().map(|(slot, e)| (slot, e.leg.clone())).collect();
        let weights = if self.legs.is_full() {
            Some(self.solve_hedge()?)
        } else {
            None
        };
        Ok(SessionReport { legs, weights })
    }

    /// Payoff diagram of the current legs against the underlying.
    pub fn payoff(&self) -> Result<PayoffDiagram, SessionError> {
        if self.legs.is_empty() {
            return Err(SessionError::NoLegs);
        }
        let legs: Vec<&Leg> = self.legs.iter().map(|(_, e)| &e.leg).collect();
        let underlying_sign = self.underlying.as_ref().map(|u| u.sign()).unwrap_or(0.0);
        Ok(PayoffDiagram::build(
            self.market.spot_f64(),
            &legs,
            underlying_sign,
            self.ticker(),
            self.expiration(),
            &self.config.render,
        ))
    }

    fn init_choices(&mut self) {
        if !self.config.session.completion {
            return;
        }

        let calls = &self.market.chain.calls;
        let (first, last) = match (calls.first(), calls.last()) {
            (Some(f), Some(l)) => (f.strike_f64() as i64, l.strike_f64() as i64),
            _ => (0, 0),
        };
        let step = self.config.session.pick_strike_step.max(1) as usize;

        let mut pick = Vec::new();
        for strike in (first..last).step_by(step) {
            for position in [PositionSide::Long, PositionSide::Short] {
                for side in [OptionType::Call, OptionType::Put] {
                    pick.push(format!("{} {} {}", strike, position, side));
                }
            }
        }

        self.choices.pick = pick;
        self.choices.add_identifiers = self.market.chain.max_len();
        self.refresh_choices();
    }

    /// Recompute the removable slots after a mutating command.
    fn refresh_choices(&mut self) {
        if !self.config.session.completion {
            return;
        }
        self.choices.rmv = self.legs.occupied();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::OptionQuote;
    use crate::hedge::SignConvention;
    use approx::assert_relative_eq;
    use rust_decimal_macros::dec;

    fn expiry() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 12, 18).unwrap()
    }

    fn valuation() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, 18).unwrap()
    }

    fn market() -> MarketSnapshot {
        let calls = vec![
            OptionQuote::new(dec!(90), 0.30, dec!(11.20)),
            OptionQuote::new(dec!(95), 0.27, dec!(7.10)),
            OptionQuote::new(dec!(100), 0.25, dec!(3.90)),
            OptionQuote::new(dec!(105), 0.23, dec!(1.75)),
            OptionQuote::new(dec!(110), 0.22, dec!(0.65)),
        ];
        let puts = vec![
            OptionQuote::new(dec!(90), 0.33, dec!(0.80)),
            OptionQuote::new(dec!(95), 0.30, dec!(1.85)),
            OptionQuote::new(dec!(100), 0.28, dec!(3.70)),
            OptionQuote::new(dec!(105), 0.26, dec!(6.60)),
        ];
        MarketSnapshot::new("SPY", dec!(100.50), OptionsChain::new(expiry(), calls, puts))
    }

    fn session() -> HedgeSession {
        HedgeSession::new(market(), HedgeConfig::default()).with_valuation_date(valuation())
    }

    fn picked() -> HedgeSession {
        let mut s = session();
        s.pick(dec!(100), PositionSide::Short, OptionType::Put, Some(1000.0))
            .unwrap();
        s
    }

    #[test]
    fn test_days_to_expiry_counts_today() {
        let s = session();
        assert_eq!(s.days_to_expiry(), 31.0);
        assert_relative_eq!(s.time_to_expiry_years(), 31.0 / 365.0);
    }

    #[test]
    fn test_expired_chain_is_floored() {
        let s = session().with_valuation_date(NaiveDate::from_ymd_opt(2027, 1, 5).unwrap());
        assert_eq!(s.days_to_expiry(), 1.0);
        let s = session().with_valuation_date(expiry());
        assert_eq!(s.days_to_expiry(), 1.0);
    }

    #[test]
    fn test_list_pads_shorter_side() {
        let rows = session().list();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[4].call, Some(dec!(110)));
        assert_eq!(rows[4].put, None);
        assert_eq!(rows[0].put, Some(dec!(90)));
    }

    #[test]
    fn test_pick_populates_portfolio_greeks() {
        let mut s = session();
        assert_eq!(s.state(), SessionState::Empty);

        let greeks = s
            .pick(dec!(100), PositionSide::Short, OptionType::Put, Some(1000.0))
            .unwrap();

        assert_eq!(s.state(), SessionState::PositionPicked);
        assert_eq!(s.portfolio_greeks(), Some(&greeks));
        assert!(greeks.delta < 0.0);
        assert!(greeks.gamma > 0.0);
        let position = s.underlying().unwrap();
        assert_eq!(position.implied_volatility, 0.28);
        assert_eq!(position.label(), "Short Put 1000 @ 100");
    }

    #[test]
    fn test_pick_uses_default_amount() {
        let mut s = session();
        s.pick(dec!(95), PositionSide::Long, OptionType::Call, None).unwrap();
        assert_eq!(s.underlying().unwrap().amount, 1000.0);
    }

    #[test]
    fn test_pick_unknown_strike_is_error() {
        let mut s = session();
        let err = s
            .pick(dec!(110), PositionSide::Long, OptionType::Put, None)
            .unwrap_err();
        assert!(matches!(err, SessionError::StrikeNotFound { .. }));
        assert_eq!(s.state(), SessionState::Empty);
        assert!(s.underlying().is_none());
    }

    #[test]
    fn test_pick_rejects_non_positive_amount() {
        let mut s = session();
        let err = s
            .pick(dec!(100), PositionSide::Long, OptionType::Call, Some(0.0))
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidAmount(_)));
    }

    #[test]
    fn test_repick_overwrites_and_keeps_legs() {
        let mut s = picked();
        s.add(OptionType::Call, PositionSide::Long, 2).unwrap();
        let first = *s.portfolio_greeks().unwrap();

        let second = s
            .pick(dec!(105), PositionSide::Long, OptionType::Call, Some(500.0))
            .unwrap();

        assert_ne!(first, second);
        assert_eq!(s.portfolio_greeks(), Some(&second));
        assert_eq!(s.underlying().unwrap().amount, 500.0);
        assert_eq!(s.state(), SessionState::OneLeg);
    }

    #[test]
    fn test_add_before_pick_is_rejected() {
        let mut s = session();
        let err = s.add(OptionType::Call, PositionSide::Long, 0).unwrap_err();
        assert!(matches!(err, SessionError::NoPosition));
        assert!(s.legs().option_a().is_none());
        assert!(s.legs().option_b().is_none());
        assert_eq!(s.state(), SessionState::Empty);
    }

    #[test]
    fn test_add_invalid_identifier() {
        let mut s = picked();
        let err = s.add(OptionType::Put, PositionSide::Long, 4).unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidIdentifier {
                identifier: 4,
                available: 4,
                ..
            }
        ));
        assert!(s.legs().is_empty());
    }

    #[test]
    fn test_add_third_leg_is_rejected() {
        let mut s = picked();
        s.add(OptionType::Call, PositionSide::Long, 2).unwrap();
        s.add(OptionType::Put, PositionSide::Short, 1).unwrap();
        let before = s.legs().clone();

        let err = s.add(OptionType::Call, PositionSide::Short, 4).unwrap_err();
        assert!(matches!(err, SessionError::SlotsFull));
        assert_eq!(s.legs(), &before);
    }

    #[test]
    fn test_session_scenario() {
        let mut s = picked();
        let portfolio = *s.portfolio_greeks().unwrap();

        let a = s.add(OptionType::Call, PositionSide::Long, 2).unwrap();
        assert_eq!(a.slot, Slot::OptionA);
        assert_eq!(s.state(), SessionState::OneLeg);
        assert!(matches!(s.solve_hedge(), Err(SessionError::IncompleteHedge)));

        let b = s.add(OptionType::Put, PositionSide::Short, 1).unwrap();
        assert_eq!(b.slot, Slot::OptionB);
        assert_eq!(s.state(), SessionState::TwoLegs);
        assert_eq!(s.legs().option_a().unwrap().greeks, a.greeks);
        assert_eq!(s.legs().option_b().unwrap().greeks, b.greeks);

        let weights = s.solve_hedge().unwrap();
        assert!(weights.is_solvable());
        assert!(!weights.is_singular);

        let report = s.sop().unwrap();
        assert_eq!(report.legs.len(), 2);
        assert_eq!(report.weights, Some(weights));

        assert_eq!(s.rmv(RemoveTarget::Slot(Slot::OptionA)).unwrap(), vec![Slot::OptionA]);
        assert!(s.legs().option_a().is_none());
        assert_eq!(s.legs().option_b().unwrap().greeks, b.greeks);
        assert_eq!(s.portfolio_greeks(), Some(&portfolio));
        assert_eq!(s.state(), SessionState::OneLeg);
        assert_eq!(s.sop().unwrap().weights, None);

        s.add(OptionType::Call, PositionSide::Long, 3).unwrap();
        assert_eq!(s.legs().option_a().unwrap().leg.strike, dec!(105));

        assert_eq!(s.rmv(RemoveTarget::All).unwrap(), vec![Slot::OptionA, Slot::OptionB]);
        assert_eq!(s.state(), SessionState::PositionPicked);
        assert!(s.legs().is_empty());
        assert_eq!(s.portfolio_greeks(), Some(&portfolio));
    }

    #[test]
    fn test_weights_neutralize_session_exposure() {
        let mut s = picked();
        s.add(OptionType::Call, PositionSide::Long, 2).unwrap();
        s.add(OptionType::Put, PositionSide::Short, 1).unwrap();

        let w = s.solve_hedge().unwrap();
        let p = s.portfolio_greeks().unwrap().scaled(-1000.0); // short 1000
        let a = s.legs().option_a().unwrap().greeks;
        let b = s.legs().option_b().unwrap().greeks.scaled(-1.0); // short put

        assert_relative_eq!(p.gamma + a.gamma * w.option_a + b.gamma * w.option_b, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.vega + a.vega * w.option_a + b.vega * w.option_b, 0.0, epsilon = 1e-6);
        assert_relative_eq!(
            p.delta + a.delta * w.option_a + b.delta * w.option_b + w.shares,
            0.0,
            epsilon = 1e-6
        );
    }

    fn two_leg_weights(config: HedgeConfig, side: PositionSide) -> HedgeWeights {
        let mut s = HedgeSession::new(market(), config).with_valuation_date(valuation());
        s.pick(dec!(100), PositionSide::Short, OptionType::Put, None).unwrap();
        s.add(OptionType::Call, side, 1).unwrap();
        s.add(OptionType::Put, side, 0).unwrap();
        s.solve_hedge().unwrap()
    }

    #[test]
    fn test_short_legs_flip_option_weights() {
        let long = two_leg_weights(HedgeConfig::default(), PositionSide::Long);
        let short = two_leg_weights(HedgeConfig::default(), PositionSide::Short);

        assert!(long.is_solvable());
        assert_ne!(long, short);
        assert_relative_eq!(short.option_a, -long.option_a, epsilon = 1e-9);
        assert_relative_eq!(short.option_b, -long.option_b, epsilon = 1e-9);
        assert_relative_eq!(short.shares, long.shares, epsilon = 1e-9);
    }

    #[test]
    fn test_display_only_convention_ignores_leg_side() {
        let config = HedgeConfig {
            solver: crate::hedge::SolverConfig {
                sign_convention: SignConvention::DisplayOnly,
                ..Default::default()
            },
            ..Default::default()
        };
        let long = two_leg_weights(config.clone(), PositionSide::Long);
        let short = two_leg_weights(config, PositionSide::Short);
        assert_eq!(long, short);
    }

    #[test]
    fn test_display_only_convention_ignores_short() {
        let config = HedgeConfig {
            solver: crate::hedge::SolverConfig {
                sign_convention: SignConvention::DisplayOnly,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut short = HedgeSession::new(market(), config.clone()).with_valuation_date(valuation());
        let mut long = HedgeSession::new(market(), config).with_valuation_date(valuation());
        short.pick(dec!(100), PositionSide::Short, OptionType::Put, None).unwrap();
        long.pick(dec!(100), PositionSide::Long, OptionType::Put, None).unwrap();
        for s in [&mut short, &mut long] {
            s.add(OptionType::Call, PositionSide::Long, 2).unwrap();
            s.add(OptionType::Put, PositionSide::Short, 1).unwrap();
        }
        assert_eq!(short.solve_hedge().unwrap(), long.solve_hedge().unwrap());
    }

    #[test]
    fn test_same_leg_twice_is_singular() {
        let mut s = picked();
        s.add(OptionType::Call, PositionSide::Long, 2).unwrap();
        s.add(OptionType::Call, PositionSide::Long, 2).unwrap();

        let w = s.solve_hedge().unwrap();
        assert!(w.is_singular);
    }

    #[test]
    fn test_rmv_without_legs() {
        let mut s = picked();
        assert!(matches!(s.rmv(RemoveTarget::All), Err(SessionError::NoLegs)));
        assert!(matches!(s.sop(), Err(SessionError::NoLegs)));
        assert!(matches!(s.payoff(), Err(SessionError::NoLegs)));
    }

    #[test]
    fn test_rmv_empty_slot() {
        let mut s = picked();
        s.add(OptionType::Call, PositionSide::Long, 2).unwrap();
        let err = s.rmv(RemoveTarget::Slot(Slot::OptionB)).unwrap_err();
        assert!(matches!(err, SessionError::SlotEmpty(Slot::OptionB)));
        assert_eq!(s.legs().len(), 1);
    }

    #[test]
    fn test_remove_target_parse() {
        assert_eq!(RemoveTarget::parse("all").unwrap(), RemoveTarget::All);
        assert_eq!(
            RemoveTarget::parse("Option B").unwrap(),
            RemoveTarget::Slot(Slot::OptionB)
        );
        assert!(matches!(
            RemoveTarget::parse("Option C"),
            Err(SessionError::UnknownSlot(name)) if name == "Option C"
        ));
    }

    #[test]
    fn test_choices_follow_mutations() {
        let mut s = picked();
        assert!(s.choices().rmv.is_empty());
        assert_eq!(s.choices().add_identifiers, 5);
        // Strikes 90, 95, 100, 105 (last excluded) x Long/Short x Call/Put
        assert_eq!(s.choices().pick.len(), 16);
        assert_eq!(s.choices().pick[0], "90 Long Call");

        s.add(OptionType::Call, PositionSide::Long, 2).unwrap();
        assert_eq!(s.choices().rmv, vec![Slot::OptionA]);
        s.add(OptionType::Put, PositionSide::Short, 1).unwrap();
        assert_eq!(s.choices().rmv, vec![Slot::OptionA, Slot::OptionB]);
        s.rmv(RemoveTarget::Slot(Slot::OptionA)).unwrap();
        assert_eq!(s.choices().rmv, vec![Slot::OptionB]);
    }

    #[test]
    fn test_choices_disabled() {
        let config = HedgeConfig {
            session: SessionConfig {
                completion: false,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut s = HedgeSession::new(market(), config).with_valuation_date(valuation());
        s.pick(dec!(100), PositionSide::Long, OptionType::Call, None).unwrap();
        s.add(OptionType::Call, PositionSide::Long, 0).unwrap();
        assert_eq!(s.choices(), &SessionChoices::default());
    }

    #[test]
    fn test_leg_price_uses_session_time() {
        let mut s = picked();
        s.add(OptionType::Call, PositionSide::Long, 2).unwrap();
        let leg = s.legs().option_a().unwrap().leg.clone();

        let expected = GreeksCalculator::default().price(100.5, 0.25, 100.0, 31.0 / 365.0, 1);
        assert_relative_eq!(s.leg_price(&leg), expected);
        assert!(s.leg_price(&leg) > 0.5);
    }

    #[test]
    fn test_payoff_uses_underlying_sign() {
        let mut s = picked();
        s.add(OptionType::Call, PositionSide::Long, 2).unwrap();
        let diagram = s.payoff().unwrap();
        assert_eq!(diagram.underlying_sign, -1.0);
        assert_eq!(diagram.ticker, "SPY");
        assert_eq!(diagram.leg_labels.len(), 1);
        assert_eq!(diagram.points.len(), s.config().render.payoff_points);
    }

    #[test]
    fn test_open_from_provider() {
        let provider = crate::data::StaticProvider::new().with_snapshot(market());
        let s = HedgeSession::open(&provider, "spy", expiry(), HedgeConfig::default()).unwrap();
        assert_eq!(s.ticker(), "SPY");
        assert_eq!(s.spot_price(), dec!(100.50));

        let missing = HedgeSession::open(&provider, "QQQ", expiry(), HedgeConfig::default());
        assert!(matches!(missing, Err(SessionError::MarketData(_))));
    }
}
