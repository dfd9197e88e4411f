//! Payoff-at-expiry diagrams.
//!
//! Each option leg pays `sign * (intrinsic - cost)` per unit at expiry. The
//! underlying contributes `underlying_sign * (price - spot)`. Prices are
//! sampled evenly across `spot * (1 +/- payoff_range_pct / 100)`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::table::{fmt_num, render_table};
use crate::data::OptionType;
use crate::session::Leg;

/// Half-width of the bar column, in characters.
const BAR_WIDTH: usize = 20;

/// Payoff rendering configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Number of price samples.
    pub payoff_points: usize,
    /// Sampled range around spot, in percent.
    pub payoff_range_pct: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            payoff_points: 21,
            payoff_range_pct: 20.0,
        }
    }
}

/// Payoff of every component at one underlying price.
#[derive(Debug, Clone, PartialEq)]
pub struct PayoffPoint {
    pub price: f64,
    /// One value per leg, in the order the legs were given.
    pub legs: Vec<f64>,
    pub underlying: f64,
    pub total: f64,
}

/// Sampled payoff curve for the current hedge.
#[derive(Debug, Clone, PartialEq)]
pub struct PayoffDiagram {
    pub ticker: String,
    pub expiration: NaiveDate,
    pub spot: f64,
    pub underlying_sign: f64,
    pub leg_labels: Vec<String>,
    pub points: Vec<PayoffPoint>,
}

/// Payoff of one leg at expiry for a given underlying price.
pub fn leg_payoff(leg: &Leg, price: f64) -> f64 {
    let strike = leg.strike_f64();
    let intrinsic = match leg.kind {
        OptionType::Call => (price - strike).max(0.0),
        OptionType::Put => (strike - price).max(0.0),
    };
    leg.sign() * (intrinsic - leg.cost_f64())
}

impl PayoffDiagram {
    pub fn build(
        spot: f64,
        legs: &[&Leg],
        underlying_sign: f64,
        ticker: &str,
        expiration: NaiveDate,
        config: &RenderConfig,
    ) -> Self {
        let points = config.payoff_points.max(2);
        let half_range = spot * config.payoff_range_pct / 100.0;
        let low = spot - half_range;
        let step = 2.0 * half_range / (points - 1) as f64;

        let points = (0..points)
            .map(|i| {
                let price = low + step * i as f64;
                let leg_values: Vec<f64> = legs.iter().map(|leg| leg_payoff(leg, price)).collect();
                let underlying = underlying_sign * (price - spot);
                let total = leg_values.iter().sum::<f64>() + underlying;
                PayoffPoint {
                    price,
                    legs: leg_values,
                    underlying,
                    total,
                }
            })
            .collect();

        let leg_labels = legs
            .iter()
            .map(|leg| format!("{} {} {}", leg.side, leg.kind, leg.strike))
            .collect();

        Self {
            ticker: ticker.to_string(),
            expiration,
            spot,
            underlying_sign,
            leg_labels,
            points,
        }
    }

    /// Total payoff sign changes, located by linear interpolation.
    pub fn break_evens(&self) -> Vec<f64> {
        self.points
            .windows(2)
            .filter_map(|w| {
                let (a, b) = (&w[0], &w[1]);
                if a.total == 0.0 {
                    Some(a.price)
                } else if a.total.signum() != b.total.signum() && b.total != 0.0 {
                    let t = a.total / (a.total - b.total);
                    Some(a.price + t * (b.price - a.price))
                } else {
                    None
                }
            })
            .collect()
    }

    fn bar(value: f64, scale: f64) -> String {
        let len = if scale > 0.0 {
            ((value.abs() / scale) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let len = len.min(BAR_WIDTH);
        if value < 0.0 {
            format!("{}{}|", " ".repeat(BAR_WIDTH - len), "=".repeat(len))
        } else {
            format!("{}|{}", " ".repeat(BAR_WIDTH), "=".repeat(len))
        }
    }

    pub fn render(&self) -> String {
        let mut headers: Vec<&str> = vec!["Price"];
        headers.extend(self.leg_labels.iter().map(String::as_str));
        headers.extend(["Underlying", "Total", "Payoff"]);

        let scale = self
            .points
            .iter()
            .fold(0.0_f64, |acc, p| acc.max(p.total.abs()));

        let rows: Vec<Vec<String>> = self
            .points
            .iter()
            .map(|p| {
                let mut row = vec![fmt_num(p.price, 2)];
                row.extend(p.legs.iter().map(|v| fmt_num(*v, 2)));
                row.push(fmt_num(p.underlying, 2));
                row.push(fmt_num(p.total, 2));
                row.push(Self::bar(p.total, scale));
                row
            })
            .collect();

        let title = format!(
            "Payoff at expiry for {} {} (spot {})",
            self.ticker,
            self.expiration,
            fmt_num(self.spot, 2)
        );
        let mut out = render_table(Some(&title), &headers, &rows);

        let break_evens = self.break_evens();
        if !break_evens.is_empty() {
            let formatted: Vec<String> = break_evens.iter().map(|b| fmt_num(*b, 2)).collect();
            out.push_str(&format!("Break-even: {}\n", formatted.join(", ")));
        }
        out
    }
}
