//! The two fixed option slots of a hedge.
//!
//! A slot holds a leg together with the Greeks computed for it, so the
//! two can only appear and disappear together.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::data::{OptionType, PositionSide};
use crate::greeks::Greeks;

/// Identity of an option slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    OptionA,
    OptionB,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::OptionA, Slot::OptionB];

    pub fn index(&self) -> usize {
        match self {
            Self::OptionA => 0,
            Self::OptionB => 1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OptionA => "Option A",
            Self::OptionB => "Option B",
        }
    }

    /// Parse a slot name, tolerating case and missing whitespace ("option a", "OptionB", "B").
    pub fn from_name(s: &str) -> Option<Self> {
        let compact: String = s.split_whitespace().collect::<String>().to_uppercase();
        match compact.as_str() {
            "OPTIONA" | "A" => Some(Self::OptionA),
            "OPTIONB" | "B" => Some(Self::OptionB),
            _ => None,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One option position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub kind: OptionType,
    pub side: PositionSide,
    pub strike: Decimal,
    pub implied_volatility: f64,
    /// Last traded price; shown and used for payoff, not for solving.
    pub cost: Decimal,
}

impl Leg {
    pub fn new(
        kind: OptionType,
        side: PositionSide,
        strike: Decimal,
        implied_volatility: f64,
        cost: Decimal,
    ) -> Self {
        Self {
            kind,
            side,
            strike,
            implied_volatility,
            cost,
        }
    }

    /// +1 long, -1 short.
    pub fn sign(&self) -> f64 {
        self.side.sign()
    }

    pub fn strike_f64(&self) -> f64 {
        self.strike.try_into().unwrap_or(0.0)
    }

    pub fn cost_f64(&self) -> f64 {
        self.cost.try_into().unwrap_or(0.0)
    }
}

/// A stored leg and its Greeks.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotEntry {
    pub leg: Leg,
    pub greeks: Greeks,
}

/// Fixed two-slot store. The first empty slot wins on insert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegSlots {
    entries: [Option<SlotEntry>; 2],
}

impl LegSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: Slot) -> Option<&SlotEntry> {
        self.entries[slot.index()].as_ref()
    }

    pub fn option_a(&self) -> Option<&SlotEntry> {
        self.get(Slot::OptionA)
    }

    pub fn option_b(&self) -> Option<&SlotEntry> {
        self.get(Slot::OptionB)
    }

    pub fn first_empty(&self) -> Option<Slot> {
        Slot::ALL.into_iter().find(|s| self.get(*s).is_none())
    }

    /// Store a leg in the first empty slot. Gives the entry back when both are taken.
    pub fn insert(&mut self, entry: SlotEntry) -> Result<Slot, SlotEntry> {
        match self.first_empty() {
            Some(slot) => {
                self.entries[slot.index()] = Some(entry);
                Ok(slot)
            }
            None => Err(entry),
        }
    }

    pub fn remove(&mut self, slot: Slot) -> Option<SlotEntry> {
        self.entries[slot.index()].take()
    }

    /// Empty both slots, returning the ones that were occupied.
    pub fn clear(&mut self) -> Vec<Slot> {
        let occupied = self.occupied();
        self.entries = [None, None];
        occupied
    }

    pub fn occupied(&self) -> Vec<Slot> {
        Slot::ALL.into_iter().filter(|s| self.get(*s).is_some()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slot, &SlotEntry)> {
        Slot::ALL
            .into_iter()
            .filter_map(move |s| self.get(s).map(|entry| (s, entry)))
    }

    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == 2
    }
}
