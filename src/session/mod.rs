//! Interactive hedging session.
//!
//! Provides:
//! - The underlying position picked for hedging
//! - Two fixed option slots (Option A, Option B)
//! - Neutral weights once both slots are filled

pub mod error;
pub mod slots;
pub mod state;

pub use error::SessionError;
pub use slots::{Leg, LegSlots, Slot, SlotEntry};
pub use state::{
    AddOutcome, HedgeSession, RemoveTarget, SessionChoices, SessionConfig, SessionReport,
    SessionState, StrikeRow, UnderlyingPosition,
};
