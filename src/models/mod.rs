//! Data structures for the tournament engine: events, registrations, matches, brackets.

mod bracket;
mod error;
mod event;
mod game;
mod registration;

pub use bracket::{Bracket, BracketRound};
pub use error::{EngineError, ErrorKind, Result};
pub use event::{Event, EventId, EventRecord, EventStatus};
pub use game::{BracketPosition, GameMatch, MatchId, MatchStatus, Score, Slot, Validation};
pub use registration::{Registration, RegistrationId, RegistrationStatus, TeamId};
