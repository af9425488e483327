//! Engine errors and the coarse kinds callers branch on.

use crate::models::event::{EventId, EventStatus};
use crate::models::game::{MatchId, MatchStatus, Slot};
use crate::models::registration::{RegistrationId, TeamId};
use serde::Serialize;
use thiserror::Error;

/// Result alias used across the engine.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Coarse error taxonomy exposed to API consumers.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed input: negative score, tied submission, bad roster.
    Validation,
    /// Illegal state transition.
    State,
    /// Race or replay: someone else already did this.
    Conflict,
    NotFound,
    InsufficientTeams,
    /// Storage fault.
    Internal,
}

/// Errors that can occur during engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Need at least 2 accepted teams to generate a bracket (found {found})")]
    InsufficientTeams { found: usize },

    #[error("Bracket for event {0} has already been generated")]
    AlreadyGenerated(EventId),

    #[error("Event {0} was modified concurrently; reload and retry")]
    PersistenceConflict(EventId),

    #[error("Cannot {action} a match that is {from}")]
    InvalidTransition {
        from: MatchStatus,
        action: &'static str,
    },

    #[error("Cannot {action} an event that is {from}")]
    InvalidEventTransition {
        from: EventStatus,
        action: &'static str,
    },

    #[error("Event {0} not found")]
    EventNotFound(EventId),

    #[error("Match {0} not found")]
    MatchNotFound(MatchId),

    #[error("Registration {0} not found")]
    RegistrationNotFound(RegistrationId),

    #[error("Scores must not be negative")]
    NegativeScore,

    #[error("A tied score cannot be submitted")]
    TiedScore,

    #[error("Validator {validator_id} has already validated this match")]
    DuplicateValidation { validator_id: String },

    #[error("Slot {side} of match {match_id} is already filled")]
    SlotAlreadyFilled { match_id: MatchId, side: Slot },

    #[error("Team {team_id} has {found} players, format requires {expected}")]
    IncompleteRoster {
        team_id: TeamId,
        expected: usize,
        found: usize,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        use EngineError::*;
        match self {
            InsufficientTeams { .. } => ErrorKind::InsufficientTeams,
            AlreadyGenerated(_)
            | PersistenceConflict(_)
            | DuplicateValidation { .. }
            | SlotAlreadyFilled { .. } => ErrorKind::Conflict,
            InvalidTransition { .. } | InvalidEventTransition { .. } => ErrorKind::State,
            EventNotFound(_) | MatchNotFound(_) | RegistrationNotFound(_) => ErrorKind::NotFound,
            NegativeScore | TiedScore | IncompleteRoster { .. } | InvalidInput(_) => {
                ErrorKind::Validation
            }
            Storage(_) => ErrorKind::Internal,
        }
    }
}

impl From<csv::Error> for EngineError {
    fn from(e: csv::Error) -> Self {
        EngineError::InvalidInput(format!("csv: {e}"))
    }
}
