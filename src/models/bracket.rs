//! Read-only bracket view derived from the event's matches.

use crate::models::event::{EventId, EventStatus};
use crate::models::game::GameMatch;
use crate::models::registration::TeamId;
use serde::{Deserialize, Serialize};

/// One round of the bracket, matches ordered by match number.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketRound {
    pub round: u32,
    pub matches: Vec<GameMatch>,
}

/// The full round/match tree for an event, rounds ascending.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub event_id: EventId,
    pub status: EventStatus,
    pub champion: Option<TeamId>,
    pub rounds: Vec<BracketRound>,
}

impl Bracket {
    /// The final match, if the bracket has been generated.
    pub fn final_match(&self) -> Option<&GameMatch> {
        self.rounds.last().and_then(|r| r.matches.first())
    }

    pub fn round(&self, round: u32) -> Option<&BracketRound> {
        self.rounds.iter().find(|r| r.round == round)
    }
}
