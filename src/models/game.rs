//! Match entity: slots, status, score, bracket position and validations.

use crate::models::event::EventId;
use crate::models::registration::TeamId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// One of the two team slots of a match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    #[default]
    A,
    B,
}

impl Slot {
    /// Slot of the parent match fed by match `match_number`: odd numbers feed A, even feed B.
    pub fn for_match_number(match_number: u32) -> Self {
        if match_number % 2 == 1 {
            Slot::A
        } else {
            Slot::B
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::A => write!(f, "team_a"),
            Slot::B => write!(f, "team_b"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Upcoming,
    InProgress,
    /// Result submitted, waiting for enough validations.
    PendingValidation,
    Finished,
    Cancelled,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Upcoming => write!(f, "upcoming"),
            MatchStatus::InProgress => write!(f, "in_progress"),
            MatchStatus::PendingValidation => write!(f, "pending_validation"),
            MatchStatus::Finished => write!(f, "finished"),
            MatchStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub a: u32,
    pub b: u32,
}

/// Where a match sits in the bracket.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketPosition {
    /// 1 for the first played round, increasing toward the final.
    pub round: u32,
    /// 1-based within the round.
    pub match_number: u32,
    /// Slot of the parent match the winner feeds; `None` on the final.
    pub side: Option<Slot>,
}

impl BracketPosition {
    /// Address of the match this one's winner advances into, if any.
    pub fn parent(&self, total_rounds: u32) -> Option<(u32, u32, Slot)> {
        if self.round >= total_rounds {
            return None;
        }
        Some((
            self.round + 1,
            self.match_number.div_ceil(2),
            Slot::for_match_number(self.match_number),
        ))
    }
}

/// One recorded confirmation of a submitted result.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    pub validator_id: String,
    pub validated_at: DateTime<Utc>,
}

/// A single match between two (possibly unresolved) teams.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub event_id: EventId,
    /// None while the slot is an unresolved placeholder (or a bye).
    pub team_a: Option<TeamId>,
    pub team_b: Option<TeamId>,
    pub status: MatchStatus,
    pub score: Score,
    pub position: BracketPosition,
    /// Set once, when the match finishes.
    pub winner: Option<TeamId>,
    pub validators: Vec<Validation>,
    #[serde(default)]
    pub notes: String,
}

impl GameMatch {
    pub fn new(event_id: EventId, position: BracketPosition) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            team_a: None,
            team_b: None,
            status: MatchStatus::Upcoming,
            score: Score::default(),
            position,
            winner: None,
            validators: Vec::new(),
            notes: String::new(),
        }
    }

    pub fn team(&self, slot: Slot) -> Option<TeamId> {
        match slot {
            Slot::A => self.team_a,
            Slot::B => self.team_b,
        }
    }

    pub fn team_mut(&mut self, slot: Slot) -> &mut Option<TeamId> {
        match slot {
            Slot::A => &mut self.team_a,
            Slot::B => &mut self.team_b,
        }
    }

    /// Both slots resolved.
    pub fn is_ready(&self) -> bool {
        self.team_a.is_some() && self.team_b.is_some()
    }

    pub fn has_validated(&self, validator_id: &str) -> bool {
        self.validators.iter().any(|v| v.validator_id == validator_id)
    }

    /// Team currently ahead on score, `None` on a tie.
    pub fn leader(&self) -> Option<TeamId> {
        match self.score.a.cmp(&self.score.b) {
            std::cmp::Ordering::Greater => self.team_a,
            std::cmp::Ordering::Less => self.team_b,
            std::cmp::Ordering::Equal => None,
        }
    }
}
