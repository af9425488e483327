//! Event entity and the per-event aggregate held by the store.

use crate::models::error::{EngineError, Result};
use crate::models::game::{GameMatch, MatchId};
use crate::models::registration::TeamId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an event.
pub type EventId = Uuid;

/// Current phase of the event.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    #[default]
    Draft,
    /// Accepting registrations.
    Open,
    RegistrationClosed,
    /// Bracket generated; matches being played.
    InProgress,
    Completed,
    Cancelled,
}

impl EventStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, EventStatus::Completed | EventStatus::Cancelled)
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventStatus::Draft => write!(f, "draft"),
            EventStatus::Open => write!(f, "open"),
            EventStatus::RegistrationClosed => write!(f, "registration_closed"),
            EventStatus::InProgress => write!(f, "in_progress"),
            EventStatus::Completed => write!(f, "completed"),
            EventStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A competitive event teams register for.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub status: EventStatus,
    /// Team format such as "2v2".
    pub format: String,
    pub max_teams: usize,
    /// One-shot guard: flips to true exactly once, when the bracket is generated.
    pub bracket_generated: bool,
    /// Number of rounds in the generated bracket (0 before generation).
    pub rounds: u32,
    /// Winner of the final, once the event is completed.
    pub champion: Option<TeamId>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Create a draft event. `format` must look like "NvN" and at least 2 teams must fit.
    pub fn new(name: impl Into<String>, format: impl Into<String>, max_teams: usize) -> Result<Self> {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidInput("event name must not be empty".into()));
        }
        let format = format.into();
        if parse_team_size(&format).is_none() {
            return Err(EngineError::InvalidInput(format!(
                "unsupported format '{format}', expected e.g. 2v2"
            )));
        }
        if max_teams < 2 {
            return Err(EngineError::InvalidInput("max_teams must be at least 2".into()));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            status: EventStatus::Draft,
            format,
            max_teams,
            bracket_generated: false,
            rounds: 0,
            champion: None,
            created_at: Utc::now(),
        })
    }

    /// Registrations are only taken while the event is open.
    pub fn ensure_accepting_registrations(&self) -> Result<()> {
        if self.status != EventStatus::Open {
            return Err(EngineError::InvalidEventTransition {
                from: self.status,
                action: "register a team for",
            });
        }
        Ok(())
    }

    /// Registrations can be accepted or rejected until the bracket is generated.
    pub fn ensure_reviewing_registrations(&self) -> Result<()> {
        if self.bracket_generated
            || !matches!(
                self.status,
                EventStatus::Open | EventStatus::RegistrationClosed
            )
        {
            return Err(EngineError::InvalidEventTransition {
                from: self.status,
                action: "review registrations for",
            });
        }
        Ok(())
    }

    /// Roster size must match the format.
    pub fn ensure_roster_fits(&self, team_name: &str, roster: &[String]) -> Result<()> {
        let expected = self.team_size();
        if roster.len() != expected {
            return Err(EngineError::InvalidInput(format!(
                "team '{team_name}' has {} player(s), format {} requires {expected}",
                roster.len(),
                self.format
            )));
        }
        Ok(())
    }

    /// Players per team, from the format ("2v2" -> 2).
    pub fn team_size(&self) -> usize {
        parse_team_size(&self.format).unwrap_or(1)
    }
}

fn parse_team_size(format: &str) -> Option<usize> {
    let (a, b) = format.trim().to_ascii_lowercase().split_once('v').map(|(a, b)| {
        (a.trim().parse::<usize>().ok(), b.trim().parse::<usize>().ok())
    })?;
    match (a, b) {
        (Some(a), Some(b)) if a == b && a >= 1 => Some(a),
        _ => None,
    }
}

/// Everything the engine mutates atomically for one event: the event row and its matches.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventRecord {
    pub event: Event,
    pub matches: Vec<GameMatch>,
}

impl EventRecord {
    pub fn new(event: Event) -> Self {
        Self {
            event,
            matches: Vec::new(),
        }
    }

    pub fn find_match(&self, id: MatchId) -> Option<&GameMatch> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn find_match_mut(&mut self, id: MatchId) -> Result<&mut GameMatch> {
        self.matches
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(EngineError::MatchNotFound(id))
    }

    /// Match at `(round, match_number)`; unique within an event.
    pub fn match_at_mut(&mut self, round: u32, match_number: u32) -> Option<&mut GameMatch> {
        self.matches
            .iter_mut()
            .find(|m| m.position.round == round && m.position.match_number == match_number)
    }
}
