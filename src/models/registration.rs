//! Team registrations, as supplied by the registration collaborator.

use crate::models::event::EventId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team.
pub type TeamId = Uuid;

/// Unique identifier for a registration.
pub type RegistrationId = Uuid;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

/// A team's application to play in an event.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub id: RegistrationId,
    pub event_id: EventId,
    pub team_id: TeamId,
    pub team_name: String,
    /// Player ids or handles.
    pub roster: Vec<String>,
    pub status: RegistrationStatus,
    /// Acceptance time; decides seed order (earliest = seed 1).
    pub accepted_at: Option<DateTime<Utc>>,
}

impl Registration {
    /// A pending registration for a new team.
    pub fn new(event_id: EventId, team_name: impl Into<String>, roster: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            team_id: Uuid::new_v4(),
            team_name: team_name.into(),
            roster,
            status: RegistrationStatus::Pending,
            accepted_at: None,
        }
    }

    pub fn accept(&mut self, at: DateTime<Utc>) {
        self.status = RegistrationStatus::Accepted;
        self.accepted_at = Some(at);
    }

    pub fn reject(&mut self) {
        self.status = RegistrationStatus::Rejected;
        self.accepted_at = None;
    }

    pub fn is_accepted(&self) -> bool {
        self.status == RegistrationStatus::Accepted
    }
}
