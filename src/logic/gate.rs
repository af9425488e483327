//! Registration gate: turn accepted registrations into a seeded field.

use crate::models::{EngineError, Event, EventStatus, Registration, Result, TeamId};

/// Check the generation preconditions and return team ids in seed order.
///
/// 1. The bracket must not have been generated yet and the event must be open or closed for registration.
/// 2. Accepted registrations are ordered by acceptance time (ties by team id); earliest is seed 1.
/// 3. Rosters must match the format's team size.
/// 4. At most `max_teams` are seeded; late acceptances beyond that are left out.
pub fn prepare_field(event: &Event, registrations: &[Registration]) -> Result<Vec<TeamId>> {
    if event.bracket_generated {
        return Err(EngineError::AlreadyGenerated(event.id));
    }
    if !matches!(
        event.status,
        EventStatus::Open | EventStatus::RegistrationClosed
    ) {
        return Err(EngineError::InvalidEventTransition {
            from: event.status,
            action: "generate a bracket for",
        });
    }

    let mut accepted: Vec<&Registration> = registrations
        .iter()
        .filter(|r| r.event_id == event.id && r.is_accepted())
        .collect();
    accepted.sort_by_key(|r| (r.accepted_at, r.team_id));

    let team_size = event.team_size();
    if let Some(r) = accepted.iter().find(|r| r.roster.len() != team_size) {
        return Err(EngineError::IncompleteRoster {
            team_id: r.team_id,
            expected: team_size,
            found: r.roster.len(),
        });
    }

    if accepted.len() > event.max_teams {
        log::warn!(
            "Event {}: {} accepted teams exceed max_teams {}, seeding the earliest {}",
            event.id,
            accepted.len(),
            event.max_teams,
            event.max_teams
        );
        accepted.truncate(event.max_teams);
    }

    if accepted.len() < 2 {
        return Err(EngineError::InsufficientTeams {
            found: accepted.len(),
        });
    }

    Ok(accepted.into_iter().map(|r| r.team_id).collect())
}
