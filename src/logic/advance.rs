//! Round advancer: move a finished match's winner toward the final.

use crate::models::{
    BracketPosition, EngineError, EventRecord, EventStatus, MatchId, MatchStatus, Result, Slot, TeamId,
};
use serde::Serialize;

/// Outcome of advancing one finished match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Advancement {
    /// Winner written into the parent match's slot.
    Advanced {
        from: MatchId,
        to: MatchId,
        side: Slot,
        team: TeamId,
    },
    /// The final finished: the event is completed.
    Completed { final_match: MatchId, champion: TeamId },
    /// Replay of an advancement that already happened.
    AlreadyApplied { from: MatchId },
}

/// Write the winner of finished match `match_id` into its parent slot, or complete the event
/// when it was the final.
///
/// An occupied parent slot is never overwritten: the write is rejected with
/// `SlotAlreadyFilled`.
pub fn advance_winner(record: &mut EventRecord, match_id: MatchId) -> Result<Advancement> {
    let (position, winner) = finished_winner(record, match_id)?;

    let Some((round, match_number, side)) = position.parent(record.event.rounds) else {
        record.event.status = EventStatus::Completed;
        record.event.champion = Some(winner);
        return Ok(Advancement::Completed {
            final_match: match_id,
            champion: winner,
        });
    };

    let event_id = record.event.id;
    let parent = record
        .match_at_mut(round, match_number)
        .ok_or_else(|| {
            EngineError::Storage(format!(
                "event {event_id} has no match at round {round} #{match_number}"
            ))
        })?;
    let slot = parent.team_mut(side);
    if slot.is_some() {
        log::warn!(
            "Refusing to overwrite {side} of match {} with winner of {match_id}",
            parent.id
        );
        return Err(EngineError::SlotAlreadyFilled {
            match_id: parent.id,
            side,
        });
    }
    *slot = Some(winner);

    Ok(Advancement::Advanced {
        from: match_id,
        to: parent.id,
        side,
        team: winner,
    })
}

/// Idempotent form of [`advance_winner`] for retries: a winner already sitting in its parent
/// slot (or already crowned champion) is a no-op.
pub fn reconcile_advancement(record: &mut EventRecord, match_id: MatchId) -> Result<Advancement> {
    let (position, winner) = finished_winner(record, match_id)?;

    let already = match position.parent(record.event.rounds) {
        None => {
            record.event.status == EventStatus::Completed && record.event.champion == Some(winner)
        }
        Some((round, match_number, side)) => record
            .match_at_mut(round, match_number)
            .is_some_and(|parent| parent.team(side) == Some(winner)),
    };
    if already {
        return Ok(Advancement::AlreadyApplied { from: match_id });
    }
    advance_winner(record, match_id)
}

fn finished_winner(
    record: &EventRecord,
    match_id: MatchId,
) -> Result<(BracketPosition, TeamId)> {
    let m = record
        .find_match(match_id)
        .ok_or(EngineError::MatchNotFound(match_id))?;
    match (m.status, m.winner) {
        (MatchStatus::Finished, Some(winner)) => Ok((m.position, winner)),
        (from, _) => Err(EngineError::InvalidTransition {
            from,
            action: "advance the winner of",
        }),
    }
}
