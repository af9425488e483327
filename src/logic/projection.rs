//! Bracket projection: the read-only view of an event's matches.

use crate::models::{Bracket, BracketRound, EventRecord};

/// Group the event's matches by round (ascending), each round ordered by match number.
pub fn project_bracket(record: &EventRecord) -> Bracket {
    let mut matches = record.matches.clone();
    matches.sort_by_key(|m| (m.position.round, m.position.match_number));

    let mut rounds: Vec<BracketRound> = Vec::new();
    for m in matches {
        match rounds.last_mut() {
            Some(r) if r.round == m.position.round => r.matches.push(m),
            _ => rounds.push(BracketRound {
                round: m.position.round,
                matches: vec![m],
            }),
        }
    }

    Bracket {
        event_id: record.event.id,
        status: record.event.status,
        champion: record.event.champion,
        rounds,
    }
}
