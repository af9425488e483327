//! Bracket builder: round skeleton, byes and placeholder matches.

use crate::logic::advance::{advance_winner, Advancement};
use crate::models::{
    BracketPosition, EngineError, EventId, EventRecord, EventStatus, GameMatch, MatchStatus,
    Result, Slot, TeamId,
};

/// What a successful generation produced.
#[derive(Clone, Debug)]
pub struct GenerationReport {
    pub rounds: u32,
    pub matches_created: usize,
    pub byes: usize,
    /// Advancements performed for bye winners.
    pub advancements: Vec<Advancement>,
}

/// Field size after padding with byes: the next power of two.
pub fn bracket_size(teams: usize) -> usize {
    teams.max(1).next_power_of_two()
}

/// Rounds needed for a padded field of `size` teams.
pub fn round_count(size: usize) -> u32 {
    size.trailing_zeros()
}

/// Build every match of the bracket, in round then match-number order.
///
/// Round 1 holds `size / 2` matches: the first `byes` seeds each get a one-team match that is
/// already finished, then the remaining seeds are paired sequentially. Rounds 2..=R hold
/// placeholder matches with both slots empty, halving each round down to the single final.
pub fn build_skeleton(event_id: EventId, seeds: &[TeamId]) -> Result<Vec<GameMatch>> {
    if seeds.len() < 2 {
        return Err(EngineError::InsufficientTeams { found: seeds.len() });
    }
    let size = bracket_size(seeds.len());
    let rounds = round_count(size);
    let byes = size - seeds.len();

    let position = |round: u32, match_number: u32| BracketPosition {
        round,
        match_number,
        side: (round < rounds).then(|| Slot::for_match_number(match_number)),
    };

    let mut matches = Vec::with_capacity(size - 1);
    let mut match_number = 1;

    for &team in &seeds[..byes] {
        let mut m = GameMatch::new(event_id, position(1, match_number));
        m.team_a = Some(team);
        m.status = MatchStatus::Finished;
        m.winner = Some(team);
        m.notes = "bye".to_string();
        matches.push(m);
        match_number += 1;
    }
    for pair in seeds[byes..].chunks_exact(2) {
        let mut m = GameMatch::new(event_id, position(1, match_number));
        m.team_a = Some(pair[0]);
        m.team_b = Some(pair[1]);
        matches.push(m);
        match_number += 1;
    }

    for round in 2..=rounds {
        let count = (size >> round) as u32;
        for n in 1..=count {
            matches.push(GameMatch::new(event_id, position(round, n)));
        }
    }

    Ok(matches)
}

/// Generate the bracket into `record`: set the one-shot guard, move the event in progress and
/// push every bye winner into round 2.
///
/// The caller commits the record as one unit; nothing here is visible until then.
pub fn generate_bracket(record: &mut EventRecord, seeds: &[TeamId]) -> Result<GenerationReport> {
    if record.event.bracket_generated {
        return Err(EngineError::AlreadyGenerated(record.event.id));
    }
    let matches = build_skeleton(record.event.id, seeds)?;
    let size = bracket_size(seeds.len());
    let rounds = round_count(size);
    let bye_ids: Vec<_> = matches
        .iter()
        .filter(|m| m.status == MatchStatus::Finished)
        .map(|m| m.id)
        .collect();

    record.matches = matches;
    record.event.bracket_generated = true;
    record.event.rounds = rounds;
    record.event.status = EventStatus::InProgress;

    let mut advancements = Vec::with_capacity(bye_ids.len());
    for id in &bye_ids {
        advancements.push(advance_winner(record, *id)?);
    }

    Ok(GenerationReport {
        rounds,
        matches_created: record.matches.len(),
        byes: bye_ids.len(),
        advancements,
    })
}
