//! Result validator: consensus threshold before a submitted result becomes final.

use crate::logic::advance::{advance_winner, Advancement};
use crate::models::{
    EngineError, EventRecord, GameMatch, MatchId, MatchStatus, Result, Validation,
};
use chrono::{DateTime, Utc};

/// What recording one validation did.
#[derive(Clone, Debug)]
pub struct ValidationStep {
    /// Validations still needed before the match finishes (0 once finished).
    pub awaiting: usize,
    /// Present when this validation crossed the threshold.
    pub advancement: Option<Advancement>,
}

/// Record `validator_id`'s confirmation of match `match_id`.
///
/// When the number of distinct validators reaches `required`, the match finishes with the team
/// ahead on score as winner and the winner is advanced in the same record update. The caller
/// commits the record as one unit, so finishing and advancing land together or not at all.
pub fn record_validation(
    record: &mut EventRecord,
    match_id: MatchId,
    validator_id: &str,
    required: usize,
    now: DateTime<Utc>,
) -> Result<ValidationStep> {
    let validator_id = validator_id.trim();
    if validator_id.is_empty() {
        return Err(EngineError::InvalidInput("validator id must not be empty".into()));
    }

    let game = record.find_match_mut(match_id)?;
    if game.status != MatchStatus::PendingValidation {
        return Err(EngineError::InvalidTransition {
            from: game.status,
            action: "validate",
        });
    }
    if game.has_validated(validator_id) {
        return Err(EngineError::DuplicateValidation {
            validator_id: validator_id.to_string(),
        });
    }
    game.validators.push(Validation {
        validator_id: validator_id.to_string(),
        validated_at: now,
    });

    let count = game.validators.len();
    let required = required.max(1);
    if count < required {
        return Ok(ValidationStep {
            awaiting: required - count,
            advancement: None,
        });
    }

    finish(game)?;
    let advancement = advance_winner(record, match_id)?;
    Ok(ValidationStep {
        awaiting: 0,
        advancement: Some(advancement),
    })
}

/// pending_validation -> finished, winner read from the current score.
fn finish(game: &mut GameMatch) -> Result<()> {
    let winner = game.leader().ok_or(EngineError::TiedScore)?;
    game.status = MatchStatus::Finished;
    game.winner = Some(winner);
    log::debug!("Match {} finished, winner {}", game.id, winner);
    Ok(())
}
