//! Match state machine: start, score, submit, cancel.
//!
//! `pending_validation -> finished` is not here; only the result validator performs it.

use crate::models::{EngineError, GameMatch, MatchStatus, Result};

/// upcoming -> in_progress. Both slots must be resolved; placeholders cannot start.
pub fn start_match(game: &mut GameMatch) -> Result<()> {
    if game.status != MatchStatus::Upcoming {
        return Err(EngineError::InvalidTransition {
            from: game.status,
            action: "start",
        });
    }
    if !game.is_ready() {
        return Err(EngineError::InvalidTransition {
            from: game.status,
            action: "start (teams not yet decided)",
        });
    }
    game.status = MatchStatus::InProgress;
    Ok(())
}

/// Overwrite the score of an in-progress match. No upper bound is enforced.
pub fn update_score(game: &mut GameMatch, score_a: i64, score_b: i64) -> Result<()> {
    if game.status != MatchStatus::InProgress {
        return Err(EngineError::InvalidTransition {
            from: game.status,
            action: "update the score of",
        });
    }
    if score_a < 0 || score_b < 0 {
        return Err(EngineError::NegativeScore);
    }
    let a = u32::try_from(score_a)
        .map_err(|_| EngineError::InvalidInput(format!("score {score_a} is out of range")))?;
    let b = u32::try_from(score_b)
        .map_err(|_| EngineError::InvalidInput(format!("score {score_b} is out of range")))?;
    game.score.a = a;
    game.score.b = b;
    Ok(())
}

/// in_progress -> pending_validation. A tie must be corrected before submitting.
pub fn submit_result(game: &mut GameMatch) -> Result<()> {
    if game.status != MatchStatus::InProgress {
        return Err(EngineError::InvalidTransition {
            from: game.status,
            action: "submit the result of",
        });
    }
    if game.score.a == game.score.b {
        return Err(EngineError::TiedScore);
    }
    game.status = MatchStatus::PendingValidation;
    Ok(())
}

/// upcoming|in_progress -> cancelled. Terminal.
pub fn cancel_match(game: &mut GameMatch) -> Result<()> {
    if !matches!(game.status, MatchStatus::Upcoming | MatchStatus::InProgress) {
        return Err(EngineError::InvalidTransition {
            from: game.status,
            action: "cancel",
        });
    }
    game.status = MatchStatus::Cancelled;
    Ok(())
}
