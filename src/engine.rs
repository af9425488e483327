//! Tournament engine: each operation loads one event record, applies pure logic, commits the
//! record with compare-and-swap and only then emits lifecycle events.

use crate::lifecycle::{LifecycleEvent, LifecycleSink};
use crate::logic::{self, Advancement};
use crate::models::{
    Bracket, EngineError, Event, EventId, EventRecord, EventStatus, GameMatch, MatchId,
    MatchStatus, Result,
};
use crate::registrations::RegistrationSource;
use crate::store::{EventStore, Versioned};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

/// Tunables for the engine.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EngineSettings {
    /// Distinct validations needed before a submitted result is final.
    pub required_validations: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            required_validations: 1,
        }
    }
}

/// Response of a validate call.
#[derive(Clone, Debug, Serialize)]
pub struct ValidationReceipt {
    #[serde(rename = "match")]
    pub game: GameMatch,
    /// Validations still needed; 0 once the match is finished.
    pub awaiting: usize,
    pub advancement: Option<Advancement>,
}

pub struct TournamentEngine {
    store: Arc<dyn EventStore>,
    registrations: Arc<dyn RegistrationSource>,
    sink: Arc<dyn LifecycleSink>,
    settings: EngineSettings,
}

impl TournamentEngine {
    pub fn new(
        store: Arc<dyn EventStore>,
        registrations: Arc<dyn RegistrationSource>,
        sink: Arc<dyn LifecycleSink>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            store,
            registrations,
            sink,
            settings,
        }
    }

    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    // ---- events -------------------------------------------------------------------------

    pub fn create_event(&self, name: &str, format: &str, max_teams: usize) -> Result<Event> {
        let event = Event::new(name, format, max_teams)?;
        self.store.insert(EventRecord::new(event.clone()))?;
        log::info!("Created event {} ({})", event.id, event.name);
        Ok(event)
    }

    pub fn get_event(&self, event_id: EventId) -> Result<Event> {
        Ok(self.store.load(event_id)?.value.event)
    }

    pub fn list_events(&self) -> Result<Vec<Event>> {
        self.store.list_events()
    }

    /// draft -> open.
    pub fn open_registration(&self, event_id: EventId) -> Result<Event> {
        self.move_event(event_id, EventStatus::Draft, EventStatus::Open, "open registration for")
    }

    /// open -> registration_closed.
    pub fn close_registration(&self, event_id: EventId) -> Result<Event> {
        self.move_event(
            event_id,
            EventStatus::Open,
            EventStatus::RegistrationClosed,
            "close registration for",
        )
    }

    /// Cancel a non-terminal event together with all of its unplayed matches.
    pub fn cancel_event(&self, event_id: EventId) -> Result<Event> {
        let (cancelled, record) = self.execute(event_id, |record| {
            if record.event.status.is_terminal() {
                return Err(EngineError::InvalidEventTransition {
                    from: record.event.status,
                    action: "cancel",
                });
            }
            record.event.status = EventStatus::Cancelled;
            let mut cancelled = Vec::new();
            for m in &mut record.matches {
                if matches!(m.status, MatchStatus::Upcoming | MatchStatus::InProgress) {
                    logic::cancel_match(m)?;
                    cancelled.push(m.id);
                }
            }
            Ok(cancelled)
        })?;
        log::info!(
            "Cancelled event {event_id} ({} open match(es) cancelled)",
            cancelled.len()
        );
        for id in cancelled {
            self.sink.emit(LifecycleEvent::MatchCancelled(id));
        }
        self.sink.emit(LifecycleEvent::EventCancelled(event_id));
        Ok(record.event)
    }

    fn move_event(
        &self,
        event_id: EventId,
        from: EventStatus,
        to: EventStatus,
        action: &'static str,
    ) -> Result<Event> {
        let ((), record) = self.execute(event_id, |record| {
            if record.event.status != from {
                return Err(EngineError::InvalidEventTransition {
                    from: record.event.status,
                    action,
                });
            }
            record.event.status = to;
            Ok(())
        })?;
        log::info!("Event {event_id}: {from} -> {to}");
        Ok(record.event)
    }

    // ---- bracket ------------------------------------------------------------------------

    /// Seed the accepted teams and create the whole bracket in one commit.
    ///
    /// A concurrent generation for the same event fails with `AlreadyGenerated` (it saw the
    /// guard) or `PersistenceConflict` (it lost the commit race); either way only one bracket
    /// exists.
    pub fn generate_bracket(&self, event_id: EventId) -> Result<Bracket> {
        let registrations = self.registrations.registrations(event_id)?;
        let (report, record) = self.execute(event_id, |record| {
            let seeds = logic::prepare_field(&record.event, &registrations)?;
            logic::generate_bracket(record, &seeds)
        })?;
        log::info!(
            "Generated bracket for event {event_id}: {} round(s), {} match(es), {} bye(s)",
            report.rounds,
            report.matches_created,
            report.byes
        );
        self.sink.emit(LifecycleEvent::BracketGenerated(event_id));
        for a in &report.advancements {
            self.emit_advancement(event_id, a);
        }
        Ok(logic::project_bracket(&record))
    }

    pub fn get_bracket(&self, event_id: EventId) -> Result<Bracket> {
        Ok(logic::project_bracket(&self.store.load(event_id)?.value))
    }

    // ---- matches ------------------------------------------------------------------------

    pub fn get_match(&self, match_id: MatchId) -> Result<GameMatch> {
        let event_id = self.store.locate_match(match_id)?;
        self.store
            .load(event_id)?
            .value
            .find_match(match_id)
            .cloned()
            .ok_or(EngineError::MatchNotFound(match_id))
    }

    pub fn start_match(&self, match_id: MatchId) -> Result<GameMatch> {
        let game = self.execute_on_match(match_id, |record| {
            logic::start_match(record.find_match_mut(match_id)?)
        })?;
        log::debug!("Match {match_id} started");
        self.sink.emit(LifecycleEvent::MatchStarted(match_id));
        Ok(game)
    }

    pub fn submit_score(&self, match_id: MatchId, score_a: i64, score_b: i64) -> Result<GameMatch> {
        self.execute_on_match(match_id, |record| {
            logic::update_score(record.find_match_mut(match_id)?, score_a, score_b)
        })
    }

    pub fn submit_result(&self, match_id: MatchId) -> Result<GameMatch> {
        let game = self.execute_on_match(match_id, |record| {
            logic::submit_result(record.find_match_mut(match_id)?)
        })?;
        log::debug!(
            "Match {match_id} submitted {}-{}, awaiting validation",
            game.score.a,
            game.score.b
        );
        Ok(game)
    }

    pub fn cancel_match(&self, match_id: MatchId) -> Result<GameMatch> {
        let game = self.execute_on_match(match_id, |record| {
            logic::cancel_match(record.find_match_mut(match_id)?)
        })?;
        log::info!("Match {match_id} cancelled");
        self.sink.emit(LifecycleEvent::MatchCancelled(match_id));
        Ok(game)
    }

    /// Record a validation; the one that reaches the threshold finishes and advances the match
    /// in the same commit. Of two racing validations only one can commit, so a winner is never
    /// propagated twice.
    pub fn validate_result(&self, match_id: MatchId, validator_id: &str) -> Result<ValidationReceipt> {
        let required = self.settings.required_validations;
        let now = Utc::now();
        let event_id = self.store.locate_match(match_id)?;
        let (step, record) = self.execute(event_id, |record| {
            ensure_in_progress(&record.event)?;
            logic::record_validation(record, match_id, validator_id, required, now)
        })?;
        let game = record
            .find_match(match_id)
            .cloned()
            .ok_or(EngineError::MatchNotFound(match_id))?;

        match &step.advancement {
            Some(a) => {
                log::info!(
                    "Match {match_id} finished, winner {}",
                    game.winner.map(|w| w.to_string()).unwrap_or_default()
                );
                self.sink.emit(LifecycleEvent::MatchFinished(match_id));
                self.emit_advancement(event_id, a);
            }
            None => log::debug!(
                "Validation by {validator_id} recorded for match {match_id}, awaiting {} more",
                step.awaiting
            ),
        }
        Ok(ValidationReceipt {
            game,
            awaiting: step.awaiting,
            advancement: step.advancement,
        })
    }

    /// Re-run the advancement of a finished match. Safe to call repeatedly: a winner already in
    /// place is reported as `AlreadyApplied`.
    pub fn retry_advancement(&self, match_id: MatchId) -> Result<Advancement> {
        let event_id = self.store.locate_match(match_id)?;
        let (advancement, _) = self.execute(event_id, |record| {
            logic::reconcile_advancement(record, match_id)
        })?;
        self.emit_advancement(event_id, &advancement);
        Ok(advancement)
    }

    // ---- plumbing -----------------------------------------------------------------------

    /// Load, mutate and commit one event record. Nothing is stored if `op` fails.
    fn execute<T>(
        &self,
        event_id: EventId,
        op: impl FnOnce(&mut EventRecord) -> Result<T>,
    ) -> Result<(T, EventRecord)> {
        let Versioned { version, mut value } = self.store.load(event_id)?;
        let out = op(&mut value)?;
        self.store.commit(value.clone(), version)?;
        Ok((out, value))
    }

    /// `execute` for an operation on one match of an in-progress event; returns the match.
    fn execute_on_match(
        &self,
        match_id: MatchId,
        op: impl FnOnce(&mut EventRecord) -> Result<()>,
    ) -> Result<GameMatch> {
        let event_id = self.store.locate_match(match_id)?;
        let ((), record) = self.execute(event_id, |record| {
            ensure_in_progress(&record.event)?;
            op(record)
        })?;
        record
            .find_match(match_id)
            .cloned()
            .ok_or(EngineError::MatchNotFound(match_id))
    }

    fn emit_advancement(&self, event_id: EventId, advancement: &Advancement) {
        match advancement {
            Advancement::Advanced { from, to, side, .. } => {
                log::debug!("Winner of {from} advanced into {side} of {to}");
                self.sink.emit(LifecycleEvent::MatchAdvanced(*from));
            }
            Advancement::Completed { champion, .. } => {
                log::info!("Event {event_id} completed, champion {champion}");
                self.sink.emit(LifecycleEvent::EventCompleted(event_id));
            }
            Advancement::AlreadyApplied { from } => {
                log::debug!("Advancement of {from} already applied");
            }
        }
    }
}

fn ensure_in_progress(event: &Event) -> Result<()> {
    if event.status != EventStatus::InProgress {
        return Err(EngineError::InvalidEventTransition {
            from: event.status,
            action: "play matches in",
        });
    }
    Ok(())
}
