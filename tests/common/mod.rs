//! Shared fixtures: an engine over in-memory collaborators and a sink that records events.

#![allow(dead_code)]

use bracket_tournament_web::{
    EngineSettings, Event, EventId, LifecycleEvent, LifecycleSink, MatchId, MemoryStore,
    RegistrationBook, TeamId, TournamentEngine,
};
use chrono::{Duration, TimeZone, Utc};
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<LifecycleEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, wanted: &LifecycleEvent) -> usize {
        self.events().iter().filter(|e| *e == wanted).count()
    }
}

impl LifecycleSink for RecordingSink {
    fn emit(&self, event: LifecycleEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub struct Harness {
    pub engine: Arc<TournamentEngine>,
    pub registrations: Arc<RegistrationBook>,
    pub sink: Arc<RecordingSink>,
}

pub fn harness(required_validations: usize) -> Harness {
    let registrations = Arc::new(RegistrationBook::new());
    let sink = Arc::new(RecordingSink::default());
    let engine = TournamentEngine::new(
        Arc::new(MemoryStore::new()),
        registrations.clone(),
        sink.clone(),
        EngineSettings {
            required_validations,
        },
    );
    Harness {
        engine: Arc::new(engine),
        registrations,
        sink,
    }
}

impl Harness {
    /// An open 1v1 event with `n` teams accepted one minute apart, in order. Returns team ids in
    /// seed order.
    pub fn open_event_with_teams(&self, n: usize) -> (Event, Vec<TeamId>) {
        let event = self.engine.create_event("Spring Cup", "1v1", 64).unwrap();
        let event = self.engine.open_registration(event.id).unwrap();
        let teams = self.accept_teams(&event, n);
        (event, teams)
    }

    /// Register and accept `n` one-player teams into an open event.
    pub fn accept_teams(&self, event: &Event, n: usize) -> Vec<TeamId> {
        let base = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        (0..n)
            .map(|i| {
                let reg = self
                    .registrations
                    .register(event, &format!("Team {i}"), vec![format!("player{i}")])
                    .unwrap();
                self.registrations
                    .accept(event, reg.id, base + Duration::minutes(i as i64))
                    .unwrap()
                    .team_id
            })
            .collect()
    }

    pub fn match_at(&self, event_id: EventId, round: u32, match_number: u32) -> MatchId {
        self.engine
            .get_bracket(event_id)
            .unwrap()
            .round(round)
            .and_then(|r| {
                r.matches
                    .iter()
                    .find(|m| m.position.match_number == match_number)
            })
            .map(|m| m.id)
            .unwrap()
    }

    /// Start, score, submit and validate (once per required validation) a match.
    pub fn play(&self, match_id: MatchId, score_a: i64, score_b: i64) {
        self.engine.start_match(match_id).unwrap();
        self.engine.submit_score(match_id, score_a, score_b).unwrap();
        self.engine.submit_result(match_id).unwrap();
        for i in 0..self.engine.settings().required_validations {
            self.engine
                .validate_result(match_id, &format!("referee-{i}"))
                .unwrap();
        }
    }
}
