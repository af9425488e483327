//! Registration collaborator: the source of accepted teams, plus an in-memory book with CSV import.

use crate::models::{EngineError, Event, EventId, Registration, RegistrationId, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::sync::{RwLock, RwLockWriteGuard};

/// Supplies the registrations of an event. Implemented by whatever owns team sign-ups.
pub trait RegistrationSource: Send + Sync {
    /// Every registration of the event; the gate filters and orders the accepted ones.
    fn registrations(&self, event_id: EventId) -> Result<Vec<Registration>>;
}

type Entries = HashMap<RegistrationId, Registration>;

/// In-memory registrations keyed by id.
#[derive(Default)]
pub struct RegistrationBook {
    entries: RwLock<Entries>,
}

/// One CSV row: `team_name,players,accepted_at`.
#[derive(Debug, Deserialize)]
struct CsvRow {
    team_name: String,
    /// `;`-separated.
    players: String,
    /// RFC 3339; empty means still pending.
    #[serde(default)]
    accepted_at: Option<String>,
}

/// A registration request that passed validation but is not stored yet.
struct Candidate {
    team_name: String,
    roster: Vec<String>,
    accepted_at: Option<DateTime<Utc>>,
}

impl RegistrationBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a team for an open event (pending until accepted).
    pub fn register(&self, event: &Event, team_name: &str, roster: Vec<String>) -> Result<Registration> {
        event.ensure_accepting_registrations()?;
        let candidate = candidate(event, team_name, roster, None)?;
        let mut g = self.write()?;
        ensure_unique(&g, event.id, &candidate.team_name)?;
        Ok(insert(&mut g, event.id, candidate))
    }

    pub fn get(&self, id: RegistrationId) -> Result<Registration> {
        self.entries
            .read()
            .map_err(|_| EngineError::Storage("lock error".into()))?
            .get(&id)
            .cloned()
            .ok_or(EngineError::RegistrationNotFound(id))
    }

    /// Accept a registration of `event`; only while the bracket has not been generated.
    pub fn accept(&self, event: &Event, id: RegistrationId, at: DateTime<Utc>) -> Result<Registration> {
        self.review(event, id, |reg| reg.accept(at))
    }

    /// Reject a registration of `event`; only while the bracket has not been generated.
    pub fn reject(&self, event: &Event, id: RegistrationId) -> Result<Registration> {
        self.review(event, id, Registration::reject)
    }

    /// Import registrations from CSV with header `team_name,players,accepted_at`.
    ///
    /// Rows with an `accepted_at` timestamp are accepted at that time. Every row is checked
    /// (parse, name, roster, duplicates in the file and in the book) before any is stored, and
    /// all rows are stored under one lock, so a bad row imports nothing.
    pub fn import_csv<R: Read>(&self, event: &Event, reader: R) -> Result<Vec<Registration>> {
        event.ensure_accepting_registrations()?;
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut candidates = Vec::new();
        for row in rdr.deserialize::<CsvRow>() {
            let row = row?;
            let accepted_at = match row.accepted_at.as_deref() {
                None | Some("") => None,
                Some(s) => Some(
                    DateTime::parse_from_rfc3339(s)
                        .map_err(|e| EngineError::InvalidInput(format!("accepted_at '{s}': {e}")))?
                        .with_timezone(&Utc),
                ),
            };
            let roster = row.players.split(';').map(str::to_string).collect();
            candidates.push(candidate(event, &row.team_name, roster, accepted_at)?);
        }

        let mut g = self.write()?;
        let mut seen = HashSet::new();
        for c in &candidates {
            ensure_unique(&g, event.id, &c.team_name)?;
            if !seen.insert(c.team_name.to_ascii_lowercase()) {
                return Err(EngineError::InvalidInput(format!(
                    "team '{}' appears twice in the import",
                    c.team_name
                )));
            }
        }
        let imported: Vec<Registration> = candidates
            .into_iter()
            .map(|c| insert(&mut g, event.id, c))
            .collect();
        log::info!("Imported {} registration(s) for event {}", imported.len(), event.id);
        Ok(imported)
    }

    fn review(
        &self,
        event: &Event,
        id: RegistrationId,
        apply: impl FnOnce(&mut Registration),
    ) -> Result<Registration> {
        event.ensure_reviewing_registrations()?;
        let mut g = self.write()?;
        let reg = g
            .get_mut(&id)
            .filter(|r| r.event_id == event.id)
            .ok_or(EngineError::RegistrationNotFound(id))?;
        apply(reg);
        Ok(reg.clone())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Entries>> {
        self.entries
            .write()
            .map_err(|_| EngineError::Storage("lock error".into()))
    }
}

/// Normalise and check one request against the event's format.
fn candidate(
    event: &Event,
    team_name: &str,
    roster: Vec<String>,
    accepted_at: Option<DateTime<Utc>>,
) -> Result<Candidate> {
    let team_name = team_name.trim();
    if team_name.is_empty() {
        return Err(EngineError::InvalidInput("team name must not be empty".into()));
    }
    let roster: Vec<String> = roster
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    event.ensure_roster_fits(team_name, &roster)?;
    Ok(Candidate {
        team_name: team_name.to_string(),
        roster,
        accepted_at,
    })
}

/// Team names are unique per event, case-insensitive.
fn ensure_unique(entries: &Entries, event_id: EventId, team_name: &str) -> Result<()> {
    let is_duplicate = entries
        .values()
        .any(|r| r.event_id == event_id && r.team_name.eq_ignore_ascii_case(team_name));
    if is_duplicate {
        return Err(EngineError::InvalidInput(format!(
            "team '{team_name}' is already registered"
        )));
    }
    Ok(())
}

fn insert(entries: &mut Entries, event_id: EventId, c: Candidate) -> Registration {
    let mut reg = Registration::new(event_id, c.team_name, c.roster);
    if let Some(at) = c.accepted_at {
        reg.accept(at);
    }
    entries.insert(reg.id, reg.clone());
    reg
}

impl RegistrationSource for RegistrationBook {
    fn registrations(&self, event_id: EventId) -> Result<Vec<Registration>> {
        let g = self
            .entries
            .read()
            .map_err(|_| EngineError::Storage("lock error".into()))?;
        Ok(g.values().filter(|r| r.event_id == event_id).cloned().collect())
    }
}
