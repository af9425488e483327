//! Persistence seam: versioned event records with compare-and-swap commits.

use crate::models::{EngineError, Event, EventId, EventRecord, MatchId, Result};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A record together with the version it was read at.
#[derive(Clone, Debug)]
pub struct Versioned<T> {
    pub version: u64,
    pub value: T,
}

/// Storage for event records.
///
/// `commit` is the only write path for existing events and must be atomic: it replaces the whole
/// record only if nobody committed since `expected_version` was read.
pub trait EventStore: Send + Sync {
    /// Insert a new event at version 1.
    fn insert(&self, record: EventRecord) -> Result<()>;

    fn load(&self, event_id: EventId) -> Result<Versioned<EventRecord>>;

    /// Event owning match `match_id`.
    fn locate_match(&self, match_id: MatchId) -> Result<EventId>;

    /// Replace the record if its stored version is still `expected_version`; returns the new
    /// version, or `PersistenceConflict` when someone else committed first.
    fn commit(&self, record: EventRecord, expected_version: u64) -> Result<u64>;

    fn list_events(&self) -> Result<Vec<Event>>;
}

#[derive(Default)]
struct Inner {
    records: HashMap<EventId, Versioned<EventRecord>>,
    match_index: HashMap<MatchId, EventId>,
}

/// In-memory store; all state behind one lock.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| EngineError::Storage("lock error".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| EngineError::Storage("lock error".into()))
    }
}

impl EventStore for MemoryStore {
    fn insert(&self, record: EventRecord) -> Result<()> {
        let mut g = self.write()?;
        let id = record.event.id;
        if g.records.contains_key(&id) {
            return Err(EngineError::PersistenceConflict(id));
        }
        for m in &record.matches {
            g.match_index.insert(m.id, id);
        }
        g.records.insert(
            id,
            Versioned {
                version: 1,
                value: record,
            },
        );
        Ok(())
    }

    fn load(&self, event_id: EventId) -> Result<Versioned<EventRecord>> {
        self.read()?
            .records
            .get(&event_id)
            .cloned()
            .ok_or(EngineError::EventNotFound(event_id))
    }

    fn locate_match(&self, match_id: MatchId) -> Result<EventId> {
        self.read()?
            .match_index
            .get(&match_id)
            .copied()
            .ok_or(EngineError::MatchNotFound(match_id))
    }

    fn commit(&self, record: EventRecord, expected_version: u64) -> Result<u64> {
        let mut g = self.write()?;
        let id = record.event.id;
        let current = g
            .records
            .get(&id)
            .map(|v| v.version)
            .ok_or(EngineError::EventNotFound(id))?;
        if current != expected_version {
            log::warn!(
                "Commit conflict on event {id}: expected version {expected_version}, found {current}"
            );
            return Err(EngineError::PersistenceConflict(id));
        }
        for m in &record.matches {
            g.match_index.insert(m.id, id);
        }
        let version = current + 1;
        g.records.insert(
            id,
            Versioned {
                version,
                value: record,
            },
        );
        Ok(version)
    }

    fn list_events(&self) -> Result<Vec<Event>> {
        let g = self.read()?;
        let mut events: Vec<Event> = g.records.values().map(|v| v.value.event.clone()).collect();
        events.sort_by_key(|e| (e.created_at, e.id));
        Ok(events)
    }
}
