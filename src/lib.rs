//! Single-elimination tournament engine: library with models, bracket logic and the engine service.

pub mod config;
pub mod engine;
pub mod lifecycle;
pub mod logic;
pub mod models;
pub mod registrations;
pub mod store;

pub use config::ServerConfig;
pub use engine::{EngineSettings, TournamentEngine, ValidationReceipt};
pub use lifecycle::{EventBus, LifecycleEvent, LifecycleSink};
pub use logic::Advancement;
pub use models::{
    Bracket, BracketPosition, BracketRound, EngineError, ErrorKind, Event, EventId, EventRecord,
    EventStatus, GameMatch, MatchId, MatchStatus, Registration, RegistrationId,
    RegistrationStatus, Result, Score, Slot, TeamId, Validation,
};
pub use registrations::{RegistrationBook, RegistrationSource};
pub use store::{EventStore, MemoryStore, Versioned};
