//! Lifecycle events emitted after each successful commit, and the sink they go to.

use crate::models::{EventId, MatchId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Outbound notification: a type tag plus the affected entity id.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "entity_id")]
pub enum LifecycleEvent {
    #[serde(rename = "bracket:generated")]
    BracketGenerated(EventId),
    #[serde(rename = "match:started")]
    MatchStarted(MatchId),
    #[serde(rename = "match:finished")]
    MatchFinished(MatchId),
    /// Carries the id of the match whose winner moved up.
    #[serde(rename = "match:advanced")]
    MatchAdvanced(MatchId),
    #[serde(rename = "match:cancelled")]
    MatchCancelled(MatchId),
    #[serde(rename = "event:completed")]
    EventCompleted(EventId),
    #[serde(rename = "event:cancelled")]
    EventCancelled(EventId),
}

impl LifecycleEvent {
    pub fn tag(&self) -> &'static str {
        match self {
            LifecycleEvent::BracketGenerated(_) => "bracket:generated",
            LifecycleEvent::MatchStarted(_) => "match:started",
            LifecycleEvent::MatchFinished(_) => "match:finished",
            LifecycleEvent::MatchAdvanced(_) => "match:advanced",
            LifecycleEvent::MatchCancelled(_) => "match:cancelled",
            LifecycleEvent::EventCompleted(_) => "event:completed",
            LifecycleEvent::EventCancelled(_) => "event:cancelled",
        }
    }

    pub fn entity_id(&self) -> Uuid {
        match *self {
            LifecycleEvent::BracketGenerated(id)
            | LifecycleEvent::MatchStarted(id)
            | LifecycleEvent::MatchFinished(id)
            | LifecycleEvent::MatchAdvanced(id)
            | LifecycleEvent::MatchCancelled(id)
            | LifecycleEvent::EventCompleted(id)
            | LifecycleEvent::EventCancelled(id) => id,
        }
    }
}

/// Where lifecycle events go. Delivery is fire-and-forget: `emit` must not fail the caller.
pub trait LifecycleSink: Send + Sync {
    fn emit(&self, event: LifecycleEvent);
}

/// Broadcast sink: every subscriber receives every event emitted after it subscribed.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<LifecycleEvent>,
}

impl EventBus {
    /// `capacity` events are buffered per slow subscriber before the oldest are dropped.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.tx.subscribe()
    }
}

impl LifecycleSink for EventBus {
    fn emit(&self, event: LifecycleEvent) {
        if self.tx.send(event).is_err() {
            log::debug!("No lifecycle subscribers, event dropped");
        }
    }
}
