//! Event types for the Atelier event system
//!
//! Provides shared event definitions and the EventBus used by the curation
//! pipeline for progress reporting and SSE broadcasting.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Atelier event types
///
/// Events are broadcast via EventBus and can be serialized for SSE
/// transmission. All events carry the session they belong to; stage names
/// are carried as strings so the event layer stays independent of the
/// pipeline's state enum.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CurationEvent {
    /// A curation session was created and its pipeline task spawned
    SessionStarted {
        session_id: Uuid,
        /// Theme title the session was started with
        theme: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The pipeline entered a new stage
    StageStarted {
        session_id: Uuid,
        /// Stage name (e.g. "DISCOVERING_ARTISTS")
        stage: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Coarse progress update within the pipeline
    ///
    /// Emitted at every stage transition and at notable points inside a
    /// stage. NOT persisted; transmitted via SSE only.
    ProgressUpdated {
        session_id: Uuid,
        stage: String,
        /// Overall completion (0.0 - 100.0)
        percentage: f64,
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A discovery stage published its candidate set and is now paused
    ///
    /// Triggers:
    /// - SSE: Prompt the operator UI to fetch candidates via /curation/status
    CheckpointPublished {
        session_id: Uuid,
        stage: String,
        candidate_count: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A valid selection was submitted and the pipeline resumed
    SelectionAccepted {
        session_id: Uuid,
        stage: String,
        /// Indices into the published candidate set, as accepted
        accepted: Vec<usize>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Session finished successfully with a proposal
    SessionCompleted {
        session_id: Uuid,
        artist_count: usize,
        artwork_count: usize,
        duration_seconds: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Session failed; error message is also available via /curation/status
    SessionFailed {
        session_id: Uuid,
        stage: String,
        error: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Session cancelled by the operator
    SessionCancelled {
        session_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl CurationEvent {
    /// Get event type as string for filtering
    pub fn event_type(&self) -> &str {
        match self {
            CurationEvent::SessionStarted { .. } => "SessionStarted",
            CurationEvent::StageStarted { .. } => "StageStarted",
            CurationEvent::ProgressUpdated { .. } => "ProgressUpdated",
            CurationEvent::CheckpointPublished { .. } => "CheckpointPublished",
            CurationEvent::SelectionAccepted { .. } => "SelectionAccepted",
            CurationEvent::SessionCompleted { .. } => "SessionCompleted",
            CurationEvent::SessionFailed { .. } => "SessionFailed",
            CurationEvent::SessionCancelled { .. } => "SessionCancelled",
        }
    }

    /// Session the event belongs to
    pub fn session_id(&self) -> Uuid {
        match self {
            CurationEvent::SessionStarted { session_id, .. }
            | CurationEvent::StageStarted { session_id, .. }
            | CurationEvent::ProgressUpdated { session_id, .. }
            | CurationEvent::CheckpointPublished { session_id, .. }
            | CurationEvent::SelectionAccepted { session_id, .. }
            | CurationEvent::SessionCompleted { session_id, .. }
            | CurationEvent::SessionFailed { session_id, .. }
            | CurationEvent::SessionCancelled { session_id, .. } => *session_id,
        }
    }
}

/// Event bus for broadcasting curation events
///
/// Wraps a tokio broadcast channel. Emission is fire-and-forget; slow
/// subscribers drop old events rather than backpressuring the pipeline.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CurationEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<CurationEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: CurationEvent,
    ) -> Result<usize, broadcast::error::SendError<CurationEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: CurationEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
