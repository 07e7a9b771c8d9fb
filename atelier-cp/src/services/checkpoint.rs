//! Checkpoint coordination
//!
//! A discovery stage publishes its candidate set, transitions the session
//! into the matching AWAITING_* state, and suspends on the receiver half
//! of a oneshot handshake. The checkpoint resolves exactly once, when a
//! valid selection is submitted; rejection leaves both the checkpoint and
//! the session state untouched. Failing or cancelling a session drops the
//! pending sender so a blocked pipeline observes termination instead of
//! hanging. There is no default timeout on the wait itself.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{oneshot, Mutex, RwLock};
use uuid::Uuid;

use crate::models::{CurationState, RankedCandidate};

/// A published candidate set together with the stage that produced it
#[derive(Debug, Clone)]
pub struct RankedSet {
    pub stage: CurationState,
    pub candidates: Vec<RankedCandidate>,
}

/// Selection validation errors
#[derive(Debug, Error)]
pub enum SelectionError {
    /// Empty selections are rejected
    #[error("Selection is empty")]
    Empty,

    /// Index outside [0, candidate_count)
    #[error("Selection index {index} out of range (candidate count {count})")]
    OutOfRange { index: usize, count: usize },

    /// No checkpoint is pending for the session (not yet published, or
    /// already resolved)
    #[error("No pending checkpoint for session (state {state})")]
    WrongState { state: String },

    /// Session is unknown to the coordinator
    #[error("Unknown session")]
    UnknownSession,
}

/// One pending checkpoint: published candidates plus the resolver half of
/// the handshake
struct PendingCheckpoint {
    stage: CurationState,
    candidates: Vec<RankedCandidate>,
    resolver: oneshot::Sender<Vec<usize>>,
}

/// Per-session checkpoint slot
///
/// Sessions own independent primitives; the outer map lock only covers
/// slot registration and lookup.
type Slot = Arc<Mutex<Option<PendingCheckpoint>>>;

/// Coordinates the publish/await/submit handshake for every session
#[derive(Default)]
pub struct CheckpointCoordinator {
    slots: RwLock<HashMap<Uuid, Slot>>,
}

impl CheckpointCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session with the coordinator
    pub async fn register(&self, session_id: Uuid) {
        self.slots
            .write()
            .await
            .entry(session_id)
            .or_insert_with(|| Arc::new(Mutex::new(None)));
    }

    async fn slot(&self, session_id: Uuid) -> Option<Slot> {
        self.slots.read().await.get(&session_id).cloned()
    }

    /// Publish a candidate set and obtain the receiver the pipeline will
    /// suspend on
    ///
    /// At most one checkpoint may be outstanding per session; publishing
    /// over a pending one is a pipeline bug and returns an error.
    pub async fn publish(
        &self,
        session_id: Uuid,
        stage: CurationState,
        candidates: Vec<RankedCandidate>,
    ) -> Result<oneshot::Receiver<Vec<usize>>, SelectionError> {
        let slot = self
            .slot(session_id)
            .await
            .ok_or(SelectionError::UnknownSession)?;
        let mut pending = slot.lock().await;

        if pending.is_some() {
            return Err(SelectionError::WrongState {
                state: "checkpoint already pending".to_string(),
            });
        }

        let (tx, rx) = oneshot::channel();
        let count = candidates.len();
        *pending = Some(PendingCheckpoint {
            stage,
            candidates,
            resolver: tx,
        });

        tracing::info!(
            session_id = %session_id,
            stage = %stage,
            candidates = count,
            "Checkpoint published; pipeline suspended"
        );

        Ok(rx)
    }

    /// Submit a selection against the pending checkpoint
    ///
    /// Validates before resolving: empty selections and out-of-range
    /// indices are rejected with the checkpoint (and session state) left
    /// unchanged. A second submission after a successful one finds no
    /// pending checkpoint and is rejected.
    pub async fn submit(
        &self,
        session_id: Uuid,
        indices: &[usize],
        current_state: CurationState,
    ) -> Result<Vec<RankedCandidate>, SelectionError> {
        let slot = self
            .slot(session_id)
            .await
            .ok_or(SelectionError::UnknownSession)?;
        let mut pending = slot.lock().await;

        let checkpoint = pending.as_ref().ok_or_else(|| SelectionError::WrongState {
            state: current_state.to_string(),
        })?;

        if indices.is_empty() {
            return Err(SelectionError::Empty);
        }
        let count = checkpoint.candidates.len();
        if let Some(&index) = indices.iter().find(|&&i| i >= count) {
            return Err(SelectionError::OutOfRange { index, count });
        }
        if current_state != checkpoint.stage {
            return Err(SelectionError::WrongState {
                state: current_state.to_string(),
            });
        }

        // Validation passed: resolve exactly once
        let checkpoint = pending.take().expect("checkpoint present");
        let accepted: Vec<RankedCandidate> = indices
            .iter()
            .map(|&i| checkpoint.candidates[i].clone())
            .collect();

        if checkpoint.resolver.send(indices.to_vec()).is_err() {
            // Pipeline is gone (failed or cancelled between publish and
            // submit); the checkpoint is already destroyed
            return Err(SelectionError::WrongState {
                state: "pipeline no longer waiting".to_string(),
            });
        }

        tracing::info!(
            session_id = %session_id,
            stage = %checkpoint.stage,
            accepted = accepted.len(),
            "Selection accepted; pipeline resumed"
        );

        Ok(accepted)
    }

    /// Candidate set of the pending checkpoint, if any
    pub async fn pending_candidates(&self, session_id: Uuid) -> Option<RankedSet> {
        let slot = self.slot(session_id).await?;
        let pending = slot.lock().await;
        pending.as_ref().map(|p| RankedSet {
            stage: p.stage,
            candidates: p.candidates.clone(),
        })
    }

    /// Drop any pending checkpoint so a suspended pipeline wakes with an
    /// error instead of hanging; used on failure and cancellation
    pub async fn fail(&self, session_id: Uuid) {
        if let Some(slot) = self.slot(session_id).await {
            let mut pending = slot.lock().await;
            if pending.take().is_some() {
                tracing::info!(
                    session_id = %session_id,
                    "Pending checkpoint dropped; any suspended waiter is woken"
                );
            }
        }
    }
}
