//! Curation workflow API handlers
//!
//! POST /curation/start, GET /curation/status/:session_id,
//! POST /curation/select/:session_id, POST /curation/cancel/:session_id

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{
        CurationProgress, CurationSession, CurationState, ExhibitionProposal, RankedCandidate,
        SessionOptions, ThemeContext,
    },
    AppState,
};

/// POST /curation/start request
#[derive(Debug, Deserialize)]
pub struct StartCurationRequest {
    /// Short exhibition title (required)
    pub theme: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub concepts: Vec<String>,
    #[serde(default)]
    pub movements: Vec<String>,
    #[serde(default)]
    pub reference_artists: Vec<String>,
    /// Inclusive target period, e.g. [1870, 1890]
    #[serde(default)]
    pub period: Option<(i32, i32)>,
    #[serde(default)]
    pub interactive: bool,
    #[serde(default)]
    pub max_artists: Option<usize>,
    #[serde(default)]
    pub max_artworks: Option<usize>,
}

/// POST /curation/start response
#[derive(Debug, Serialize)]
pub struct StartCurationResponse {
    pub session_id: Uuid,
    pub state: CurationState,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

/// GET /curation/status response
///
/// Candidate sets appear only while the session awaits a selection, the
/// proposal only once COMPLETE, and the error message only when FAILED.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub session_id: Uuid,
    pub state: CurationState,
    pub progress: CurationProgress,
    pub notes: Vec<String>,
    pub started_at: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<RankedCandidate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ExhibitionProposal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// POST /curation/select request
#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    pub indices: Vec<usize>,
}

/// POST /curation/select response
#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub session_id: Uuid,
    pub state: CurationState,
    pub accepted_indices: Vec<usize>,
    /// Names of the accepted candidates, in submission order
    pub accepted: Vec<String>,
}

/// POST /curation/cancel response
#[derive(Debug, Serialize)]
pub struct CancelCurationResponse {
    pub session_id: Uuid,
    pub state: CurationState,
    pub cancelled_at: chrono::DateTime<chrono::Utc>,
}

/// POST /curation/start
///
/// Create a session and spawn its pipeline task. Returns the session id
/// immediately; progress is observed via /curation/status and SSE.
pub async fn start_curation(
    State(state): State<AppState>,
    Json(request): Json<StartCurationRequest>,
) -> ApiResult<Json<StartCurationResponse>> {
    if request.theme.trim().is_empty() {
        return Err(ApiError::BadRequest("Theme title is required".to_string()));
    }
    if request.concepts.is_empty()
        && request.description.trim().is_empty()
        && request.reference_artists.is_empty()
    {
        return Err(ApiError::BadRequest(
            "Provide at least one of: concepts, description, reference_artists".to_string(),
        ));
    }
    if let Some((start, end)) = request.period {
        if start > end {
            return Err(ApiError::BadRequest(format!(
                "Invalid period: {} > {}",
                start, end
            )));
        }
    }

    let defaults = SessionOptions::default();
    let options = SessionOptions {
        interactive: request.interactive,
        max_artists: request.max_artists.unwrap_or(defaults.max_artists).max(1),
        max_artworks: request.max_artworks.unwrap_or(defaults.max_artworks).max(1),
    };

    let theme = ThemeContext {
        title: request.theme.trim().to_string(),
        description: request.description.trim().to_string(),
        concepts: request.concepts,
        movements: request.movements,
        period: request.period,
        reference_artists: request.reference_artists,
    };

    let session = CurationSession::new(theme, options);
    let response = StartCurationResponse {
        session_id: session.session_id,
        state: session.state,
        started_at: session.started_at,
    };

    let session_id = session.session_id;
    let handle = state.registry.insert(session).await;
    state.coordinator.register(session_id).await;

    let cancel_token = CancellationToken::new();
    state
        .cancellation_tokens
        .write()
        .await
        .insert(session_id, cancel_token.clone());

    tracing::info!(session_id = %session_id, "Curation session started");

    // Spawn background task for workflow orchestration
    let orchestrator = state.orchestrator.clone();
    let last_error = state.last_error.clone();
    tokio::spawn(async move {
        if let Err(e) = orchestrator.run(handle, cancel_token).await {
            tracing::error!(
                session_id = %session_id,
                error = %e,
                "Curation workflow background task failed"
            );
            *last_error.write().await = Some(e.to_string());
        }
    });

    Ok(Json(response))
}

/// GET /curation/status/:session_id
pub async fn get_curation_status(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<StatusResponse>> {
    let session = state
        .registry
        .snapshot(session_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Curation session not found: {}", session_id)))?;

    tracing::debug!(session_id = %session_id, state = %session.state, "Status query");

    let candidates = match session.state {
        CurationState::AwaitingArtistSelection => Some(session.artist_candidates.clone()),
        CurationState::AwaitingArtworkSelection => Some(session.artwork_candidates.clone()),
        _ => None,
    };

    let result = match session.state {
        CurationState::Complete => session.proposal.clone(),
        _ => None,
    };

    let error = match session.state {
        CurationState::Failed => session.error.clone(),
        _ => None,
    };

    Ok(Json(StatusResponse {
        session_id: session.session_id,
        state: session.state,
        progress: session.progress.clone(),
        notes: session.notes.clone(),
        started_at: session.started_at,
        ended_at: session.ended_at,
        candidates,
        result,
        error,
    }))
}

/// POST /curation/select/:session_id
///
/// Submit a selection against the pending checkpoint. Rejected selections
/// (empty, out-of-range, wrong state) leave the session unchanged.
pub async fn submit_selection(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SelectionRequest>,
) -> ApiResult<Json<SelectionResponse>> {
    let session = state
        .registry
        .snapshot(session_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Curation session not found: {}", session_id)))?;

    let accepted = state
        .coordinator
        .submit(session_id, &request.indices, session.state)
        .await?;

    Ok(Json(SelectionResponse {
        session_id,
        state: session.state,
        accepted_indices: request.indices,
        accepted: accepted.into_iter().map(|c| c.entity.name).collect(),
    }))
}

/// POST /curation/cancel/:session_id
///
/// Cancel a running session. Wakes a pipeline suspended at a checkpoint;
/// terminal sessions cannot be cancelled.
pub async fn cancel_curation(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<CancelCurationResponse>> {
    let handle = state
        .registry
        .get(session_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Curation session not found: {}", session_id)))?;

    {
        let session = handle.read().await;
        if session.is_terminal() {
            return Err(ApiError::BadRequest(format!(
                "Curation session already in terminal state: {}",
                session.state
            )));
        }
    }

    // Wake the pipeline wherever it is: the token covers stage boundaries,
    // the dropped checkpoint covers a suspended wait
    if let Some(token) = state.cancellation_tokens.read().await.get(&session_id) {
        token.cancel();
    }
    state.coordinator.fail(session_id).await;

    tracing::info!(session_id = %session_id, "Curation session cancelled");

    let session = handle.read().await;
    Ok(Json(CancelCurationResponse {
        session_id,
        state: session.state,
        cancelled_at: chrono::Utc::now(),
    }))
}

/// Build curation workflow routes
pub fn curation_routes() -> Router<AppState> {
    Router::new()
        .route("/curation/start", post(start_curation))
        .route("/curation/status/:session_id", get(get_curation_status))
        .route("/curation/select/:session_id", post(submit_selection))
        .route("/curation/cancel/:session_id", post(cancel_curation))
}
