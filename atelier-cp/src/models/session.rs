//! Curation workflow state machine
//!
//! A curation session progresses through the pipeline states:
//! STARTING → THEME_REFINEMENT → DISCOVERING_ARTISTS →
//! AWAITING_ARTIST_SELECTION → DISCOVERING_ARTWORKS →
//! AWAITING_ARTWORK_SELECTION → ENRICHING → GENERATING_PROPOSAL →
//! COMPLETE (or FAILED / CANCELLED)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::{CanonicalEntity, RankedCandidate};
use super::proposal::ExhibitionProposal;
use super::theme::ThemeContext;

/// Curation workflow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CurationState {
    /// Session created, pipeline task not yet running
    Starting,
    /// Concept validation and derivation from the theme brief
    ThemeRefinement,
    /// Harvest → reconcile → score → rank for artists
    DiscoveringArtists,
    /// Paused: artist candidate set published, waiting for a selection
    AwaitingArtistSelection,
    /// Harvest → reconcile → score → rank for artworks
    DiscoveringArtworks,
    /// Paused: artwork candidate set published, waiting for a selection
    AwaitingArtworkSelection,
    /// Supplementary attribute passes over the selected artworks
    Enriching,
    /// Assembling the exhibition proposal
    GeneratingProposal,
    /// Finished successfully
    Complete,
    /// Terminated with an error
    Failed,
    /// Cancelled by the operator
    Cancelled,
}

impl CurationState {
    /// Name as exposed over the API and in events
    pub fn as_str(&self) -> &'static str {
        match self {
            CurationState::Starting => "STARTING",
            CurationState::ThemeRefinement => "THEME_REFINEMENT",
            CurationState::DiscoveringArtists => "DISCOVERING_ARTISTS",
            CurationState::AwaitingArtistSelection => "AWAITING_ARTIST_SELECTION",
            CurationState::DiscoveringArtworks => "DISCOVERING_ARTWORKS",
            CurationState::AwaitingArtworkSelection => "AWAITING_ARTWORK_SELECTION",
            CurationState::Enriching => "ENRICHING",
            CurationState::GeneratingProposal => "GENERATING_PROPOSAL",
            CurationState::Complete => "COMPLETE",
            CurationState::Failed => "FAILED",
            CurationState::Cancelled => "CANCELLED",
        }
    }

    /// Check if the state is terminal (finished)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CurationState::Complete | CurationState::Failed | CurationState::Cancelled
        )
    }

    /// Check if the state is a checkpoint pause
    pub fn is_awaiting(&self) -> bool {
        matches!(
            self,
            CurationState::AwaitingArtistSelection | CurationState::AwaitingArtworkSelection
        )
    }
}

impl std::fmt::Display for CurationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// State transition event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub session_id: Uuid,
    pub old_state: CurationState,
    pub new_state: CurationState,
    pub transitioned_at: DateTime<Utc>,
}

/// Coarse progress reported to the operator at each stage transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurationProgress {
    /// Overall completion (0.0 - 100.0)
    pub percentage: f64,
    /// Current operation description
    pub message: String,
    /// Elapsed time (seconds)
    pub elapsed_seconds: u64,
}

impl Default for CurationProgress {
    fn default() -> Self {
        Self {
            percentage: 0.0,
            message: String::from("Initializing..."),
            elapsed_seconds: 0,
        }
    }
}

/// Per-session options from the start request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Pause at checkpoints for operator selections; when false the
    /// pipeline auto-selects the top candidates by combined score
    pub interactive: bool,
    /// Number of artists to carry past the artist stage
    pub max_artists: usize,
    /// Number of artworks to carry past the artwork stage
    pub max_artworks: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            interactive: false,
            max_artists: 5,
            max_artworks: 12,
        }
    }
}

/// Curation session (in-memory state)
///
/// Candidate sets and selections are retained after each stage so a FAILED
/// session still exposes partial artifacts for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurationSession {
    /// Unique session identifier
    pub session_id: Uuid,

    /// Current workflow state
    pub state: CurationState,

    /// Theme brief driving the session
    pub theme: ThemeContext,

    /// Session options
    pub options: SessionOptions,

    /// Progress tracking
    pub progress: CurationProgress,

    /// Non-fatal notes accumulated during the run (absorbed source
    /// failures, ranking shortfalls)
    pub notes: Vec<String>,

    /// Error message when state is FAILED
    pub error: Option<String>,

    /// Most recently published artist candidate set
    pub artist_candidates: Vec<RankedCandidate>,
    /// Accepted artist selection
    pub selected_artists: Vec<CanonicalEntity>,
    /// Most recently published artwork candidate set
    pub artwork_candidates: Vec<RankedCandidate>,
    /// Accepted artwork selection
    pub selected_artworks: Vec<CanonicalEntity>,

    /// Final artifact, present only in COMPLETE
    pub proposal: Option<ExhibitionProposal>,

    /// Session start time
    pub started_at: DateTime<Utc>,
    /// Session end time (terminal states only)
    pub ended_at: Option<DateTime<Utc>>,
}

impl CurationSession {
    /// Create new curation session in STARTING state
    pub fn new(theme: ThemeContext, options: SessionOptions) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            state: CurationState::Starting,
            theme,
            options,
            progress: CurationProgress::default(),
            notes: Vec::new(),
            error: None,
            artist_candidates: Vec::new(),
            selected_artists: Vec::new(),
            artwork_candidates: Vec::new(),
            selected_artworks: Vec::new(),
            proposal: None,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Transition to new state
    pub fn transition_to(&mut self, new_state: CurationState) -> StateTransition {
        let transition = StateTransition {
            session_id: self.session_id,
            old_state: self.state,
            new_state,
            transitioned_at: Utc::now(),
        };
        self.state = new_state;

        // Set end time for terminal states
        if new_state.is_terminal() {
            self.ended_at = Some(Utc::now());
        }

        transition
    }

    /// Update progress
    pub fn update_progress(&mut self, percentage: f64, message: impl Into<String>) {
        self.progress.percentage = percentage.clamp(0.0, 100.0);
        self.progress.message = message.into();
        self.progress.elapsed_seconds = (Utc::now() - self.started_at).num_seconds().max(0) as u64;
    }

    /// Record a non-fatal note
    pub fn add_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    /// Check if session is terminal (finished)
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starting() {
        let session = CurationSession::new(ThemeContext::default(), SessionOptions::default());
        assert_eq!(session.state, CurationState::Starting);
        assert!(!session.is_terminal());
        assert!(session.ended_at.is_none());
    }

    #[test]
    fn test_transition_records_old_and_new() {
        let mut session = CurationSession::new(ThemeContext::default(), SessionOptions::default());
        let t = session.transition_to(CurationState::ThemeRefinement);
        assert_eq!(t.old_state, CurationState::Starting);
        assert_eq!(t.new_state, CurationState::ThemeRefinement);
        assert_eq!(session.state, CurationState::ThemeRefinement);
        assert!(session.ended_at.is_none());
    }

    #[test]
    fn test_terminal_states_set_end_time() {
        for terminal in [
            CurationState::Complete,
            CurationState::Failed,
            CurationState::Cancelled,
        ] {
            let mut session =
                CurationSession::new(ThemeContext::default(), SessionOptions::default());
            session.transition_to(terminal);
            assert!(session.is_terminal());
            assert!(session.ended_at.is_some());
        }
    }

    #[test]
    fn test_progress_clamped() {
        let mut session = CurationSession::new(ThemeContext::default(), SessionOptions::default());
        session.update_progress(150.0, "done-ish");
        assert_eq!(session.progress.percentage, 100.0);
        session.update_progress(-5.0, "backwards");
        assert_eq!(session.progress.percentage, 0.0);
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&CurationState::AwaitingArtistSelection).unwrap();
        assert_eq!(json, "\"AWAITING_ARTIST_SELECTION\"");
        assert!(CurationState::AwaitingArtistSelection.is_awaiting());
        assert!(!CurationState::DiscoveringArtists.is_awaiting());
    }
}
