//! Curation workflow orchestrator
//!
//! Drives the full sequence for one session:
//! THEME_REFINEMENT → DISCOVERING_ARTISTS → (AWAITING_ARTIST_SELECTION) →
//! DISCOVERING_ARTWORKS → (AWAITING_ARTWORK_SELECTION) → ENRICHING →
//! GENERATING_PROPOSAL → COMPLETE
//!
//! Each discovery stage runs Harvester → Reconciler → Scorer → Ranker.
//! Interactive sessions pause at the checkpoints; non-interactive sessions
//! auto-select the top candidates by combined score. Per-record and
//! per-adapter errors are absorbed upstream; only whole-stage failures
//! reach this layer, where they transition the session to FAILED with the
//! partial artifacts preserved.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use atelier_common::events::{CurationEvent, EventBus};

use crate::models::{
    CandidateRecord, CanonicalEntity, CurationState, EntityKind, RankedCandidate, SourceTag,
    ThemeContext,
};
use crate::models::{ExhibitionProposal, ProposalEntry, ProposalSection};
use crate::services::checkpoint::CheckpointCoordinator;
use crate::services::harvester::{CandidateHarvester, HarvestQuery};
use crate::services::ranker::DiversityRanker;
use crate::services::reconciler::RecordReconciler;
use crate::services::registry::SessionHandle;
use crate::services::scorer::Scorer;

/// Whole-stage failures; everything smaller is absorbed before it gets here
#[derive(Debug, Error)]
pub enum StageError {
    /// A discovery stage exhausted every source without usable output
    #[error("{stage} produced no usable candidates")]
    NoCandidates { stage: CurationState },

    /// The session was cancelled by the operator
    #[error("session cancelled")]
    Cancelled,

    /// The checkpoint handshake terminated without a selection
    #[error("checkpoint wait terminated: {0}")]
    CheckpointAborted(String),
}

/// External progress reporting
///
/// Invoked at each stage transition. Errors inside a sink are caught and
/// logged by the orchestrator, never propagated into the pipeline.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn report(
        &self,
        session_id: Uuid,
        stage: CurationState,
        percentage: f64,
        message: &str,
    ) -> anyhow::Result<()>;
}

/// Progress sink backed by the shared event bus
pub struct EventBusSink {
    bus: EventBus,
}

impl EventBusSink {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl ProgressSink for EventBusSink {
    async fn report(
        &self,
        session_id: Uuid,
        stage: CurationState,
        percentage: f64,
        message: &str,
    ) -> anyhow::Result<()> {
        self.bus.emit_lossy(CurationEvent::ProgressUpdated {
            session_id,
            stage: stage.as_str().to_string(),
            percentage,
            message: message.to_string(),
            timestamp: Utc::now(),
        });
        Ok(())
    }
}

/// Pipeline-wide settings applied to every session
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Upper bound on any published candidate set
    pub candidate_pool_size: usize,
    /// Minimum-representation targets for the artist stage
    pub artist_targets: BTreeMap<String, usize>,
    /// Minimum-representation targets for the artwork stage
    pub artwork_targets: BTreeMap<String, usize>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            candidate_pool_size: 12,
            artist_targets: BTreeMap::new(),
            artwork_targets: BTreeMap::new(),
        }
    }
}

/// Orchestrates the curation pipeline for all sessions
pub struct StageOrchestrator {
    coordinator: Arc<CheckpointCoordinator>,
    harvester: CandidateHarvester,
    reconciler: RecordReconciler,
    scorer: Scorer,
    ranker: DiversityRanker,
    progress: Arc<dyn ProgressSink>,
    event_bus: EventBus,
    settings: PipelineSettings,
}

impl StageOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        coordinator: Arc<CheckpointCoordinator>,
        harvester: CandidateHarvester,
        scorer: Scorer,
        ranker: DiversityRanker,
        progress: Arc<dyn ProgressSink>,
        event_bus: EventBus,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            coordinator,
            harvester,
            reconciler: RecordReconciler::new(),
            scorer,
            ranker,
            progress,
            event_bus,
            settings,
        }
    }

    /// Execute the complete curation workflow for one session
    ///
    /// Runs until COMPLETE, FAILED, or CANCELLED. The error branch records
    /// the failure on the session before propagating it to the caller.
    pub async fn run(
        &self,
        handle: SessionHandle,
        cancel_token: CancellationToken,
    ) -> anyhow::Result<()> {
        let (session_id, theme_title) = {
            let session = handle.read().await;
            (session.session_id, session.theme.title.clone())
        };

        tracing::info!(session_id = %session_id, theme = %theme_title, "Starting curation workflow");

        self.event_bus.emit_lossy(CurationEvent::SessionStarted {
            session_id,
            theme: theme_title,
            timestamp: Utc::now(),
        });

        match self.execute(&handle, session_id, &cancel_token).await {
            Ok(()) => {
                let session = handle.read().await;
                let duration_seconds =
                    (Utc::now() - session.started_at).num_seconds().max(0) as u64;
                tracing::info!(
                    session_id = %session_id,
                    duration_seconds,
                    "Curation workflow completed successfully"
                );
                self.event_bus.emit_lossy(CurationEvent::SessionCompleted {
                    session_id,
                    artist_count: session.selected_artists.len(),
                    artwork_count: session.selected_artworks.len(),
                    duration_seconds,
                    timestamp: Utc::now(),
                });
                Ok(())
            }
            Err(StageError::Cancelled) => {
                tracing::info!(session_id = %session_id, "Curation workflow cancelled");
                self.coordinator.fail(session_id).await;
                let mut session = handle.write().await;
                if !session.is_terminal() {
                    session.transition_to(CurationState::Cancelled);
                    let percentage = session.progress.percentage;
                    session.update_progress(percentage, "Cancelled by operator");
                }
                drop(session);
                self.event_bus.emit_lossy(CurationEvent::SessionCancelled {
                    session_id,
                    timestamp: Utc::now(),
                });
                Ok(())
            }
            Err(e) => {
                tracing::error!(session_id = %session_id, error = %e, "Curation workflow failed");
                // Wake any waiter before recording the failure
                self.coordinator.fail(session_id).await;
                let stage = {
                    let mut session = handle.write().await;
                    let stage = session.state;
                    if !session.is_terminal() {
                        session.error = Some(e.to_string());
                        session.transition_to(CurationState::Failed);
                        let percentage = session.progress.percentage;
                        session.update_progress(percentage, format!("Failed: {}", e));
                    }
                    stage
                };
                self.event_bus.emit_lossy(CurationEvent::SessionFailed {
                    session_id,
                    stage: stage.as_str().to_string(),
                    error: e.to_string(),
                    timestamp: Utc::now(),
                });
                Err(e.into())
            }
        }
    }

    async fn execute(
        &self,
        handle: &SessionHandle,
        session_id: Uuid,
        cancel_token: &CancellationToken,
    ) -> Result<(), StageError> {
        // Phase 1: THEME_REFINEMENT
        let theme = self.phase_theme_refinement(handle, session_id, cancel_token).await?;

        // Phase 2: DISCOVERING_ARTISTS (+ optional checkpoint)
        let artists = self
            .phase_discover_artists(handle, session_id, &theme, cancel_token)
            .await?;

        // Phase 3: DISCOVERING_ARTWORKS (+ optional checkpoint)
        let artworks = self
            .phase_discover_artworks(handle, session_id, &theme, &artists, cancel_token)
            .await?;

        // Phase 4: ENRICHING
        let artworks = self
            .phase_enrich(handle, session_id, &theme, artworks, cancel_token)
            .await?;

        // Phase 5: GENERATING_PROPOSAL
        self.phase_proposal(handle, session_id, &theme, &artists, artworks, cancel_token)
            .await?;

        Ok(())
    }

    /// Transition into a stage, update coarse progress, and notify the sink
    async fn enter_stage(
        &self,
        handle: &SessionHandle,
        session_id: Uuid,
        stage: CurationState,
        percentage: f64,
        message: &str,
        cancel_token: &CancellationToken,
    ) -> Result<(), StageError> {
        if cancel_token.is_cancelled() {
            return Err(StageError::Cancelled);
        }

        {
            let mut session = handle.write().await;
            session.transition_to(stage);
            session.update_progress(percentage, message);
        }

        tracing::info!(session_id = %session_id, stage = %stage, "Stage started");
        self.event_bus.emit_lossy(CurationEvent::StageStarted {
            session_id,
            stage: stage.as_str().to_string(),
            timestamp: Utc::now(),
        });

        // Sink errors are logged, never propagated
        if let Err(e) = self
            .progress
            .report(session_id, stage, percentage, message)
            .await
        {
            tracing::warn!(session_id = %session_id, error = %e, "Progress sink failed");
        }

        Ok(())
    }

    /// Phase 1: validate provided concepts, derive missing ones from the
    /// theme description
    async fn phase_theme_refinement(
        &self,
        handle: &SessionHandle,
        session_id: Uuid,
        cancel_token: &CancellationToken,
    ) -> Result<ThemeContext, StageError> {
        self.enter_stage(
            handle,
            session_id,
            CurationState::ThemeRefinement,
            5.0,
            "Refining theme concepts",
            cancel_token,
        )
        .await?;

        let mut session = handle.write().await;

        let mut concepts: Vec<String> = session
            .theme
            .concepts
            .iter()
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect();
        concepts.dedup();

        if concepts.is_empty() {
            concepts = derive_concepts(&session.theme.description);
            if !concepts.is_empty() {
                tracing::info!(
                    session_id = %session_id,
                    derived = concepts.len(),
                    "No validated concepts provided; derived from theme description"
                );
                session.add_note(format!(
                    "Derived {} concepts from the theme description",
                    concepts.len()
                ));
            }
        }

        session.theme.concepts = dedup_preserving_order(concepts);
        Ok(session.theme.clone())
    }

    /// Phase 2: harvest → reconcile → score → rank artists, then pause or
    /// auto-select
    async fn phase_discover_artists(
        &self,
        handle: &SessionHandle,
        session_id: Uuid,
        theme: &ThemeContext,
        cancel_token: &CancellationToken,
    ) -> Result<Vec<CanonicalEntity>, StageError> {
        self.enter_stage(
            handle,
            session_id,
            CurationState::DiscoveringArtists,
            15.0,
            "Discovering candidate artists",
            cancel_token,
        )
        .await?;

        let mut queries: Vec<HarvestQuery> = theme
            .concepts
            .iter()
            .map(|c| HarvestQuery::Concept(c.clone()))
            .collect();
        queries.extend(
            theme
                .reference_artists
                .iter()
                .map(|r| HarvestQuery::Reference(r.clone())),
        );

        let mut records = seed_reference_records(theme);
        records.extend(
            self.harvester
                .harvest(&queries, EntityKind::Artist, theme)
                .await,
        );

        let ranked = self
            .discover(
                handle,
                session_id,
                theme,
                records,
                CurationState::DiscoveringArtists,
                &self.settings.artist_targets,
                25.0,
                cancel_token,
            )
            .await?;

        {
            let mut session = handle.write().await;
            session.artist_candidates = ranked.clone();
        }

        let max_artists = handle.read().await.options.max_artists;
        let interactive = handle.read().await.options.interactive;

        let selected = if interactive {
            self.await_selection(
                handle,
                session_id,
                CurationState::AwaitingArtistSelection,
                &ranked,
                40.0,
                cancel_token,
            )
            .await?
        } else {
            auto_select(&ranked, max_artists)
        };

        tracing::info!(
            session_id = %session_id,
            selected = selected.len(),
            "Artist selection settled"
        );

        {
            let mut session = handle.write().await;
            session.selected_artists = selected.clone();
        }

        Ok(selected)
    }

    /// Phase 3: harvest → reconcile → score → rank artworks for the
    /// selected artists, then pause or auto-select
    async fn phase_discover_artworks(
        &self,
        handle: &SessionHandle,
        session_id: Uuid,
        theme: &ThemeContext,
        artists: &[CanonicalEntity],
        cancel_token: &CancellationToken,
    ) -> Result<Vec<CanonicalEntity>, StageError> {
        self.enter_stage(
            handle,
            session_id,
            CurationState::DiscoveringArtworks,
            55.0,
            "Discovering candidate artworks",
            cancel_token,
        )
        .await?;

        // Works by the selected artists count as reference-derived; theme
        // concepts widen the net
        let mut queries: Vec<HarvestQuery> = artists
            .iter()
            .map(|a| HarvestQuery::Reference(a.name.clone()))
            .collect();
        queries.extend(
            theme
                .concepts
                .iter()
                .map(|c| HarvestQuery::Concept(c.clone())),
        );

        let records = self
            .harvester
            .harvest(&queries, EntityKind::Artwork, theme)
            .await;

        let ranked = self
            .discover(
                handle,
                session_id,
                theme,
                records,
                CurationState::DiscoveringArtworks,
                &self.settings.artwork_targets,
                62.0,
                cancel_token,
            )
            .await?;

        {
            let mut session = handle.write().await;
            session.artwork_candidates = ranked.clone();
        }

        let max_artworks = handle.read().await.options.max_artworks;
        let interactive = handle.read().await.options.interactive;

        let selected = if interactive {
            self.await_selection(
                handle,
                session_id,
                CurationState::AwaitingArtworkSelection,
                &ranked,
                70.0,
                cancel_token,
            )
            .await?
        } else {
            auto_select(&ranked, max_artworks)
        };

        tracing::info!(
            session_id = %session_id,
            selected = selected.len(),
            "Artwork selection settled"
        );

        {
            let mut session = handle.write().await;
            session.selected_artworks = selected.clone();
        }

        Ok(selected)
    }

    /// Shared reconcile → score → rank tail of a discovery stage
    #[allow(clippy::too_many_arguments)]
    async fn discover(
        &self,
        handle: &SessionHandle,
        session_id: Uuid,
        theme: &ThemeContext,
        records: Vec<CandidateRecord>,
        stage: CurationState,
        targets: &BTreeMap<String, usize>,
        scoring_percentage: f64,
        cancel_token: &CancellationToken,
    ) -> Result<Vec<RankedCandidate>, StageError> {
        tracing::debug!(
            session_id = %session_id,
            stage = %stage,
            records = records.len(),
            "Reconciling harvested records"
        );

        if records.is_empty() {
            return Err(StageError::NoCandidates { stage });
        }

        let mut entities = self.reconciler.reconcile(records);
        if entities.is_empty() {
            return Err(StageError::NoCandidates { stage });
        }

        {
            let mut session = handle.write().await;
            session.update_progress(
                scoring_percentage,
                format!("Scoring {} candidates", entities.len()),
            );
        }

        for entity in entities.iter_mut() {
            if cancel_token.is_cancelled() {
                return Err(StageError::Cancelled);
            }
            let assessment = self.scorer.assess(entity, theme).await;
            entity.assessment = Some(assessment);
        }

        let ranked = self
            .ranker
            .rank(entities, self.settings.candidate_pool_size, targets);
        if ranked.is_empty() {
            return Err(StageError::NoCandidates { stage });
        }

        Ok(ranked)
    }

    /// Publish a checkpoint and suspend until a selection resolves it
    async fn await_selection(
        &self,
        handle: &SessionHandle,
        session_id: Uuid,
        stage: CurationState,
        ranked: &[RankedCandidate],
        percentage: f64,
        cancel_token: &CancellationToken,
    ) -> Result<Vec<CanonicalEntity>, StageError> {
        // Publish before the state transition: once the session reads as
        // AWAITING_*, the checkpoint is guaranteed to be pending. A submit
        // landing in between is rejected by the state check and retried by
        // the operator.
        let receiver = self
            .coordinator
            .publish(session_id, stage, ranked.to_vec())
            .await
            .map_err(|e| StageError::CheckpointAborted(e.to_string()))?;

        self.enter_stage(
            handle,
            session_id,
            stage,
            percentage,
            "Awaiting operator selection",
            cancel_token,
        )
        .await?;

        self.event_bus.emit_lossy(CurationEvent::CheckpointPublished {
            session_id,
            stage: stage.as_str().to_string(),
            candidate_count: ranked.len(),
            timestamp: Utc::now(),
        });

        // The only unbounded suspension in the pipeline: resumed by a
        // selection, a cancellation, or a failure dropping the sender.
        // No default timeout is enforced here.
        let indices = tokio::select! {
            _ = cancel_token.cancelled() => return Err(StageError::Cancelled),
            resolved = receiver => resolved.map_err(|_| {
                if cancel_token.is_cancelled() {
                    StageError::Cancelled
                } else {
                    StageError::CheckpointAborted("checkpoint dropped before selection".to_string())
                }
            })?,
        };

        self.event_bus.emit_lossy(CurationEvent::SelectionAccepted {
            session_id,
            stage: stage.as_str().to_string(),
            accepted: indices.clone(),
            timestamp: Utc::now(),
        });

        Ok(indices
            .into_iter()
            .filter_map(|i| ranked.get(i).map(|r| r.entity.clone()))
            .collect())
    }

    /// Phase 4: supplementary attribute passes over the selected artworks
    ///
    /// Fail-open per entity: an artwork whose enrichment harvest fails
    /// keeps its existing attributes.
    async fn phase_enrich(
        &self,
        handle: &SessionHandle,
        session_id: Uuid,
        theme: &ThemeContext,
        mut artworks: Vec<CanonicalEntity>,
        cancel_token: &CancellationToken,
    ) -> Result<Vec<CanonicalEntity>, StageError> {
        self.enter_stage(
            handle,
            session_id,
            CurationState::Enriching,
            80.0,
            "Enriching selected artworks",
            cancel_token,
        )
        .await?;

        for artwork in artworks.iter_mut() {
            if cancel_token.is_cancelled() {
                return Err(StageError::Cancelled);
            }
            let queries = [HarvestQuery::Concept(artwork.name.clone())];
            let records = self
                .harvester
                .harvest(&queries, EntityKind::Artwork, theme)
                .await;
            if records.is_empty() {
                let mut session = handle.write().await;
                session.add_note(format!("No supplementary records found for {}", artwork.name));
                continue;
            }
            self.reconciler.enrich(artwork, records);
        }

        {
            let mut session = handle.write().await;
            session.selected_artworks = artworks.clone();
        }

        Ok(artworks)
    }

    /// Phase 5: assemble the exhibition proposal and complete the session
    async fn phase_proposal(
        &self,
        handle: &SessionHandle,
        session_id: Uuid,
        theme: &ThemeContext,
        artists: &[CanonicalEntity],
        artworks: Vec<CanonicalEntity>,
        cancel_token: &CancellationToken,
    ) -> Result<(), StageError> {
        self.enter_stage(
            handle,
            session_id,
            CurationState::GeneratingProposal,
            92.0,
            "Assembling exhibition proposal",
            cancel_token,
        )
        .await?;

        let proposal = build_proposal(theme, artists, &artworks);

        let mut session = handle.write().await;
        session.proposal = Some(proposal);
        session.transition_to(CurationState::Complete);
        session.update_progress(100.0, "Curation complete");

        Ok(())
    }
}

/// Top-N auto-selection by combined score (the ranker output is already
/// ordered)
fn auto_select(ranked: &[RankedCandidate], max: usize) -> Vec<CanonicalEntity> {
    ranked
        .iter()
        .take(max)
        .map(|r| r.entity.clone())
        .collect()
}

/// Seed records for the curator's reference artists, so they participate
/// in reconciliation and scoring like any discovered candidate
fn seed_reference_records(theme: &ThemeContext) -> Vec<CandidateRecord> {
    theme
        .reference_artists
        .iter()
        .map(|name| {
            let mut record = CandidateRecord::new(SourceTag::CuratorSeed, EntityKind::Artist);
            record.name = Some(name.clone());
            record.via_reference = Some(name.clone());
            record
        })
        .collect()
}

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "from", "into", "between", "their", "about",
    "through", "exhibition", "artists", "artworks", "works", "art",
];

/// Keyword extraction fallback when the brief carries no validated concepts
fn derive_concepts(description: &str) -> Vec<String> {
    let mut concepts: Vec<String> = Vec::new();
    for word in description
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
    {
        if word.len() <= 3 || STOPWORDS.contains(&word) {
            continue;
        }
        if !concepts.iter().any(|c| c == word) {
            concepts.push(word.to_string());
        }
        if concepts.len() >= 6 {
            break;
        }
    }
    concepts
}

fn dedup_preserving_order(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

/// Group the selected artworks into sections by movement (medium as
/// fallback) and pull per-section rationale lines from the assessments
fn build_proposal(
    theme: &ThemeContext,
    artists: &[CanonicalEntity],
    artworks: &[CanonicalEntity],
) -> ExhibitionProposal {
    let mut sections: Vec<ProposalSection> = Vec::new();
    let mut section_index: BTreeMap<String, usize> = BTreeMap::new();

    for artwork in artworks {
        let section_title = artwork
            .movements
            .first()
            .or_else(|| artwork.mediums.first())
            .cloned()
            .unwrap_or_else(|| "Highlights".to_string());

        let entry = ProposalEntry {
            title: artwork.name.clone(),
            artist: artwork
                .creators
                .first()
                .cloned()
                .or_else(|| artwork.via_reference.clone()),
            year: artwork.active_year,
            image_url: artwork.image_url.clone(),
            sources: artwork.provenance.clone(),
        };

        let rationale_line = artwork
            .assessment
            .as_ref()
            .map(|a| a.rationale.clone())
            .unwrap_or_default();

        match section_index.get(&section_title) {
            Some(&i) => {
                sections[i].artworks.push(entry);
            }
            None => {
                section_index.insert(section_title.clone(), sections.len());
                sections.push(ProposalSection {
                    title: section_title,
                    rationale: rationale_line,
                    artworks: vec![entry],
                });
            }
        }
    }

    ExhibitionProposal {
        theme_title: theme.title.clone(),
        statement: theme.description.clone(),
        artists: artists.iter().map(|a| a.name.clone()).collect(),
        artwork_count: artworks.len(),
        sections,
        generated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_concepts_filters_stopwords_and_short_words() {
        let concepts =
            derive_concepts("An exhibition about light and water in impressionist painting");
        assert!(concepts.contains(&"light".to_string()));
        assert!(concepts.contains(&"water".to_string()));
        assert!(concepts.contains(&"impressionist".to_string()));
        assert!(!concepts.iter().any(|c| c == "about" || c == "and"));
        assert!(concepts.len() <= 6);
    }

    #[test]
    fn test_auto_select_takes_prefix() {
        let entity = |name: &str| CanonicalEntity {
            identity: crate::models::IdentityKey::Name(name.to_string()),
            kind: EntityKind::Artist,
            name: name.to_string(),
            description: None,
            movements: Vec::new(),
            mediums: Vec::new(),
            creators: Vec::new(),
            nationality: None,
            gender: None,
            active_year: None,
            image_url: None,
            via_reference: None,
            provenance: vec![SourceTag::Wikidata],
            assessment: None,
        };
        let ranked: Vec<RankedCandidate> = ["a", "b", "c"]
            .iter()
            .map(|n| RankedCandidate {
                entity: entity(n),
                diversity: 0.0,
                combined: 0.0,
            })
            .collect();

        let selected = auto_select(&ranked, 2);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].name, "a");

        assert_eq!(auto_select(&ranked, 10).len(), 3);
    }

    #[test]
    fn test_seed_records_carry_reference() {
        let theme = ThemeContext {
            reference_artists: vec!["Claude Monet".to_string()],
            ..Default::default()
        };
        let seeds = seed_reference_records(&theme);
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].source, SourceTag::CuratorSeed);
        assert_eq!(seeds[0].via_reference.as_deref(), Some("Claude Monet"));
    }

    #[test]
    fn test_build_proposal_groups_by_movement() {
        let mut a = CanonicalEntity {
            identity: crate::models::IdentityKey::Name("w1".to_string()),
            kind: EntityKind::Artwork,
            name: "Work One".to_string(),
            description: None,
            movements: vec!["Surrealism".to_string()],
            mediums: vec!["oil".to_string()],
            creators: vec!["Artist A".to_string()],
            nationality: None,
            gender: None,
            active_year: Some(1931),
            image_url: None,
            via_reference: None,
            provenance: vec![SourceTag::Europeana],
            assessment: None,
        };
        let mut b = a.clone();
        b.name = "Work Two".to_string();
        b.movements = Vec::new(); // falls back to medium
        let mut c = a.clone();
        c.name = "Work Three".to_string();

        a.assessment = None;
        let theme = ThemeContext {
            title: "Dream Logic".to_string(),
            description: "Surrealist imagery".to_string(),
            ..Default::default()
        };

        let proposal = build_proposal(&theme, &[], &[a, b, c]);
        assert_eq!(proposal.artwork_count, 3);
        assert_eq!(proposal.sections.len(), 2);

        let surrealism = proposal
            .sections
            .iter()
            .find(|s| s.title == "Surrealism")
            .unwrap();
        assert_eq!(surrealism.artworks.len(), 2);
        let oil = proposal.sections.iter().find(|s| s.title == "oil").unwrap();
        assert_eq!(oil.artworks[0].artist.as_deref(), Some("Artist A"));
    }
}
