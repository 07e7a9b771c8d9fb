//! Shared test helpers: in-memory source adapters and session drivers

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use atelier_cp::models::{
    CandidateRecord, CurationSession, CurationState, EntityKind, SessionOptions, SourceTag,
    ThemeContext,
};
use atelier_cp::services::orchestrator::PipelineSettings;
use atelier_cp::services::{CategoryRules, DiversityRanker, Scorer};
use atelier_cp::sources::{SourceAdapter, SourceMode};
use atelier_cp::AppState;

/// In-memory adapter returning canned records per entity kind
pub struct StubAdapter {
    tag: SourceTag,
    artists: Vec<CandidateRecord>,
    artworks: Vec<CandidateRecord>,
}

impl StubAdapter {
    pub fn new(tag: SourceTag) -> Self {
        Self {
            tag,
            artists: Vec::new(),
            artworks: Vec::new(),
        }
    }

    pub fn with_artists(mut self, artists: Vec<CandidateRecord>) -> Self {
        self.artists = artists;
        self
    }

    pub fn with_artworks(mut self, artworks: Vec<CandidateRecord>) -> Self {
        self.artworks = artworks;
        self
    }
}

#[async_trait]
impl SourceAdapter for StubAdapter {
    fn tag(&self) -> SourceTag {
        self.tag
    }

    fn mode(&self) -> SourceMode {
        SourceMode::Concurrent
    }

    async fn search(
        &self,
        _query: &str,
        kind: EntityKind,
        _ctx: &ThemeContext,
    ) -> Vec<CandidateRecord> {
        match kind {
            EntityKind::Artist => self.artists.clone(),
            EntityKind::Artwork => self.artworks.clone(),
        }
    }
}

pub fn artist_record(
    tag: SourceTag,
    qid: &str,
    name: &str,
    movement: &str,
    year: i32,
) -> CandidateRecord {
    let mut record = CandidateRecord::new(tag, EntityKind::Artist);
    record.authority_id = Some(qid.to_string());
    record.name = Some(name.to_string());
    record.description = Some(format!("{} painter associated with {}", name, movement));
    record.movements = vec![movement.to_string()];
    record.active_year = Some(year);
    record
}

pub fn artwork_record(
    tag: SourceTag,
    id: &str,
    title: &str,
    creator: &str,
    movement: &str,
    year: i32,
) -> CandidateRecord {
    let mut record = CandidateRecord::new(tag, EntityKind::Artwork);
    record.secondary_id = Some(id.to_string());
    record.name = Some(title.to_string());
    record.description = Some(format!("{} by {}", title, creator));
    record.creators = vec![creator.to_string()];
    record.movements = vec![movement.to_string()];
    record.active_year = Some(year);
    record
}

/// A small but realistic two-source fixture
pub fn fixture_adapters() -> Vec<Arc<dyn SourceAdapter>> {
    let wikidata = StubAdapter::new(SourceTag::Wikidata)
        .with_artists(vec![
            artist_record(SourceTag::Wikidata, "Q1001", "Maren Holst", "Impressionism", 1874),
            artist_record(SourceTag::Wikidata, "Q1002", "Iris Duval", "Impressionism", 1880),
            artist_record(SourceTag::Wikidata, "Q1003", "Tomas Brandt", "Realism", 1850),
        ])
        .with_artworks(vec![
            artwork_record(
                SourceTag::Wikidata,
                "wd:w1",
                "Morning on the River",
                "Maren Holst",
                "Impressionism",
                1885,
            ),
            artwork_record(
                SourceTag::Wikidata,
                "wd:w2",
                "Harvest Light",
                "Iris Duval",
                "Impressionism",
                1887,
            ),
        ]);

    let europeana = StubAdapter::new(SourceTag::Europeana)
        .with_artists(vec![
            // Same person as Wikidata's Q1001: carries the same authority id
            artist_record(SourceTag::Europeana, "Q1001", "Maren Holst", "Impressionism", 1874),
        ])
        .with_artworks(vec![
            artwork_record(
                SourceTag::Europeana,
                "eu:w3",
                "Quiet Harbor",
                "Tomas Brandt",
                "Realism",
                1862,
            ),
        ]);

    let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::new();
    adapters.push(Arc::new(wikidata));
    adapters.push(Arc::new(europeana));
    adapters
}

pub fn fixture_theme() -> ThemeContext {
    ThemeContext {
        title: "Light Over Water".to_string(),
        description: "Impressionist studies of rivers and harbors".to_string(),
        concepts: vec!["impressionism".to_string(), "river".to_string()],
        movements: vec!["Impressionism".to_string()],
        period: Some((1870, 1890)),
        reference_artists: vec!["Maren Holst".to_string()],
    }
}

pub fn test_state(adapters: Vec<Arc<dyn SourceAdapter>>) -> AppState {
    AppState::with_components(
        adapters,
        Scorer::heuristic_only(),
        DiversityRanker::new(CategoryRules::default()),
        PipelineSettings::default(),
    )
}

/// Insert a session, register it, and spawn its pipeline task
pub async fn spawn_session(
    state: &AppState,
    theme: ThemeContext,
    options: SessionOptions,
) -> (Uuid, CancellationToken) {
    let session = CurationSession::new(theme, options);
    let session_id = session.session_id;
    let handle = state.registry.insert(session).await;
    state.coordinator.register(session_id).await;

    let cancel_token = CancellationToken::new();
    let orchestrator = state.orchestrator.clone();
    let token = cancel_token.clone();
    tokio::spawn(async move {
        let _ = orchestrator.run(handle, token).await;
    });

    (session_id, cancel_token)
}

/// Poll until the session reaches a state matching the predicate
pub async fn wait_for_state(
    state: &AppState,
    session_id: Uuid,
    predicate: impl Fn(CurationState) -> bool,
) -> CurationSession {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        if let Some(snapshot) = state.registry.snapshot(session_id).await {
            if predicate(snapshot.state) {
                return snapshot;
            }
            if tokio::time::Instant::now() > deadline {
                panic!(
                    "Timed out waiting for session state (last state: {})",
                    snapshot.state
                );
            }
        } else if tokio::time::Instant::now() > deadline {
            panic!("Timed out waiting for unknown session");
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
