//! Canonical entities and relevance assessments

use serde::{Deserialize, Serialize};

use super::record::{EntityKind, IdentityKey, SourceTag};

/// The deduplicated, merged representation of one real-world entity
///
/// Created by the reconciler, mutated by enrichment passes, finalized once
/// scored. Provenance is always non-empty and a subset of the source tags
/// of the records that fed the entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalEntity {
    pub identity: IdentityKey,
    pub kind: EntityKind,

    pub name: String,
    pub description: Option<String>,
    pub movements: Vec<String>,
    pub mediums: Vec<String>,
    /// Creator names (artwork entities only)
    pub creators: Vec<String>,
    pub nationality: Option<String>,
    pub gender: Option<String>,
    pub active_year: Option<i32>,
    pub image_url: Option<String>,

    /// Curator reference entity this entity was discovered through, if any
    pub via_reference: Option<String>,

    /// Sources that contributed at least one record (deduped, non-empty)
    pub provenance: Vec<SourceTag>,

    /// Present once the scorer has run
    pub assessment: Option<RelevanceAssessment>,
}

impl CanonicalEntity {
    /// Relevance score, 0.0 when not yet assessed
    pub fn relevance(&self) -> f64 {
        self.assessment.as_ref().map(|a| a.score).unwrap_or(0.0)
    }
}

/// How a relevance assessment was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMethod {
    /// LLM-backed strategy parsed successfully
    LanguageModel,
    /// Deterministic heuristic (either configured, or fallback after an
    /// LLM call/parse failure)
    Heuristic,
    /// Safe default after an internal scoring error
    Default,
}

/// Relevance assessment owned by exactly one canonical entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelevanceAssessment {
    /// Always in [0.0, 1.0]
    pub score: f64,
    /// Human-readable justification
    pub rationale: String,
    /// Weighted component contributions (heuristic) or zeros (LLM)
    pub components: ScoreComponents,
    pub method: ScoringMethod,
}

/// Weighted contribution of each heuristic component to the final score
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub concept_overlap: f64,
    pub movement_alignment: f64,
    pub temporal_fit: f64,
    pub reference_bonus: f64,
}

impl ScoreComponents {
    pub fn total(&self) -> f64 {
        self.concept_overlap + self.movement_alignment + self.temporal_fit + self.reference_bonus
    }
}

/// A ranked entity with its scores, as published to the operator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub entity: CanonicalEntity,
    /// Diversity sub-score in [0, 1]
    pub diversity: f64,
    /// relevance * 0.7 + diversity * 0.3
    pub combined: f64,
}
