//! Relevance scoring
//!
//! Two interchangeable strategies behind one contract: an LLM-backed
//! strategy and a deterministic heuristic. Any call or parse failure in
//! the LLM strategy routes to the heuristic; any internal error beyond
//! that yields a safe default. `Scorer::assess` never fails.

mod heuristic;
mod llm;

pub use heuristic::{HeuristicStrategy, HeuristicWeights};
pub use llm::LlmStrategy;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    CanonicalEntity, RelevanceAssessment, ScoreComponents, ScoringMethod, ThemeContext,
};

/// Scoring strategy errors
#[derive(Debug, Error)]
pub enum ScoreError {
    /// LLM backend call failed
    #[error("Backend error: {0}")]
    Backend(String),

    /// LLM response did not contain a usable score/rationale layout
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A strategy that assesses one entity against the theme context
#[async_trait]
pub trait ScoringStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn score(
        &self,
        entity: &CanonicalEntity,
        ctx: &ThemeContext,
    ) -> Result<RelevanceAssessment, ScoreError>;
}

/// Front door for relevance scoring
///
/// Tries the primary (LLM) strategy when configured, falls back to the
/// heuristic on any failure, and degrades to a neutral default if even the
/// heuristic errors. The returned score is always in [0, 1].
pub struct Scorer {
    primary: Option<LlmStrategy>,
    heuristic: HeuristicStrategy,
}

impl Scorer {
    /// Heuristic-only scorer
    pub fn heuristic_only() -> Self {
        Self {
            primary: None,
            heuristic: HeuristicStrategy::new(),
        }
    }

    /// LLM-backed scorer with heuristic fallback
    pub fn with_llm(primary: LlmStrategy) -> Self {
        Self {
            primary: Some(primary),
            heuristic: HeuristicStrategy::new(),
        }
    }

    /// Assess an entity; never fails
    pub async fn assess(&self, entity: &CanonicalEntity, ctx: &ThemeContext) -> RelevanceAssessment {
        if let Some(primary) = &self.primary {
            match primary.score(entity, ctx).await {
                Ok(assessment) => return clamped(assessment),
                Err(e) => {
                    tracing::warn!(
                        entity = %entity.name,
                        error = %e,
                        "LLM scoring degraded; falling back to heuristic"
                    );
                }
            }
        }

        match self.heuristic.score(entity, ctx).await {
            Ok(assessment) => clamped(assessment),
            Err(e) => {
                tracing::error!(
                    entity = %entity.name,
                    error = %e,
                    "Heuristic scoring failed; using neutral default"
                );
                RelevanceAssessment {
                    score: 0.5,
                    rationale: "Relevance could not be established; neutral default applied."
                        .to_string(),
                    components: ScoreComponents::default(),
                    method: ScoringMethod::Default,
                }
            }
        }
    }
}

fn clamped(mut assessment: RelevanceAssessment) -> RelevanceAssessment {
    assessment.score = assessment.score.clamp(0.0, 1.0);
    assessment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityKind, IdentityKey, SourceTag};
    use crate::sources::{LanguageModel, LlmError};
    use std::sync::Arc;

    pub(super) fn entity(name: &str, description: &str) -> CanonicalEntity {
        CanonicalEntity {
            identity: IdentityKey::Name(crate::models::normalize_name(name)),
            kind: EntityKind::Artist,
            name: name.to_string(),
            description: Some(description.to_string()),
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
        }
    }

    struct CannedModel {
        response: Result<String, ()>,
    }

    #[async_trait]
    impl LanguageModel for CannedModel {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            self.response
                .clone()
                .map_err(|_| LlmError::NetworkError("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_llm_success_used_directly() {
        let model = Arc::new(CannedModel {
            response: Ok("SCORE: 0.85\nRATIONALE: Strong overlap with the theme.".to_string()),
        });
        let scorer = Scorer::with_llm(LlmStrategy::new(model));

        let a = scorer
            .assess(&entity("Agnes Martin", "grid paintings"), &ThemeContext::default())
            .await;
        assert_eq!(a.method, ScoringMethod::LanguageModel);
        assert!((a.score - 0.85).abs() < 1e-9);
        assert!(a.rationale.contains("Strong overlap"));
    }

    #[tokio::test]
    async fn test_llm_failure_falls_back_to_heuristic() {
        let model = Arc::new(CannedModel { response: Err(()) });
        let scorer = Scorer::with_llm(LlmStrategy::new(model));

        let a = scorer
            .assess(&entity("Agnes Martin", "grid paintings"), &ThemeContext::default())
            .await;
        assert_eq!(a.method, ScoringMethod::Heuristic);
        assert!((0.0..=1.0).contains(&a.score));
    }

    #[tokio::test]
    async fn test_malformed_llm_text_falls_back() {
        for junk in [
            "",
            "I think this artist is quite relevant!",
            "SCORE: n/a\nRATIONALE: none",
            "{\"score\": 0.9}",
        ] {
            let model = Arc::new(CannedModel {
                response: Ok(junk.to_string()),
            });
            let scorer = Scorer::with_llm(LlmStrategy::new(model));
            let a = scorer
                .assess(&entity("X", "y"), &ThemeContext::default())
                .await;
            assert_eq!(a.method, ScoringMethod::Heuristic, "input: {:?}", junk);
            assert!((0.0..=1.0).contains(&a.score));
        }
    }

    #[tokio::test]
    async fn test_out_of_range_llm_score_clamped() {
        let model = Arc::new(CannedModel {
            response: Ok("SCORE: 7.5\nRATIONALE: enthusiastic".to_string()),
        });
        let scorer = Scorer::with_llm(LlmStrategy::new(model));
        let a = scorer
            .assess(&entity("X", "y"), &ThemeContext::default())
            .await;
        assert_eq!(a.score, 1.0);
    }
}
