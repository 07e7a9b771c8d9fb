//! Deterministic heuristic scoring
//!
//! Weighted sum of independently computable components. Weights are fixed
//! constants summing to 1.0; the final score is clamped to [0, 1].
//!
//! | Component          | Weight | Raw signal                                  |
//! |--------------------|--------|---------------------------------------------|
//! | Concept overlap    | 0.40   | matched / total theme concepts              |
//! | Movement alignment | 0.25   | matched / total target movements            |
//! | Temporal fit       | 0.20   | 1.0 in period, stepwise decay outside       |
//! | Reference bonus    | 0.15   | 1.0 when discovered via a reference entity  |

use async_trait::async_trait;

use super::{ScoreError, ScoringStrategy};
use crate::models::{
    CanonicalEntity, RelevanceAssessment, ScoreComponents, ScoringMethod, ThemeContext,
};

/// Fixed component weights
#[derive(Debug, Clone, Copy)]
pub struct HeuristicWeights {
    pub concept_overlap: f64,
    pub movement_alignment: f64,
    pub temporal_fit: f64,
    pub reference_bonus: f64,
}

impl Default for HeuristicWeights {
    fn default() -> Self {
        Self {
            concept_overlap: 0.40,
            movement_alignment: 0.25,
            temporal_fit: 0.20,
            reference_bonus: 0.15,
        }
    }
}

/// Deterministic scoring strategy
pub struct HeuristicStrategy {
    weights: HeuristicWeights,
}

impl HeuristicStrategy {
    pub fn new() -> Self {
        Self {
            weights: HeuristicWeights::default(),
        }
    }

    /// Evaluate an entity; infallible by construction
    pub fn evaluate(&self, entity: &CanonicalEntity, ctx: &ThemeContext) -> RelevanceAssessment {
        let w = self.weights;

        let (concept_ratio, matched_concepts) = concept_overlap(entity, ctx);
        let movement_ratio = movement_alignment(entity, ctx);
        let temporal = temporal_fit(entity.active_year, ctx);
        let reference = if entity.via_reference.is_some() {
            1.0
        } else {
            0.0
        };

        let components = ScoreComponents {
            concept_overlap: w.concept_overlap * concept_ratio,
            movement_alignment: w.movement_alignment * movement_ratio,
            temporal_fit: w.temporal_fit * temporal,
            reference_bonus: w.reference_bonus * reference,
        };
        let score = components.total().clamp(0.0, 1.0);

        let rationale = build_rationale(entity, ctx, matched_concepts, movement_ratio, temporal);

        RelevanceAssessment {
            score,
            rationale,
            components,
            method: ScoringMethod::Heuristic,
        }
    }
}

impl Default for HeuristicStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScoringStrategy for HeuristicStrategy {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn score(
        &self,
        entity: &CanonicalEntity,
        ctx: &ThemeContext,
    ) -> Result<RelevanceAssessment, ScoreError> {
        Ok(self.evaluate(entity, ctx))
    }
}

/// Share of theme concepts found in the entity's text, plus the matches
fn concept_overlap(entity: &CanonicalEntity, ctx: &ThemeContext) -> (f64, Vec<String>) {
    if ctx.concepts.is_empty() {
        return (0.0, Vec::new());
    }

    let haystack = format!(
        "{} {} {} {}",
        entity.name,
        entity.description.as_deref().unwrap_or(""),
        entity.movements.join(" "),
        entity.mediums.join(" ")
    )
    .to_lowercase();

    let matched: Vec<String> = ctx
        .concepts
        .iter()
        .filter(|c| {
            let needle = c.trim().to_lowercase();
            !needle.is_empty() && haystack.contains(&needle)
        })
        .cloned()
        .collect();

    (matched.len() as f64 / ctx.concepts.len() as f64, matched)
}

/// Controlled-vocabulary alignment between entity movements and targets
fn movement_alignment(entity: &CanonicalEntity, ctx: &ThemeContext) -> f64 {
    if ctx.movements.is_empty() {
        return 0.0;
    }

    let matched = ctx
        .movements
        .iter()
        .filter(|target| {
            entity
                .movements
                .iter()
                .any(|m| m.eq_ignore_ascii_case(target))
        })
        .count();

    matched as f64 / ctx.movements.len() as f64
}

/// 1.0 inside the target period; stepwise decay with distance outside it.
/// Neutral 0.5 when either the period or the entity's year is unknown.
fn temporal_fit(year: Option<i32>, ctx: &ThemeContext) -> f64 {
    let year = match year {
        Some(y) => y,
        None => return 0.5,
    };
    match ctx.period_distance(year) {
        None => 0.5,
        Some(0) => 1.0,
        Some(d) if d <= 10 => 0.7,
        Some(d) if d <= 25 => 0.4,
        Some(_) => 0.1,
    }
}

fn build_rationale(
    entity: &CanonicalEntity,
    ctx: &ThemeContext,
    matched_concepts: Vec<String>,
    movement_ratio: f64,
    temporal: f64,
) -> String {
    let mut parts: Vec<String> = Vec::new();

    if ctx.concepts.is_empty() {
        parts.push("No theme concepts to match against".to_string());
    } else if matched_concepts.is_empty() {
        parts.push("No overlap with the theme concepts".to_string());
    } else {
        parts.push(format!(
            "Matches theme concepts: {}",
            matched_concepts.join(", ")
        ));
    }

    if movement_ratio > 0.0 {
        parts.push("aligned with the targeted movements".to_string());
    }

    match (entity.active_year, temporal) {
        (Some(year), t) if t >= 1.0 => parts.push(format!("active in period ({})", year)),
        (Some(year), t) if t >= 0.4 => {
            parts.push(format!("active near the target period ({})", year))
        }
        _ => {}
    }

    if let Some(reference) = &entity.via_reference {
        parts.push(format!("surfaced via reference artist {}", reference));
    }

    let mut rationale = parts.join("; ");
    rationale.push('.');
    rationale
}
