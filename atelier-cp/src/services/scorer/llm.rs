//! LLM-backed scoring strategy
//!
//! Builds a fixed-layout prompt, requests a `SCORE:` / `RATIONALE:`
//! response, and parses it leniently: the first numeric token after the
//! score marker (clamped to [0, 1]) and the text block after the rationale
//! marker. Any call or parse failure surfaces as a `ScoreError` so the
//! front door can route to the heuristic.

use async_trait::async_trait;
use std::sync::Arc;

use super::{ScoreError, ScoringStrategy};
use crate::models::{
    CanonicalEntity, RelevanceAssessment, ScoreComponents, ScoringMethod, ThemeContext,
};
use crate::sources::LanguageModel;

const SCORE_MARKER: &str = "SCORE:";
const RATIONALE_MARKER: &str = "RATIONALE:";

/// Strategy backed by a language model
pub struct LlmStrategy {
    model: Arc<dyn LanguageModel>,
}

impl LlmStrategy {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    fn build_prompt(&self, entity: &CanonicalEntity, ctx: &ThemeContext) -> String {
        let mut prompt = String::new();
        prompt.push_str(
            "You are assisting an exhibition curator. Rate how relevant the candidate below is \
             to the exhibition theme on a scale from 0.0 (irrelevant) to 1.0 (essential).\n\n",
        );
        prompt.push_str(&format!("Theme: {}\n", ctx.title));
        if !ctx.description.is_empty() {
            prompt.push_str(&format!("Theme description: {}\n", ctx.description));
        }
        if !ctx.concepts.is_empty() {
            prompt.push_str(&format!("Key concepts: {}\n", ctx.concepts.join(", ")));
        }
        if !ctx.movements.is_empty() {
            prompt.push_str(&format!("Target movements: {}\n", ctx.movements.join(", ")));
        }
        if let Some((start, end)) = ctx.period {
            prompt.push_str(&format!("Target period: {}-{}\n", start, end));
        }

        prompt.push_str(&format!("\nCandidate ({}): {}\n", entity.kind, entity.name));
        if let Some(description) = &entity.description {
            prompt.push_str(&format!("Description: {}\n", description));
        }
        if !entity.movements.is_empty() {
            prompt.push_str(&format!("Movements: {}\n", entity.movements.join(", ")));
        }
        if !entity.mediums.is_empty() {
            prompt.push_str(&format!("Mediums: {}\n", entity.mediums.join(", ")));
        }
        if let Some(year) = entity.active_year {
            prompt.push_str(&format!("Year: {}\n", year));
        }
        if let Some(reference) = &entity.via_reference {
            prompt.push_str(&format!("Discovered via reference artist: {}\n", reference));
        }

        prompt.push_str(
            "\nRespond in exactly this layout:\nSCORE: <number between 0.0 and 1.0>\n\
             RATIONALE: <two or three sentences>\n",
        );
        prompt
    }
}

#[async_trait]
impl ScoringStrategy for LlmStrategy {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn score(
        &self,
        entity: &CanonicalEntity,
        ctx: &ThemeContext,
    ) -> Result<RelevanceAssessment, ScoreError> {
        let prompt = self.build_prompt(entity, ctx);

        let response = self
            .model
            .complete(&prompt)
            .await
            .map_err(|e| ScoreError::Backend(e.to_string()))?;

        let score = parse_score(&response)
            .ok_or_else(|| ScoreError::Parse("no numeric token after score marker".to_string()))?;
        let rationale = parse_rationale(&response)
            .ok_or_else(|| ScoreError::Parse("no rationale block".to_string()))?;

        Ok(RelevanceAssessment {
            score,
            rationale,
            components: ScoreComponents::default(),
            method: ScoringMethod::LanguageModel,
        })
    }
}

/// Extract the first numeric token after the score marker, clamped to [0, 1]
fn parse_score(text: &str) -> Option<f64> {
    let upper = text.to_uppercase();
    let start = upper.find(SCORE_MARKER)? + SCORE_MARKER.len();
    let tail = &text[start..];

    let mut token = String::new();
    let mut seen_digit = false;
    for c in tail.chars() {
        match c {
            '0'..='9' => {
                token.push(c);
                seen_digit = true;
            }
            '.' | '-' | '+' if !seen_digit || c == '.' => token.push(c),
            _ if seen_digit => break,
            // Skip leading junk (whitespace, asterisks, quotes) before the number
            _ if token.is_empty() => continue,
            _ => break,
        }
    }

    token.parse::<f64>().ok().map(|v| v.clamp(0.0, 1.0))
}

/// Extract the rationale block after the rationale marker
fn parse_rationale(text: &str) -> Option<String> {
    let upper = text.to_uppercase();
    let start = upper.find(RATIONALE_MARKER)? + RATIONALE_MARKER.len();
    let block = text[start..].trim();
    if block.is_empty() {
        None
    } else {
        Some(block.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_score_plain() {
        assert_eq!(parse_score("SCORE: 0.75\nRATIONALE: fine"), Some(0.75));
    }

    #[test]
    fn test_parse_score_lenient_layouts() {
        assert_eq!(parse_score("score: 0.4"), Some(0.4));
        assert_eq!(parse_score("**SCORE:** 0.9 (high)"), Some(0.9));
        assert_eq!(parse_score("SCORE:1"), Some(1.0));
        assert_eq!(parse_score("Here we go.\nSCORE:  .65 because"), Some(0.65));
    }

    #[test]
    fn test_parse_score_clamps() {
        assert_eq!(parse_score("SCORE: 8.5"), Some(1.0));
        assert_eq!(parse_score("SCORE: -0.3"), Some(0.0));
    }

    #[test]
    fn test_parse_score_missing() {
        assert_eq!(parse_score("no markers here"), None);
        assert_eq!(parse_score("SCORE: n/a"), None);
        assert_eq!(parse_score(""), None);
    }

    #[test]
    fn test_parse_rationale() {
        let text = "SCORE: 0.7\nRATIONALE: Close alignment with the theme.\nExtra line.";
        let rationale = parse_rationale(text).unwrap();
        assert!(rationale.starts_with("Close alignment"));
        assert!(rationale.contains("Extra line."));
        assert_eq!(parse_rationale("SCORE: 0.7"), None);
        assert_eq!(parse_rationale("RATIONALE:   "), None);
    }

    #[test]
    fn test_prompt_contains_layout_and_context() {
        let model: Arc<dyn LanguageModel> = Arc::new(NullModel);
        let strategy = LlmStrategy::new(model);

        let ctx = ThemeContext {
            title: "Light and Water".to_string(),
            description: "Impressionist studies of water".to_string(),
            concepts: vec!["light".to_string(), "water".to_string()],
            movements: vec!["Impressionism".to_string()],
            period: Some((1870, 1890)),
            reference_artists: vec!["Claude Monet".to_string()],
        };
        let entity = crate::services::scorer::tests::entity("Alfred Sisley", "river landscapes");

        let prompt = strategy.build_prompt(&entity, &ctx);
        assert!(prompt.contains("SCORE:"));
        assert!(prompt.contains("RATIONALE:"));
        assert!(prompt.contains("Light and Water"));
        assert!(prompt.contains("Alfred Sisley"));
        assert!(prompt.contains("1870-1890"));
    }

    struct NullModel;

    #[async_trait]
    impl crate::sources::LanguageModel for NullModel {
        async fn complete(&self, _prompt: &str) -> Result<String, crate::sources::LlmError> {
            Err(crate::sources::LlmError::EmptyCompletion)
        }
    }
}
