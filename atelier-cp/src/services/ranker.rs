//! Diversity-aware ranking
//!
//! Combines relevance with secondary representation signals and greedily
//! selects a bounded subset. This is a satisficing heuristic, not an
//! optimal constrained solver: when the pool contains at least as many
//! members of each category as its minimum target, every minimum is met;
//! otherwise the shortfall is logged, never silently hidden.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{CanonicalEntity, RankedCandidate};

const RELEVANCE_WEIGHT: f64 = 0.7;
const DIVERSITY_WEIGHT: f64 = 0.3;
const MEMBERSHIP_WEIGHT: f64 = 0.6;
const RECENCY_WEIGHT: f64 = 0.4;

/// Entity attribute a category rule matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeField {
    Movement,
    Medium,
    Nationality,
    Gender,
}

/// One configured representation category
///
/// An entity belongs to `category` when any of `values` matches the chosen
/// attribute (case-insensitive).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: String,
    pub field: AttributeField,
    pub values: Vec<String>,
}

/// Configured category vocabulary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryRules(pub Vec<CategoryRule>);

impl CategoryRules {
    /// Categories an entity belongs to
    pub fn categories_for(&self, entity: &CanonicalEntity) -> BTreeSet<String> {
        let mut categories = BTreeSet::new();
        for rule in &self.0 {
            let matched = match rule.field {
                AttributeField::Movement => list_matches(&entity.movements, &rule.values),
                AttributeField::Medium => list_matches(&entity.mediums, &rule.values),
                AttributeField::Nationality => scalar_matches(&entity.nationality, &rule.values),
                AttributeField::Gender => scalar_matches(&entity.gender, &rule.values),
            };
            if matched {
                categories.insert(rule.category.clone());
            }
        }
        categories
    }
}

fn list_matches(attributes: &[String], values: &[String]) -> bool {
    attributes
        .iter()
        .any(|a| values.iter().any(|v| v.eq_ignore_ascii_case(a)))
}

fn scalar_matches(attribute: &Option<String>, values: &[String]) -> bool {
    attribute
        .as_deref()
        .map(|a| values.iter().any(|v| v.eq_ignore_ascii_case(a)))
        .unwrap_or(false)
}

/// Per-entity representation signals; derived for ranking only, never
/// persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiversitySignal {
    pub categories: BTreeSet<String>,
    /// Pool-relative recency in [0, 1]
    pub recency: f64,
}

/// Greedy, constraint-satisficing ranker
pub struct DiversityRanker {
    rules: CategoryRules,
}

impl DiversityRanker {
    pub fn new(rules: CategoryRules) -> Self {
        Self { rules }
    }

    /// Produce a bounded, diversity-aware ordering
    ///
    /// 1. Derive a diversity sub-score per entity (weighted category
    ///    membership + recency, each in [0, 1]).
    /// 2. Stable-sort descending by `combined`.
    /// 3. Greedy pass: admit entities that fill an unmet category minimum,
    ///    or anything once all minimums are satisfied.
    /// 4. Fill pass: admit remaining entities in `combined` order up to `max`.
    ///
    /// Output preserves the combined-score ordering and never exceeds `max`.
    pub fn rank(
        &self,
        entities: Vec<CanonicalEntity>,
        max: usize,
        targets: &BTreeMap<String, usize>,
    ) -> Vec<RankedCandidate> {
        if max == 0 || entities.is_empty() {
            return Vec::new();
        }

        let (min_year, max_year) = year_bounds(&entities);

        let mut pool: Vec<(RankedCandidate, BTreeSet<String>)> = entities
            .into_iter()
            .map(|entity| {
                let signal = self.signal_for(&entity, min_year, max_year, targets);
                let diversity = MEMBERSHIP_WEIGHT * membership_share(&signal.categories, targets)
                    + RECENCY_WEIGHT * signal.recency;
                let combined =
                    RELEVANCE_WEIGHT * entity.relevance() + DIVERSITY_WEIGHT * diversity;
                (
                    RankedCandidate {
                        entity,
                        diversity,
                        combined,
                    },
                    signal.categories,
                )
            })
            .collect();

        // Stable sort keeps input order for ties
        pool.sort_by(|a, b| {
            b.0.combined
                .partial_cmp(&a.0.combined)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut admitted = vec![false; pool.len()];
        let mut admitted_count = 0usize;
        let mut fills: BTreeMap<&str, usize> = targets.keys().map(|k| (k.as_str(), 0)).collect();

        // Greedy pass: prioritize unmet category minimums
        for (i, (_, categories)) in pool.iter().enumerate() {
            if admitted_count >= max {
                break;
            }
            let all_met = fills
                .iter()
                .all(|(category, count)| *count >= targets[*category]);
            let fills_unmet = categories
                .iter()
                .any(|c| fills.get(c.as_str()).map_or(false, |n| *n < targets[c]));

            if all_met || fills_unmet {
                admitted[i] = true;
                admitted_count += 1;
                for category in categories {
                    if let Some(count) = fills.get_mut(category.as_str()) {
                        *count += 1;
                    }
                }
            }
        }

        // Fill pass: top up with the highest-combined remainder
        for (i, _) in pool.iter().enumerate() {
            if admitted_count >= max {
                break;
            }
            if !admitted[i] {
                admitted[i] = true;
                admitted_count += 1;
                for category in &pool[i].1 {
                    if let Some(count) = fills.get_mut(category.as_str()) {
                        *count += 1;
                    }
                }
            }
        }

        for (category, minimum) in targets {
            let reached = fills.get(category.as_str()).copied().unwrap_or(0);
            if reached < *minimum {
                tracing::warn!(
                    category = %category,
                    minimum,
                    reached,
                    "Diversity minimum not satisfiable from the candidate pool"
                );
            }
        }

        let ranked: Vec<RankedCandidate> = pool
            .into_iter()
            .zip(admitted)
            .filter(|(_, keep)| *keep)
            .map(|((candidate, _), _)| candidate)
            .collect();

        tracing::debug!(
            selected = ranked.len(),
            max,
            targets = targets.len(),
            "Ranking completed"
        );

        ranked
    }

    fn signal_for(
        &self,
        entity: &CanonicalEntity,
        min_year: i32,
        max_year: i32,
        _targets: &BTreeMap<String, usize>,
    ) -> DiversitySignal {
        let recency = match entity.active_year {
            Some(year) if max_year > min_year => {
                (year - min_year) as f64 / (max_year - min_year) as f64
            }
            Some(_) => 0.5,
            None => 0.5,
        };

        DiversitySignal {
            categories: self.rules.categories_for(entity),
            recency: recency.clamp(0.0, 1.0),
        }
    }
}

/// Share of target categories an entity's memberships cover
fn membership_share(categories: &BTreeSet<String>, targets: &BTreeMap<String, usize>) -> f64 {
    if targets.is_empty() {
        return 0.0;
    }
    let matched = categories.iter().filter(|c| targets.contains_key(*c)).count();
    matched as f64 / targets.len() as f64
}

fn year_bounds(entities: &[CanonicalEntity]) -> (i32, i32) {
    let years: Vec<i32> = entities.iter().filter_map(|e| e.active_year).collect();
    match (years.iter().min(), years.iter().max()) {
        (Some(&min), Some(&max)) => (min, max),
        _ => (0, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        EntityKind, IdentityKey, RelevanceAssessment, ScoreComponents, ScoringMethod, SourceTag,
    };

    fn scored_entity(name: &str, movement: Option<&str>, score: f64) -> CanonicalEntity {
        CanonicalEntity {
            identity: IdentityKey::Name(crate::models::normalize_name(name)),
            kind: EntityKind::Artist,
            name: name.to_string(),
            description: None,
            movements: movement.map(|m| vec![m.to_string()]).unwrap_or_default(),
            mediums: Vec::new(),
            creators: Vec::new(),
            nationality: None,
            gender: None,
            active_year: None,
            image_url: None,
            via_reference: None,
            provenance: vec![SourceTag::Wikidata],
            assessment: Some(RelevanceAssessment {
                score,
                rationale: String::new(),
                components: ScoreComponents::default(),
                method: ScoringMethod::Heuristic,
            }),
        }
    }

    fn movement_rules() -> CategoryRules {
        CategoryRules(vec![
            CategoryRule {
                category: "A".to_string(),
                field: AttributeField::Movement,
                values: vec!["Surrealism".to_string()],
            },
            CategoryRule {
                category: "B".to_string(),
                field: AttributeField::Movement,
                values: vec!["Fluxus".to_string()],
            },
        ])
    }

    #[test]
    fn test_output_bounded_by_max() {
        let ranker = DiversityRanker::new(CategoryRules::default());
        let pool: Vec<_> = (0..10)
            .map(|i| scored_entity(&format!("Artist {}", i), None, 0.5))
            .collect();

        let ranked = ranker.rank(pool, 3, &BTreeMap::new());
        assert_eq!(ranked.len(), 3);

        let ranked_empty = ranker.rank(Vec::new(), 3, &BTreeMap::new());
        assert!(ranked_empty.is_empty());
    }

    #[test]
    fn test_satisfiable_minimums_are_met() {
        // max=5, targets {A:2, B:1}, pool with exactly 2 A and 1 B members
        // buried under higher-relevance unconstrained entities
        let ranker = DiversityRanker::new(movement_rules());
        let mut pool = vec![
            scored_entity("Plain 1", None, 0.95),
            scored_entity("Plain 2", None, 0.94),
            scored_entity("Plain 3", None, 0.93),
            scored_entity("Plain 4", None, 0.92),
            scored_entity("Plain 5", None, 0.91),
        ];
        pool.push(scored_entity("Surrealist 1", Some("Surrealism"), 0.30));
        pool.push(scored_entity("Surrealist 2", Some("Surrealism"), 0.25));
        pool.push(scored_entity("Fluxus 1", Some("Fluxus"), 0.20));

        let targets: BTreeMap<String, usize> =
            [("A".to_string(), 2), ("B".to_string(), 1)].into();

        let ranked = ranker.rank(pool, 5, &targets);
        assert_eq!(ranked.len(), 5);

        let names: Vec<&str> = ranked.iter().map(|r| r.entity.name.as_str()).collect();
        assert!(names.contains(&"Surrealist 1"));
        assert!(names.contains(&"Surrealist 2"));
        assert!(names.contains(&"Fluxus 1"));
    }

    #[test]
    fn test_shortfall_does_not_discard_output() {
        // Only one A member exists but the minimum asks for three
        let ranker = DiversityRanker::new(movement_rules());
        let pool = vec![
            scored_entity("Plain 1", None, 0.9),
            scored_entity("Surrealist 1", Some("Surrealism"), 0.4),
        ];
        let targets: BTreeMap<String, usize> = [("A".to_string(), 3)].into();

        let ranked = ranker.rank(pool, 2, &targets);
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_ordering_follows_combined_score() {
        let ranker = DiversityRanker::new(CategoryRules::default());
        let pool = vec![
            scored_entity("Low", None, 0.2),
            scored_entity("High", None, 0.9),
            scored_entity("Mid", None, 0.5),
        ];

        let ranked = ranker.rank(pool, 3, &BTreeMap::new());
        let names: Vec<&str> = ranked.iter().map(|r| r.entity.name.as_str()).collect();
        assert_eq!(names, vec!["High", "Mid", "Low"]);
        assert!(ranked[0].combined >= ranked[1].combined);
    }

    #[test]
    fn test_combined_weights_relevance_over_diversity() {
        let ranker = DiversityRanker::new(movement_rules());
        let targets: BTreeMap<String, usize> = [("A".to_string(), 1)].into();

        // Category member with mid relevance vs plain entity with high
        let pool = vec![
            scored_entity("Plain", None, 1.0),
            scored_entity("Member", Some("Surrealism"), 1.0),
        ];
        let ranked = ranker.rank(pool, 2, &targets);

        let member = ranked
            .iter()
            .find(|r| r.entity.name == "Member")
            .unwrap();
        let plain = ranked.iter().find(|r| r.entity.name == "Plain").unwrap();
        // Equal relevance: category membership decides via the 0.3 weight
        assert!(member.combined > plain.combined);
        assert!(member.diversity > plain.diversity);
    }

    #[test]
    fn test_max_zero_returns_empty() {
        let ranker = DiversityRanker::new(CategoryRules::default());
        let pool = vec![scored_entity("A", None, 0.9)];
        assert!(ranker.rank(pool, 0, &BTreeMap::new()).is_empty());
    }
}
