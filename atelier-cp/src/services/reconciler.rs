//! Record reconciliation
//!
//! Merges raw records that denote the same real-world entity into one
//! canonical entity. Grouping uses the identity-key priority chain
//! (authority id, else secondary id, else normalized name); records with
//! no usable key are dropped. Name-fallback matching can false-merge
//! common names — accepted, not corrected.

use std::collections::HashMap;

use crate::models::{CandidateRecord, CanonicalEntity, IdentityKey};

/// Merge policy:
/// - scalar attributes: first non-empty value in arrival order wins
/// - list attributes: union, duplicates removed, first-appearance order
/// - provenance: union of contributing records' source tags
pub struct RecordReconciler;

impl RecordReconciler {
    pub fn new() -> Self {
        Self
    }

    /// Reconcile a batch of raw records into canonical entities
    ///
    /// Entity order follows the first appearance of each identity key.
    /// Idempotent: feeding the output back through (as single records per
    /// entity) collapses nothing further.
    pub fn reconcile(&self, records: Vec<CandidateRecord>) -> Vec<CanonicalEntity> {
        let total = records.len();
        let mut entities: Vec<CanonicalEntity> = Vec::new();
        let mut index_by_key: HashMap<IdentityKey, usize> = HashMap::new();
        let mut dropped = 0usize;

        for record in records {
            let key = match record.identity_key() {
                Some(key) => key,
                None => {
                    dropped += 1;
                    tracing::debug!(
                        source = %record.source,
                        kind = %record.kind,
                        "Record has no usable identity key; dropping"
                    );
                    continue;
                }
            };

            match index_by_key.get(&key) {
                Some(&i) => merge_record(&mut entities[i], record),
                None => {
                    index_by_key.insert(key.clone(), entities.len());
                    entities.push(entity_from_record(key, record));
                }
            }
        }

        if dropped > 0 {
            tracing::warn!(
                dropped,
                total,
                "Dropped records without identity keys during reconciliation"
            );
        }

        log_name_collisions(&entities);

        tracing::info!(
            raw = total,
            canonical = entities.len(),
            "Reconciliation completed"
        );

        entities
    }

    /// Merge enrichment records into an existing entity
    ///
    /// Only records whose identity key matches the entity's are applied;
    /// the rest are ignored (enrichment queries are fuzzy). Merge policy is
    /// the same as reconciliation, so fields already present always win.
    pub fn enrich(&self, entity: &mut CanonicalEntity, records: Vec<CandidateRecord>) {
        let mut applied = 0usize;
        for record in records {
            match record.identity_key() {
                Some(key) if keys_match(&entity.identity, &key, &entity.name) => {
                    merge_record(entity, record);
                    applied += 1;
                }
                _ => {}
            }
        }
        tracing::debug!(
            identity = %entity.identity,
            applied,
            "Enrichment merge completed"
        );
    }
}

impl Default for RecordReconciler {
    fn default() -> Self {
        Self::new()
    }
}

/// Enrichment matching: identical keys always match; a normalized-name key
/// also matches an entity keyed by authority/secondary id when the names
/// agree (the id was unknown to the enriching source).
fn keys_match(entity_key: &IdentityKey, record_key: &IdentityKey, entity_name: &str) -> bool {
    if entity_key == record_key {
        return true;
    }
    matches!(record_key, IdentityKey::Name(n) if *n == crate::models::normalize_name(entity_name))
}

fn entity_from_record(key: IdentityKey, record: CandidateRecord) -> CanonicalEntity {
    let mut entity = CanonicalEntity {
        identity: key,
        kind: record.kind,
        name: String::new(),
        description: None,
        movements: Vec::new(),
        mediums: Vec::new(),
        creators: Vec::new(),
        nationality: None,
        gender: None,
        active_year: None,
        image_url: None,
        via_reference: None,
        provenance: Vec::new(),
        assessment: None,
    };
    merge_record(&mut entity, record);
    entity
}

fn merge_record(entity: &mut CanonicalEntity, record: CandidateRecord) {
    // Scalars: first non-empty writer wins
    if entity.name.is_empty() {
        if let Some(name) = record.name.filter(|n| !n.trim().is_empty()) {
            entity.name = name;
        }
    }
    merge_scalar(&mut entity.description, record.description);
    merge_scalar(&mut entity.nationality, record.nationality);
    merge_scalar(&mut entity.gender, record.gender);
    merge_scalar(&mut entity.image_url, record.image_url);
    merge_scalar(&mut entity.via_reference, record.via_reference);
    if entity.active_year.is_none() {
        entity.active_year = record.active_year;
    }

    // Lists: union, duplicates removed
    merge_list(&mut entity.movements, record.movements);
    merge_list(&mut entity.mediums, record.mediums);
    merge_list(&mut entity.creators, record.creators);

    // Provenance: union of contributing source tags
    if !entity.provenance.contains(&record.source) {
        entity.provenance.push(record.source);
    }
}

fn merge_scalar(existing: &mut Option<String>, incoming: Option<String>) {
    if existing.is_none() {
        if let Some(value) = incoming.filter(|v| !v.trim().is_empty()) {
            *existing = Some(value);
        }
    }
}

fn merge_list(existing: &mut Vec<String>, incoming: Vec<String>) {
    for value in incoming {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !existing.iter().any(|v| v.eq_ignore_ascii_case(trimmed)) {
            existing.push(trimmed.to_string());
        }
    }
}

/// Diagnostic for the accepted name-fallback risk: distinct identities
/// whose normalized names collide or nearly collide likely denote the same
/// person under different authority ids (or two people sharing a common
/// name). Logged, never corrected.
fn log_name_collisions(entities: &[CanonicalEntity]) {
    for (i, a) in entities.iter().enumerate() {
        for b in entities.iter().skip(i + 1) {
            if a.name.is_empty() || b.name.is_empty() {
                continue;
            }
            let na = crate::models::normalize_name(&a.name);
            let nb = crate::models::normalize_name(&b.name);
            let similarity = strsim::jaro_winkler(&na, &nb);
            if na == nb || similarity > 0.95 {
                tracing::debug!(
                    left = %a.identity,
                    right = %b.identity,
                    similarity,
                    "Distinct identities with (near-)identical names; possible split or false identity"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityKind, SourceTag};

    fn record(source: SourceTag, name: &str) -> CandidateRecord {
        let mut r = CandidateRecord::new(source, EntityKind::Artist);
        r.name = Some(name.to_string());
        r
    }

    #[test]
    fn test_disjoint_fields_union_into_one_entity() {
        // Three records sharing one identity key, disjoint optional fields
        let mut a = record(SourceTag::Wikidata, "Hilma af Klint");
        a.authority_id = Some("Q432857".into());
        a.description = Some("Swedish painter".into());

        let mut b = record(SourceTag::GettyUlan, "af Klint, Hilma");
        b.authority_id = Some("Q432857".into());
        b.nationality = Some("Swedish".into());
        b.movements = vec!["Abstract art".into()];

        let mut c = record(SourceTag::Europeana, "Hilma af Klint");
        c.authority_id = Some("Q432857".into());
        c.active_year = Some(1862);
        c.movements = vec!["abstract art".into(), "Symbolism".into()];

        let entities = RecordReconciler::new().reconcile(vec![a, b, c]);
        assert_eq!(entities.len(), 1);

        let e = &entities[0];
        assert_eq!(e.name, "Hilma af Klint"); // first writer wins
        assert_eq!(e.description.as_deref(), Some("Swedish painter"));
        assert_eq!(e.nationality.as_deref(), Some("Swedish"));
        assert_eq!(e.active_year, Some(1862));
        // Case-insensitive union keeps first spelling
        assert_eq!(e.movements, vec!["Abstract art", "Symbolism"]);
        assert_eq!(
            e.provenance,
            vec![
                SourceTag::Wikidata,
                SourceTag::GettyUlan,
                SourceTag::Europeana
            ]
        );
    }

    #[test]
    fn test_output_never_larger_than_input() {
        let records: Vec<_> = (0..20)
            .map(|i| {
                let mut r = record(SourceTag::Wikidata, &format!("Artist {}", i % 7));
                if i % 2 == 0 {
                    r.authority_id = Some(format!("Q{}", i % 5));
                }
                r
            })
            .collect();
        let raw = records.len();

        let entities = RecordReconciler::new().reconcile(records);
        assert!(entities.len() <= raw);
        for e in &entities {
            assert!(!e.provenance.is_empty());
            assert!(e.provenance.iter().all(|t| *t == SourceTag::Wikidata));
        }
    }

    #[test]
    fn test_keyless_records_dropped() {
        let blank = CandidateRecord::new(SourceTag::Europeana, EntityKind::Artwork);
        let named = record(SourceTag::Wikidata, "Known Artist");

        let entities = RecordReconciler::new().reconcile(vec![blank, named]);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].name, "Known Artist");
    }

    #[test]
    fn test_name_fallback_merges_case_variants() {
        let a = record(SourceTag::Wikidata, "Leonora  Carrington");
        let b = record(SourceTag::Europeana, "leonora carrington");

        let entities = RecordReconciler::new().reconcile(vec![a, b]);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].provenance.len(), 2);
    }

    #[test]
    fn test_authority_id_separates_same_name() {
        // Same normalized name but distinct authority ids: two entities
        let mut a = record(SourceTag::Wikidata, "John Smith");
        a.authority_id = Some("Q1".into());
        let mut b = record(SourceTag::Wikidata, "John Smith");
        b.authority_id = Some("Q2".into());

        let entities = RecordReconciler::new().reconcile(vec![a, b]);
        assert_eq!(entities.len(), 2);
    }

    #[test]
    fn test_idempotent_on_merged_output() {
        let mut a = record(SourceTag::Wikidata, "Hilma af Klint");
        a.authority_id = Some("Q432857".into());
        let mut b = record(SourceTag::GettyUlan, "Hilma af Klint");
        b.authority_id = Some("Q432857".into());
        b.nationality = Some("Swedish".into());
        let c = record(SourceTag::Europeana, "Agnes Martin");

        let reconciler = RecordReconciler::new();
        let first = reconciler.reconcile(vec![a, b, c]);

        // Re-feed the merged output as records carrying the same identities
        let replay: Vec<CandidateRecord> = first
            .iter()
            .map(|e| {
                let mut r = CandidateRecord::new(e.provenance[0], e.kind);
                r.name = Some(e.name.clone());
                if let IdentityKey::Authority(id) = &e.identity {
                    r.authority_id = Some(id.clone());
                }
                r.nationality = e.nationality.clone();
                r.movements = e.movements.clone();
                r
            })
            .collect();

        let second = reconciler.reconcile(replay);
        assert_eq!(second.len(), first.len());
        for (x, y) in first.iter().zip(second.iter()) {
            assert_eq!(x.identity, y.identity);
            assert_eq!(x.name, y.name);
        }
    }

    #[test]
    fn test_enrich_applies_matching_records_only() {
        let mut seed = record(SourceTag::Wikidata, "Agnes Martin");
        seed.authority_id = Some("Q275641".into());
        let mut entity = RecordReconciler::new()
            .reconcile(vec![seed])
            .into_iter()
            .next()
            .unwrap();

        let mut matching = record(SourceTag::GettyUlan, "Agnes Martin");
        matching.nationality = Some("American".into());
        let mut unrelated = record(SourceTag::GettyUlan, "Someone Else");
        unrelated.nationality = Some("Unknown".into());

        RecordReconciler::new().enrich(&mut entity, vec![matching, unrelated]);
        assert_eq!(entity.nationality.as_deref(), Some("American"));
        assert!(entity.provenance.contains(&SourceTag::GettyUlan));
    }
}
