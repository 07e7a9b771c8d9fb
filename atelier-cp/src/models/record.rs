//! Raw candidate records and identity keys
//!
//! Source adapters normalize their wire responses into `CandidateRecord`
//! at the harvester boundary, so nothing downstream handles untyped maps.
//! Records are ephemeral: the reconciler consumes them and produces
//! canonical entities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// External source a record was harvested from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    /// Wikidata entity search
    Wikidata,
    /// Getty Union List of Artist Names
    GettyUlan,
    /// Europeana aggregator
    Europeana,
    /// Seeded directly from the curator's theme brief
    CuratorSeed,
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceTag::Wikidata => "wikidata",
            SourceTag::GettyUlan => "getty_ulan",
            SourceTag::Europeana => "europeana",
            SourceTag::CuratorSeed => "curator_seed",
        };
        write!(f, "{}", name)
    }
}

/// Kind of entity a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Artist,
    Artwork,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Artist => write!(f, "artist"),
            EntityKind::Artwork => write!(f, "artwork"),
        }
    }
}

/// One raw, source-tagged result from a single adapter call
///
/// Scalar fields are optional because sources are heterogeneous; the
/// reconciler merges per field with first-non-empty-wins semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub source: SourceTag,
    pub kind: EntityKind,

    /// Primary authority identifier (e.g. a Wikidata QID)
    pub authority_id: Option<String>,
    /// Secondary authority identifier (e.g. "ulan:500115588", an accession number)
    pub secondary_id: Option<String>,

    pub name: Option<String>,
    pub description: Option<String>,
    pub movements: Vec<String>,
    pub mediums: Vec<String>,
    /// Creator names (artwork records only)
    pub creators: Vec<String>,
    pub nationality: Option<String>,
    pub gender: Option<String>,
    /// Representative year (birth year for artists, creation year for works)
    pub active_year: Option<i32>,
    pub image_url: Option<String>,

    /// Name of the curator-provided reference entity this record was
    /// discovered through, if any
    pub via_reference: Option<String>,
}

impl CandidateRecord {
    /// Empty record for a source/kind pair; adapters fill in what they have
    pub fn new(source: SourceTag, kind: EntityKind) -> Self {
        Self {
            source,
            kind,
            authority_id: None,
            secondary_id: None,
            name: None,
            description: None,
            movements: Vec::new(),
            mediums: Vec::new(),
            creators: Vec::new(),
            nationality: None,
            gender: None,
            active_year: None,
            image_url: None,
            via_reference: None,
        }
    }

    /// Identity key under the priority chain: authority id, else secondary
    /// id, else normalized name. None when the record has no usable key
    /// (such records are dropped during reconciliation).
    pub fn identity_key(&self) -> Option<IdentityKey> {
        if let Some(id) = self.authority_id.as_deref().filter(|s| !s.trim().is_empty()) {
            return Some(IdentityKey::Authority(id.trim().to_string()));
        }
        if let Some(id) = self.secondary_id.as_deref().filter(|s| !s.trim().is_empty()) {
            return Some(IdentityKey::Secondary(id.trim().to_string()));
        }
        match self.name.as_deref().map(normalize_name) {
            Some(n) if !n.is_empty() => Some(IdentityKey::Name(n)),
            _ => None,
        }
    }
}

/// Key used to group raw records into one canonical entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum IdentityKey {
    /// Primary authority identifier
    Authority(String),
    /// Secondary authority identifier
    Secondary(String),
    /// Normalized-name fallback; can false-merge common names (accepted risk)
    Name(String),
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityKey::Authority(id) => write!(f, "auth:{}", id),
            IdentityKey::Secondary(id) => write!(f, "sec:{}", id),
            IdentityKey::Name(name) => write!(f, "name:{}", name),
        }
    }
}

/// Case-fold and collapse whitespace for name-fallback matching
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
