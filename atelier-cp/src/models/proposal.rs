//! Exhibition proposal artifact

use serde::{Deserialize, Serialize};

use super::record::SourceTag;

/// One artwork entry within a proposal section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalEntry {
    pub title: String,
    pub artist: Option<String>,
    pub year: Option<i32>,
    pub image_url: Option<String>,
    /// Sources the underlying entity was reconciled from
    pub sources: Vec<SourceTag>,
}

/// A thematic section grouping related artworks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalSection {
    pub title: String,
    /// Short justification drawn from the relevance assessments
    pub rationale: String,
    pub artworks: Vec<ProposalEntry>,
}

/// Final curation artifact assembled once selections are complete
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExhibitionProposal {
    pub theme_title: String,
    pub statement: String,
    /// Selected artist names
    pub artists: Vec<String>,
    pub sections: Vec<ProposalSection>,
    pub artwork_count: usize,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}
