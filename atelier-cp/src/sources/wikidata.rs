//! Wikidata entity search client
//!
//! Queries the `wbsearchentities` action API for artists and artworks.
//! Search hits carry QIDs, which become the primary authority identifier
//! during reconciliation.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use super::{SourceAdapter, SourceMode};
use crate::models::{CandidateRecord, EntityKind, SourceTag, ThemeContext};

const WIKIDATA_BASE_URL: &str = "https://www.wikidata.org/w/api.php";
const USER_AGENT: &str = "Atelier/0.1.0 (curation pipeline)";
const SEARCH_LIMIT: u32 = 10;

/// Wikidata client errors
#[derive(Debug, Error)]
pub enum WikidataError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// `wbsearchentities` response
#[derive(Debug, Clone, Deserialize)]
pub struct WbSearchResponse {
    #[serde(default)]
    pub search: Vec<WbSearchHit>,
}

/// One entity hit from `wbsearchentities`
#[derive(Debug, Clone, Deserialize)]
pub struct WbSearchHit {
    /// Entity QID (e.g. "Q5582")
    pub id: String,
    /// English label
    pub label: Option<String>,
    /// Short English description
    pub description: Option<String>,
}

/// Wikidata API client
pub struct WikidataClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl WikidataClient {
    pub fn new() -> Result<Self, WikidataError> {
        Self::with_base_url(WIKIDATA_BASE_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Result<Self, WikidataError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| WikidataError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Search entities by free text
    pub async fn search_entities(&self, query: &str) -> Result<Vec<WbSearchHit>, WikidataError> {
        let url = format!(
            "{}?action=wbsearchentities&search={}&language=en&type=item&limit={}&format=json",
            self.base_url,
            urlencode(query),
            SEARCH_LIMIT
        );

        tracing::debug!(query = %query, url = %url, "Querying Wikidata API");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| WikidataError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(WikidataError::ApiError(status.as_u16(), error_text));
        }

        let parsed: WbSearchResponse = response
            .json()
            .await
            .map_err(|e| WikidataError::ParseError(e.to_string()))?;

        tracing::debug!(
            query = %query,
            hits = parsed.search.len(),
            "Wikidata search completed"
        );

        Ok(parsed.search)
    }

    fn hit_to_record(&self, hit: WbSearchHit, kind: EntityKind) -> CandidateRecord {
        let mut record = CandidateRecord::new(SourceTag::Wikidata, kind);
        record.authority_id = Some(hit.id);
        record.name = hit.label;
        record.description = hit.description;
        record
    }
}

#[async_trait]
impl SourceAdapter for WikidataClient {
    fn tag(&self) -> SourceTag {
        SourceTag::Wikidata
    }

    fn mode(&self) -> SourceMode {
        SourceMode::Concurrent
    }

    async fn search(
        &self,
        query: &str,
        kind: EntityKind,
        _ctx: &ThemeContext,
    ) -> Vec<CandidateRecord> {
        // Nudge the text search toward the right entity class
        let effective_query = match kind {
            EntityKind::Artist => format!("{} artist", query),
            EntityKind::Artwork => format!("{} painting", query),
        };

        match self.search_entities(&effective_query).await {
            Ok(hits) => hits
                .into_iter()
                .map(|hit| self.hit_to_record(hit, kind))
                .collect(),
            Err(e) => {
                tracing::warn!(query = %query, error = %e, "Wikidata search failed; contributing nothing");
                Vec::new()
            }
        }
    }
}

/// Minimal percent-encoding for query strings
fn urlencode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
