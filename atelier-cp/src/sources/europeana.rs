//! Europeana aggregator client
//!
//! Artwork-heavy source. Record ids from the aggregator act as secondary
//! authority identifiers; creator names are carried so artwork records can
//! be attributed during proposal assembly.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use super::{SourceAdapter, SourceMode};
use crate::models::{CandidateRecord, EntityKind, SourceTag, ThemeContext};

const EUROPEANA_BASE_URL: &str = "https://api.europeana.eu/record/v2";
const USER_AGENT: &str = "Atelier/0.1.0 (curation pipeline)";
const SEARCH_ROWS: u32 = 12;

/// Europeana client errors
#[derive(Debug, Error)]
pub enum EuropeanaError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Search response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct EuropeanaSearchResponse {
    #[serde(default)]
    pub items: Vec<EuropeanaItem>,
}

/// One aggregated record
#[derive(Debug, Clone, Deserialize)]
pub struct EuropeanaItem {
    /// Aggregator record id (e.g. "/90402/SK_A_3262")
    pub id: String,
    #[serde(default)]
    pub title: Vec<String>,
    #[serde(default, rename = "dcCreator")]
    pub dc_creator: Vec<String>,
    #[serde(default, rename = "dcDescription")]
    pub dc_description: Vec<String>,
    #[serde(default)]
    pub year: Vec<String>,
    #[serde(rename = "edmIsShownBy", default)]
    pub edm_is_shown_by: Vec<String>,
}

/// Europeana API client
pub struct EuropeanaClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl EuropeanaClient {
    pub fn new(api_key: String) -> Result<Self, EuropeanaError> {
        Self::with_base_url(api_key, EUROPEANA_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, EuropeanaError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| EuropeanaError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
            api_key,
        })
    }

    /// Full-text search over aggregated records
    pub async fn search_records(
        &self,
        query: &str,
    ) -> Result<Vec<EuropeanaItem>, EuropeanaError> {
        let url = format!(
            "{}/search.json?wskey={}&query={}&qf=TYPE:IMAGE&rows={}&profile=standard",
            self.base_url,
            self.api_key,
            query.replace(' ', "+"),
            SEARCH_ROWS
        );

        tracing::debug!(query = %query, "Querying Europeana API");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| EuropeanaError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EuropeanaError::ApiError(status.as_u16(), error_text));
        }

        let parsed: EuropeanaSearchResponse = response
            .json()
            .await
            .map_err(|e| EuropeanaError::ParseError(e.to_string()))?;

        tracing::debug!(
            query = %query,
            items = parsed.items.len(),
            "Europeana search completed"
        );

        Ok(parsed.items)
    }

    fn item_to_record(&self, item: EuropeanaItem, kind: EntityKind) -> CandidateRecord {
        let mut record = CandidateRecord::new(SourceTag::Europeana, kind);
        record.secondary_id = Some(format!("europeana:{}", item.id));
        record.name = item.title.into_iter().next();
        record.description = item.dc_description.into_iter().next();
        record.active_year = item
            .year
            .into_iter()
            .next()
            .and_then(|y| y.trim().parse::<i32>().ok());
        record.image_url = item.edm_is_shown_by.into_iter().next();
        record.creators = item.dc_creator;
        record
    }
}

#[async_trait]
impl SourceAdapter for EuropeanaClient {
    fn tag(&self) -> SourceTag {
        SourceTag::Europeana
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
        match self.search_records(query).await {
            Ok(items) => items
                .into_iter()
                .map(|item| self.item_to_record(item, kind))
                .collect(),
            Err(e) => {
                tracing::warn!(query = %query, error = %e, "Europeana search failed; contributing nothing");
                Vec::new()
            }
        }
    }
}
