//! Getty ULAN vocabulary client
//!
//! The Getty endpoints throttle aggressively, so this adapter runs in
//! strictly sequential mode with a fixed inter-call delay, and additionally
//! enforces a minimum interval between its own requests.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

use super::{SourceAdapter, SourceMode};
use crate::models::{CandidateRecord, EntityKind, SourceTag, ThemeContext};

const GETTY_BASE_URL: &str = "https://vocab.getty.edu/resource";
const USER_AGENT: &str = "Atelier/0.1.0 (curation pipeline)";
const RATE_LIMIT_MS: u64 = 1000; // 1 request per second
const INTER_CALL_DELAY_MS: u64 = 1200;

/// Getty client errors
#[derive(Debug, Error)]
pub enum GettyError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// ULAN search response
#[derive(Debug, Clone, Deserialize)]
pub struct UlanSearchResponse {
    #[serde(default)]
    pub results: Vec<UlanHit>,
}

/// One ULAN subject hit
#[derive(Debug, Clone, Deserialize)]
pub struct UlanHit {
    /// ULAN subject id (e.g. "500115588")
    pub subject_id: String,
    /// Preferred term (artist name)
    pub term: String,
    /// Role descriptor (e.g. "painter")
    pub role: Option<String>,
    pub nationality: Option<String>,
    /// Birth year when recorded
    pub birth_year: Option<i32>,
}

/// Rate limiter enforcing a minimum interval between requests
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    /// Wait if necessary to comply with rate limit
    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// Getty ULAN API client
pub struct GettyUlanClient {
    http_client: reqwest::Client,
    base_url: String,
    rate_limiter: RateLimiter,
}

impl GettyUlanClient {
    pub fn new() -> Result<Self, GettyError> {
        Self::with_base_url(GETTY_BASE_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Result<Self, GettyError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| GettyError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
            rate_limiter: RateLimiter::new(RATE_LIMIT_MS),
        })
    }

    /// Search ULAN by name fragment
    pub async fn search_ulan(&self, query: &str) -> Result<Vec<UlanHit>, GettyError> {
        self.rate_limiter.wait().await;

        let url = format!(
            "{}/search?q={}&dataset=ulan&format=json",
            self.base_url,
            query.replace(' ', "+")
        );

        tracing::debug!(query = %query, url = %url, "Querying Getty ULAN");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| GettyError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == 429 || status == 503 {
            return Err(GettyError::RateLimitExceeded);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GettyError::ApiError(status.as_u16(), error_text));
        }

        let parsed: UlanSearchResponse = response
            .json()
            .await
            .map_err(|e| GettyError::ParseError(e.to_string()))?;

        Ok(parsed.results)
    }

    fn hit_to_record(&self, hit: UlanHit) -> CandidateRecord {
        let mut record = CandidateRecord::new(SourceTag::GettyUlan, EntityKind::Artist);
        record.secondary_id = Some(format!("ulan:{}", hit.subject_id));
        record.name = Some(hit.term);
        record.description = hit.role;
        record.nationality = hit.nationality;
        record.active_year = hit.birth_year;
        record
    }
}

#[async_trait]
impl SourceAdapter for GettyUlanClient {
    fn tag(&self) -> SourceTag {
        SourceTag::GettyUlan
    }

    fn mode(&self) -> SourceMode {
        SourceMode::Sequential {
            delay: Duration::from_millis(INTER_CALL_DELAY_MS),
        }
    }

    async fn search(
        &self,
        query: &str,
        kind: EntityKind,
        _ctx: &ThemeContext,
    ) -> Vec<CandidateRecord> {
        // ULAN is an artist-name authority; it has nothing to say about works
        if kind != EntityKind::Artist {
            return Vec::new();
        }

        match self.search_ulan(query).await {
            Ok(hits) => hits.into_iter().map(|h| self.hit_to_record(h)).collect(),
            Err(e) => {
                tracing::warn!(query = %query, error = %e, "Getty ULAN search failed; contributing nothing");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        assert!(GettyUlanClient::new().is_ok());
    }

    #[test]
    fn test_sequential_mode() {
        let client = GettyUlanClient::new().unwrap();
        assert!(matches!(client.mode(), SourceMode::Sequential { .. }));
    }

    #[test]
    fn test_search_response_parsing() {
        let json = r#"{
            "results": [
                {
                    "subject_id": "500115588",
                    "term": "Gogh, Vincent van",
                    "role": "painter",
                    "nationality": "Dutch",
                    "birth_year": 1853
                }
            ]
        }"#;

        let parsed: UlanSearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.results.len(), 1);
        assert_eq!(parsed.results[0].subject_id, "500115588");
    }

    #[test]
    fn test_hit_to_record_sets_secondary_id() {
        let client = GettyUlanClient::new().unwrap();
        let hit = UlanHit {
            subject_id: "500115588".to_string(),
            term: "Gogh, Vincent van".to_string(),
            role: Some("painter".to_string()),
            nationality: Some("Dutch".to_string()),
            birth_year: Some(1853),
        };

        let record = client.hit_to_record(hit);
        assert_eq!(record.secondary_id.as_deref(), Some("ulan:500115588"));
        assert!(record.authority_id.is_none());
        assert_eq!(record.active_year, Some(1853));
    }

    #[tokio::test]
    async fn test_rate_limiter_timing() {
        let limiter = RateLimiter::new(100); // 100ms for faster test

        let start = Instant::now();

        limiter.wait().await;
        let first_elapsed = start.elapsed();

        limiter.wait().await;
        let second_elapsed = start.elapsed();

        assert!(first_elapsed < Duration::from_millis(50));
        assert!(second_elapsed >= Duration::from_millis(90));
    }

    #[tokio::test]
    async fn test_artwork_search_is_empty() {
        let client = GettyUlanClient::new().unwrap();
        let records = client
            .search(
                "sunflowers",
                EntityKind::Artwork,
                &ThemeContext::default(),
            )
            .await;
        assert!(records.is_empty());
    }
}
