//! External source adapters
//!
//! Each adapter wraps one heterogeneous upstream (Wikidata, Getty ULAN,
//! Europeana) behind the `SourceAdapter` contract: calls must not raise —
//! a failing call logs and returns an empty list, and the harvester bounds
//! every call with a timeout on top.

mod europeana;
mod getty;
mod llm;
mod wikidata;

pub use europeana::EuropeanaClient;
pub use getty::GettyUlanClient;
pub use llm::{ChatCompletionClient, LanguageModel, LlmError};
pub use wikidata::WikidataClient;

use async_trait::async_trait;
use std::time::Duration;

use crate::models::{CandidateRecord, EntityKind, ThemeContext};

/// Execution mode the harvester uses for an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    /// Independent calls, fanned out under bounded concurrency
    Concurrent,
    /// Rate-sensitive upstream: strictly sequential calls in submission
    /// order with a fixed inter-call delay
    Sequential { delay: Duration },
}

/// A searchable external source of candidate records
///
/// Implementations absorb their own failures: `search` returns an empty
/// list on any upstream error (the error is logged, never propagated).
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Tag recorded in the provenance of every record this adapter emits
    fn tag(&self) -> crate::models::SourceTag;

    /// How the harvester schedules calls to this adapter
    fn mode(&self) -> SourceMode;

    /// Search the source for candidates matching a free-text query
    async fn search(
        &self,
        query: &str,
        kind: EntityKind,
        ctx: &ThemeContext,
    ) -> Vec<CandidateRecord>;
}
