//! Candidate harvesting across source adapters
//!
//! Fans a query set out to every configured adapter and collects raw,
//! source-tagged records. Fail-open at the call level: a failing,
//! timed-out, or empty-returning adapter contributes nothing and never
//! aborts the harvest. No ordering guarantee exists across adapters;
//! within a rate-limited adapter, calls preserve submission order.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;

use crate::models::{CandidateRecord, EntityKind, ThemeContext};
use crate::sources::{SourceAdapter, SourceMode};

/// One harvest query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestQuery {
    /// Free-text concept from the theme brief
    Concept(String),
    /// Curator-provided reference entity name; records discovered through
    /// it are tagged for the scorer's reference bonus
    Reference(String),
}

impl HarvestQuery {
    pub fn text(&self) -> &str {
        match self {
            HarvestQuery::Concept(s) | HarvestQuery::Reference(s) => s,
        }
    }

    fn reference_name(&self) -> Option<&str> {
        match self {
            HarvestQuery::Reference(s) => Some(s),
            HarvestQuery::Concept(_) => None,
        }
    }
}

/// Collects raw candidate records from all configured adapters
pub struct CandidateHarvester {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    /// Concurrency bound for the fan-out over independent adapters
    max_concurrency: usize,
    /// Upper bound on any single adapter call
    call_timeout: Duration,
}

impl CandidateHarvester {
    pub fn new(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        max_concurrency: usize,
        call_timeout: Duration,
    ) -> Self {
        Self {
            adapters,
            max_concurrency: max_concurrency.max(1),
            call_timeout,
        }
    }

    pub fn adapter_count(&self) -> usize {
        self.adapters.len()
    }

    /// Harvest records for a query set
    ///
    /// Concurrent-mode adapters run as a bounded fan-out over all
    /// (adapter, query) pairs; sequential-mode adapters run their queries
    /// in submission order with the adapter's fixed inter-call delay.
    /// Never returns an error.
    pub async fn harvest(
        &self,
        queries: &[HarvestQuery],
        kind: EntityKind,
        ctx: &ThemeContext,
    ) -> Vec<CandidateRecord> {
        let mut records = Vec::new();

        // Fan-out across independent adapters
        let concurrent_calls: Vec<_> = self
            .adapters
            .iter()
            .filter(|a| a.mode() == SourceMode::Concurrent)
            .flat_map(|adapter| {
                queries
                    .iter()
                    .map(move |query| self.bounded_call(adapter.clone(), query.clone(), kind, ctx))
            })
            .collect();

        let mut fanned: Vec<Vec<CandidateRecord>> = stream::iter(concurrent_calls)
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;
        for batch in fanned.drain(..) {
            records.extend(batch);
        }

        // Strict sequencing for rate-sensitive adapters
        for adapter in self.adapters.iter() {
            let delay = match adapter.mode() {
                SourceMode::Sequential { delay } => delay,
                SourceMode::Concurrent => continue,
            };

            for (i, query) in queries.iter().enumerate() {
                if i > 0 {
                    tokio::time::sleep(delay).await;
                }
                let batch = self
                    .bounded_call(adapter.clone(), query.clone(), kind, ctx)
                    .await;
                records.extend(batch);
            }
        }

        tracing::info!(
            kind = %kind,
            queries = queries.len(),
            adapters = self.adapters.len(),
            records = records.len(),
            "Harvest completed"
        );

        records
    }

    /// One adapter call under the harvest timeout
    ///
    /// Timeouts are absorbed like any other adapter failure. Records from
    /// reference queries are tagged with the reference name so the scorer
    /// can apply its bonus.
    async fn bounded_call(
        &self,
        adapter: Arc<dyn SourceAdapter>,
        query: HarvestQuery,
        kind: EntityKind,
        ctx: &ThemeContext,
    ) -> Vec<CandidateRecord> {
        let source = adapter.tag();
        let result =
            tokio::time::timeout(self.call_timeout, adapter.search(query.text(), kind, ctx)).await;

        match result {
            Ok(mut batch) => {
                tracing::debug!(
                    source = %source,
                    query = %query.text(),
                    records = batch.len(),
                    "Adapter call completed"
                );
                if let Some(reference) = query.reference_name() {
                    for record in batch.iter_mut() {
                        if record.via_reference.is_none() {
                            record.via_reference = Some(reference.to_string());
                        }
                    }
                }
                batch
            }
            Err(_) => {
                tracing::warn!(
                    source = %source,
                    query = %query.text(),
                    timeout_ms = self.call_timeout.as_millis() as u64,
                    "Adapter call timed out; contributing nothing"
                );
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceTag;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Test adapter that records call order and can stall or fail
    struct ProbeAdapter {
        tag: SourceTag,
        mode: SourceMode,
        stall: Option<Duration>,
        calls: Mutex<Vec<String>>,
        records_per_call: usize,
    }

    impl ProbeAdapter {
        fn concurrent(tag: SourceTag, records_per_call: usize) -> Self {
            Self {
                tag,
                mode: SourceMode::Concurrent,
                stall: None,
                calls: Mutex::new(Vec::new()),
                records_per_call,
            }
        }

        fn sequential(tag: SourceTag, records_per_call: usize) -> Self {
            Self {
                tag,
                mode: SourceMode::Sequential {
                    delay: Duration::from_millis(5),
                },
                stall: None,
                calls: Mutex::new(Vec::new()),
                records_per_call,
            }
        }
    }

    #[async_trait]
    impl SourceAdapter for ProbeAdapter {
        fn tag(&self) -> SourceTag {
            self.tag
        }

        fn mode(&self) -> SourceMode {
            self.mode
        }

        async fn search(
            &self,
            query: &str,
            kind: EntityKind,
            _ctx: &ThemeContext,
        ) -> Vec<CandidateRecord> {
            if let Some(stall) = self.stall {
                tokio::time::sleep(stall).await;
            }
            self.calls.lock().unwrap().push(query.to_string());
            (0..self.records_per_call)
                .map(|i| {
                    let mut r = CandidateRecord::new(self.tag, kind);
                    r.name = Some(format!("{} #{}", query, i));
                    r
                })
                .collect()
        }
    }

    fn harvester(adapters: Vec<Arc<dyn SourceAdapter>>) -> CandidateHarvester {
        CandidateHarvester::new(adapters, 4, Duration::from_millis(100))
    }

    #[tokio::test]
    async fn test_fan_out_collects_all_sources() {
        let a = Arc::new(ProbeAdapter::concurrent(SourceTag::Wikidata, 2));
        let b = Arc::new(ProbeAdapter::concurrent(SourceTag::Europeana, 3));
        let h = harvester(vec![a, b]);

        let queries = vec![
            HarvestQuery::Concept("color field".into()),
            HarvestQuery::Concept("abstraction".into()),
        ];
        let records = h
            .harvest(&queries, EntityKind::Artist, &ThemeContext::default())
            .await;

        // 2 adapters x 2 queries, 2 and 3 records per call
        assert_eq!(records.len(), 2 * 2 + 2 * 3);
    }

    #[tokio::test]
    async fn test_timeout_is_absorbed() {
        let slow = Arc::new(ProbeAdapter {
            tag: SourceTag::Wikidata,
            mode: SourceMode::Concurrent,
            stall: Some(Duration::from_secs(5)),
            calls: Mutex::new(Vec::new()),
            records_per_call: 1,
        });
        let fast = Arc::new(ProbeAdapter::concurrent(SourceTag::Europeana, 1));
        let h = harvester(vec![slow, fast]);

        let queries = vec![HarvestQuery::Concept("portrait".into())];
        let records = h
            .harvest(&queries, EntityKind::Artwork, &ThemeContext::default())
            .await;

        // The slow adapter times out and contributes nothing
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source, SourceTag::Europeana);
    }

    #[tokio::test]
    async fn test_sequential_preserves_submission_order() {
        let seq = Arc::new(ProbeAdapter::sequential(SourceTag::GettyUlan, 1));
        let seq_probe = seq.clone();
        let h = harvester(vec![seq]);

        let queries = vec![
            HarvestQuery::Concept("first".into()),
            HarvestQuery::Concept("second".into()),
            HarvestQuery::Concept("third".into()),
        ];
        h.harvest(&queries, EntityKind::Artist, &ThemeContext::default())
            .await;

        let calls = seq_probe.calls.lock().unwrap().clone();
        assert_eq!(calls, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_reference_queries_tag_records() {
        let a = Arc::new(ProbeAdapter::concurrent(SourceTag::Wikidata, 1));
        let h = harvester(vec![a]);

        let queries = vec![
            HarvestQuery::Reference("Claude Monet".into()),
            HarvestQuery::Concept("garden".into()),
        ];
        let records = h
            .harvest(&queries, EntityKind::Artist, &ThemeContext::default())
            .await;

        let via: Vec<_> = records
            .iter()
            .filter_map(|r| r.via_reference.as_deref())
            .collect();
        assert_eq!(via, vec!["Claude Monet"]);
    }

    #[tokio::test]
    async fn test_empty_adapter_set() {
        let h = harvester(vec![]);
        let records = h
            .harvest(
                &[HarvestQuery::Concept("anything".into())],
                EntityKind::Artist,
                &ThemeContext::default(),
            )
            .await;
        assert!(records.is_empty());
    }
}
