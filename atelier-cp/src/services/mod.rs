//! Pipeline services

pub mod checkpoint;
pub mod harvester;
pub mod orchestrator;
pub mod ranker;
pub mod reconciler;
pub mod registry;
pub mod scorer;

pub use checkpoint::{CheckpointCoordinator, RankedSet, SelectionError};
pub use harvester::{CandidateHarvester, HarvestQuery};
pub use orchestrator::{EventBusSink, ProgressSink, StageError, StageOrchestrator};
pub use ranker::{AttributeField, CategoryRule, CategoryRules, DiversityRanker};
pub use reconciler::RecordReconciler;
pub use registry::SessionRegistry;
pub use scorer::{HeuristicStrategy, LlmStrategy, ScoreError, Scorer, ScoringStrategy};
