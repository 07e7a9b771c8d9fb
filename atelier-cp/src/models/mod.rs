//! Domain model for the curation pipeline

mod entity;
mod proposal;
mod record;
mod session;
mod theme;

pub use entity::{
    CanonicalEntity, RankedCandidate, RelevanceAssessment, ScoreComponents, ScoringMethod,
};
pub use proposal::{ExhibitionProposal, ProposalEntry, ProposalSection};
pub use record::{normalize_name, CandidateRecord, EntityKind, IdentityKey, SourceTag};
pub use session::{
    CurationProgress, CurationSession, CurationState, SessionOptions, StateTransition,
};
pub use theme::ThemeContext;
