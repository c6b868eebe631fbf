//! LLM rubric scoring for meeting transcripts.
//!
//! Two independent rubrics run against every transcript: opportunity
//! qualification (five binary criteria about the client) and sales coaching
//! (eight 0-3 criteria about the salesperson). Each criterion is one model
//! call; aggregation over the per-criterion results is pure and deterministic.

pub mod aggregate;
pub mod context;
pub mod criteria;
pub mod evaluator;
pub mod orchestrator;

pub use aggregate::{OpportunityScores, SalesScores};
pub use criteria::{OpportunityCriterion, SalesCriterion};
pub use evaluator::{CriterionEvaluator, RetryPolicy, SalesAssessment, SectionResult};
pub use orchestrator::{ScoredRecord, ScoringOrchestrator};
