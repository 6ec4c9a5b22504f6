//! Post-extraction components
//!
//! Everything that runs after the analyzer modules: category scoring, issue
//! rules and the package decision table. All of it is pure over the signals.

pub mod issue_engine;
pub mod recommendation_engine;
pub mod scoring_engine;

pub use issue_engine::{Issue, IssueCategory, IssueCount, IssueEngine};
pub use recommendation_engine::{
    NeedFlags, PackageRecommendation, RecommendationEngine, ServicePackage,
};
pub use scoring_engine::CategoryScores;
