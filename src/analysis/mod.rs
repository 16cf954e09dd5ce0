//! Static analysis over the dependency graph: topological ordering and
//! learning-difficulty scoring.
pub mod difficulty;
pub mod topology;

pub use difficulty::{analyze, DifficultyAnalysis, DifficultyRecord, ScoreDistribution};
pub use topology::AnalysisError;
