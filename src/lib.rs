//! circuit_audit — validates a learned library of instruction circuits
//! against an external reference verifier and explains which instructions
//! were hard to learn.
//!
//! The pipeline is a single sequential pass: load the catalog, build the
//! dependency graph, score learning difficulty along a topological order,
//! classify every instruction through the verifier, and render the report.

pub mod analysis;
pub mod catalog;
pub mod display;
pub mod graph;
pub mod verify;

pub use analysis::{AnalysisError, DifficultyAnalysis};
pub use catalog::{load_catalog, CatalogError, Circuit, Instruction};
pub use display::{format_report, AuditSummary};
pub use graph::{DependencyGraph, NodeId};
pub use verify::{
    RunConfig, RunError, RunReport, RunTally, SubprocessVerifier, VerificationOutcome, Verifier,
};

use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Run(#[from] RunError),
}

/// Everything one audit pass produced.
#[derive(Debug)]
pub struct Audit {
    pub analysis: DifficultyAnalysis,
    pub run: RunReport,
    pub summary: AuditSummary,
    pub text: String,
}

/// Runs the whole pipeline over a circuit directory with the real
/// subprocess verifier.
pub fn audit_directory(
    circuit_dir: &Path,
    verifier_program: &Path,
    config: &RunConfig,
) -> Result<Audit, AuditError> {
    let catalog = load_catalog(circuit_dir)?;
    let graph = DependencyGraph::from_catalog(&catalog);
    let analysis = analysis::analyze(&graph)?;

    let mut verifier = SubprocessVerifier::new(verifier_program, circuit_dir);
    let run = verify::run(&graph, &catalog, &analysis.order, &mut verifier, config)?;

    let summary = AuditSummary::new(&graph, &analysis, &run);
    let text = format_report(&graph, &analysis, &run);
    Ok(Audit {
        analysis,
        run,
        summary,
        text,
    })
}
