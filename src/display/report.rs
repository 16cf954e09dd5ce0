//! Renders the audit report: hardest chain, difficulty distribution, and the
//! outcome tally. Pure functions of the analysis and run outputs.

use crate::analysis::{DifficultyAnalysis, ScoreDistribution};
use crate::catalog::Instruction;
use crate::graph::DependencyGraph;
use crate::verify::{RunReport, RunTally, VerificationOutcome};
use serde::Serialize;
use std::fmt::Write;

/// Machine-consumable mirror of the textual report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditSummary {
    pub hardest_chain: Vec<Instruction>,
    pub distribution: ScoreDistribution,
    pub tally: RunTally,
}

impl AuditSummary {
    pub fn new(graph: &DependencyGraph, analysis: &DifficultyAnalysis, run: &RunReport) -> Self {
        Self {
            hardest_chain: analysis
                .hardest_chain()
                .into_iter()
                .map(|id| graph.name(id).clone())
                .collect(),
            distribution: analysis.distribution.clone(),
            tally: run.tally.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Formats the full report. An empty graph renders every section with an
/// empty body; there are no error conditions here.
pub fn format_report(
    graph: &DependencyGraph,
    analysis: &DifficultyAnalysis,
    run: &RunReport,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "INSTRUCTION AUDIT REPORT");
    let _ = writeln!(out, "--------------------------------------------------");

    write_chain(&mut out, graph, analysis);
    write_distribution(&mut out, &analysis.distribution);
    write_tally(&mut out, &run.tally);
    write_mismatches(&mut out, run);

    out
}

fn write_chain(out: &mut String, graph: &DependencyGraph, analysis: &DifficultyAnalysis) {
    let chain = analysis.hardest_chain();
    let _ = writeln!(out, "Hardest chain ({} steps):", chain.len());
    for (i, &node) in chain.iter().enumerate() {
        let _ = writeln!(
            out,
            "  [{}] {} (score {})",
            i,
            graph.name(node),
            analysis.score(node)
        );
    }
}

fn write_distribution(out: &mut String, dist: &ScoreDistribution) {
    let _ = writeln!(
        out,
        "Difficulty distribution ({} instructions, min {}, max {}, mean {:.2}):",
        dist.total, dist.min, dist.max, dist.mean
    );
    for (score, count) in &dist.counts {
        let _ = writeln!(out, "  score {score}: {count}");
    }
}

fn write_tally(out: &mut String, tally: &RunTally) {
    let _ = writeln!(out, "Outcome tally:");
    for outcome in VerificationOutcome::ALL {
        let _ = writeln!(out, "  {:<24} : {}", outcome.label(), tally.count(outcome));
    }
    let _ = writeln!(out, "  {:<24} : {}", "total", tally.total);
}

fn write_mismatches(out: &mut String, run: &RunReport) {
    for record in &run.records {
        if let Some(diag) = &record.diagnostics {
            let _ = writeln!(out, "Mismatch detail for '{}':", record.instruction);
            let _ = writeln!(out, "  circuit:");
            for line in diag.circuit_source.lines() {
                let _ = writeln!(out, "    {line}");
            }
            let _ = writeln!(out, "  verifier output:");
            for line in diag.verifier_output.lines() {
                let _ = writeln!(out, "    {line}");
            }
        }
    }
}
