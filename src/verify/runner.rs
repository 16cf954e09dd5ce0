//! The sequential classification runner.
//!
//! Walks the catalog's subjects in topological order, asking the injected
//! verifier capability about each one and mapping its termination status to
//! an outcome. Sequencing is deliberate: reference verifiers keep global
//! temp-file state, so invocations must not overlap.

use super::outcome::{Diagnostics, OutcomeRecord, RunTally, VerificationOutcome};
use crate::catalog::{Circuit, Instruction};
use crate::graph::{DependencyGraph, NodeId};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use thiserror::Error;

/// How a single verifier invocation terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifierStatus {
    Exited(i32),
    /// Killed at the wall-clock deadline. Kept distinct from exit codes so a
    /// timeout can never be mistaken for a contract violation.
    TimedOut,
}

/// Termination status plus captured text output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierReply {
    pub status: VerifierStatus,
    pub output: String,
}

/// The external-verifier capability.
///
/// Modeled as a trait so tests substitute a deterministic double without
/// spawning processes. `invoke` must enforce the timeout as a hard wall, and
/// must not leak whatever it started.
pub trait Verifier {
    fn invoke(
        &mut self,
        instruction: &Instruction,
        timeout: Duration,
    ) -> Result<VerifierReply, RunError>;
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error("failed to invoke verifier for '{instruction}': {source}")]
    Invocation {
        instruction: Instruction,
        #[source]
        source: std::io::Error,
    },
    /// The verifier broke its status contract. Fatal: continuing would
    /// silently corrupt every subsequent count.
    #[error("verifier returned unexpected exit status {code} for '{instruction}'")]
    UnexpectedStatus { instruction: Instruction, code: i32 },
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Hard wall-clock budget per invocation.
    pub timeout: Duration,
    /// Instructions whose reference implementation is known to be wrong.
    pub deny_list: HashSet<Instruction>,
    /// Attach circuit source and verifier output to NotEquivalent records.
    pub verbose: bool,
    /// Exit code the verifier uses for "circuits differ".
    pub not_equivalent_code: i32,
    /// Exit code the verifier uses for "instruction not modeled".
    pub unsupported_code: i32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            deny_list: HashSet::new(),
            verbose: false,
            not_equivalent_code: 1,
            unsupported_code: 2,
        }
    }
}

impl RunConfig {
    /// Maps a termination status to its outcome category. Total over the
    /// status type; only the outcome is decided here, never run control.
    pub fn classify(&self, status: &VerifierStatus) -> VerificationOutcome {
        match *status {
            VerifierStatus::TimedOut => VerificationOutcome::Timeout,
            VerifierStatus::Exited(0) => VerificationOutcome::Correct,
            VerifierStatus::Exited(code) if code == self.not_equivalent_code => {
                VerificationOutcome::NotEquivalent
            }
            VerifierStatus::Exited(code) if code == self.unsupported_code => {
                VerificationOutcome::UnsupportedByReference
            }
            VerifierStatus::Exited(_) => VerificationOutcome::UnexpectedError,
        }
    }
}

/// Everything a completed run produced.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// One record per subject, in classification (topological) order.
    pub records: Vec<OutcomeRecord>,
    pub tally: RunTally,
}

/// Classifies every subject in `order` against the verifier.
///
/// Deny-listed subjects are classified without an invocation. An unexpected
/// exit status aborts the run immediately; per-instruction timeouts and
/// mismatches do not.
pub fn run<V: Verifier>(
    graph: &DependencyGraph,
    catalog: &[Circuit],
    order: &[NodeId],
    verifier: &mut V,
    config: &RunConfig,
) -> Result<RunReport, RunError> {
    let sources: HashMap<&Instruction, &Circuit> =
        catalog.iter().map(|c| (&c.subject, c)).collect();

    let mut report = RunReport::default();
    for &node in order {
        let instruction = graph.name(node).clone();

        if config.deny_list.contains(&instruction) {
            tracing::debug!(%instruction, "deny-listed, skipping verifier");
            push(&mut report, instruction, VerificationOutcome::KnownReferenceBug, None);
            continue;
        }

        let reply = verifier.invoke(&instruction, config.timeout)?;
        let outcome = config.classify(&reply.status);
        tracing::debug!(%instruction, outcome = outcome.label(), "classified");

        match outcome {
            VerificationOutcome::UnexpectedError => {
                let code = match reply.status {
                    VerifierStatus::Exited(code) => code,
                    VerifierStatus::TimedOut => unreachable!("timeouts classify as Timeout"),
                };
                tracing::error!(%instruction, code, "verifier broke its status contract");
                return Err(RunError::UnexpectedStatus { instruction, code });
            }
            VerificationOutcome::NotEquivalent if config.verbose => {
                let diagnostics = sources.get(&instruction).map(|circuit| Diagnostics {
                    circuit_source: circuit.source.clone(),
                    verifier_output: reply.output.clone(),
                });
                push(&mut report, instruction, outcome, diagnostics);
            }
            _ => push(&mut report, instruction, outcome, None),
        }
    }

    debug_assert!(report.tally.is_reconciled());
    Ok(report)
}

fn push(
    report: &mut RunReport,
    instruction: Instruction,
    outcome: VerificationOutcome,
    diagnostics: Option<Diagnostics>,
) {
    report.tally.record(outcome);
    report.records.push(OutcomeRecord {
        instruction,
        outcome,
        diagnostics,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis;
    use rstest::rstest;

    /// Test double: scripted replies keyed by instruction name, recording
    /// every invocation.
    struct MockVerifier {
        replies: HashMap<Instruction, VerifierStatus>,
        invoked: Vec<Instruction>,
    }

    impl MockVerifier {
        fn new(replies: &[(&str, VerifierStatus)]) -> Self {
            Self {
                replies: replies
                    .iter()
                    .map(|(n, s)| (Instruction::from(*n), s.clone()))
                    .collect(),
                invoked: Vec::new(),
            }
        }
    }

    impl Verifier for MockVerifier {
        fn invoke(
            &mut self,
            instruction: &Instruction,
            _timeout: Duration,
        ) -> Result<VerifierReply, RunError> {
            self.invoked.push(instruction.clone());
            let status = self
                .replies
                .get(instruction)
                .cloned()
                .unwrap_or(VerifierStatus::Exited(0));
            Ok(VerifierReply {
                status,
                output: format!("checked {instruction}"),
            })
        }
    }

    fn circuit(subject: &str, refs: &[&str]) -> Circuit {
        Circuit {
            subject: Instruction::from(subject),
            references: refs.iter().map(|r| Instruction::from(*r)).collect(),
            source: format!("; circuit for {subject}\n"),
        }
    }

    fn setup(catalog: &[Circuit]) -> (DependencyGraph, Vec<NodeId>) {
        let graph = DependencyGraph::from_catalog(catalog);
        let order = analysis::topology::sort(&graph).unwrap();
        (graph, order)
    }

    #[rstest]
    #[case(VerifierStatus::Exited(0), VerificationOutcome::Correct)]
    #[case(VerifierStatus::Exited(1), VerificationOutcome::NotEquivalent)]
    #[case(VerifierStatus::Exited(2), VerificationOutcome::UnsupportedByReference)]
    #[case(VerifierStatus::Exited(3), VerificationOutcome::UnexpectedError)]
    #[case(VerifierStatus::Exited(-1), VerificationOutcome::UnexpectedError)]
    #[case(VerifierStatus::TimedOut, VerificationOutcome::Timeout)]
    fn test_status_mapping(
        #[case] status: VerifierStatus,
        #[case] expected: VerificationOutcome,
    ) {
        let config = RunConfig::default();
        assert_eq!(config.classify(&status), expected);
    }

    #[test]
    fn test_one_of_each_outcome_tallies_exactly() {
        let catalog = vec![
            circuit("W", &[]),
            circuit("X", &[]),
            circuit("Y", &[]),
            circuit("Z", &[]),
        ];
        let (graph, order) = setup(&catalog);
        let mut verifier = MockVerifier::new(&[
            ("X", VerifierStatus::Exited(0)),
            ("Y", VerifierStatus::Exited(1)),
            ("Z", VerifierStatus::Exited(2)),
            ("W", VerifierStatus::TimedOut),
        ]);

        let report = run(&graph, &catalog, &order, &mut verifier, &RunConfig::default()).unwrap();
        let tally = &report.tally;
        assert_eq!(tally.correct, 1);
        assert_eq!(tally.not_equivalent, 1);
        assert_eq!(tally.unsupported_by_reference, 1);
        assert_eq!(tally.timeout, 1);
        assert_eq!(tally.total, 4);
        assert!(tally.is_reconciled());
        assert_eq!(report.records.len(), 4);
    }

    #[test]
    fn test_deny_listed_subject_never_invokes_verifier() {
        let catalog = vec![circuit("DAA", &[]), circuit("ADD", &[])];
        let (graph, order) = setup(&catalog);
        let mut verifier = MockVerifier::new(&[]);
        let config = RunConfig {
            deny_list: [Instruction::from("DAA")].into_iter().collect(),
            ..RunConfig::default()
        };

        let report = run(&graph, &catalog, &order, &mut verifier, &config).unwrap();
        assert_eq!(report.tally.known_reference_bug, 1);
        assert_eq!(report.tally.correct, 1);
        assert_eq!(verifier.invoked, vec![Instruction::from("ADD")]);

        let daa = report
            .records
            .iter()
            .find(|r| r.instruction.as_str() == "DAA")
            .unwrap();
        assert_eq!(daa.outcome, VerificationOutcome::KnownReferenceBug);
    }

    #[test]
    fn test_unexpected_status_aborts_the_run() {
        let catalog = vec![circuit("A", &[]), circuit("B", &["A"])];
        let (graph, order) = setup(&catalog);
        let mut verifier = MockVerifier::new(&[("A", VerifierStatus::Exited(42))]);

        let err = run(&graph, &catalog, &order, &mut verifier, &RunConfig::default()).unwrap_err();
        match err {
            RunError::UnexpectedStatus { instruction, code } => {
                assert_eq!(instruction, Instruction::from("A"));
                assert_eq!(code, 42);
            }
            other => panic!("expected UnexpectedStatus, got {other:?}"),
        }
        // B came after A in topological order and was never reached.
        assert_eq!(verifier.invoked.len(), 1);
    }

    #[test]
    fn test_verbose_attaches_diagnostics_on_mismatch_only() {
        let catalog = vec![circuit("A", &[]), circuit("B", &[])];
        let (graph, order) = setup(&catalog);
        let mut verifier = MockVerifier::new(&[("B", VerifierStatus::Exited(1))]);
        let config = RunConfig {
            verbose: true,
            ..RunConfig::default()
        };

        let report = run(&graph, &catalog, &order, &mut verifier, &config).unwrap();
        for record in &report.records {
            match record.outcome {
                VerificationOutcome::NotEquivalent => {
                    let diag = record.diagnostics.as_ref().unwrap();
                    assert_eq!(diag.circuit_source, "; circuit for B\n");
                    assert!(diag.verifier_output.contains("checked B"));
                }
                _ => assert!(record.diagnostics.is_none()),
            }
        }
    }

    #[test]
    fn test_empty_catalog_yields_zero_tally() {
        let (graph, order) = setup(&[]);
        let mut verifier = MockVerifier::new(&[]);
        let report = run(&graph, &[], &order, &mut verifier, &RunConfig::default()).unwrap();
        assert_eq!(report.tally, RunTally::default());
        assert!(report.records.is_empty());
        assert!(verifier.invoked.is_empty());
    }

    #[test]
    fn test_subjects_are_classified_in_topological_order() {
        let catalog = vec![
            circuit("C", &["B"]),
            circuit("B", &["A"]),
            circuit("A", &[]),
        ];
        let (graph, order) = setup(&catalog);
        let mut verifier = MockVerifier::new(&[]);
        run(&graph, &catalog, &order, &mut verifier, &RunConfig::default()).unwrap();
        let names: Vec<_> = verifier.invoked.iter().map(|i| i.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }
}
