//! Classification outcomes and the per-run tally.

use crate::catalog::Instruction;
use serde::{Deserialize, Serialize};

/// The closed set of per-instruction classification results.
///
/// These are expected results of a run, not errors; none of them aborts the
/// batch. The set is fixed by contract with the reference verifier and is
/// matched exhaustively everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationOutcome {
    /// The circuit is equivalent to the reference implementation.
    Correct,
    /// The reference itself is known to be wrong for this instruction; the
    /// verifier is never consulted.
    KnownReferenceBug,
    /// The verifier did not finish within the configured wall-clock budget.
    Timeout,
    /// The reference does not model this instruction.
    UnsupportedByReference,
    /// The circuit disagrees with the reference.
    NotEquivalent,
    /// The verifier exited outside its status contract.
    UnexpectedError,
}

impl VerificationOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Correct => "correct",
            Self::KnownReferenceBug => "known reference bug",
            Self::Timeout => "timeout",
            Self::UnsupportedByReference => "unsupported by reference",
            Self::NotEquivalent => "not equivalent",
            Self::UnexpectedError => "unexpected error",
        }
    }

    pub const ALL: [VerificationOutcome; 6] = [
        Self::Correct,
        Self::KnownReferenceBug,
        Self::Timeout,
        Self::UnsupportedByReference,
        Self::NotEquivalent,
        Self::UnexpectedError,
    ];
}

/// Optional context attached to a `NotEquivalent` record in verbose mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub circuit_source: String,
    pub verifier_output: String,
}

/// One classified instruction, in classification order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub instruction: Instruction,
    pub outcome: VerificationOutcome,
    pub diagnostics: Option<Diagnostics>,
}

/// Per-category counts plus a running total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTally {
    pub correct: usize,
    pub known_reference_bug: usize,
    pub timeout: usize,
    pub unsupported_by_reference: usize,
    pub not_equivalent: usize,
    pub unexpected_error: usize,
    pub total: usize,
}

impl RunTally {
    pub fn record(&mut self, outcome: VerificationOutcome) {
        match outcome {
            VerificationOutcome::Correct => self.correct += 1,
            VerificationOutcome::KnownReferenceBug => self.known_reference_bug += 1,
            VerificationOutcome::Timeout => self.timeout += 1,
            VerificationOutcome::UnsupportedByReference => self.unsupported_by_reference += 1,
            VerificationOutcome::NotEquivalent => self.not_equivalent += 1,
            VerificationOutcome::UnexpectedError => self.unexpected_error += 1,
        }
        self.total += 1;
    }

    pub fn count(&self, outcome: VerificationOutcome) -> usize {
        match outcome {
            VerificationOutcome::Correct => self.correct,
            VerificationOutcome::KnownReferenceBug => self.known_reference_bug,
            VerificationOutcome::Timeout => self.timeout,
            VerificationOutcome::UnsupportedByReference => self.unsupported_by_reference,
            VerificationOutcome::NotEquivalent => self.not_equivalent,
            VerificationOutcome::UnexpectedError => self.unexpected_error,
        }
    }

    /// True when the category counts sum to the total. Holds after every
    /// `record` call; checked at run end anyway.
    pub fn is_reconciled(&self) -> bool {
        VerificationOutcome::ALL
            .iter()
            .map(|&o| self.count(o))
            .sum::<usize>()
            == self.total
    }
}
