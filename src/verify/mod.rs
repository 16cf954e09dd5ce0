//! Batch equivalence checking against the external reference verifier.
pub mod outcome;
pub mod process;
pub mod runner;

pub use outcome::{Diagnostics, OutcomeRecord, RunTally, VerificationOutcome};
pub use process::SubprocessVerifier;
pub use runner::{run, RunConfig, RunError, RunReport, Verifier, VerifierReply, VerifierStatus};
