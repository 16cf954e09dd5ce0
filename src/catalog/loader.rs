//! Reads a directory of circuit files into the instruction catalog.
//!
//! Each `.circ` file holds one circuit: the filename stem is the subject
//! instruction, the body is one operation per line (`<opcode> <operands...>`).
//! The referenced-instruction set is the set of leading opcode tokens; blank
//! lines and `;` comment lines are skipped.

use super::types::{Circuit, Instruction};
use smallvec::SmallVec;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CIRCUIT_EXTENSION: &str = "circ";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("circuit file '{path}' has no usable instruction name")]
    InvalidName { path: PathBuf },
}

/// Loads every circuit file under `dir`, sorted by subject name.
///
/// Non-circuit files are skipped. Any unreadable or unnameable circuit file
/// aborts the load: a graph built from a partial catalog cannot be trusted.
pub fn load_catalog(dir: &Path) -> Result<Vec<Circuit>, CatalogError> {
    let entries = fs::read_dir(dir).map_err(|source| CatalogError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut circuits = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| CatalogError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();

        if path.extension().and_then(|e| e.to_str()) != Some(CIRCUIT_EXTENSION) {
            tracing::debug!(path = %path.display(), "skipping non-circuit file");
            continue;
        }

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| CatalogError::InvalidName { path: path.clone() })?;

        let source = fs::read_to_string(&path).map_err(|source| CatalogError::Io {
            path: path.clone(),
            source,
        })?;

        circuits.push(Circuit {
            subject: Instruction::from(stem),
            references: parse_references(&source),
            source,
        });
    }

    // Filenames are unique within a directory, so subjects are unique too.
    circuits.sort_by(|a, b| a.subject.cmp(&b.subject));
    tracing::debug!(count = circuits.len(), dir = %dir.display(), "catalog loaded");
    Ok(circuits)
}

/// Extracts the set of instructions a circuit body calls.
fn parse_references(source: &str) -> SmallVec<[Instruction; 4]> {
    let mut seen = HashSet::new();
    let mut refs = SmallVec::new();
    for line in source.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(';') {
            continue;
        }
        let opcode = match trimmed.split_whitespace().next() {
            Some(tok) => tok,
            None => continue,
        };
        if seen.insert(opcode.to_string()) {
            refs.push(Instruction::from(opcode));
        }
    }
    refs
}
