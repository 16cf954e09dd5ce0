use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// An opcode name. Interned as a plain string; equality is structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Instruction(pub String);

impl Instruction {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[inline(always)]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Instruction {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A learned circuit: the instruction it implements plus the instructions
/// its body calls. Read once at load time, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Circuit {
    pub subject: Instruction,
    /// Deduplicated set of called instructions, in first-appearance order.
    pub references: SmallVec<[Instruction; 4]>,
    /// Raw file body, kept for diagnostic reporting on mismatches.
    pub source: String,
}
