//! The instruction catalog: one learned circuit per instruction.
pub mod loader;
pub mod types;

// Re-export key types for convenient access
pub use loader::{load_catalog, CatalogError, CIRCUIT_EXTENSION};
pub use types::{Circuit, Instruction};
