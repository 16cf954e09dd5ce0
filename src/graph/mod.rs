//! Defines the core data structures for the dependency graph.
pub mod dag;
pub mod storage;

// Re-export key types for convenient access
pub use dag::DependencyGraph;
pub use storage::NodeId;
