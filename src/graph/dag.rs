//! dag.rs
//! Wraps the low-level GraphStore with the catalog-facing build contract.

use super::storage::{GraphStore, NodeId};
use crate::catalog::{Circuit, Instruction};

/// Directed dependency graph over catalog instructions.
///
/// An edge dep -> subject means "to learn subject, dep must already be
/// learnable". Nodes are exactly the catalog's subjects; references to
/// instructions outside the catalog are primitives and carry no edge.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    pub(crate) store: GraphStore,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph from a loaded catalog.
    ///
    /// Catalog subjects are unique (one circuit per instruction), so every
    /// subject interns to a fresh node. External references are dropped, not
    /// the edges of some placeholder node.
    pub fn from_catalog(catalog: &[Circuit]) -> Self {
        let mut graph = Self::new();
        for circuit in catalog {
            graph.store.intern(&circuit.subject);
        }
        for circuit in catalog {
            let subject = graph.store.index[&circuit.subject];
            for reference in &circuit.references {
                let dep = graph.store.index.get(reference).copied();
                if let Some(dep) = dep {
                    graph.store.add_edge(dep, subject);
                }
            }
        }
        graph
    }

    pub fn node_count(&self) -> usize {
        self.store.count()
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        (0..self.store.count()).map(NodeId::new)
    }

    pub fn name(&self, id: NodeId) -> &Instruction {
        &self.store.names[id.index()]
    }

    pub fn lookup(&self, name: &Instruction) -> Option<NodeId> {
        self.store.index.get(name).copied()
    }

    /// Direct dependencies of `id` (instructions that must be learned first).
    pub fn predecessors(&self, id: NodeId) -> &[NodeId] {
        self.store.get_preds(id)
    }

    pub fn successors(&self, id: NodeId) -> &[NodeId] {
        &self.store.succs[id.index()]
    }
}
