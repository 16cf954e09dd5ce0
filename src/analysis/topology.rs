use crate::catalog::Instruction;
use crate::graph::{DependencyGraph, NodeId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The catalog is not acyclic; names one instruction on the cycle.
    #[error("cyclic dependency involving instruction '{0}'")]
    CyclicDependency(Instruction),
}

/// Performs a Topological Sort using Depth-First Search (DFS).
///
/// Returns a list of NodeIds where every dependency appears before its
/// consumer, or fails if the graph contains a cycle. A cyclic catalog is
/// malformed input, so no partial order is ever returned.
pub fn sort(graph: &DependencyGraph) -> Result<Vec<NodeId>, AnalysisError> {
    let count = graph.node_count();
    let mut order = Vec::with_capacity(count);
    let mut state = vec![VisitState::None; count];

    // Iterate 0..count so disconnected nodes are visited too.
    for i in 0..count {
        if state[i] == VisitState::None {
            visit(NodeId::new(i), graph, &mut state, &mut order)?;
        }
    }

    Ok(order)
}

#[derive(Clone, PartialEq, Eq)]
enum VisitState {
    None,
    Visiting, // Used for cycle detection
    Visited,
}

fn visit(
    node: NodeId,
    graph: &DependencyGraph,
    state: &mut Vec<VisitState>,
    order: &mut Vec<NodeId>,
) -> Result<(), AnalysisError> {
    let idx = node.index();

    match state[idx] {
        VisitState::Visited => return Ok(()),
        VisitState::Visiting => {
            return Err(AnalysisError::CyclicDependency(graph.name(node).clone()))
        }
        VisitState::None => state[idx] = VisitState::Visiting,
    }

    // Recurse on dependencies so they land earlier in the post-order.
    for &dep in graph.predecessors(node) {
        visit(dep, graph, state, order)?;
    }

    state[idx] = VisitState::Visited;
    order.push(node);
    Ok(())
}
