//! storage.rs
//! Dense storage for the instruction dependency graph: interned names plus
//! per-node adjacency in both directions.

use crate::catalog::Instruction;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline(always)]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
    pub fn new(idx: usize) -> Self {
        Self(idx as u32)
    }
}

/// Columnar node store. `NodeId`s are dense indices into the parallel vectors.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    pub names: Vec<Instruction>,
    pub index: HashMap<Instruction, NodeId>,

    /// Direct dependencies of each node (edge sources).
    pub preds: Vec<SmallVec<[NodeId; 4]>>,
    /// Nodes depending on each node (edge targets).
    pub succs: Vec<SmallVec<[NodeId; 4]>>,
}

impl GraphStore {
    pub fn count(&self) -> usize {
        self.names.len()
    }

    /// Adds a node for `name` if absent; returns its id either way.
    pub fn intern(&mut self, name: &Instruction) -> NodeId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = NodeId::new(self.names.len());
        self.names.push(name.clone());
        self.index.insert(name.clone(), id);
        self.preds.push(SmallVec::new());
        self.succs.push(SmallVec::new());
        id
    }

    pub fn add_edge(&mut self, from: NodeId, to: NodeId) {
        self.preds[to.index()].push(from);
        self.succs[from.index()].push(to);
    }

    #[inline(always)]
    pub fn get_preds(&self, id: NodeId) -> &[NodeId] {
        &self.preds[id.index()]
    }
}
