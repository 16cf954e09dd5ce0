//! Learning-difficulty scoring over the dependency graph.
//!
//! The difficulty of an instruction is the length of the longest dependency
//! chain ending at it: 0 for a circuit calling only primitives, otherwise
//! 1 + the hardest of its direct dependencies.

use super::topology::{self, AnalysisError};
use crate::graph::{DependencyGraph, NodeId};
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-node score plus the predecessor that produced it.
///
/// When several predecessors tie on score, whichever the traversal saw first
/// is recorded. The choice is consistent within a run; across runs it is an
/// accepted don't-care.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DifficultyRecord {
    pub score: u32,
    pub predecessor: Option<NodeId>,
}

/// Summary of the score multiset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreDistribution {
    pub min: u32,
    pub max: u32,
    pub mean: f64,
    /// Count of nodes per score value.
    pub counts: BTreeMap<u32, usize>,
    pub total: usize,
}

impl ScoreDistribution {
    fn from_records(records: &[DifficultyRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }
        let mut counts = BTreeMap::new();
        let mut sum = 0u64;
        let mut min = u32::MAX;
        let mut max = 0u32;
        for rec in records {
            *counts.entry(rec.score).or_insert(0) += 1;
            sum += rec.score as u64;
            min = min.min(rec.score);
            max = max.max(rec.score);
        }
        Self {
            min,
            max,
            mean: sum as f64 / records.len() as f64,
            counts,
            total: records.len(),
        }
    }
}

/// Complete scoring output for one analysis run. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct DifficultyAnalysis {
    /// The topological order the scores were computed in.
    pub order: Vec<NodeId>,
    /// Indexed by `NodeId`.
    pub records: Vec<DifficultyRecord>,
    /// Node holding the global maximum score, if the graph is non-empty.
    pub hardest: Option<NodeId>,
    pub distribution: ScoreDistribution,
}

impl DifficultyAnalysis {
    pub fn score(&self, id: NodeId) -> u32 {
        self.records[id.index()].score
    }

    /// Reconstructs the hardest chain, from a score-0 source up to the
    /// global-maximum node inclusive.
    ///
    /// Each backward step decreases the score by exactly 1, so the walk
    /// terminates in max score + 1 steps.
    pub fn hardest_chain(&self) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut cursor = self.hardest;
        while let Some(node) = cursor {
            chain.push(node);
            cursor = self.records[node.index()].predecessor;
        }
        chain.reverse();
        chain
    }
}

/// Scores every node of an acyclic graph.
///
/// Fails with `CyclicDependency` before producing any records; a partial
/// difficulty table would be misleading.
pub fn analyze(graph: &DependencyGraph) -> Result<DifficultyAnalysis, AnalysisError> {
    let order = topology::sort(graph)?;
    let mut records = vec![DifficultyRecord::default(); graph.node_count()];

    for &node in &order {
        let mut best: Option<(NodeId, u32)> = None;
        for &dep in graph.predecessors(node) {
            let score = records[dep.index()].score;
            // Strict '>' keeps the first maximizing predecessor on ties.
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((dep, score));
            }
        }
        if let Some((dep, score)) = best {
            records[node.index()] = DifficultyRecord {
                score: score + 1,
                predecessor: Some(dep),
            };
        }
    }

    // First node in traversal order wins score ties, matching the recorded
    // predecessor discipline.
    let mut hardest: Option<NodeId> = None;
    for &node in &order {
        if hardest.map_or(true, |h| records[node.index()].score > records[h.index()].score) {
            hardest = Some(node);
        }
    }

    let distribution = ScoreDistribution::from_records(&records);
    Ok(DifficultyAnalysis {
        order,
        records,
        hardest,
        distribution,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Circuit, Instruction};

    fn circuit(subject: &str, refs: &[&str]) -> Circuit {
        Circuit {
            subject: Instruction::from(subject),
            references: refs.iter().map(|r| Instruction::from(*r)).collect(),
            source: String::new(),
        }
    }

    fn graph(catalog: &[Circuit]) -> DependencyGraph {
        DependencyGraph::from_catalog(catalog)
    }

    #[test]
    fn test_source_nodes_score_zero() {
        let g = graph(&[circuit("NOP", &[]), circuit("MOV", &["LD"])]);
        let a = analyze(&g).unwrap();
        for node in g.nodes() {
            // LD is not in the catalog, so both nodes are sources.
            assert_eq!(a.score(node), 0);
            assert_eq!(a.records[node.index()].predecessor, None);
        }
    }

    #[test]
    fn test_chain_scores_increment() {
        let g = graph(&[
            circuit("A", &[]),
            circuit("B", &["A"]),
            circuit("C", &["B"]),
        ]);
        let a = analyze(&g).unwrap();
        let id = |n: &str| g.lookup(&Instruction::from(n)).unwrap();
        assert_eq!(a.score(id("A")), 0);
        assert_eq!(a.score(id("B")), 1);
        assert_eq!(a.score(id("C")), 2);
        assert_eq!(a.hardest, Some(id("C")));
    }

    #[test]
    fn test_diamond_scores_two_regardless_of_tiebreak() {
        // A -> B, A -> C, B -> D, C -> D
        let g = graph(&[
            circuit("A", &[]),
            circuit("B", &["A"]),
            circuit("C", &["A"]),
            circuit("D", &["B", "C"]),
        ]);
        let a = analyze(&g).unwrap();
        let id = |n: &str| g.lookup(&Instruction::from(n)).unwrap();
        assert_eq!(a.score(id("D")), 2);

        // The recorded predecessor is one of the tied maxima.
        let pred = a.records[id("D").index()].predecessor.unwrap();
        assert!(pred == id("B") || pred == id("C"));
    }

    #[test]
    fn test_hardest_chain_walks_back_to_a_source() {
        let g = graph(&[
            circuit("A", &[]),
            circuit("B", &["A"]),
            circuit("C", &["B"]),
            circuit("X", &[]),
        ]);
        let a = analyze(&g).unwrap();
        let chain = a.hardest_chain();
        let names: Vec<_> = chain.iter().map(|&n| g.name(n).as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);

        // Exactly max score + 1 steps.
        assert_eq!(chain.len() as u32, a.distribution.max + 1);
        assert_eq!(a.score(chain[0]), 0);
    }

    #[test]
    fn test_distribution_counts_and_mean() {
        let g = graph(&[
            circuit("A", &[]),
            circuit("B", &["A"]),
            circuit("C", &["A"]),
        ]);
        let a = analyze(&g).unwrap();
        let d = &a.distribution;
        assert_eq!(d.total, 3);
        assert_eq!(d.min, 0);
        assert_eq!(d.max, 1);
        assert_eq!(d.counts[&0], 1);
        assert_eq!(d.counts[&1], 2);
        assert!((d.mean - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_cyclic_catalog_produces_no_partial_results() {
        let g = graph(&[circuit("A", &["B"]), circuit("B", &["A"])]);
        let err = analyze(&g).unwrap_err();
        assert!(matches!(err, AnalysisError::CyclicDependency(_)));
    }

    #[test]
    fn test_empty_graph_yields_empty_analysis() {
        let g = DependencyGraph::new();
        let a = analyze(&g).unwrap();
        assert!(a.order.is_empty());
        assert!(a.hardest.is_none());
        assert!(a.hardest_chain().is_empty());
        assert_eq!(a.distribution, ScoreDistribution::default());
    }
}
