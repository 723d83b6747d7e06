use ctbnc_core::{AdjacencyMatrix, Network, NodeIndexer};
use std::collections::VecDeque;
use tracing::warn;

/// Decides which structures the search may visit.
pub trait StructureConstraint: Send + Sync + std::fmt::Debug {
    fn is_legal(&self, structure: &AdjacencyMatrix, indexer: &NodeIndexer) -> bool;

    /// True when exactly one structure is legal, so search can be skipped.
    fn has_unique_structure(&self) -> bool {
        false
    }

    /// Install the unique legal structure into `network`.
    fn initialize(&self, _network: &mut Network) {}

    /// True when legality is a conjunction of per-node conditions on parent
    /// sets, so each node's parents can be searched independently.
    fn is_node_local(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str;
}

/// General Bayesian network: any acyclic structure.
#[derive(Copy, Clone, Debug, Default)]
pub struct DagConstraint;

/// Kahn's algorithm: repeatedly strip nodes without incoming arcs.
pub fn is_acyclic(structure: &AdjacencyMatrix) -> bool {
    let n = structure.dim();
    let mut in_degree: Vec<usize> = (0..n).map(|j| structure.in_degree(j)).collect();
    let mut ready: VecDeque<usize> = (0..n).filter(|&j| in_degree[j] == 0).collect();
    let mut removed = 0;

    while let Some(node) = ready.pop_front() {
        removed += 1;
        for child in structure.children(node) {
            in_degree[child] -= 1;
            if in_degree[child] == 0 {
                ready.push_back(child);
            }
        }
    }

    removed == n
}

impl StructureConstraint for DagConstraint {
    fn is_legal(&self, structure: &AdjacencyMatrix, _indexer: &NodeIndexer) -> bool {
        is_acyclic(structure)
    }

    fn name(&self) -> &'static str {
        "dag"
    }
}

/// No arcs at all.
#[derive(Copy, Clone, Debug, Default)]
pub struct EmptyConstraint;

impl StructureConstraint for EmptyConstraint {
    fn is_legal(&self, structure: &AdjacencyMatrix, _indexer: &NodeIndexer) -> bool {
        structure.arc_count() == 0
    }

    fn has_unique_structure(&self) -> bool {
        true
    }

    fn initialize(&self, network: &mut Network) {
        network.set_structure(AdjacencyMatrix::empty(network.len()));
    }

    fn is_node_local(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "empty"
    }
}

/// Feature variables may never be parents of class variables. Cycles among
/// features are allowed.
#[derive(Copy, Clone, Debug, Default)]
pub struct BridgeConstraint;

fn respects_bridge(structure: &AdjacencyMatrix, indexer: &NodeIndexer) -> bool {
    structure
        .arcs()
        .into_iter()
        .all(|(from, to)| !(indexer.is_class(to) && !indexer.is_class(from)))
}

impl StructureConstraint for BridgeConstraint {
    fn is_legal(&self, structure: &AdjacencyMatrix, indexer: &NodeIndexer) -> bool {
        respects_bridge(structure, indexer)
    }

    fn is_node_local(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "bridge"
    }
}

/// Every class variable is a parent of every feature, and nothing else.
#[derive(Copy, Clone, Debug, Default)]
pub struct NaiveBayesConstraint;

impl NaiveBayesConstraint {
    fn structure_for(indexer: &NodeIndexer) -> AdjacencyMatrix {
        let mut arcs = Vec::new();
        for class in indexer.class_indices() {
            for feature in indexer.feature_indices() {
                arcs.push((class, feature));
            }
        }
        AdjacencyMatrix::from_arcs(indexer.len(), &arcs)
    }
}

impl StructureConstraint for NaiveBayesConstraint {
    fn is_legal(&self, structure: &AdjacencyMatrix, indexer: &NodeIndexer) -> bool {
        *structure == Self::structure_for(indexer)
    }

    fn has_unique_structure(&self) -> bool {
        true
    }

    fn initialize(&self, network: &mut Network) {
        let structure = Self::structure_for(network.indexer());
        network.set_structure(structure);
    }

    fn is_node_local(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "naive-bayes"
    }
}

/// Bridge rule plus at most `k` feature parents per node. Class parents do
/// not count towards the bound.
#[derive(Copy, Clone, Debug)]
pub struct MaxKConstraint {
    k: usize,
}

impl MaxKConstraint {
    pub fn new(k: usize) -> Self {
        if k < 1 {
            warn!(k, "max-k constraint needs k >= 1, using 1");
        }
        Self { k: k.max(1) }
    }

    pub fn k(&self) -> usize {
        self.k
    }
}

impl StructureConstraint for MaxKConstraint {
    fn is_legal(&self, structure: &AdjacencyMatrix, indexer: &NodeIndexer) -> bool {
        if !respects_bridge(structure, indexer) {
            return false;
        }
        (0..structure.dim()).all(|node| {
            let feature_parents = structure
                .parents(node)
                .into_iter()
                .filter(|&p| !indexer.is_class(p))
                .count();
            feature_parents <= self.k
        })
    }

    fn is_node_local(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "max-k"
    }
}
