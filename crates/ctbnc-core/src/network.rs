use crate::node::{num_configurations, NodeKind};
use crate::stats::{self, SufficientStatistics};
use crate::{AdjacencyMatrix, Dataset, Node, NodeIndexer};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NetworkKind {
    /// Static Bayesian network over discrete (class) variables.
    Bayesian,
    /// Continuous-time Bayesian network; CPT nodes only provide parent states.
    ContinuousTime,
}

impl NetworkKind {
    /// Arc reversal is a legal move only in static networks.
    pub fn allows_reversal(&self) -> bool {
        matches!(self, NetworkKind::Bayesian)
    }
}

/// Arena of nodes plus the structure that connects them.
///
/// Nodes are addressed by their index in the arena; the adjacency matrix holds
/// the edge set as index pairs. Cloning deep-copies nodes and edges.
#[derive(Clone, Debug)]
pub struct Network {
    kind: NetworkKind,
    nodes: Vec<Node>,
    indexer: NodeIndexer,
    structure: AdjacencyMatrix,
}

impl Network {
    pub fn new(kind: NetworkKind, nodes: Vec<Node>) -> Self {
        let mut indexer = NodeIndexer::new();
        for node in &nodes {
            indexer.insert(node.name(), node.is_class_variable());
        }
        let structure = AdjacencyMatrix::empty(nodes.len());
        Self { kind, nodes, indexer, structure }
    }

    pub fn kind(&self) -> NetworkKind {
        self.kind
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn node_mut(&mut self, index: usize) -> &mut Node {
        &mut self.nodes[index]
    }

    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.indexer.index_of(name).map(|i| &self.nodes[i])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn indexer(&self) -> &NodeIndexer {
        &self.indexer
    }

    pub fn structure(&self) -> &AdjacencyMatrix {
        &self.structure
    }

    /// Replace the structure. Parameters of nodes whose parent set changed
    /// are dropped, since they no longer match the structure.
    pub fn set_structure(&mut self, structure: AdjacencyMatrix) {
        debug_assert_eq!(structure.dim(), self.nodes.len(), "structure size must match node count");
        for (i, node) in self.nodes.iter_mut().enumerate() {
            if structure.column(i) != self.structure.column(i) {
                node.clear_parameters();
            }
        }
        self.structure = structure;
    }

    pub fn add_arc(&mut self, from: usize, to: usize) {
        if !self.structure.has_arc(from, to) {
            self.structure.set_arc(from, to, true);
            self.nodes[to].clear_parameters();
        }
    }

    pub fn remove_arc(&mut self, from: usize, to: usize) {
        if self.structure.has_arc(from, to) {
            self.structure.set_arc(from, to, false);
            self.nodes[to].clear_parameters();
        }
    }

    pub fn parents(&self, index: usize) -> Vec<usize> {
        self.structure.parents(index)
    }

    pub fn children(&self, index: usize) -> Vec<usize> {
        self.structure.children(index)
    }

    /// Cardinalities of the parents of `index`, in parent index order.
    pub fn parent_cardinalities(&self, index: usize) -> Vec<usize> {
        self.parents(index)
            .into_iter()
            .map(|p| self.nodes[p].cardinality())
            .collect()
    }

    pub fn num_parent_configurations(&self, index: usize) -> usize {
        num_configurations(&self.parent_cardinalities(index))
    }

    /// Nodes whose parent sets are learned and scored: every node of a static
    /// network, the CIM nodes of a continuous-time one.
    pub fn learnable_nodes(&self) -> Vec<usize> {
        match self.kind {
            NetworkKind::Bayesian => (0..self.nodes.len()).collect(),
            NetworkKind::ContinuousTime => (0..self.nodes.len())
                .filter(|&i| self.nodes[i].kind() == NodeKind::Cim)
                .collect(),
        }
    }

    pub fn sufficient_statistics(&self, index: usize, dataset: &Dataset) -> SufficientStatistics {
        stats::compute(self, index, dataset)
    }

    /// Arcs as `(parent name, child name)` pairs.
    pub fn named_arcs(&self) -> Vec<(String, String)> {
        self.structure
            .arcs()
            .into_iter()
            .map(|(from, to)| (self.nodes[from].name().to_string(), self.nodes[to].name().to_string()))
            .collect()
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let arcs = self.named_arcs();
        if arcs.is_empty() {
            return write!(f, "(no arcs)");
        }
        let rendered: Vec<String> = arcs.iter().map(|(a, b)| format!("{a} -> {b}")).collect();
        write!(f, "{}", rendered.join(", "))
    }
}
