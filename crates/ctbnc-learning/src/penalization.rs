use ctbnc_core::{Dataset, Network, NetworkKind, NodeKind};
use serde::{Serialize, Deserialize};

/// Complexity penalty subtracted from likelihood-based scores.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Penalization {
    /// `ln(N) / 2` per free parameter.
    #[default]
    Bic,
    /// One per free parameter.
    Aic,
    None,
}

impl Penalization {
    pub fn factor(&self, sample_size: f64) -> f64 {
        match self {
            Penalization::Bic => sample_size.max(1.0).ln() / 2.0,
            Penalization::Aic => 1.0,
            Penalization::None => 0.0,
        }
    }

    /// Penalty of one node of `network` scored on `dataset`.
    pub fn node_penalty(&self, network: &Network, dataset: &Dataset, node: usize) -> f64 {
        if *self == Penalization::None {
            return 0.0;
        }
        node_complexity(network, node) * self.factor(sample_size(network, dataset))
    }
}

/// Number of free parameters of a node under its current parent set.
pub fn node_complexity(network: &Network, node: usize) -> f64 {
    let r = network.node(node).cardinality() as f64;
    let configs = network.num_parent_configurations(node) as f64;
    match network.node(node).kind() {
        NodeKind::Cpt => (r - 1.0) * configs,
        NodeKind::Cim => (r - 1.0) * r * configs,
    }
}

/// Sequences for a static network, transition intervals for a CTBN. Never
/// below one.
pub fn sample_size(network: &Network, dataset: &Dataset) -> f64 {
    let n = match network.kind() {
        NetworkKind::Bayesian => dataset.len(),
        NetworkKind::ContinuousTime => dataset.num_intervals(),
    };
    n.max(1) as f64
}
