pub mod log_likelihood;
pub mod conditional;
pub mod bayesian_dirichlet;

use crate::Penalization;
use ctbnc_core::{Dataset, Network};

pub use log_likelihood::LogLikelihood;
pub use conditional::ConditionalLogLikelihood;
pub use bayesian_dirichlet::{BayesianDirichlet, BdeHyperparameters};

/// Ranks candidate structures. Higher is better.
///
/// Scores see the structure through `network` and compute fresh sufficient
/// statistics for whatever parent sets it currently holds.
pub trait StructureScore: Send + Sync + std::fmt::Debug {
    /// Local score of one node under its current parent set.
    fn compute_node(&self, network: &Network, dataset: &Dataset, node: usize) -> f64;

    /// Score of the whole structure over the nodes the network learns.
    fn compute(&self, network: &Network, dataset: &Dataset) -> f64 {
        network
            .learnable_nodes()
            .into_iter()
            .map(|node| self.compute_node(network, dataset, node))
            .sum()
    }

    /// Whether `compute` is the sum of `compute_node` over learnable nodes.
    fn is_decomposable(&self) -> bool {
        true
    }

    fn penalization(&self) -> Penalization;

    fn name(&self) -> &'static str;
}
