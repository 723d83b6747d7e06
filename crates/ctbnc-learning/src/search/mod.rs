pub mod cache;
pub mod hill_climbing;
pub mod random_restart;
pub mod hybrid;

use crate::{StructureConstraint, StructureScore};
use ctbnc_core::{AdjacencyMatrix, Dataset, Network};
use tracing::info;

pub use cache::{ParentMask, ScoreCache};
pub use hill_climbing::HillClimbing;
pub use random_restart::RandomRestartHillClimbing;
pub use hybrid::HybridHillClimbing;

/// Structure learning strategy.
pub trait StructureSearch: Send + Sync + std::fmt::Debug {
    /// Find a high-scoring legal structure for `network` and install it.
    fn search(
        &self,
        network: &mut Network,
        dataset: &Dataset,
        score: &dyn StructureScore,
        constraint: &dyn StructureConstraint,
    ) -> SearchOutcome;

    fn name(&self) -> &'static str;
}

/// Result of one structure search.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchOutcome {
    pub structure: AdjacencyMatrix,
    pub score: f64,
    /// Accepted moves.
    pub iterations: usize,
    /// Scored candidate structures (cache hits included).
    pub evaluations: usize,
    pub cache_hits: usize,
}

impl SearchOutcome {
    /// Add the work counters of `other` to `self`.
    pub fn absorb_counters(&mut self, other: &SearchOutcome) {
        self.iterations += other.iterations;
        self.evaluations += other.evaluations;
        self.cache_hits += other.cache_hits;
    }
}

/// The network's current structure if legal, the empty structure otherwise.
pub fn initial_structure(network: &Network, constraint: &dyn StructureConstraint) -> AdjacencyMatrix {
    let current = network.structure();
    if constraint.is_legal(current, network.indexer()) {
        current.clone()
    } else {
        AdjacencyMatrix::empty(network.len())
    }
}

/// Shared driver: skip search for unique structures, otherwise climb from the
/// initial structure and install the result.
pub(crate) fn run_search(
    search: &str,
    network: &mut Network,
    dataset: &Dataset,
    score: &dyn StructureScore,
    constraint: &dyn StructureConstraint,
    climb: impl FnOnce(&Network, AdjacencyMatrix) -> SearchOutcome,
) -> SearchOutcome {
    if constraint.has_unique_structure() {
        constraint.initialize(network);
        let outcome = SearchOutcome {
            structure: network.structure().clone(),
            score: score.compute(network, dataset),
            iterations: 0,
            evaluations: 1,
            cache_hits: 0,
        };
        info!(search, constraint = constraint.name(), score = outcome.score, "unique structure, search skipped");
        return outcome;
    }

    let start = initial_structure(network, constraint);
    info!(
        search,
        score = score.name(),
        constraint = constraint.name(),
        nodes = network.len(),
        "structure search started"
    );
    let outcome = climb(network, start);
    network.set_structure(outcome.structure.clone());
    info!(
        search,
        score = outcome.score,
        arcs = outcome.structure.arc_count(),
        iterations = outcome.iterations,
        evaluations = outcome.evaluations,
        cache_hits = outcome.cache_hits,
        "structure search finished"
    );
    outcome
}
