use super::hill_climbing::Climber;
use super::{run_search, SearchOutcome, StructureSearch};
use crate::{StructureConstraint, StructureScore};
use ctbnc_core::{AdjacencyMatrix, Dataset, Network};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use serde::{Serialize, Deserialize};
use tracing::debug;

/// Hill climbing repeated from randomly perturbed starting structures.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RandomRestartHillClimbing {
    pub restarts: usize,
    /// Random arc toggles applied to the start of each restart.
    pub perturbations: usize,
    pub seed: u64,
}

impl Default for RandomRestartHillClimbing {
    fn default() -> Self {
        Self { restarts: 10, perturbations: 5, seed: 42 }
    }
}

/// RNG of one restart, independent of how restarts are scheduled.
pub fn restart_rng(global_seed: u64, restart: u64) -> ChaCha20Rng {
    let seed = global_seed.wrapping_add(restart.wrapping_mul(0x9e3779b97f4a7c15));
    ChaCha20Rng::seed_from_u64(seed)
}

/// Toggle random arcs into learnable nodes, keeping only legal toggles.
pub fn perturb(
    network: &Network,
    start: &AdjacencyMatrix,
    constraint: &dyn StructureConstraint,
    perturbations: usize,
    rng: &mut impl Rng,
) -> AdjacencyMatrix {
    let targets = network.learnable_nodes();
    let n = start.dim();
    let mut current = start.clone();
    if targets.is_empty() || n < 2 {
        return current;
    }
    for _ in 0..perturbations {
        let to = targets[rng.gen_range(0..targets.len())];
        let from = rng.gen_range(0..n);
        if from == to {
            continue;
        }
        let candidate = current.toggled(from, to);
        if constraint.is_legal(&candidate, network.indexer()) {
            current = candidate;
        }
    }
    current
}

impl StructureSearch for RandomRestartHillClimbing {
    fn search(
        &self,
        network: &mut Network,
        dataset: &Dataset,
        score: &dyn StructureScore,
        constraint: &dyn StructureConstraint,
    ) -> SearchOutcome {
        let climber = Climber::new(dataset, score, constraint, None);
        run_search(self.name(), network, dataset, score, constraint, |net, start| {
            let first = climber.climb(net, start.clone());
            let restarts: Vec<SearchOutcome> = (0..self.restarts)
                .into_par_iter()
                .map(|restart| {
                    let mut rng = restart_rng(self.seed, restart as u64);
                    let perturbed = perturb(net, &start, constraint, self.perturbations, &mut rng);
                    climber.climb(net, perturbed)
                })
                .collect();

            let mut best = first;
            let mut totals = best.clone();
            for (restart, outcome) in restarts.into_iter().enumerate() {
                totals.absorb_counters(&outcome);
                debug!(restart, score = outcome.score, "restart finished");
                // ties keep the earlier result
                if outcome.score > best.score {
                    best = outcome;
                }
            }
            SearchOutcome {
                iterations: totals.iterations,
                evaluations: totals.evaluations,
                cache_hits: totals.cache_hits,
                ..best
            }
        })
    }

    fn name(&self) -> &'static str {
        "random-restart-hill-climbing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MaxKConstraint;
    use ctbnc_core::{NetworkKind, Node, Variable};
    use rand::RngCore;

    #[test]
    fn test_restart_rng_is_reproducible() {
        let a: Vec<u64> = (0..4).map(|_| restart_rng(7, 3).next_u64()).collect();
        assert!(a.windows(2).all(|w| w[0] == w[1]));
        assert_ne!(restart_rng(7, 3).next_u64(), restart_rng(7, 4).next_u64());
    }

    #[test]
    fn test_perturbation_stays_legal() {
        let net = Network::new(
            NetworkKind::ContinuousTime,
            vec![
                Node::cpt(Variable::new("C", ["a", "b"]), true),
                Node::cim(Variable::new("X", ["0", "1"])),
                Node::cim(Variable::new("Y", ["0", "1"])),
                Node::cim(Variable::new("Z", ["0", "1"])),
            ],
        );
        let constraint = MaxKConstraint::new(1);
        for seed in 0..20 {
            let mut rng = restart_rng(seed, 0);
            let m = perturb(&net, net.structure(), &constraint, 10, &mut rng);
            assert!(constraint.is_legal(&m, net.indexer()));
            assert!(m.parents(0).is_empty());
        }
    }
}
