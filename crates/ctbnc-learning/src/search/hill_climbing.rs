use super::cache::{ParentMask, ScoreCache};
use super::{run_search, SearchOutcome, StructureSearch};
use crate::{StructureConstraint, StructureScore};
use ctbnc_core::{AdjacencyMatrix, Dataset, Network, NetworkKind};
use rayon::prelude::*;
use tracing::debug;

/// Greedy single-arc hill climbing.
#[derive(Copy, Clone, Debug, Default)]
pub struct HillClimbing;

impl StructureSearch for HillClimbing {
    fn search(
        &self,
        network: &mut Network,
        dataset: &Dataset,
        score: &dyn StructureScore,
        constraint: &dyn StructureConstraint,
    ) -> SearchOutcome {
        let climber = Climber::new(dataset, score, constraint, None);
        run_search(self.name(), network, dataset, score, constraint, |net, start| climber.climb(net, start))
    }

    fn name(&self) -> &'static str {
        "hill-climbing"
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Move {
    Add(usize, usize),
    Remove(usize, usize),
    Reverse(usize, usize),
}

impl Move {
    fn apply(&self, structure: &AdjacencyMatrix) -> AdjacencyMatrix {
        match *self {
            Move::Add(from, to) | Move::Remove(from, to) => structure.toggled(from, to),
            Move::Reverse(from, to) => structure.reversed(from, to),
        }
    }

    /// Nodes whose parent set the move changes.
    fn touched(&self) -> Vec<usize> {
        match *self {
            Move::Add(_, to) | Move::Remove(_, to) => vec![to],
            Move::Reverse(from, to) => vec![to, from],
        }
    }
}

/// The climbing engine shared by every search strategy.
pub(crate) struct Climber<'a> {
    dataset: &'a Dataset,
    score: &'a dyn StructureScore,
    constraint: &'a dyn StructureConstraint,
    skeleton: Option<&'a AdjacencyMatrix>,
}

impl<'a> Climber<'a> {
    pub(crate) fn new(
        dataset: &'a Dataset,
        score: &'a dyn StructureScore,
        constraint: &'a dyn StructureConstraint,
        skeleton: Option<&'a AdjacencyMatrix>,
    ) -> Self {
        Self { dataset, score, constraint, skeleton }
    }

    /// Climb from `start` until no legal neighbor improves the score.
    pub(crate) fn climb(&self, network: &Network, start: AdjacencyMatrix) -> SearchOutcome {
        if network.kind() == NetworkKind::ContinuousTime
            && self.score.is_decomposable()
            && self.constraint.is_node_local()
        {
            self.climb_per_node(network, start)
        } else {
            self.climb_nodes(network, start, &network.learnable_nodes())
        }
    }

    /// Optimize each parent set on its own worker. Workers read the shared
    /// snapshot and return their column; columns are assembled afterwards.
    fn climb_per_node(&self, network: &Network, start: AdjacencyMatrix) -> SearchOutcome {
        let columns: Vec<(usize, Vec<bool>, SearchOutcome)> = network
            .learnable_nodes()
            .par_iter()
            .map(|&node| {
                let outcome = self.climb_nodes(network, start.clone(), &[node]);
                (node, outcome.structure.column(node), outcome)
            })
            .collect();

        let mut structure = start;
        for (node, column, _) in &columns {
            structure.set_column(*node, column);
        }

        let mut assembled = network.clone();
        assembled.set_structure(structure.clone());
        let mut outcome = SearchOutcome {
            score: self.score.compute(&assembled, self.dataset),
            structure,
            iterations: 0,
            evaluations: 0,
            cache_hits: 0,
        };
        for (_, _, worker) in &columns {
            outcome.absorb_counters(worker);
        }
        outcome
    }

    /// Hill climbing over arcs that end at `targets`.
    fn climb_nodes(&self, network: &Network, start: AdjacencyMatrix, targets: &[usize]) -> SearchOutcome {
        let learnable = network.learnable_nodes();
        let decomposable = self.score.is_decomposable();
        let mut work = network.clone();
        let mut cache = ScoreCache::new();
        let mut evaluations = 1;

        let mut current = start;
        let mut local = vec![0.0; network.len()];
        let mut current_score = if decomposable {
            for &node in &learnable {
                local[node] = self.local_score(&mut work, &mut cache, &current, node);
            }
            learnable.iter().map(|&node| local[node]).sum()
        } else {
            work.set_structure(current.clone());
            self.score.compute(&work, self.dataset)
        };
        let mut iterations = 0;

        loop {
            let mut best: Option<(AdjacencyMatrix, Vec<(usize, f64)>)> = None;
            let mut best_score = current_score;

            for mv in self.moves(network.kind(), &current, targets) {
                let candidate = mv.apply(&current);
                if !self.constraint.is_legal(&candidate, network.indexer()) {
                    continue;
                }
                evaluations += 1;

                let (candidate_score, updates) = if decomposable {
                    let updates: Vec<(usize, f64)> = mv
                        .touched()
                        .into_iter()
                        .filter(|node| learnable.contains(node))
                        .map(|node| (node, self.local_score(&mut work, &mut cache, &candidate, node)))
                        .collect();
                    let total = learnable
                        .iter()
                        .map(|&node| {
                            updates
                                .iter()
                                .find(|(n, _)| *n == node)
                                .map_or(local[node], |&(_, s)| s)
                        })
                        .sum();
                    (total, updates)
                } else {
                    work.set_structure(candidate.clone());
                    (self.score.compute(&work, self.dataset), Vec::new())
                };

                // strict improvement: the first of equal candidates wins
                if candidate_score > best_score {
                    best_score = candidate_score;
                    best = Some((candidate, updates));
                }
            }

            let Some((next, updates)) = best else {
                break;
            };
            current = next;
            current_score = best_score;
            for (node, score) in updates {
                local[node] = score;
            }
            iterations += 1;
            debug!(iteration = iterations, score = current_score, arcs = current.arc_count(), "accepted move");
        }

        SearchOutcome {
            structure: current,
            score: current_score,
            iterations,
            evaluations,
            cache_hits: cache.hits(),
        }
    }

    fn local_score(
        &self,
        work: &mut Network,
        cache: &mut ScoreCache,
        structure: &AdjacencyMatrix,
        node: usize,
    ) -> f64 {
        let mask = ParentMask::from_column(&structure.column(node));
        cache.get_or_insert_with(node, mask, || {
            work.set_structure(structure.clone());
            self.score.compute_node(work, self.dataset, node)
        })
    }

    fn allowed_by_skeleton(&self, from: usize, to: usize) -> bool {
        self.skeleton.map_or(true, |skeleton| skeleton.has_arc(from, to))
    }

    /// Single-arc neighbors of `current` restricted to arcs into `targets`,
    /// in a fixed order.
    fn moves(&self, kind: NetworkKind, current: &AdjacencyMatrix, targets: &[usize]) -> Vec<Move> {
        let mut moves = Vec::new();
        for &to in targets {
            for from in (0..current.dim()).filter(|&from| from != to) {
                if current.has_arc(from, to) {
                    moves.push(Move::Remove(from, to));
                    if kind.allows_reversal()
                        && !current.has_arc(to, from)
                        && self.allowed_by_skeleton(to, from)
                    {
                        moves.push(Move::Reverse(from, to));
                    }
                } else if self.allowed_by_skeleton(from, to) {
                    moves.push(Move::Add(from, to));
                }
            }
        }
        moves
    }
}
