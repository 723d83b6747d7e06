use super::hill_climbing::Climber;
use super::{run_search, SearchOutcome, StructureSearch};
use crate::{StructureConstraint, StructureScore};
use ctbnc_core::{AdjacencyMatrix, Dataset, Network, NodeIndexer};
use tracing::debug;

/// Hill climbing inside a skeleton found by some other method.
///
/// Arcs may only be added when the skeleton contains them, and reversed only
/// when the skeleton contains the reversed arc. Removal is always allowed.
#[derive(Clone, Debug, PartialEq)]
pub struct HybridHillClimbing {
    skeleton: AdjacencyMatrix,
}

impl HybridHillClimbing {
    pub fn new(skeleton: AdjacencyMatrix) -> Self {
        Self { skeleton }
    }

    /// Build the skeleton from `(parent, child)` names. Names the indexer
    /// does not know are skipped.
    pub fn from_named_arcs(indexer: &NodeIndexer, arcs: &[(String, String)]) -> Self {
        let mut indexed = Vec::with_capacity(arcs.len());
        for (from, to) in arcs {
            match (indexer.index_of(from), indexer.index_of(to)) {
                (Some(i), Some(j)) => indexed.push((i, j)),
                _ => debug!(from = from.as_str(), to = to.as_str(), "skeleton arc outside this network, skipped"),
            }
        }
        Self::new(AdjacencyMatrix::from_arcs(indexer.len(), &indexed))
    }

    pub fn skeleton(&self) -> &AdjacencyMatrix {
        &self.skeleton
    }
}

impl StructureSearch for HybridHillClimbing {
    fn search(
        &self,
        network: &mut Network,
        dataset: &Dataset,
        score: &dyn StructureScore,
        constraint: &dyn StructureConstraint,
    ) -> SearchOutcome {
        let climber = Climber::new(dataset, score, constraint, Some(&self.skeleton));
        run_search(self.name(), network, dataset, score, constraint, |net, start| climber.climb(net, start))
    }

    fn name(&self) -> &'static str {
        "hybrid-hill-climbing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skeleton_from_names() {
        let mut ix = NodeIndexer::new();
        ix.insert("C", true);
        ix.insert("X", false);
        ix.insert("Y", false);
        let hybrid = HybridHillClimbing::from_named_arcs(
            &ix,
            &[("C".into(), "X".into()), ("X".into(), "Y".into()), ("Q".into(), "Y".into())],
        );
        assert_eq!(hybrid.skeleton().arcs(), vec![(0, 1), (1, 2)]);
    }
}
