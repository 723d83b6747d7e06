use ctbnc_core::{AdjacencyMatrix, NodeIndexer};
use ctbnc_learning::{BridgeConstraint, DagConstraint, MaxKConstraint, StructureConstraint};
use proptest::prelude::*;

fn indexer(classes: usize, features: usize) -> NodeIndexer {
    let mut ix = NodeIndexer::new();
    for c in 0..classes {
        ix.insert(format!("C{c}"), true);
    }
    for f in 0..features {
        ix.insert(format!("X{f}"), false);
    }
    ix
}

fn matrix(n: usize, bits: &[bool]) -> AdjacencyMatrix {
    let mut m = AdjacencyMatrix::empty(n);
    for i in 0..n {
        for j in 0..n {
            if i != j && bits[i * n + j] {
                m.set_arc(i, j, true);
            }
        }
    }
    m
}

fn sized_bits() -> impl Strategy<Value = (usize, Vec<bool>)> {
    (2usize..8).prop_flat_map(|n| (Just(n), prop::collection::vec(any::<bool>(), n * n)))
}

proptest! {
    #[test]
    fn ordered_structures_are_acyclic((n, bits) in sized_bits(), shift in 0usize..8) {
        // arcs only from lower to higher rank, ranks rotated by `shift`
        let rank = |i: usize| (i + shift) % n;
        let mut m = AdjacencyMatrix::empty(n);
        for i in 0..n {
            for j in 0..n {
                if rank(i) < rank(j) && bits[i * n + j] {
                    m.set_arc(i, j, true);
                }
            }
        }
        prop_assert!(DagConstraint.is_legal(&m, &indexer(0, n)));
    }

    #[test]
    fn any_directed_cycle_is_rejected((n, bits) in sized_bits(), len in 2usize..8) {
        let len = len.min(n);
        let mut m = matrix(n, &bits);
        for i in 0..len {
            m.set_arc(i, (i + 1) % len, true);
        }
        prop_assert!(!DagConstraint.is_legal(&m, &indexer(0, n)));
    }

    #[test]
    fn bridge_forbids_feature_to_class(classes in 1usize..4, features in 1usize..4, seed_bits in prop::collection::vec(any::<bool>(), 49)) {
        let n = classes + features;
        let ix = indexer(classes, features);
        let mut m = matrix(n, &seed_bits[..n * n]);
        let has_violation = m.arcs().iter().any(|&(from, to)| from >= classes && to < classes);
        prop_assert_eq!(BridgeConstraint.is_legal(&m, &ix), !has_violation);

        for (from, to) in m.arcs() {
            if from >= classes && to < classes {
                m.set_arc(from, to, false);
            }
        }
        prop_assert!(BridgeConstraint.is_legal(&m, &ix));
        m.set_arc(classes, 0, true);
        prop_assert!(!BridgeConstraint.is_legal(&m, &ix));
    }

    #[test]
    fn max_k_bounds_feature_parents(k in 1usize..4, features in 2usize..6, seed_bits in prop::collection::vec(any::<bool>(), 49)) {
        let classes = 1;
        let n = classes + features;
        let ix = indexer(classes, features);
        let mut m = matrix(n, &seed_bits[..n * n]);
        for feature in classes..n {
            m.set_arc(feature, 0, false);
        }
        let constraint = MaxKConstraint::new(k);
        let within_bound = (0..n).all(|j| m.parents(j).into_iter().filter(|&p| p >= classes).count() <= k);
        prop_assert_eq!(constraint.is_legal(&m, &ix), within_bound);
    }
}

#[test]
fn k_plus_one_feature_parents_are_rejected() {
    let ix = indexer(1, 5);
    for k in 1..4 {
        let arcs: Vec<(usize, usize)> = (2..2 + k + 1).map(|p| (p, 1)).chain([(0, 1)]).collect();
        let m = AdjacencyMatrix::from_arcs(6, &arcs);
        assert!(!MaxKConstraint::new(k).is_legal(&m, &ix));
        assert!(MaxKConstraint::new(k + 1).is_legal(&m, &ix));
    }
}
