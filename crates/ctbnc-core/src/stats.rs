use crate::node::{configuration_index, NodeKind};
use crate::{Dataset, Network, Sequence, Variable};
use nalgebra::DMatrix;
use std::collections::BTreeMap;

/// Counts of `(parent configuration, own state)` co-occurrences.
#[derive(Clone, Debug, PartialEq)]
pub struct CptStatistics {
    /// `[config × state]`
    pub counts: DMatrix<f64>,
}

impl CptStatistics {
    pub fn configuration_count(&self, config: usize) -> f64 {
        self.counts.row(config).sum()
    }

    pub fn total(&self) -> f64 {
        self.counts.sum()
    }
}

/// Transition counts and sojourn times of a continuous-time node.
#[derive(Clone, Debug, PartialEq)]
pub struct CimStatistics {
    /// `[config × state]` number of departures from each state (M_x).
    pub departures: DMatrix<f64>,
    /// Per configuration, `[from × to]` transition counts (M_xx').
    pub transitions: Vec<DMatrix<f64>>,
    /// `[config × state]` time spent in each state (T_x).
    pub sojourn: DMatrix<f64>,
}

impl CimStatistics {
    pub fn zeros(configurations: usize, cardinality: usize) -> Self {
        Self {
            departures: DMatrix::zeros(configurations, cardinality),
            transitions: vec![DMatrix::zeros(cardinality, cardinality); configurations],
            sojourn: DMatrix::zeros(configurations, cardinality),
        }
    }

    pub fn num_configurations(&self) -> usize {
        self.departures.nrows()
    }

    pub fn cardinality(&self) -> usize {
        self.departures.ncols()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SufficientStatistics {
    Cpt(CptStatistics),
    Cim(CimStatistics),
}

impl SufficientStatistics {
    pub fn num_configurations(&self) -> usize {
        match self {
            SufficientStatistics::Cpt(s) => s.counts.nrows(),
            SufficientStatistics::Cim(s) => s.num_configurations(),
        }
    }

    pub fn cardinality(&self) -> usize {
        match self {
            SufficientStatistics::Cpt(s) => s.counts.ncols(),
            SufficientStatistics::Cim(s) => s.cardinality(),
        }
    }
}

/// Resolves the parent configuration of a node at a point of a sequence.
struct ParentLookup<'a> {
    parents: Vec<(&'a Variable, bool)>,
    cardinalities: Vec<usize>,
}

impl<'a> ParentLookup<'a> {
    fn new(network: &'a Network, node: usize) -> Self {
        let parents: Vec<(&Variable, bool)> = network
            .parents(node)
            .into_iter()
            .map(|p| {
                let n = network.node(p);
                (n.variable(), n.is_class_variable())
            })
            .collect();
        let cardinalities = parents.iter().map(|(v, _)| v.cardinality()).collect();
        Self { parents, cardinalities }
    }

    fn num_configurations(&self) -> usize {
        self.cardinalities.iter().product()
    }

    /// `None` when a parent value is missing or outside the state universe.
    fn configuration(
        &self,
        sequence: &Sequence,
        index: usize,
        classes: Option<&BTreeMap<String, String>>,
    ) -> Option<usize> {
        let mut states = Vec::with_capacity(self.parents.len());
        for (variable, is_class) in &self.parents {
            let value = match *is_class {
                true => classes
                    .and_then(|c| c.get(variable.name()).map(|v| v.as_str()))
                    .or_else(|| sequence.class_value(variable.name())),
                false => sequence.observations()[index].value(variable.name()),
            };
            states.push(variable.state_index(value?)?);
        }
        Some(configuration_index(&self.cardinalities, &states))
    }
}

/// Sufficient statistics of `node` under its current parent set.
pub fn compute(network: &Network, node: usize, dataset: &Dataset) -> SufficientStatistics {
    match network.node(node).kind() {
        NodeKind::Cpt => SufficientStatistics::Cpt(cpt_statistics(network, node, dataset.sequences())),
        NodeKind::Cim => SufficientStatistics::Cim(cim_statistics(network, node, dataset.sequences(), None)),
    }
}

/// Counts for a CPT node. Class values are constant over a sequence, so each
/// labeled sequence contributes one record.
pub fn cpt_statistics(network: &Network, node: usize, sequences: &[Sequence]) -> CptStatistics {
    let lookup = ParentLookup::new(network, node);
    let variable = network.node(node).variable();
    let mut counts = DMatrix::zeros(lookup.num_configurations(), variable.cardinality());

    for sequence in sequences {
        let state = sequence
            .value_at(0, variable.name())
            .and_then(|v| variable.state_index(v));
        let config = lookup.configuration(sequence, 0, None);
        if let (Some(state), Some(config)) = (state, config) {
            counts[(config, state)] += 1.0;
        }
    }

    CptStatistics { counts }
}

/// Transition counts and sojourn times for a CIM node over `sequences`.
///
/// With `classes`, class-parent values are taken from that assignment instead
/// of the sequences' own labels; this is how a trajectory is evaluated under a
/// hypothetical class configuration.
pub fn cim_statistics<'s>(
    network: &Network,
    node: usize,
    sequences: impl IntoIterator<Item = &'s Sequence>,
    classes: Option<&BTreeMap<String, String>>,
) -> CimStatistics {
    let lookup = ParentLookup::new(network, node);
    let variable = network.node(node).variable();
    let mut stats = CimStatistics::zeros(lookup.num_configurations(), variable.cardinality());

    for sequence in sequences {
        let observations = sequence.observations();
        for i in 0..sequence.num_intervals() {
            let current = observations[i].value(variable.name()).and_then(|v| variable.state_index(v));
            let next = observations[i + 1].value(variable.name()).and_then(|v| variable.state_index(v));
            let config = lookup.configuration(sequence, i, classes);

            let (Some(x), Some(x_next), Some(u)) = (current, next, config) else {
                continue;
            };

            stats.sojourn[(u, x)] += observations[i + 1].time - observations[i].time;
            if x_next != x {
                stats.departures[(u, x)] += 1.0;
                stats.transitions[u][(x, x_next)] += 1.0;
            }
        }
    }

    stats
}
