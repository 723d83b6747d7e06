use crate::{NodeTypeError, Variable};
use nalgebra::DMatrix;
use serde::{Serialize, Deserialize};
use std::str::FromStr;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    /// Discrete node parameterized by a conditional probability table.
    Cpt,
    /// Continuous-time node parameterized by a conditional intensity matrix.
    Cim,
}

impl FromStr for NodeKind {
    type Err = NodeTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cpt" => Ok(NodeKind::Cpt),
            "cim" => Ok(NodeKind::Cim),
            other => Err(NodeTypeError(other.to_string())),
        }
    }
}

/// Conditional probability table, one row per parent configuration.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Cpt {
    pub probabilities: DMatrix<f64>,
}

impl Cpt {
    pub fn new(probabilities: DMatrix<f64>) -> Self {
        Self { probabilities }
    }

    pub fn probability(&self, config: usize, state: usize) -> f64 {
        self.probabilities[(config, state)]
    }

    pub fn distribution(&self, config: usize) -> Vec<f64> {
        self.probabilities.row(config).iter().copied().collect()
    }

    pub fn num_configurations(&self) -> usize {
        self.probabilities.nrows()
    }

    pub fn cardinality(&self) -> usize {
        self.probabilities.ncols()
    }
}

/// Conditional intensity matrix stored as exit rates `q` and destination
/// distributions `θ` per parent configuration.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Cim {
    /// `[config × state]` exit rates.
    pub rates: DMatrix<f64>,
    /// Per configuration, `[from × to]` transition probabilities (zero diagonal).
    pub transitions: Vec<DMatrix<f64>>,
}

impl Cim {
    pub fn new(rates: DMatrix<f64>, transitions: Vec<DMatrix<f64>>) -> Self {
        Self { rates, transitions }
    }

    pub fn exit_rate(&self, config: usize, state: usize) -> f64 {
        self.rates[(config, state)]
    }

    pub fn transition_probability(&self, config: usize, from: usize, to: usize) -> f64 {
        self.transitions[config][(from, to)]
    }

    /// The intensity matrix for one configuration: `-q` on the diagonal and
    /// `q·θ` elsewhere, so rows sum to zero.
    pub fn intensity_matrix(&self, config: usize) -> DMatrix<f64> {
        let n = self.cardinality();
        DMatrix::from_fn(n, n, |i, j| {
            let q = self.rates[(config, i)];
            if i == j {
                -q
            } else {
                q * self.transitions[config][(i, j)]
            }
        })
    }

    pub fn num_configurations(&self) -> usize {
        self.rates.nrows()
    }

    pub fn cardinality(&self) -> usize {
        self.rates.ncols()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Parameters {
    Cpt(Cpt),
    Cim(Cim),
}

/// One variable inside a network. Parents and children live in the owning
/// network's adjacency matrix, not in the node.
#[derive(Clone, Debug)]
pub struct Node {
    variable: Variable,
    is_class: bool,
    kind: NodeKind,
    parameters: Option<Parameters>,
}

impl Node {
    pub fn new(variable: Variable, is_class: bool, kind: NodeKind) -> Self {
        Self { variable, is_class, kind, parameters: None }
    }

    /// Factory by type name ("cpt" or "cim").
    pub fn from_type_name(type_name: &str, variable: Variable, is_class: bool) -> Result<Self, NodeTypeError> {
        Ok(Self::new(variable, is_class, type_name.parse()?))
    }

    pub fn cpt(variable: Variable, is_class: bool) -> Self {
        Self::new(variable, is_class, NodeKind::Cpt)
    }

    pub fn cim(variable: Variable) -> Self {
        Self::new(variable, false, NodeKind::Cim)
    }

    pub fn name(&self) -> &str {
        self.variable.name()
    }

    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    pub fn states(&self) -> &[String] {
        self.variable.states()
    }

    pub fn cardinality(&self) -> usize {
        self.variable.cardinality()
    }

    pub fn is_class_variable(&self) -> bool {
        self.is_class
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn parameters(&self) -> Option<&Parameters> {
        self.parameters.as_ref()
    }

    pub fn set_parameters(&mut self, parameters: Parameters) {
        self.parameters = Some(parameters);
    }

    pub fn clear_parameters(&mut self) {
        self.parameters = None;
    }

    pub fn as_cpt(&self) -> Option<&Cpt> {
        match &self.parameters {
            Some(Parameters::Cpt(cpt)) => Some(cpt),
            _ => None,
        }
    }

    pub fn as_cim(&self) -> Option<&Cim> {
        match &self.parameters {
            Some(Parameters::Cim(cim)) => Some(cim),
            _ => None,
        }
    }
}

/// Mixed-radix index of a parent configuration. The first parent is the least
/// significant digit.
pub fn configuration_index(cardinalities: &[usize], states: &[usize]) -> usize {
    let mut index = 0;
    let mut stride = 1;
    for (&card, &state) in cardinalities.iter().zip(states) {
        index += state * stride;
        stride *= card;
    }
    index
}

/// Inverse of [`configuration_index`].
pub fn configuration_states(cardinalities: &[usize], mut index: usize) -> Vec<usize> {
    cardinalities
        .iter()
        .map(|&card| {
            let state = index % card.max(1);
            index /= card.max(1);
            state
        })
        .collect()
}

/// Number of configurations of a parent set (1 for no parents).
pub fn num_configurations(cardinalities: &[usize]) -> usize {
    cardinalities.iter().product()
}
