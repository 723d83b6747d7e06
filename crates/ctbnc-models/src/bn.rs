use crate::ClassifierError;
use ctbnc_core::node::configuration_index;
use ctbnc_core::{Dataset, Network, NetworkKind, Node, ParameterEstimator, Variable};
use ctbnc_learning::{SearchOutcome, StructureConstraint, StructureScore, StructureSearch};

/// Static Bayesian network over the class variables.
#[derive(Clone, Debug)]
pub struct BayesianNetwork {
    network: Network,
}

impl BayesianNetwork {
    pub fn new(class_variables: Vec<Variable>) -> Result<Self, ClassifierError> {
        let nodes = class_variables
            .into_iter()
            .map(|variable| Node::from_type_name("cpt", variable, true))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { network: Network::new(NetworkKind::Bayesian, nodes) })
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn learn_structure(
        &mut self,
        dataset: &Dataset,
        search: &dyn StructureSearch,
        score: &dyn StructureScore,
        constraint: &dyn StructureConstraint,
    ) -> SearchOutcome {
        search.search(&mut self.network, dataset, score, constraint)
    }

    pub fn learn_parameters(&mut self, dataset: &Dataset, estimator: &ParameterEstimator) {
        estimator.learn(&mut self.network, dataset);
    }

    pub fn is_learned(&self) -> bool {
        self.network.nodes().iter().all(|node| node.as_cpt().is_some())
    }

    /// `ln P(c)` of a full class assignment, given as one state index per
    /// node in node order. `-inf` for zero-probability assignments.
    pub fn log_probability(&self, states: &[usize]) -> Result<f64, ClassifierError> {
        let mut log_p = 0.0;
        for (index, node) in self.network.nodes().iter().enumerate() {
            let cpt = node.as_cpt().ok_or(ClassifierError::NotLearned)?;
            let parents = self.network.parents(index);
            let parent_states: Vec<usize> = parents.iter().map(|&p| states[p]).collect();
            let config = configuration_index(&self.network.parent_cardinalities(index), &parent_states);
            let p = cpt.probability(config, states[index]);
            if p <= 0.0 {
                return Ok(f64::NEG_INFINITY);
            }
            log_p += p.ln();
        }
        Ok(log_p)
    }
}
