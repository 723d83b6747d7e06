use crate::ClassifierError;
use ctbnc_core::stats::cim_statistics;
use ctbnc_core::{Dataset, Network, NetworkKind, Node, ParameterEstimator, Sequence, Variable};
use ctbnc_learning::score::log_likelihood::cim_trajectory_log_likelihood;
use ctbnc_learning::{SearchOutcome, StructureConstraint, StructureScore, StructureSearch};
use std::collections::BTreeMap;

/// Continuous-time Bayesian network over the features. Class variables are
/// present as CPT nodes that only supply parent states.
#[derive(Clone, Debug)]
pub struct ContinuousTimeBayesianNetwork {
    network: Network,
}

impl ContinuousTimeBayesianNetwork {
    /// Nodes are laid out class variables first, then features.
    pub fn new(class_variables: Vec<Variable>, feature_variables: Vec<Variable>) -> Result<Self, ClassifierError> {
        let mut nodes = Vec::with_capacity(class_variables.len() + feature_variables.len());
        for variable in class_variables {
            nodes.push(Node::from_type_name("cpt", variable, true)?);
        }
        for variable in feature_variables {
            nodes.push(Node::from_type_name("cim", variable, false)?);
        }
        Ok(Self { network: Network::new(NetworkKind::ContinuousTime, nodes) })
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
        self.network
            .learnable_nodes()
            .into_iter()
            .all(|node| self.network.node(node).as_cim().is_some())
    }

    /// Log-likelihood of the feature trajectories of `sequence` with the
    /// class variables fixed to `classes`. `-inf` when a feature moves where
    /// the learned CIM allows no move.
    pub fn sequence_log_likelihood(
        &self,
        sequence: &Sequence,
        classes: &BTreeMap<String, String>,
    ) -> Result<f64, ClassifierError> {
        let mut ll = 0.0;
        for node in self.network.learnable_nodes() {
            let cim = self.network.node(node).as_cim().ok_or(ClassifierError::NotLearned)?;
            let stats = cim_statistics(&self.network, node, std::iter::once(sequence), Some(classes));
            ll += cim_trajectory_log_likelihood(&stats, cim);
            if ll == f64::NEG_INFINITY {
                break;
            }
        }
        Ok(ll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctbnc_core::Observation;
    use ctbnc_learning::{BridgeConstraint, HillClimbing, LogLikelihood, Penalization};

    fn sequence(class: &str, period: usize) -> Sequence {
        let obs = (0..12)
            .map(|t| {
                let x = if (t / period) % 2 == 0 { "0" } else { "1" };
                Observation::from_pairs(t as f64, [("C", class), ("X", x)])
            })
            .collect();
        Sequence::new(vec!["C".into()], vec!["X".into()], obs).unwrap()
    }

    #[test]
    fn test_likelihood_prefers_generating_class() {
        let ds = Dataset::new(vec![sequence("fast", 1), sequence("slow", 4), sequence("fast", 1), sequence("slow", 3)])
            .unwrap();
        let mut ctbn = ContinuousTimeBayesianNetwork::new(
            ds.class_variable_set().unwrap(),
            ds.feature_variable_set().unwrap(),
        )
        .unwrap();
        let score = LogLikelihood::new(Penalization::Bic, ParameterEstimator::MaximumLikelihood);
        ctbn.learn_structure(&ds, &HillClimbing, &score, &BridgeConstraint);
        ctbn.learn_parameters(&ds, &ParameterEstimator::bayesian(1.0, 1.0, 0.1));
        assert!(ctbn.is_learned());
        assert!(ctbn.network().structure().has_arc(0, 1));

        let test = sequence("fast", 1);
        let as_class = |c: &str| -> BTreeMap<String, String> { [("C".to_string(), c.to_string())].into() };
        let fast = ctbn.sequence_log_likelihood(&test, &as_class("fast")).unwrap();
        let slow = ctbn.sequence_log_likelihood(&test, &as_class("slow")).unwrap();
        assert!(fast > slow);
    }
}
