use super::log_likelihood::cim_trajectory_log_likelihood;
use super::StructureScore;
use crate::Penalization;
use ctbnc_core::node::{configuration_index, configuration_states, num_configurations};
use ctbnc_core::special::log_sum_exp;
use ctbnc_core::stats::cim_statistics;
use ctbnc_core::{Dataset, Network, NodeKind, ParameterEstimator, Parameters};
use std::collections::BTreeMap;

/// Discriminative CTBN score.
///
/// For a feature node `n` and each labeled sequence `s` with class
/// configuration `c_s` (restricted to the class parents of `n`):
///
/// `ll_n(s | c_s) − ln Σ_c P(c) exp(ll_n(s | c))`
///
/// where `ll_n(s | c)` is the log-likelihood of the node's transitions in `s`
/// with its class parents fixed to `c`, and `P(c)` is the empirical
/// distribution of class configurations. Nodes without class parents do not
/// discriminate and contribute zero before penalization.
#[derive(Copy, Clone, Debug, Default)]
pub struct ConditionalLogLikelihood {
    pub penalization: Penalization,
    pub estimator: ParameterEstimator,
}

impl ConditionalLogLikelihood {
    pub fn new(penalization: Penalization, estimator: ParameterEstimator) -> Self {
        Self { penalization, estimator }
    }

    fn conditional_term(&self, network: &Network, dataset: &Dataset, node: usize) -> f64 {
        if network.node(node).kind() != NodeKind::Cim {
            return 0.0;
        }
        let class_parents: Vec<usize> = network
            .parents(node)
            .into_iter()
            .filter(|&p| network.node(p).is_class_variable())
            .collect();
        if class_parents.is_empty() {
            return 0.0;
        }

        let stats = network.sufficient_statistics(node, dataset);
        let Parameters::Cim(cim) = self.estimator.estimate(&stats) else {
            return 0.0;
        };

        let cardinalities: Vec<usize> = class_parents.iter().map(|&p| network.node(p).cardinality()).collect();
        let configurations: Vec<BTreeMap<String, String>> = (0..num_configurations(&cardinalities))
            .map(|index| {
                class_parents
                    .iter()
                    .zip(configuration_states(&cardinalities, index))
                    .filter_map(|(&p, state)| {
                        let variable = network.node(p).variable();
                        variable.state(state).map(|s| (variable.name().to_string(), s.to_string()))
                    })
                    .collect()
            })
            .collect();

        // Class configuration of each labeled sequence, and the empirical prior.
        let labels: Vec<Option<usize>> = dataset
            .sequences()
            .iter()
            .map(|sequence| {
                let states = class_parents
                    .iter()
                    .map(|&p| {
                        let variable = network.node(p).variable();
                        sequence.class_value(variable.name()).and_then(|v| variable.state_index(v))
                    })
                    .collect::<Option<Vec<usize>>>()?;
                Some(configuration_index(&cardinalities, &states))
            })
            .collect();
        let mut counts = vec![0.0; configurations.len()];
        for label in labels.iter().flatten() {
            counts[*label] += 1.0;
        }
        let total: f64 = counts.iter().sum();
        if total == 0.0 {
            return 0.0;
        }
        let log_prior: Vec<f64> = counts
            .iter()
            .map(|&c| if c > 0.0 { (c / total).ln() } else { f64::NEG_INFINITY })
            .collect();

        let mut score = 0.0;
        for (sequence, label) in dataset.sequences().iter().zip(&labels) {
            let Some(label) = *label else {
                continue;
            };
            let joint: Vec<f64> = configurations
                .iter()
                .zip(&log_prior)
                .map(|(classes, &prior)| {
                    if prior == f64::NEG_INFINITY {
                        return f64::NEG_INFINITY;
                    }
                    let local = cim_statistics(network, node, std::iter::once(sequence), Some(classes));
                    prior + cim_trajectory_log_likelihood(&local, &cim)
                })
                .collect();
            // finite: the fitted parameters cover every move of `sequence` under its own label
            let own = joint[label] - log_prior[label];
            score += own - log_sum_exp(&joint);
        }
        score
    }
}

impl StructureScore for ConditionalLogLikelihood {
    fn compute_node(&self, network: &Network, dataset: &Dataset, node: usize) -> f64 {
        self.conditional_term(network, dataset, node) - self.penalization.node_penalty(network, dataset, node)
    }

    fn penalization(&self) -> Penalization {
        self.penalization
    }

    fn name(&self) -> &'static str {
        "conditional-log-likelihood"
    }
}
