use crate::stats::{CimStatistics, CptStatistics, SufficientStatistics};
use crate::{Cim, Cpt, Dataset, Network, Parameters};
use nalgebra::DMatrix;
use serde::{Serialize, Deserialize};
use tracing::debug;

/// How node parameters are fitted from sufficient statistics.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParameterEstimator {
    /// Relative frequencies; zero denominators give zero parameters.
    MaximumLikelihood,
    /// Dirichlet/Gamma smoothed estimates.
    Bayesian {
        /// Pseudo-count added to every CPT cell.
        alpha: f64,
        /// Pseudo-count added to every CIM transition `x -> x'`.
        m_xy: f64,
        /// Pseudo-time added to every CIM sojourn time.
        t_x: f64,
    },
}

impl Default for ParameterEstimator {
    fn default() -> Self {
        ParameterEstimator::MaximumLikelihood
    }
}

/// Divide, defining `x / 0` as zero.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

impl ParameterEstimator {
    pub fn bayesian(alpha: f64, m_xy: f64, t_x: f64) -> Self {
        ParameterEstimator::Bayesian { alpha, m_xy, t_x }
    }

    pub fn estimate(&self, stats: &SufficientStatistics) -> Parameters {
        match stats {
            SufficientStatistics::Cpt(s) => Parameters::Cpt(self.estimate_cpt(s)),
            SufficientStatistics::Cim(s) => Parameters::Cim(self.estimate_cim(s)),
        }
    }

    /// `θ_jk = (N_jk + α) / (N_j + rα)`, with `α = 0` for maximum likelihood.
    pub fn estimate_cpt(&self, stats: &CptStatistics) -> Cpt {
        let alpha = match self {
            ParameterEstimator::MaximumLikelihood => 0.0,
            ParameterEstimator::Bayesian { alpha, .. } => *alpha,
        };
        let (configs, r) = stats.counts.shape();
        let mut probabilities = DMatrix::zeros(configs, r);
        for j in 0..configs {
            let denominator = stats.configuration_count(j) + alpha * r as f64;
            for k in 0..r {
                probabilities[(j, k)] = ratio(stats.counts[(j, k)] + alpha, denominator);
            }
        }
        Cpt::new(probabilities)
    }

    /// `q = (M_x + m_xy(r-1)) / (T_x + t_x)` and
    /// `θ_xx' = (M_xx' + m_xy) / (M_x + m_xy(r-1))`.
    pub fn estimate_cim(&self, stats: &CimStatistics) -> Cim {
        let (m_xy, t_x) = match self {
            ParameterEstimator::MaximumLikelihood => (0.0, 0.0),
            ParameterEstimator::Bayesian { m_xy, t_x, .. } => (*m_xy, *t_x),
        };
        let configs = stats.num_configurations();
        let r = stats.cardinality();
        let m_x = m_xy * r.saturating_sub(1) as f64;

        let mut rates = DMatrix::zeros(configs, r);
        let mut transitions = vec![DMatrix::zeros(r, r); configs];
        for u in 0..configs {
            for x in 0..r {
                let departures = stats.departures[(u, x)] + m_x;
                rates[(u, x)] = ratio(departures, stats.sojourn[(u, x)] + t_x);
                for x_next in (0..r).filter(|&x_next| x_next != x) {
                    transitions[u][(x, x_next)] =
                        ratio(stats.transitions[u][(x, x_next)] + m_xy, departures);
                }
            }
        }
        Cim::new(rates, transitions)
    }

    /// Fit the parameters of one node from the dataset.
    pub fn learn_node(&self, network: &mut Network, dataset: &Dataset, node: usize) {
        let stats = network.sufficient_statistics(node, dataset);
        let parameters = self.estimate(&stats);
        network.node_mut(node).set_parameters(parameters);
    }

    /// Fit the parameters of every learnable node.
    pub fn learn(&self, network: &mut Network, dataset: &Dataset) {
        for node in network.learnable_nodes() {
            self.learn_node(network, dataset, node);
        }
        debug!(nodes = network.learnable_nodes().len(), estimator = ?self, "parameters learned");
    }
}
