use super::StructureScore;
use crate::Penalization;
use ctbnc_core::{
    Cim, CimStatistics, Cpt, CptStatistics, Dataset, Network, ParameterEstimator, Parameters,
    SufficientStatistics,
};

/// `Σ N_jk ln θ_jk`, skipping empty cells and zero probabilities.
pub fn cpt_log_likelihood(stats: &CptStatistics, cpt: &Cpt) -> f64 {
    let mut ll = 0.0;
    for ((j, k), &n) in indexed(&stats.counts) {
        let theta = cpt.probability(j, k);
        if n > 0.0 && theta > 0.0 {
            ll += n * theta.ln();
        }
    }
    ll
}

/// `Σ_{u,x} [M_x ln q − q T_x + Σ_x' M_xx' ln θ_xx']`, skipping states with
/// `q = 0` and destinations with `θ = 0`.
pub fn cim_log_likelihood(stats: &CimStatistics, cim: &Cim) -> f64 {
    let mut ll = 0.0;
    let r = stats.cardinality();
    for u in 0..stats.num_configurations() {
        for x in 0..r {
            let q = cim.exit_rate(u, x);
            if q <= 0.0 {
                continue;
            }
            ll += stats.departures[(u, x)] * q.ln() - q * stats.sojourn[(u, x)];
            for x_next in (0..r).filter(|&y| y != x) {
                let m = stats.transitions[u][(x, x_next)];
                let theta = cim.transition_probability(u, x, x_next);
                if m > 0.0 && theta > 0.0 {
                    ll += m * theta.ln();
                }
            }
        }
    }
    ll
}

/// Log-likelihood of trajectories under parameters that were not fitted to
/// them. Empty cells are skipped, but a departure from a state with `q = 0`
/// or a transition with `θ = 0` makes the trajectories impossible: `-inf`.
pub fn cim_trajectory_log_likelihood(stats: &CimStatistics, cim: &Cim) -> f64 {
    let mut ll = 0.0;
    let r = stats.cardinality();
    for u in 0..stats.num_configurations() {
        for x in 0..r {
            let q = cim.exit_rate(u, x);
            let departures = stats.departures[(u, x)];
            if departures > 0.0 && q <= 0.0 {
                return f64::NEG_INFINITY;
            }
            if q > 0.0 {
                ll -= q * stats.sojourn[(u, x)];
            }
            if departures > 0.0 {
                ll += departures * q.ln();
            }
            for x_next in (0..r).filter(|&y| y != x) {
                let m = stats.transitions[u][(x, x_next)];
                if m <= 0.0 {
                    continue;
                }
                let theta = cim.transition_probability(u, x, x_next);
                if theta <= 0.0 {
                    return f64::NEG_INFINITY;
                }
                ll += m * theta.ln();
            }
        }
    }
    ll
}

fn indexed(m: &nalgebra::DMatrix<f64>) -> impl Iterator<Item = ((usize, usize), &f64)> {
    let nrows = m.nrows();
    // column-major storage
    m.iter().enumerate().map(move |(i, v)| ((i % nrows, i / nrows), v))
}

/// Log-likelihood of the data under parameters fitted to it, minus the
/// penalization term. Works for CPT and CIM nodes alike.
#[derive(Copy, Clone, Debug, Default)]
pub struct LogLikelihood {
    pub penalization: Penalization,
    pub estimator: ParameterEstimator,
}

impl LogLikelihood {
    pub fn new(penalization: Penalization, estimator: ParameterEstimator) -> Self {
        Self { penalization, estimator }
    }

    /// Unpenalized log-likelihood of one node.
    pub fn node_log_likelihood(&self, network: &Network, dataset: &Dataset, node: usize) -> f64 {
        let stats = network.sufficient_statistics(node, dataset);
        match (&stats, self.estimator.estimate(&stats)) {
            (SufficientStatistics::Cpt(s), Parameters::Cpt(cpt)) => cpt_log_likelihood(s, &cpt),
            (SufficientStatistics::Cim(s), Parameters::Cim(cim)) => cim_log_likelihood(s, &cim),
            _ => 0.0,
        }
    }
}

impl StructureScore for LogLikelihood {
    fn compute_node(&self, network: &Network, dataset: &Dataset, node: usize) -> f64 {
        self.node_log_likelihood(network, dataset, node)
            - self.penalization.node_penalty(network, dataset, node)
    }

    fn penalization(&self) -> Penalization {
        self.penalization
    }

    fn name(&self) -> &'static str {
        "log-likelihood"
    }
}
