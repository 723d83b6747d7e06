use super::StructureScore;
use crate::Penalization;
use ctbnc_core::special::ln_gamma;
use ctbnc_core::{CimStatistics, CptStatistics, Dataset, Network, SufficientStatistics};
use serde::{Serialize, Deserialize};
use tracing::warn;

/// Imaginary counts of the Bayesian-Dirichlet score.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BdeHyperparameters {
    /// Dirichlet concentration per CPT cell.
    pub alpha: f64,
    /// Imaginary transitions per `x -> x'`.
    pub m_xy: f64,
    /// Imaginary time spent per state.
    pub t_x: f64,
}

impl Default for BdeHyperparameters {
    fn default() -> Self {
        Self { alpha: 1.0, m_xy: 1.0, t_x: 0.005 }
    }
}

impl BdeHyperparameters {
    /// Replace non-positive values with the defaults.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let check = |name: &str, value: f64, fallback: f64| {
            if value > 0.0 && value.is_finite() {
                value
            } else {
                warn!(name, value, fallback, "BDe hyperparameter must be positive, using default");
                fallback
            }
        };
        Self {
            alpha: check("alpha", self.alpha, defaults.alpha),
            m_xy: check("m_xy", self.m_xy, defaults.m_xy),
            t_x: check("t_x", self.t_x, defaults.t_x),
        }
    }
}

/// Marginal likelihood of the data with Dirichlet (CPT) and Gamma/Dirichlet
/// (CIM) priors. Not penalized.
#[derive(Copy, Clone, Debug, Default)]
pub struct BayesianDirichlet {
    hyperparameters: BdeHyperparameters,
}

impl BayesianDirichlet {
    pub fn new(hyperparameters: BdeHyperparameters) -> Self {
        Self { hyperparameters: hyperparameters.sanitized() }
    }

    pub fn hyperparameters(&self) -> BdeHyperparameters {
        self.hyperparameters
    }

    pub fn cpt_score(&self, stats: &CptStatistics) -> f64 {
        let alpha = self.hyperparameters.alpha;
        let r = stats.counts.ncols() as f64;
        let mut score = 0.0;
        for j in 0..stats.counts.nrows() {
            let n_j = stats.configuration_count(j);
            score += ln_gamma(r * alpha) - ln_gamma(r * alpha + n_j);
            for &n_jk in stats.counts.row(j).iter() {
                score += ln_gamma(alpha + n_jk) - ln_gamma(alpha);
            }
        }
        score
    }

    pub fn cim_score(&self, stats: &CimStatistics) -> f64 {
        let r = stats.cardinality();
        if r < 2 {
            // a single-state variable never transitions
            return 0.0;
        }
        let m_xy = self.hyperparameters.m_xy;
        let tau = self.hyperparameters.t_x;
        let alpha_x = m_xy * (r - 1) as f64;

        let mut score = 0.0;
        for u in 0..stats.num_configurations() {
            for x in 0..r {
                let m_x = stats.departures[(u, x)];
                let t_x = stats.sojourn[(u, x)];
                score += ln_gamma(alpha_x + m_x + 1.0) + (alpha_x + 1.0) * tau.ln()
                    - ln_gamma(alpha_x + 1.0)
                    - (alpha_x + m_x + 1.0) * (tau + t_x).ln();
                score += ln_gamma(alpha_x) - ln_gamma(alpha_x + m_x);
                for x_next in (0..r).filter(|&y| y != x) {
                    score += ln_gamma(m_xy + stats.transitions[u][(x, x_next)]) - ln_gamma(m_xy);
                }
            }
        }
        score
    }
}

impl StructureScore for BayesianDirichlet {
    fn compute_node(&self, network: &Network, dataset: &Dataset, node: usize) -> f64 {
        match network.sufficient_statistics(node, dataset) {
            SufficientStatistics::Cpt(s) => self.cpt_score(&s),
            SufficientStatistics::Cim(s) => self.cim_score(&s),
        }
    }

    fn penalization(&self) -> Penalization {
        Penalization::None
    }

    fn name(&self) -> &'static str {
        "bayesian-dirichlet"
    }
}
