use crate::{BayesianNetwork, ClassifierConfig, ClassifierError, ContinuousTimeBayesianNetwork, SearchConfig};
use ctbnc_core::node::{configuration_states, num_configurations};
use ctbnc_core::special::log_sum_exp;
use ctbnc_core::{AdjacencyMatrix, Cim, Cpt, Dataset, DatasetError, NodeIndexer, Sequence, Variable};
use ctbnc_learning::SearchOutcome;
use rayon::prelude::*;
use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Posterior probability of one class configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassProbability {
    pub configuration: BTreeMap<String, String>,
    pub probability: f64,
}

/// Classification of one sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// The most probable value of every class variable.
    pub class_configuration: BTreeMap<String, String>,
    /// Distribution over all class configurations, when requested.
    pub probabilities: Option<Vec<ClassProbability>>,
}

/// Multi-dimensional CTBN classifier: a Bayesian network over the class
/// variables and a CTBN over the features, joined by class-to-feature arcs.
#[derive(Clone, Debug)]
pub struct MultiCtbnc {
    config: ClassifierConfig,
    class_variables: Vec<Variable>,
    feature_variables: Vec<Variable>,
    bn: BayesianNetwork,
    ctbn: ContinuousTimeBayesianNetwork,
    bn_outcome: SearchOutcome,
    ctbn_outcome: SearchOutcome,
}

/// One class configuration with its prior under the BN.
struct Hypothesis {
    configuration: BTreeMap<String, String>,
    log_prior: f64,
}

impl MultiCtbnc {
    /// Learn structure and parameters of both sub-models from `dataset`.
    pub fn learn(dataset: &Dataset, config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        config.validate()?;
        if dataset.class_variables().is_empty() {
            return Err(DatasetError::NoClassVariables.into());
        }
        dataset.require_labels()?;
        dataset.require_transitions()?;
        if let SearchConfig::Hybrid { skeleton } = &config.search {
            for (from, to) in skeleton {
                dataset.require_variables([from.as_str(), to.as_str()])?;
            }
        }

        let class_variables = dataset.class_variable_set()?;
        let feature_variables = dataset.feature_variable_set()?;
        info!(
            sequences = dataset.len(),
            classes = class_variables.len(),
            features = feature_variables.len(),
            "learning multi-dimensional CTBN classifier"
        );

        let mut bn = BayesianNetwork::new(class_variables.clone())?;
        let search = config.build_search(bn.network().indexer());
        let bn_outcome = bn.learn_structure(
            dataset,
            search.as_ref(),
            config.bn_score().as_ref(),
            config.bn_constraint()?.as_ref(),
        );
        bn.learn_parameters(dataset, &config.estimator);

        let mut ctbn = ContinuousTimeBayesianNetwork::new(class_variables.clone(), feature_variables.clone())?;
        let search = config.build_search(ctbn.network().indexer());
        let ctbn_outcome = ctbn.learn_structure(
            dataset,
            search.as_ref(),
            config.ctbn_score().as_ref(),
            config.ctbn_constraint().as_ref(),
        );
        ctbn.learn_parameters(dataset, &config.estimator);

        info!(bn = %bn.network(), ctbn = %ctbn.network(), "classifier learned");
        Ok(Self {
            config: config.clone(),
            class_variables,
            feature_variables,
            bn,
            ctbn,
            bn_outcome,
            ctbn_outcome,
        })
    }

    /// Classify every sequence of `dataset`.
    ///
    /// For each class configuration `c` the log posterior is
    /// `ln P_BN(c) + Σ_features ll(s | c)`; the arg-max wins and, on request,
    /// the scores are normalized into a distribution.
    pub fn predict(&self, dataset: &Dataset, estimate_probabilities: bool) -> Result<Vec<Prediction>, ClassifierError> {
        if !self.bn.is_learned() || !self.ctbn.is_learned() {
            return Err(ClassifierError::NotLearned);
        }
        dataset.require_variables(self.feature_variables.iter().map(|v| v.name()))?;

        let hypotheses = self.hypotheses()?;
        dataset
            .sequences()
            .par_iter()
            .map(|sequence| self.predict_sequence(sequence, &hypotheses, estimate_probabilities))
            .collect()
    }

    /// `dataset` with the state universe of the training data added, so a
    /// test set reports every state the model knows.
    pub fn align(&self, dataset: Dataset) -> Dataset {
        dataset.with_states_of(&self.class_variables).with_states_of(&self.feature_variables)
    }

    fn hypotheses(&self) -> Result<Vec<Hypothesis>, ClassifierError> {
        let cardinalities: Vec<usize> = self.class_variables.iter().map(|v| v.cardinality()).collect();
        (0..num_configurations(&cardinalities))
            .map(|index| {
                let states = configuration_states(&cardinalities, index);
                let configuration = self
                    .class_variables
                    .iter()
                    .zip(&states)
                    .filter_map(|(variable, &state)| {
                        variable.state(state).map(|s| (variable.name().to_string(), s.to_string()))
                    })
                    .collect();
                Ok(Hypothesis { configuration, log_prior: self.bn.log_probability(&states)? })
            })
            .collect()
    }

    fn predict_sequence(
        &self,
        sequence: &Sequence,
        hypotheses: &[Hypothesis],
        estimate_probabilities: bool,
    ) -> Result<Prediction, ClassifierError> {
        let log_posterior = hypotheses
            .iter()
            .map(|h| {
                if h.log_prior == f64::NEG_INFINITY {
                    return Ok(f64::NEG_INFINITY);
                }
                Ok(h.log_prior + self.ctbn.sequence_log_likelihood(sequence, &h.configuration)?)
            })
            .collect::<Result<Vec<f64>, ClassifierError>>()?;

        // first maximum wins ties
        let mut best = 0;
        for (i, &value) in log_posterior.iter().enumerate() {
            if value > log_posterior[best] {
                best = i;
            }
        }

        let probabilities = estimate_probabilities.then(|| {
            let normalizer = log_sum_exp(&log_posterior);
            let uniform = 1.0 / hypotheses.len() as f64;
            if normalizer == f64::NEG_INFINITY {
                warn!("every class configuration has zero probability, reporting a uniform distribution");
            }
            hypotheses
                .iter()
                .zip(&log_posterior)
                .map(|(h, &value)| ClassProbability {
                    configuration: h.configuration.clone(),
                    probability: if normalizer == f64::NEG_INFINITY { uniform } else { (value - normalizer).exp() },
                })
                .collect::<Vec<_>>()
        });

        Ok(Prediction { class_configuration: hypotheses[best].configuration.clone(), probabilities })
    }

    /// Union of both structures over all variables, class variables first.
    pub fn adjacency_matrix(&self) -> AdjacencyMatrix {
        let ctbn = self.ctbn.network().structure();
        let bn_arcs = self.bn.network().structure().arcs();
        // class nodes occupy the same leading indices in both networks
        ctbn.union(&AdjacencyMatrix::from_arcs(ctbn.dim(), &bn_arcs))
    }

    pub fn indexer(&self) -> &NodeIndexer {
        self.ctbn.network().indexer()
    }

    pub fn cpt(&self, name: &str) -> Option<&Cpt> {
        self.bn.network().node_by_name(name).and_then(|node| node.as_cpt())
    }

    pub fn cim(&self, name: &str) -> Option<&Cim> {
        self.ctbn.network().node_by_name(name).and_then(|node| node.as_cim())
    }

    pub fn class_variables(&self) -> &[Variable] {
        &self.class_variables
    }

    pub fn feature_variables(&self) -> &[Variable] {
        &self.feature_variables
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn bn(&self) -> &BayesianNetwork {
        &self.bn
    }

    pub fn ctbn(&self) -> &ContinuousTimeBayesianNetwork {
        &self.ctbn
    }

    /// Search results of the class and feature sub-models.
    pub fn search_outcomes(&self) -> (&SearchOutcome, &SearchOutcome) {
        (&self.bn_outcome, &self.ctbn_outcome)
    }
}

impl std::fmt::Display for MultiCtbnc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "class sub-model:   {}", self.bn.network())?;
        write!(f, "feature sub-model: {}", self.ctbn.network())
    }
}
