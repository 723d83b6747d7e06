use crate::ClassifierError;
use ctbnc_core::{NodeIndexer, ParameterEstimator};
use ctbnc_learning::{
    BayesianDirichlet, BdeHyperparameters, BridgeConstraint, ConditionalLogLikelihood, DagConstraint,
    EmptyConstraint, HillClimbing, HybridHillClimbing, LogLikelihood, MaxKConstraint, NaiveBayesConstraint,
    Penalization, RandomRestartHillClimbing, StructureConstraint, StructureScore, StructureSearch,
};
use serde::{Serialize, Deserialize};

/// Structure search algorithm shared by both sub-models.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchConfig {
    #[default]
    HillClimbing,
    RandomRestart {
        restarts: usize,
        perturbations: usize,
        seed: u64,
    },
    /// Hill climbing restricted to a skeleton of `(parent, child)` names.
    Hybrid { skeleton: Vec<(String, String)> },
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoreKind {
    #[default]
    LogLikelihood,
    /// Continuous-time sub-model only.
    ConditionalLogLikelihood,
    BayesianDirichlet,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConstraintKind {
    /// Any DAG for the class sub-model, the bridge rule for the feature one.
    #[default]
    General,
    /// Continuous-time sub-model only.
    NaiveBayes,
    Empty,
    /// Continuous-time sub-model only.
    MaxK { k: usize },
}

/// Score and constraint of one sub-model.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SubModelConfig {
    pub score: ScoreKind,
    pub penalization: Penalization,
    pub constraint: ConstraintKind,
}

impl SubModelConfig {
    pub fn build_score(&self, estimator: ParameterEstimator, bde: BdeHyperparameters) -> Box<dyn StructureScore> {
        match self.score {
            ScoreKind::LogLikelihood => Box::new(LogLikelihood::new(self.penalization, estimator)),
            ScoreKind::ConditionalLogLikelihood => {
                Box::new(ConditionalLogLikelihood::new(self.penalization, estimator))
            }
            ScoreKind::BayesianDirichlet => Box::new(BayesianDirichlet::new(bde)),
        }
    }
}

/// Everything `MultiCtbnc::learn` needs besides the data.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ClassifierConfig {
    pub search: SearchConfig,
    /// Class sub-model (Bayesian network).
    pub bn: SubModelConfig,
    /// Feature sub-model (CTBN).
    pub ctbn: SubModelConfig,
    pub estimator: ParameterEstimator,
    pub bde: BdeHyperparameters,
}

impl ClassifierConfig {
    /// Reject combinations that make no sense for a sub-model.
    pub fn validate(&self) -> Result<(), ClassifierError> {
        if self.bn.score == ScoreKind::ConditionalLogLikelihood {
            return Err(ClassifierError::Configuration(
                "conditional log-likelihood is only defined for the continuous-time sub-model".into(),
            ));
        }
        match self.bn.constraint {
            ConstraintKind::NaiveBayes | ConstraintKind::MaxK { .. } => {
                return Err(ClassifierError::Configuration(format!(
                    "constraint {:?} does not apply to the class sub-model",
                    self.bn.constraint
                )));
            }
            ConstraintKind::General | ConstraintKind::Empty => {}
        }
        if let SearchConfig::RandomRestart { restarts: 0, .. } = self.search {
            return Err(ClassifierError::Configuration("random restart needs at least one restart".into()));
        }
        Ok(())
    }

    pub fn bn_score(&self) -> Box<dyn StructureScore> {
        self.bn.build_score(self.estimator, self.bde)
    }

    pub fn ctbn_score(&self) -> Box<dyn StructureScore> {
        self.ctbn.build_score(self.estimator, self.bde)
    }

    pub fn bn_constraint(&self) -> Result<Box<dyn StructureConstraint>, ClassifierError> {
        match self.bn.constraint {
            ConstraintKind::General => Ok(Box::new(DagConstraint)),
            ConstraintKind::Empty => Ok(Box::new(EmptyConstraint)),
            other => Err(ClassifierError::Configuration(format!(
                "constraint {other:?} does not apply to the class sub-model"
            ))),
        }
    }

    pub fn ctbn_constraint(&self) -> Box<dyn StructureConstraint> {
        match self.ctbn.constraint {
            ConstraintKind::General => Box::new(BridgeConstraint),
            ConstraintKind::NaiveBayes => Box::new(NaiveBayesConstraint),
            ConstraintKind::Empty => Box::new(EmptyConstraint),
            ConstraintKind::MaxK { k } => Box::new(MaxKConstraint::new(k)),
        }
    }

    /// The configured search, with any skeleton resolved against `indexer`.
    pub fn build_search(&self, indexer: &NodeIndexer) -> Box<dyn StructureSearch> {
        match &self.search {
            SearchConfig::HillClimbing => Box::new(HillClimbing),
            SearchConfig::RandomRestart { restarts, perturbations, seed } => Box::new(RandomRestartHillClimbing {
                restarts: *restarts,
                perturbations: *perturbations,
                seed: *seed,
            }),
            SearchConfig::Hybrid { skeleton } => Box::new(HybridHillClimbing::from_named_arcs(indexer, skeleton)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClassifierConfig::default();
        assert_eq!(config.search, SearchConfig::HillClimbing);
        assert_eq!(config.ctbn.penalization, Penalization::Bic);
        assert_eq!(config.estimator, ParameterEstimator::MaximumLikelihood);
        assert!(config.validate().is_ok());
        assert_eq!(config.ctbn_constraint().name(), "bridge");
        assert_eq!(config.bn_constraint().unwrap().name(), "dag");
    }

    #[test]
    fn test_rejects_discriminative_class_model() {
        let config = ClassifierConfig {
            bn: SubModelConfig { score: ScoreKind::ConditionalLogLikelihood, ..Default::default() },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ClassifierError::Configuration(_))));

        let config = ClassifierConfig {
            bn: SubModelConfig { constraint: ConstraintKind::NaiveBayes, ..Default::default() },
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(config.bn_constraint().is_err());
    }

    #[test]
    fn test_json_layout() {
        let json = r#"{
            "search": { "random-restart": { "restarts": 3, "perturbations": 4, "seed": 9 } },
            "ctbn": { "score": "bayesian-dirichlet", "constraint": { "max-k": { "k": 2 } } },
            "estimator": { "bayesian": { "alpha": 1.0, "m_xy": 1.0, "t_x": 0.01 } }
        }"#;
        let config: ClassifierConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.search, SearchConfig::RandomRestart { restarts: 3, perturbations: 4, seed: 9 });
        assert_eq!(config.ctbn.constraint, ConstraintKind::MaxK { k: 2 });
        assert_eq!(config.ctbn.penalization, Penalization::Bic);
        assert_eq!(config.bn, SubModelConfig::default());
        assert_eq!(config.estimator, ParameterEstimator::bayesian(1.0, 1.0, 0.01));
        assert_eq!(config.ctbn_score().name(), "bayesian-dirichlet");
    }
}
