pub mod error;
pub mod config;
pub mod bn;
pub mod ctbn;
pub mod classifier;
pub mod sampling;

pub use error::ClassifierError;
pub use config::{ClassifierConfig, SearchConfig, SubModelConfig, ScoreKind, ConstraintKind};
pub use bn::BayesianNetwork;
pub use ctbn::ContinuousTimeBayesianNetwork;
pub use classifier::{MultiCtbnc, Prediction, ClassProbability};
pub use sampling::{CtbncSampler, ClassPrior, FeatureProcess};
