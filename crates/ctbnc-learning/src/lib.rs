pub mod constraints;
pub mod penalization;
pub mod score;
pub mod search;

// Constraints
pub use constraints::{
    StructureConstraint, DagConstraint, EmptyConstraint, BridgeConstraint, NaiveBayesConstraint,
    MaxKConstraint,
};

// Scores
pub use penalization::Penalization;
pub use score::{StructureScore, LogLikelihood, ConditionalLogLikelihood, BayesianDirichlet, BdeHyperparameters};

// Search
pub use search::{
    StructureSearch, SearchOutcome, HillClimbing, RandomRestartHillClimbing, HybridHillClimbing,
};
