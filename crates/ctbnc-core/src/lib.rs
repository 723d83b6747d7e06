pub mod variable;
pub mod sequence;
pub mod dataset;
pub mod error;
pub mod indexer;
pub mod adjacency;
pub mod node;
pub mod network;
pub mod stats;
pub mod estimation;
pub mod special;

// Core types
pub use variable::{Variable, Time};
pub use sequence::{Observation, Sequence};
pub use dataset::Dataset;
pub use error::{DatasetError, NodeTypeError};

// Structure
pub use indexer::NodeIndexer;
pub use adjacency::AdjacencyMatrix;
pub use node::{Node, NodeKind, Cpt, Cim, Parameters};
pub use network::{Network, NetworkKind};

// Statistics and estimation
pub use stats::{SufficientStatistics, CptStatistics, CimStatistics};
pub use estimation::ParameterEstimator;
