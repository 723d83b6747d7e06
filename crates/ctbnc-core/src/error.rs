/// Errors raised at the dataset boundary, before any learning starts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DatasetError {
    #[error("dataset contains no sequences")]
    Empty,
    #[error("sequence contains no observations")]
    EmptySequence,
    #[error("dataset declares no class variables")]
    NoClassVariables,
    #[error("variable '{0}' is not declared by the dataset")]
    MissingVariable(String),
    #[error("variable '{0}' is declared both as class and feature")]
    DuplicateVariable(String),
    #[error("observation {index} has no value for feature '{variable}'")]
    MissingValue { index: usize, variable: String },
    #[error("sequence {sequence} declares a schema that differs from the first sequence")]
    InconsistentSchema { sequence: usize },
    #[error("timestamps must be strictly increasing (observation {index})")]
    NonIncreasingTimestamps { index: usize },
    #[error("class variable '{variable}' changes value within a sequence")]
    ClassValueChanged { variable: String },
    #[error("sequence {sequence} has {observations} observation(s), at least two are needed to learn transitions")]
    TooFewObservations { sequence: usize, observations: usize },
    #[error("sequence {sequence} has no value for class variable '{variable}'")]
    Unlabeled { sequence: usize, variable: String },
}

/// A node type name that the node factory does not know.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unsupported node type '{0}'")]
pub struct NodeTypeError(pub String);
