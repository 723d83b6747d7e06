use ctbnc_core::{DatasetError, NodeTypeError};

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error(transparent)]
    NodeType(#[from] NodeTypeError),
    #[error("model has not been learned")]
    NotLearned,
}
