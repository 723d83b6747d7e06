pub mod reader;
pub mod writer;
pub mod report;
pub mod manifest;
pub mod cli;

// Datasets on disk
pub use reader::{CsvDataset, CsvReader, ReaderError, ReaderOptions};
pub use writer::{write_dataset, write_sequence_to};

// Run outputs
pub use report::{AccuracySummary, PredictionRecord, PredictionReport};
pub use manifest::{RunManifest, SubModelSummary};
