use ctbnc_core::{Dataset, DatasetError, Observation, Sequence};
use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV in {name}: {source}")]
    Csv {
        name: String,
        #[source]
        source: csv::Error,
    },
    #[error("{name} has no time column '{column}'")]
    MissingTimeColumn { name: String, column: String },
    #[error("{name}, row {row}: '{value}' is not a time")]
    InvalidTime { name: String, row: usize, value: String },
    #[error("no CSV files found in {0}")]
    NoFiles(PathBuf),
    #[error("invalid sequence {name}: {source}")]
    Sequence {
        name: String,
        #[source]
        source: DatasetError,
    },
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// How a CSV file maps onto a sequence.
///
/// Every column other than the time column, the class columns and the
/// ignored columns is a feature. Class columns may be missing or empty,
/// which yields unlabeled sequences.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    pub time_column: String,
    pub class_variables: Vec<String>,
    pub ignored_columns: Vec<String>,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self { time_column: "t".into(), class_variables: Vec::new(), ignored_columns: Vec::new() }
    }
}

/// A dataset together with the name of the file each sequence came from.
#[derive(Clone, Debug)]
pub struct CsvDataset {
    pub dataset: Dataset,
    pub names: Vec<String>,
}

pub struct CsvReader {
    options: ReaderOptions,
}

impl CsvReader {
    pub fn new(options: ReaderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Parse one sequence from CSV text. `name` only labels errors.
    pub fn read_sequence_from<R: Read>(&self, input: R, name: &str) -> Result<Sequence, ReaderError> {
        let csv_error = |source| ReaderError::Csv { name: name.to_string(), source };
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(input);
        let headers = reader.headers().map_err(csv_error)?.clone();

        let time_index = headers
            .iter()
            .position(|h| h == self.options.time_column)
            .ok_or_else(|| ReaderError::MissingTimeColumn {
                name: name.to_string(),
                column: self.options.time_column.clone(),
            })?;

        let features: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|&(i, h)| {
                i != time_index
                    && !self.options.class_variables.iter().any(|c| c == h)
                    && !self.options.ignored_columns.iter().any(|c| c == h)
            })
            .map(|(_, h)| h.to_string())
            .collect();

        let mut observations = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(csv_error)?;
            let raw = record.get(time_index).unwrap_or_default();
            let time = raw.parse::<f64>().map_err(|_| ReaderError::InvalidTime {
                name: name.to_string(),
                row,
                value: raw.to_string(),
            })?;

            let values: BTreeMap<String, String> = headers
                .iter()
                .zip(record.iter())
                .enumerate()
                .filter(|&(i, (h, v))| i != time_index && !v.is_empty() && !self.options.ignored_columns.iter().any(|c| c == h))
                .map(|(_, (h, v))| (h.to_string(), v.to_string()))
                .collect();
            observations.push(Observation::new(time, values));
        }

        Sequence::new(self.options.class_variables.clone(), features, observations)
            .map_err(|source| ReaderError::Sequence { name: name.to_string(), source })
    }

    pub fn read_sequence(&self, path: &Path) -> Result<Sequence, ReaderError> {
        let file = std::fs::File::open(path).map_err(|source| ReaderError::Io { path: path.to_path_buf(), source })?;
        self.read_sequence_from(file, &path.display().to_string())
    }

    /// Read a single CSV file, or every `*.csv` file of a directory in
    /// lexicographic order, one sequence per file.
    pub fn read_dataset(&self, path: &Path) -> Result<CsvDataset, ReaderError> {
        let files = if path.is_dir() {
            csv_files(path)?
        } else {
            vec![path.to_path_buf()]
        };

        let mut sequences = Vec::with_capacity(files.len());
        let mut names = Vec::with_capacity(files.len());
        for file in &files {
            debug!(file = %file.display(), "reading sequence");
            sequences.push(self.read_sequence(file)?);
            names.push(sequence_name(file));
        }

        let dataset = Dataset::new(sequences)?;
        info!(
            path = %path.display(),
            sequences = dataset.len(),
            classes = dataset.class_variables().len(),
            features = dataset.feature_variables().len(),
            "dataset loaded"
        );
        Ok(CsvDataset { dataset, names })
    }
}

fn csv_files(dir: &Path) -> Result<Vec<PathBuf>, ReaderError> {
    let io_error = |source| ReaderError::Io { path: dir.to_path_buf(), source };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv")) {
            files.push(path);
        }
    }
    if files.is_empty() {
        return Err(ReaderError::NoFiles(dir.to_path_buf()));
    }
    files.sort();
    Ok(files)
}

fn sequence_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader() -> CsvReader {
        CsvReader::new(ReaderOptions { class_variables: vec!["C".into()], ..Default::default() })
    }

    #[test]
    fn test_reads_features_and_class() {
        let text = "t,C,X,Y\n0.0,a,0,low\n0.5,a,1,low\n2.0,a,1,high\n";
        let sequence = reader().read_sequence_from(text.as_bytes(), "s").unwrap();
        assert_eq!(sequence.len(), 3);
        assert_eq!(sequence.feature_variables(), ["X".to_string(), "Y".to_string()]);
        assert_eq!(sequence.class_value("C"), Some("a"));
        assert_eq!(sequence.value_at(2, "Y"), Some("high"));
    }

    #[test]
    fn test_empty_class_cells_are_unlabeled() {
        let text = "t,C,X\n0,,0\n1,,1\n";
        let sequence = reader().read_sequence_from(text.as_bytes(), "s").unwrap();
        assert!(!sequence.is_labeled());
    }

    #[test]
    fn test_rejects_bad_time() {
        let missing = reader().read_sequence_from("time,C,X\n0,a,0\n".as_bytes(), "s");
        assert!(matches!(missing, Err(ReaderError::MissingTimeColumn { .. })));

        let invalid = reader().read_sequence_from("t,C,X\n0,a,0\nsoon,a,1\n".as_bytes(), "s");
        assert!(matches!(invalid, Err(ReaderError::InvalidTime { row: 1, .. })));

        let decreasing = reader().read_sequence_from("t,C,X\n1,a,0\n0.5,a,1\n".as_bytes(), "s");
        assert!(matches!(
            decreasing,
            Err(ReaderError::Sequence { source: DatasetError::NonIncreasingTimestamps { .. }, .. })
        ));
    }

    #[test]
    fn test_ignored_columns_are_dropped() {
        let options = ReaderOptions {
            class_variables: vec!["C".into()],
            ignored_columns: vec!["id".into()],
            ..Default::default()
        };
        let text = "id,t,C,X\n7,0,a,0\n7,1,a,1\n";
        let sequence = CsvReader::new(options).read_sequence_from(text.as_bytes(), "s").unwrap();
        assert_eq!(sequence.feature_variables(), ["X".to_string()]);
        assert_eq!(sequence.observations()[0].value("id"), None);
    }
}
