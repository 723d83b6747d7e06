use crate::ReaderError;
use ctbnc_core::{Dataset, Sequence};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write one sequence as CSV: time column, class columns, feature columns.
pub fn write_sequence_to<W: Write>(sequence: &Sequence, output: W, time_column: &str) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(output);

    let columns: Vec<&str> = sequence
        .class_variables()
        .iter()
        .chain(sequence.feature_variables())
        .map(|name| name.as_str())
        .collect();
    writer.write_record(std::iter::once(time_column).chain(columns.iter().copied()))?;

    for observation in sequence.observations() {
        let time = observation.time.to_string();
        let values = columns.iter().map(|&name| {
            sequence
                .class_value(name)
                .or_else(|| observation.value(name))
                .unwrap_or_default()
        });
        writer.write_record(std::iter::once(time.as_str()).chain(values))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write every sequence of `dataset` to `dir/sequence_NNNNN.csv`.
pub fn write_dataset(dataset: &Dataset, dir: &Path, time_column: &str) -> Result<Vec<PathBuf>, ReaderError> {
    std::fs::create_dir_all(dir).map_err(|source| ReaderError::Io { path: dir.to_path_buf(), source })?;

    let mut written = Vec::with_capacity(dataset.len());
    for (index, sequence) in dataset.sequences().iter().enumerate() {
        let path = dir.join(format!("sequence_{index:05}.csv"));
        let file = std::fs::File::create(&path).map_err(|source| ReaderError::Io { path: path.clone(), source })?;
        write_sequence_to(sequence, file, time_column)
            .map_err(|source| ReaderError::Csv { name: path.display().to_string(), source })?;
        written.push(path);
    }
    Ok(written)
}
