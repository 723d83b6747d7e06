use ctbnc_core::Dataset;
use ctbnc_models::{ClassProbability, Prediction};
use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Prediction for one sequence next to its true labels, if known.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub sequence: String,
    pub predicted: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truth: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<Vec<ClassProbability>>,
}

/// Accuracy over the labeled sequences of a report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccuracySummary {
    pub evaluated: usize,
    /// Share of sequences with every class variable right.
    pub global: f64,
    pub per_class_variable: BTreeMap<String, f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub records: Vec<PredictionRecord>,
    pub accuracy: Option<AccuracySummary>,
}

impl PredictionReport {
    /// Pair predictions with the sequences they were made for. `names`
    /// labels the sequences; positions are used when it is shorter.
    pub fn new(dataset: &Dataset, names: &[String], predictions: Vec<Prediction>) -> Self {
        let records: Vec<PredictionRecord> = dataset
            .sequences()
            .iter()
            .zip(predictions)
            .enumerate()
            .map(|(index, (sequence, prediction))| PredictionRecord {
                sequence: names.get(index).cloned().unwrap_or_else(|| index.to_string()),
                predicted: prediction.class_configuration,
                truth: sequence.is_labeled().then(|| sequence.class_values().clone()),
                probabilities: prediction.probabilities,
            })
            .collect();
        let accuracy = accuracy(&records, dataset.class_variables());
        Self { records, accuracy }
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let report = serde_json::from_str(&json)?;
        Ok(report)
    }
}

fn accuracy(records: &[PredictionRecord], class_variables: &[String]) -> Option<AccuracySummary> {
    let labeled: Vec<(&BTreeMap<String, String>, &BTreeMap<String, String>)> = records
        .iter()
        .filter_map(|r| r.truth.as_ref().map(|truth| (&r.predicted, truth)))
        .collect();
    if labeled.is_empty() {
        return None;
    }
    let n = labeled.len() as f64;

    let global = labeled.iter().filter(|(predicted, truth)| predicted == truth).count() as f64 / n;
    let per_class_variable = class_variables
        .iter()
        .map(|class| {
            let correct = labeled
                .iter()
                .filter(|(predicted, truth)| predicted.get(class) == truth.get(class))
                .count();
            (class.clone(), correct as f64 / n)
        })
        .collect();

    Some(AccuracySummary { evaluated: labeled.len(), global, per_class_variable })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ctbnc_core::{Observation, Sequence};

    fn labels(c1: &str, c2: &str) -> BTreeMap<String, String> {
        [("C1".to_string(), c1.to_string()), ("C2".to_string(), c2.to_string())].into()
    }

    fn sequence(c1: &str, c2: &str) -> Sequence {
        let obs = vec![
            Observation::from_pairs(0.0, [("C1", c1), ("C2", c2), ("X", "0")]),
            Observation::from_pairs(1.0, [("C1", c1), ("C2", c2), ("X", "1")]),
        ];
        Sequence::new(vec!["C1".into(), "C2".into()], vec!["X".into()], obs).unwrap()
    }

    #[test]
    fn test_global_and_per_class_accuracy() {
        let ds = Dataset::new(vec![sequence("a", "u"), sequence("a", "v"), sequence("b", "v"), sequence("b", "u")])
            .unwrap();
        let predicted = [labels("a", "u"), labels("a", "u"), labels("b", "v"), labels("a", "v")];
        let predictions = predicted
            .into_iter()
            .map(|class_configuration| Prediction { class_configuration, probabilities: None })
            .collect();

        let report = PredictionReport::new(&ds, &["s0".into(), "s1".into()], predictions);
        assert_eq!(report.records[1].sequence, "s1");
        assert_eq!(report.records[3].sequence, "3");

        let accuracy = report.accuracy.unwrap();
        assert_eq!(accuracy.evaluated, 4);
        assert_relative_eq!(accuracy.global, 0.5);
        assert_relative_eq!(accuracy.per_class_variable["C1"], 0.75);
        assert_relative_eq!(accuracy.per_class_variable["C2"], 0.5);
    }
}
