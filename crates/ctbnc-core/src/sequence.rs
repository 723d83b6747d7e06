use crate::{DatasetError, Time};
use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;

/// A snapshot of every variable at one instant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub time: Time,
    pub values: BTreeMap<String, String>,
}

impl Observation {
    pub fn new(time: Time, values: BTreeMap<String, String>) -> Self {
        Self { time, values }
    }

    /// Build an observation from `(name, value)` pairs.
    pub fn from_pairs<K, V>(time: Time, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { time, values }
    }

    pub fn value(&self, variable: &str) -> Option<&str> {
        self.values.get(variable).map(|v| v.as_str())
    }
}

/// One multivariate trajectory: time-ordered observations of the feature
/// variables plus the (sequence-constant) values of the class variables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    observations: Vec<Observation>,
    class_variables: Vec<String>,
    feature_variables: Vec<String>,
    class_values: BTreeMap<String, String>,
}

impl Sequence {
    /// Validate and build a sequence.
    ///
    /// Timestamps must be strictly increasing and every observation must carry
    /// a value for each feature. Class values are read from the observations;
    /// they may be absent (unlabeled data) but must not change over time.
    pub fn new(
        class_variables: Vec<String>,
        feature_variables: Vec<String>,
        observations: Vec<Observation>,
    ) -> Result<Self, DatasetError> {
        if observations.is_empty() {
            return Err(DatasetError::EmptySequence);
        }

        if let Some(dup) = class_variables.iter().find(|c| feature_variables.contains(c)) {
            return Err(DatasetError::DuplicateVariable(dup.clone()));
        }

        for (index, pair) in observations.windows(2).enumerate() {
            if !(pair[1].time > pair[0].time) {
                return Err(DatasetError::NonIncreasingTimestamps { index: index + 1 });
            }
        }

        for (index, obs) in observations.iter().enumerate() {
            for feature in &feature_variables {
                if obs.value(feature).is_none() {
                    return Err(DatasetError::MissingValue { index, variable: feature.clone() });
                }
            }
        }

        let mut class_values = BTreeMap::new();
        for class in &class_variables {
            let mut seen: Option<&str> = None;
            for obs in &observations {
                match (seen, obs.value(class)) {
                    (None, Some(v)) => seen = Some(v),
                    (Some(prev), Some(v)) if prev != v => {
                        return Err(DatasetError::ClassValueChanged { variable: class.clone() });
                    }
                    _ => {}
                }
            }
            if let Some(v) = seen {
                class_values.insert(class.clone(), v.to_string());
            }
        }

        Ok(Self { observations, class_variables, feature_variables, class_values })
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn class_variables(&self) -> &[String] {
        &self.class_variables
    }

    pub fn feature_variables(&self) -> &[String] {
        &self.feature_variables
    }

    pub fn class_values(&self) -> &BTreeMap<String, String> {
        &self.class_values
    }

    pub fn class_value(&self, variable: &str) -> Option<&str> {
        self.class_values.get(variable).map(|v| v.as_str())
    }

    /// True when every class variable has a value.
    pub fn is_labeled(&self) -> bool {
        self.class_variables.iter().all(|c| self.class_values.contains_key(c))
    }

    /// Number of intervals between consecutive observations.
    pub fn num_intervals(&self) -> usize {
        self.observations.len().saturating_sub(1)
    }

    pub fn duration(&self) -> Time {
        match (self.observations.first(), self.observations.last()) {
            (Some(first), Some(last)) => last.time - first.time,
            _ => 0.0,
        }
    }

    /// Value of `variable` in observation `index`, looking at class values
    /// first since those are constant over the sequence.
    pub fn value_at(&self, index: usize, variable: &str) -> Option<&str> {
        self.class_value(variable)
            .or_else(|| self.observations.get(index).and_then(|o| o.value(variable)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_valid_sequence() {
        let obs = vec![
            Observation::from_pairs(0.0, [("C", "a"), ("X", "0")]),
            Observation::from_pairs(1.5, [("C", "a"), ("X", "1")]),
            Observation::from_pairs(2.0, [("C", "a"), ("X", "0")]),
        ];
        let seq = Sequence::new(names(&["C"]), names(&["X"]), obs).unwrap();
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.num_intervals(), 2);
        assert_eq!(seq.class_value("C"), Some("a"));
        assert!(seq.is_labeled());
        assert!((seq.duration() - 2.0).abs() < 1e-12);
        assert_eq!(seq.value_at(1, "X"), Some("1"));
        assert_eq!(seq.value_at(1, "C"), Some("a"));
    }

    #[test]
    fn test_rejects_duplicate_timestamps() {
        let obs = vec![
            Observation::from_pairs(0.0, [("X", "0")]),
            Observation::from_pairs(0.0, [("X", "1")]),
        ];
        let err = Sequence::new(vec![], names(&["X"]), obs).unwrap_err();
        assert_eq!(err, DatasetError::NonIncreasingTimestamps { index: 1 });
    }

    #[test]
    fn test_rejects_changing_class() {
        let obs = vec![
            Observation::from_pairs(0.0, [("C", "a"), ("X", "0")]),
            Observation::from_pairs(1.0, [("C", "b"), ("X", "1")]),
        ];
        let err = Sequence::new(names(&["C"]), names(&["X"]), obs).unwrap_err();
        assert!(matches!(err, DatasetError::ClassValueChanged { .. }));
    }

    #[test]
    fn test_rejects_empty_and_missing_feature() {
        assert_eq!(
            Sequence::new(vec![], names(&["X"]), vec![]).unwrap_err(),
            DatasetError::EmptySequence
        );
        let obs = vec![Observation::from_pairs(0.0, [("Y", "0")])];
        assert!(matches!(
            Sequence::new(vec![], names(&["X"]), obs).unwrap_err(),
            DatasetError::MissingValue { .. }
        ));
    }

    #[test]
    fn test_unlabeled_sequence() {
        let obs = vec![Observation::from_pairs(0.0, [("X", "0")])];
        let seq = Sequence::new(names(&["C"]), names(&["X"]), obs).unwrap();
        assert!(!seq.is_labeled());
        assert_eq!(seq.class_value("C"), None);
    }
}
