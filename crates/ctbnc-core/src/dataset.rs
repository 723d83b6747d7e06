use crate::{DatasetError, Sequence, Variable};
use std::collections::{BTreeMap, BTreeSet};

/// An ordered collection of sequences that share one variable schema.
///
/// The state universe of each variable is the sorted union of the states
/// observed over all sequences.
#[derive(Clone, Debug)]
pub struct Dataset {
    sequences: Vec<Sequence>,
    class_variables: Vec<String>,
    feature_variables: Vec<String>,
    states: BTreeMap<String, BTreeSet<String>>,
}

impl Dataset {
    pub fn new(sequences: Vec<Sequence>) -> Result<Self, DatasetError> {
        let first = sequences.first().ok_or(DatasetError::Empty)?;
        let class_variables = first.class_variables().to_vec();
        let feature_variables = first.feature_variables().to_vec();

        let sorted = |v: &[String]| v.iter().cloned().collect::<BTreeSet<_>>();
        let class_set = sorted(&class_variables);
        let feature_set = sorted(&feature_variables);

        let mut states: BTreeMap<String, BTreeSet<String>> = class_variables
            .iter()
            .chain(feature_variables.iter())
            .map(|name| (name.clone(), BTreeSet::new()))
            .collect();

        for (index, sequence) in sequences.iter().enumerate() {
            if sorted(sequence.class_variables()) != class_set
                || sorted(sequence.feature_variables()) != feature_set
            {
                return Err(DatasetError::InconsistentSchema { sequence: index });
            }
            for (class, value) in sequence.class_values() {
                if let Some(set) = states.get_mut(class) {
                    set.insert(value.clone());
                }
            }
            for obs in sequence.observations() {
                for feature in &feature_variables {
                    if let (Some(set), Some(value)) = (states.get_mut(feature), obs.value(feature)) {
                        set.insert(value.to_string());
                    }
                }
            }
        }

        Ok(Self { sequences, class_variables, feature_variables, states })
    }

    /// Extend the state universe with states known elsewhere, typically the
    /// states of a training set when aligning a test set to it.
    pub fn with_states_of(mut self, variables: &[Variable]) -> Self {
        for variable in variables {
            if let Some(set) = self.states.get_mut(variable.name()) {
                set.extend(variable.states().iter().cloned());
            }
        }
        self
    }

    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn class_variables(&self) -> &[String] {
        &self.class_variables
    }

    pub fn feature_variables(&self) -> &[String] {
        &self.feature_variables
    }

    pub fn is_class_variable(&self, name: &str) -> bool {
        self.class_variables.iter().any(|c| c == name)
    }

    /// All globally possible states of a variable, sorted.
    pub fn states(&self, name: &str) -> Result<Vec<String>, DatasetError> {
        self.states
            .get(name)
            .map(|set| set.iter().cloned().collect())
            .ok_or_else(|| DatasetError::MissingVariable(name.to_string()))
    }

    pub fn variable(&self, name: &str) -> Result<Variable, DatasetError> {
        Ok(Variable::new(name, self.states(name)?))
    }

    pub fn class_variable_set(&self) -> Result<Vec<Variable>, DatasetError> {
        self.class_variables.iter().map(|n| self.variable(n)).collect()
    }

    pub fn feature_variable_set(&self) -> Result<Vec<Variable>, DatasetError> {
        self.feature_variables.iter().map(|n| self.variable(n)).collect()
    }

    /// Total number of observation intervals over all sequences.
    pub fn num_intervals(&self) -> usize {
        self.sequences.iter().map(|s| s.num_intervals()).sum()
    }

    /// Every sequence must carry a value for every class variable.
    pub fn require_labels(&self) -> Result<(), DatasetError> {
        for (index, sequence) in self.sequences.iter().enumerate() {
            if let Some(missing) = self
                .class_variables
                .iter()
                .find(|c| sequence.class_value(c).is_none())
            {
                return Err(DatasetError::Unlabeled { sequence: index, variable: missing.clone() });
            }
        }
        Ok(())
    }

    /// Every sequence must contain at least one transition interval.
    pub fn require_transitions(&self) -> Result<(), DatasetError> {
        for (index, sequence) in self.sequences.iter().enumerate() {
            if sequence.len() < 2 {
                return Err(DatasetError::TooFewObservations {
                    sequence: index,
                    observations: sequence.len(),
                });
            }
        }
        Ok(())
    }

    /// The dataset must declare all of `names`.
    pub fn require_variables<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Result<(), DatasetError> {
        for name in names {
            if !self.states.contains_key(name) {
                return Err(DatasetError::MissingVariable(name.to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Observation;

    fn seq(class: &str, xs: &[(f64, &str)]) -> Sequence {
        let obs = xs
            .iter()
            .map(|(t, x)| Observation::from_pairs(*t, [("C", class), ("X", *x)]))
            .collect();
        Sequence::new(vec!["C".into()], vec!["X".into()], obs).unwrap()
    }

    #[test]
    fn test_state_universe_is_union() {
        let ds = Dataset::new(vec![
            seq("a", &[(0.0, "0"), (1.0, "1")]),
            seq("b", &[(0.0, "2"), (1.0, "0")]),
        ])
        .unwrap();
        assert_eq!(ds.states("X").unwrap(), vec!["0", "1", "2"]);
        assert_eq!(ds.states("C").unwrap(), vec!["a", "b"]);
        assert_eq!(ds.num_intervals(), 2);
        assert!(ds.require_labels().is_ok());
        assert!(ds.require_transitions().is_ok());
    }

    #[test]
    fn test_empty_dataset_rejected() {
        assert_eq!(Dataset::new(vec![]).unwrap_err(), DatasetError::Empty);
    }

    #[test]
    fn test_inconsistent_schema_rejected() {
        let other = Sequence::new(
            vec!["D".into()],
            vec!["X".into()],
            vec![Observation::from_pairs(0.0, [("D", "a"), ("X", "0")])],
        )
        .unwrap();
        let err = Dataset::new(vec![seq("a", &[(0.0, "0")]), other]).unwrap_err();
        assert_eq!(err, DatasetError::InconsistentSchema { sequence: 1 });
    }

    #[test]
    fn test_missing_variable_and_short_sequences() {
        let ds = Dataset::new(vec![seq("a", &[(0.0, "0")])]).unwrap();
        assert_eq!(ds.states("Y").unwrap_err(), DatasetError::MissingVariable("Y".into()));
        assert!(matches!(
            ds.require_transitions().unwrap_err(),
            DatasetError::TooFewObservations { sequence: 0, observations: 1 }
        ));
    }

    #[test]
    fn test_with_states_of_extends_universe() {
        let ds = Dataset::new(vec![seq("a", &[(0.0, "0")])])
            .unwrap()
            .with_states_of(&[Variable::new("X", ["0", "5"])]);
        assert_eq!(ds.states("X").unwrap(), vec!["0", "5"]);
    }
}
