use serde::{Serialize, Deserialize};

pub type Time = f64;

/// A named discrete variable with an ordered set of states.
///
/// The state list is fixed at construction; duplicates are dropped while the
/// first occurrence keeps its position.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variable {
    name: String,
    states: Vec<String>,
}

impl Variable {
    pub fn new<S: Into<String>>(name: impl Into<String>, states: impl IntoIterator<Item = S>) -> Self {
        let mut unique: Vec<String> = Vec::new();
        for state in states {
            let state = state.into();
            if !unique.contains(&state) {
                unique.push(state);
            }
        }
        Self { name: name.into(), states: unique }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn states(&self) -> &[String] {
        &self.states
    }

    pub fn cardinality(&self) -> usize {
        self.states.len()
    }

    pub fn state_index(&self, value: &str) -> Option<usize> {
        self.states.iter().position(|s| s == value)
    }

    pub fn state(&self, index: usize) -> Option<&str> {
        self.states.get(index).map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_states_are_deduplicated_in_order() {
        let v = Variable::new("X", ["b", "a", "b", "c"]);
        assert_eq!(v.states(), &["b", "a", "c"]);
        assert_eq!(v.cardinality(), 3);
        assert_eq!(v.state_index("c"), Some(2));
        assert_eq!(v.state_index("z"), None);
        assert_eq!(v.state(1), Some("a"));
    }
}
