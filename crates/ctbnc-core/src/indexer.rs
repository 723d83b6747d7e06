use std::collections::HashMap;

/// Stable integer index per node name, scoped to one network.
///
/// The indexer also records which indices belong to class variables, so that
/// structure constraints can tell the class block from the feature block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeIndexer {
    names: Vec<String>,
    class_flags: Vec<bool>,
    lookup: HashMap<String, usize>,
}

impl NodeIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node, returning its index. Re-registering a name returns the
    /// existing index.
    pub fn insert(&mut self, name: impl Into<String>, is_class: bool) -> usize {
        let name = name.into();
        if let Some(&idx) = self.lookup.get(&name) {
            return idx;
        }
        let idx = self.names.len();
        self.lookup.insert(name.clone(), idx);
        self.names.push(name);
        self.class_flags.push(is_class);
        idx
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(|n| n.as_str())
    }

    pub fn is_class(&self, index: usize) -> bool {
        self.class_flags.get(index).copied().unwrap_or(false)
    }

    pub fn class_indices(&self) -> Vec<usize> {
        (0..self.len()).filter(|&i| self.class_flags[i]).collect()
    }

    pub fn feature_indices(&self) -> Vec<usize> {
        (0..self.len()).filter(|&i| !self.class_flags[i]).collect()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
