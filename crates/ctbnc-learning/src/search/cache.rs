use std::collections::HashMap;

/// Bitmask of a parent set, one bit per node index.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParentMask(Vec<u64>);

impl ParentMask {
    pub fn from_column(column: &[bool]) -> Self {
        let mut words = vec![0u64; column.len().div_ceil(64)];
        for (i, &present) in column.iter().enumerate() {
            if present {
                words[i / 64] |= 1u64 << (i % 64);
            }
        }
        ParentMask(words)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0
            .get(index / 64)
            .map_or(false, |word| word & (1u64 << (index % 64)) != 0)
    }
}

/// Local scores memoized by `(node, parent set)` for one search run.
#[derive(Debug, Default)]
pub struct ScoreCache {
    scores: HashMap<(usize, ParentMask), f64>,
    hits: usize,
    misses: usize,
}

impl ScoreCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_insert_with(&mut self, node: usize, mask: ParentMask, compute: impl FnOnce() -> f64) -> f64 {
        if let Some(&score) = self.scores.get(&(node, mask.clone())) {
            self.hits += 1;
            return score;
        }
        self.misses += 1;
        let score = compute();
        self.scores.insert((node, mask), score);
        score
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
