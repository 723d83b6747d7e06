use nalgebra::DMatrix;

/// Square boolean structure matrix: `m[(i, j)] == true` is the arc `i -> j`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdjacencyMatrix(pub DMatrix<bool>);

impl AdjacencyMatrix {
    pub fn empty(n: usize) -> Self {
        AdjacencyMatrix(DMatrix::from_element(n, n, false))
    }

    /// Build from an arc list; arcs outside the matrix are ignored.
    pub fn from_arcs(n: usize, arcs: &[(usize, usize)]) -> Self {
        let mut m = Self::empty(n);
        for &(from, to) in arcs {
            if from < n && to < n {
                m.0[(from, to)] = true;
            }
        }
        m
    }

    pub fn dim(&self) -> usize {
        self.0.nrows()
    }

    pub fn has_arc(&self, from: usize, to: usize) -> bool {
        from < self.dim() && to < self.dim() && self.0[(from, to)]
    }

    pub fn set_arc(&mut self, from: usize, to: usize, present: bool) {
        self.0[(from, to)] = present;
    }

    /// Copy with the arc `from -> to` flipped.
    pub fn toggled(&self, from: usize, to: usize) -> Self {
        let mut m = self.clone();
        m.0[(from, to)] = !m.0[(from, to)];
        m
    }

    /// Copy with `from -> to` replaced by `to -> from`.
    pub fn reversed(&self, from: usize, to: usize) -> Self {
        let mut m = self.clone();
        m.0[(from, to)] = false;
        m.0[(to, from)] = true;
        m
    }

    pub fn parents(&self, node: usize) -> Vec<usize> {
        (0..self.dim()).filter(|&i| self.0[(i, node)]).collect()
    }

    pub fn children(&self, node: usize) -> Vec<usize> {
        (0..self.dim()).filter(|&j| self.0[(node, j)]).collect()
    }

    pub fn in_degree(&self, node: usize) -> usize {
        (0..self.dim()).filter(|&i| self.0[(i, node)]).count()
    }

    /// All arcs in row-major order.
    pub fn arcs(&self) -> Vec<(usize, usize)> {
        let n = self.dim();
        let mut arcs = Vec::new();
        for i in 0..n {
            for j in 0..n {
                if self.0[(i, j)] {
                    arcs.push((i, j));
                }
            }
        }
        arcs
    }

    pub fn arc_count(&self) -> usize {
        self.0.iter().filter(|&&a| a).count()
    }

    pub fn column(&self, node: usize) -> Vec<bool> {
        (0..self.dim()).map(|i| self.0[(i, node)]).collect()
    }

    pub fn set_column(&mut self, node: usize, column: &[bool]) {
        for (i, &present) in column.iter().enumerate().take(self.dim()) {
            self.0[(i, node)] = present;
        }
    }

    /// Element-wise OR of two matrices of the same size.
    pub fn union(&self, other: &AdjacencyMatrix) -> Self {
        AdjacencyMatrix(self.0.zip_map(&other.0, |a, b| a || b))
    }
}

impl std::ops::Deref for AdjacencyMatrix {
    type Target = DMatrix<bool>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<DMatrix<bool>> for AdjacencyMatrix {
    fn from(m: DMatrix<bool>) -> Self {
        AdjacencyMatrix(m)
    }
}
