//! Matrix entries.

use std::fmt;

/// A triplet `(i, j, a_ij)`: one entry of a sparse matrix.
///
/// Triplets are immutable. Two triplets may share a position; the matrix keeps
/// both and never sums them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triplet<T> {
    row: usize,
    col: usize,
    value: T,
}

impl<T: Copy> Triplet<T> {
    pub fn new(row: usize, col: usize, value: T) -> Self {
        Self { row, col, value }
    }

    /// Row position inside the matrix.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Column position inside the matrix.
    pub fn col(&self) -> usize {
        self.col
    }

    pub fn value(&self) -> T {
        self.value
    }
}

impl<T: fmt::Display> fmt::Display for Triplet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}, {}}}", self.row, self.col, self.value)
    }
}

impl<T: Copy> From<(usize, usize, T)> for Triplet<T> {
    fn from((row, col, value): (usize, usize, T)) -> Self {
        Triplet::new(row, col, value)
    }
}
