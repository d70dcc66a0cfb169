//! Dense conversions on top of Faer.
//!
//! Mostly useful to check distributed kernels against Faer's dense arithmetic.

use faer::{Mat, MatRef};

use crate::error::SpError;
use crate::matrix::distributed::DistributedMatrix;
use crate::matrix::storage::Storage;
use crate::matrix::triplet::Triplet;

impl<S: Storage<f64> + Default> DistributedMatrix<f64, S> {
    /// Sum of all images as a dense `rows x cols` matrix. Entries sharing a
    /// position add up.
    pub fn to_dense(&self) -> Mat<f64> {
        let mut dense = Mat::<f64>::zeros(self.rows(), self.cols());
        for (_, t) in self.entries() {
            dense[(t.row(), t.col())] += t.value();
        }
        dense
    }

    /// Partition the non-zero entries of `a` over `procs` processors, cyclically.
    pub fn from_dense(a: MatRef<'_, f64>, procs: usize) -> Result<Self, SpError> {
        let mut m = Self::with_procs(a.nrows(), a.ncols(), procs);
        let triplets = (0..a.ncols())
            .flat_map(|j| (0..a.nrows()).map(move |i| (i, j)))
            .filter(|&(i, j)| a[(i, j)] != 0.0)
            .map(|(i, j)| Triplet::new(i, j, a[(i, j)]));
        m.set_from_triplets(triplets)?;
        Ok(m)
    }
}
