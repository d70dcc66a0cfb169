//! Load imbalance.
//!
//! ε = max over processors s of `p * |A_s| / |A|`, where `A_s` are the entries
//! of image s. A perfect split gives 1, a partition that puts everything on one
//! processor gives `p`.

use crate::error::SpError;
use crate::matrix::distributed::DistributedMatrix;
use crate::matrix::image::MatrixImage;
use crate::matrix::storage::Storage;

/// ε for per-processor entry counts. An empty matrix is perfectly balanced,
/// so the sentinel for zero entries is 1.0.
pub fn from_counts(counts: &[usize]) -> f64 {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 1.0;
    }
    let p = counts.len() as f64;
    counts
        .iter()
        .map(|&c| p * c as f64 / total as f64)
        .fold(1.0, f64::max)
}

impl<T, S> DistributedMatrix<T, S>
where
    T: Copy + Send + Sync,
    S: Storage<T> + Default,
{
    /// Returns the load imbalance of the current partitioning.
    pub fn load_imbalance(&self) -> Result<f64, SpError> {
        let counts = self.compute(MatrixImage::non_zeros)?;
        Ok(from_counts(&counts))
    }
}
