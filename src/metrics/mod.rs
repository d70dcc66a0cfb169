//! Partition quality metrics.
//!
//! Two numbers summarize how well a partitioning prepares a matrix for a
//! distributed matrix-vector product:
//!
//! - the load imbalance ε, which compares the busiest processor to a perfectly
//!   even split ([`imbalance`]);
//! - the communication volume V, the number of vector components that have to
//!   travel between processors ([`volume`]).
//!
//! [`PartitionStats`] bundles both with the per-processor entry counts.

pub mod imbalance;
pub mod volume;

use std::fmt;

use crate::error::SpError;
use crate::matrix::distributed::DistributedMatrix;
use crate::matrix::image::MatrixImage;
use crate::matrix::storage::Storage;

/// Snapshot of a partition.
#[derive(Clone, Debug, PartialEq)]
pub struct PartitionStats {
    /// Entries per processor, indexed by processor.
    pub non_zeros: Vec<usize>,
    pub load_imbalance: f64,
    /// Σ(λ_i − 1) over rows.
    pub row_volume: usize,
    /// Σ(μ_j − 1) over columns.
    pub col_volume: usize,
}

impl PartitionStats {
    pub fn procs(&self) -> usize {
        self.non_zeros.len()
    }

    pub fn total_non_zeros(&self) -> usize {
        self.non_zeros.iter().sum()
    }

    pub fn communication_volume(&self) -> usize {
        self.row_volume + self.col_volume
    }
}

impl fmt::Display for PartitionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "p={} nz={} eps={:.4} V={} (rows {}, cols {})",
            self.procs(),
            self.total_non_zeros(),
            self.load_imbalance,
            self.communication_volume(),
            self.row_volume,
            self.col_volume
        )
    }
}

impl<T, S> DistributedMatrix<T, S>
where
    T: Copy + Send + Sync,
    S: Storage<T> + Default,
{
    /// Entry counts, load imbalance and communication volume in one go.
    pub fn stats(&self) -> Result<PartitionStats, SpError> {
        let non_zeros = self.compute(MatrixImage::non_zeros)?;
        let load_imbalance = imbalance::from_counts(&non_zeros);
        let (row_volume, col_volume) = self.communication_volume_split()?;
        Ok(PartitionStats { non_zeros, load_imbalance, row_volume, col_volume })
    }
}
