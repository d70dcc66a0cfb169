//! Communication volume of a distributed matrix-vector product.
//!
//! Let λ_i be the number of processors holding a non-zero in row `i`, and μ_j
//! the number holding one in column `j`. Then
//!
//! ```text
//! V = Σ_i (λ_i − 1) + Σ_j (μ_j − 1)
//! ```
//!
//! over the non-empty rows and columns. Here we assume that `v_j` is owned by a
//! processor holding some `a_kj ≠ 0` and `u_i` by one holding some `a_ik ≠ 0`:
//! every other processor in column `j` has to receive `v_j`, and every other
//! processor in row `i` has to send a partial sum of `u_i`.
//!
//! The counters are spread over the processors: λ_i lives at
//! `lambda[i % p][i / p]`. Phase one lets every image bump the counters of the
//! rows and columns it occupies; phase two lets every processor sum the excess
//! of the counters it owns, after which the partial sums are added up.

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::trace;

use crate::error::SpError;
use crate::matrix::distributed::DistributedMatrix;
use crate::matrix::storage::Storage;
use crate::parallel::Executor;

/// Per-processor counter buckets: counter `i` sits at `[i % p][i / p]`.
struct Counters {
    buckets: Vec<Vec<AtomicUsize>>,
}

impl Counters {
    fn new(extent: usize, procs: usize) -> Self {
        let per_proc = extent / procs + 1;
        let buckets = (0..procs)
            .map(|_| (0..per_proc).map(|_| AtomicUsize::new(0)).collect())
            .collect();
        Self { buckets }
    }

    fn bump(&self, i: usize) {
        let p = self.buckets.len();
        // visibility to phase two is given by the join between the phases
        self.buckets[i % p][i / p].fetch_add(1, Ordering::Relaxed);
    }

    /// Σ (count − 1) over the counters in bucket `s` that exceed one.
    fn excess(&self, s: usize) -> usize {
        self.buckets[s]
            .iter()
            .map(|c| c.load(Ordering::Relaxed).saturating_sub(1))
            .sum()
    }
}

impl<T, S> DistributedMatrix<T, S>
where
    T: Copy + Send + Sync,
    S: Storage<T> + Default,
{
    /// Returns the communication volume of the current partitioning.
    pub fn communication_volume(&self) -> Result<usize, SpError> {
        let (rows, cols) = self.communication_volume_split()?;
        Ok(rows + cols)
    }

    /// The row part `Σ(λ_i − 1)` and the column part `Σ(μ_j − 1)` of the
    /// communication volume.
    pub fn communication_volume_split(&self) -> Result<(usize, usize), SpError> {
        let procs = self.images().len();
        if !self.is_initialized() {
            return Err(SpError::Uninitialized);
        }
        let lambda = Counters::new(self.rows(), procs);
        let mu = Counters::new(self.cols(), procs);

        self.compute_each(|image, _| {
            for i in image.row_set().keys() {
                lambda.bump(i);
            }
            for j in image.col_set().keys() {
                mu.bump(j);
            }
        })?;

        let partials = self
            .dispatcher()
            .run(procs, |s| (lambda.excess(s), mu.excess(s)));
        trace!(?partials, "communication volume partial sums");

        Ok(partials
            .into_iter()
            .fold((0, 0), |(r, c), (rs, cs)| (r + rs, c + cs)))
    }
}
