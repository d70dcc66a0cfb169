//! Convenience constructors (MATLAB style) and synthetic test matrices.

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::SpError;
use crate::matrix::distributed::DistributedMatrix;
use crate::matrix::triplet::Triplet;
use crate::partition::Partitioning;

/// The `n x n` identity, partitioned cyclically over `procs` processors.
pub fn eye(n: usize, procs: usize) -> Result<DistributedMatrix<f64>, SpError> {
    let mut a = DistributedMatrix::with_procs(n, n, procs);
    a.set_from_triplets((0..n).map(|i| Triplet::new(i, i, 1.0)))?;
    Ok(a)
}

/// Random sparsity pattern for an `m x n` matrix with roughly `density * m * n` entries.
///
/// Entries are laid out row by row; the gap between two consecutive entries is
/// drawn uniformly from `1..=max(1, round(2 / density) - 1)`, so on average one
/// position in `1 / density` is filled. Values are uniform in `[1, 11)`.
/// Positions are unique and appear in row-major order.
pub fn random_triplets<R: Rng>(
    m: usize,
    n: usize,
    density: f64,
    rng: &mut R,
) -> Result<Vec<Triplet<f64>>, SpError> {
    if !(density > 0.0 && density <= 1.0) {
        return Err(SpError::Unsupported("density must lie in (0, 1]"));
    }
    let total = m
        .checked_mul(n)
        .ok_or(SpError::Unsupported("matrix shape m * n overflows usize"))?;
    let mut triplets = Vec::with_capacity((total as f64 * density) as usize);
    if total == 0 {
        return Ok(triplets);
    }

    let widest = ((2.0 / density).round() as usize).saturating_sub(1).max(1);
    let gap = Uniform::new_inclusive(1, widest);
    let value = Uniform::new(1.0, 11.0);

    // start half a gap in
    let mut pos = gap.sample(rng) / 2;
    while pos < total {
        triplets.push(Triplet::new(pos / n, pos % n, value.sample(rng)));
        pos += gap.sample(rng);
    }
    Ok(triplets)
}

/// A random sparse `m x n` matrix with the given fill density, randomly
/// partitioned over `procs` processors.
///
/// `seed` drives both the pattern and the partitioning; `None` seeds from entropy.
pub fn sprand(
    m: usize,
    n: usize,
    procs: usize,
    density: f64,
    seed: Option<u64>,
) -> Result<DistributedMatrix<f64>, SpError> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let triplets = random_triplets(m, n, density, &mut rng)?;

    let mut a = DistributedMatrix::with_procs(m, n, procs);
    a.set_distribution_scheme(Partitioning::Random, procs);
    a.set_seed(Some(rng.r#gen()));
    a.set_from_triplets(triplets)?;
    Ok(a)
}
