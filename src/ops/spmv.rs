//! Distributed sparse matrix-vector product.
//!
//! Each image multiplies its own entries into a private, full-length partial
//! result; the partials are then summed in processor order. This is the
//! reference kernel the partition metrics are meant to predict the cost of.

use num_traits::Num;
use tracing::trace;

use crate::core::traits::{Indexing, MatVec};
use crate::error::SpError;
use crate::matrix::distributed::DistributedMatrix;
use crate::matrix::image::MatrixImage;
use crate::matrix::storage::Storage;
use crate::parallel::Executor;

/// u = A v, computed image by image.
pub fn spmv<T, S>(a: &DistributedMatrix<T, S>, v: &[T]) -> Result<Vec<T>, SpError>
where
    T: Num + Copy + Send + Sync,
    S: Storage<T> + Default,
{
    if v.len() != a.cols() {
        return Err(SpError::DimensionMismatch { expected: a.cols(), found: v.len() });
    }
    let partials = a.compute(|image| partial(image, a.rows(), v))?;
    trace!(images = partials.len(), "summing partial products");
    Ok(reduce(partials, a.rows()))
}

/// The contribution of a single image to A v.
fn partial<T, S>(image: &MatrixImage<T, S>, rows: usize, v: &[T]) -> Vec<T>
where
    T: Num + Copy,
    S: Storage<T>,
{
    let mut u = vec![T::zero(); rows];
    for t in image {
        u[t.row()] = u[t.row()] + t.value() * v[t.col()];
    }
    u
}

fn reduce<T: Num + Copy>(partials: Vec<Vec<T>>, rows: usize) -> Vec<T> {
    partials.into_iter().fold(vec![T::zero(); rows], |mut acc, u| {
        for (a, b) in acc.iter_mut().zip(u) {
            *a = *a + b;
        }
        acc
    })
}

impl<T, S> Indexing for DistributedMatrix<T, S>
where
    T: Copy + Send + Sync,
    S: Storage<T> + Default,
{
    fn nrows(&self) -> usize {
        self.rows()
    }

    fn ncols(&self) -> usize {
        self.cols()
    }
}

/// An unpartitioned matrix has no entries and acts as zero.
impl<T, S> MatVec<Vec<T>> for DistributedMatrix<T, S>
where
    T: Num + Copy + Send + Sync,
    S: Storage<T> + Default,
{
    fn matvec(&self, x: &Vec<T>, y: &mut Vec<T>) {
        assert_eq!(self.rows(), y.len(), "Output vector y has incorrect length");
        assert_eq!(self.cols(), x.len(), "Input vector x has incorrect length");
        let partials = self
            .dispatcher()
            .map(self.images(), |_, image| partial(image, self.rows(), x));
        *y = reduce(partials, self.rows());
    }
}
