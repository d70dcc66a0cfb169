//! The distributed sparse matrix.
//!
//! A `DistributedMatrix` is spread over `p` logical processors. Each processor
//! owns a [`MatrixImage`] holding the entries the partitioning assigned to it;
//! the global matrix is the sum of its images. Work on the matrix is expressed
//! as a function run on every image concurrently (see [`compute`]), in the
//! spirit of a map over shards followed by a caller-side reduction.
//!
//! [`compute`]: DistributedMatrix::compute

use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, error, trace};

use crate::config::MatrixOptions;
use crate::error::SpError;
use crate::matrix::image::MatrixImage;
use crate::matrix::storage::{Storage, TripletStorage};
use crate::matrix::triplet::Triplet;
use crate::parallel::{Dispatcher, Executor};
use crate::partition::Partitioning;

#[derive(Debug, Clone)]
pub struct DistributedMatrix<T, S = TripletStorage<T>> {
    rows: usize,
    cols: usize,
    procs: usize,
    partitioning: Partitioning,
    seed: Option<u64>,
    dispatcher: Dispatcher,
    images: Vec<MatrixImage<T, S>>,
    nz: usize,
    initialized: bool,
}

impl<T, S> DistributedMatrix<T, S>
where
    T: Copy + Send + Sync,
    S: Storage<T> + Default,
{
    /// An empty `rows x cols` matrix on a single processor, partitioned cyclically.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::with_procs(rows, cols, 1)
    }

    pub fn with_procs(rows: usize, cols: usize, procs: usize) -> Self {
        Self {
            rows,
            cols,
            procs,
            partitioning: Partitioning::Cyclic,
            seed: None,
            dispatcher: Dispatcher::default(),
            images: Vec::new(),
            nz: 0,
            initialized: false,
        }
    }

    pub fn with_options(rows: usize, cols: usize, opts: &MatrixOptions) -> Result<Self, SpError> {
        let mut m = Self::with_procs(rows, cols, opts.procs);
        m.partitioning = opts.scheme.partitioning();
        m.seed = opts.seed;
        m.dispatcher = opts.dispatcher()?;
        Ok(m)
    }

    /// Sets the distribution scheme and processor count used by the next build.
    pub fn set_distribution_scheme(&mut self, partitioning: Partitioning, procs: usize) {
        self.partitioning = partitioning;
        self.procs = procs;
    }

    pub fn set_partitioning(&mut self, partitioning: Partitioning) {
        self.partitioning = partitioning;
    }

    /// Installs `f` as a custom distribution function `(row, col) -> processor`
    /// and selects custom partitioning.
    pub fn set_distribution_function<F>(&mut self, f: F)
    where
        F: Fn(usize, usize) -> usize + Send + Sync + 'static,
    {
        self.partitioning = Partitioning::custom(f);
    }

    pub fn set_procs(&mut self, procs: usize) {
        self.procs = procs;
    }

    /// Fixes the seed of random partitioning. `None` reseeds from entropy on every build.
    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }

    pub fn set_dispatcher(&mut self, dispatcher: Dispatcher) {
        self.dispatcher = dispatcher;
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Processor count used by the next build. A build, or
    /// [`reset_images`](Self::reset_images), leaves it equal to `images().len()`;
    /// [`set_procs`](Self::set_procs) changes it without touching the current images.
    pub fn procs(&self) -> usize {
        self.procs
    }

    /// `rows * cols`, widened so that huge sparse shapes cannot overflow.
    pub fn size(&self) -> u128 {
        self.rows as u128 * self.cols as u128
    }

    pub fn partitioning(&self) -> &Partitioning {
        &self.partitioning
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Number of entries across all images.
    pub fn non_zeros(&self) -> usize {
        self.nz
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Construct the partition from a set of triplets.
    ///
    /// Existing images are replaced. On error nothing is modified: a matrix
    /// that was never built stays uninitialized, and a built one keeps its
    /// previous partition.
    pub fn set_from_triplets<I>(&mut self, triplets: I) -> Result<(), SpError>
    where
        I: IntoIterator<Item = Triplet<T>>,
    {
        let staged = match self.stage(triplets) {
            Ok(staged) => staged,
            Err(e) => {
                error!(
                    error = %e,
                    partitioning = ?self.partitioning,
                    procs = self.procs,
                    "partitioning failed, matrix left unchanged"
                );
                return Err(e);
            }
        };

        let mut images: Vec<MatrixImage<T, S>> =
            (0..self.procs).map(|_| MatrixImage::default()).collect();
        for (proc, t) in staged {
            images[proc].push_triplet(t);
        }
        self.images = images;
        self.nz = self.images.iter().map(MatrixImage::non_zeros).sum();
        self.initialized = true;

        debug!(
            rows = self.rows,
            cols = self.cols,
            procs = self.procs,
            nz = self.nz,
            partitioning = ?self.partitioning,
            "matrix partitioned"
        );
        trace!(per_image = ?self.images.iter().map(MatrixImage::non_zeros).collect::<Vec<_>>());
        Ok(())
    }

    /// Assign every triplet to a processor without touching the matrix.
    fn stage<I>(&self, triplets: I) -> Result<Vec<(usize, Triplet<T>)>, SpError>
    where
        I: IntoIterator<Item = Triplet<T>>,
    {
        self.partitioning.validate(self.procs)?;
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut assigner = self.partitioning.assigner(self.rows, self.procs, rng);
        let triplets = triplets.into_iter();
        let mut staged = Vec::with_capacity(triplets.size_hint().0);
        for t in triplets {
            if t.row() >= self.rows || t.col() >= self.cols {
                return Err(SpError::IndexOutOfBounds {
                    row: t.row(),
                    col: t.col(),
                    rows: self.rows,
                    cols: self.cols,
                });
            }
            staged.push((assigner.target(t.row(), t.col())?, t));
        }
        Ok(staged)
    }

    /// Replaces the partition by `images`, one per processor.
    ///
    /// The processor count becomes `images.len()` and the non-zero count is
    /// recomputed from the images. Every entry must lie inside the matrix, and
    /// at least one image is required; otherwise the matrix is left unchanged.
    pub fn reset_images(&mut self, images: Vec<MatrixImage<T, S>>) -> Result<(), SpError> {
        if images.is_empty() {
            return Err(SpError::ZeroProcessors);
        }
        self.check_bounds(&images)?;
        self.procs = images.len();
        self.nz = images.iter().map(MatrixImage::non_zeros).sum();
        self.images = images;
        self.initialized = true;
        debug!(procs = self.procs, nz = self.nz, "images replaced");
        Ok(())
    }

    /// Obtain the list of images, indexed by processor.
    pub fn images(&self) -> &[MatrixImage<T, S>] {
        &self.images
    }

    /// The first entry of `images` lying outside `rows x cols`, as an error.
    fn check_bounds(&self, images: &[MatrixImage<T, S>]) -> Result<(), SpError> {
        let outside = images
            .iter()
            .flat_map(|image| image.iter())
            .find(|t| t.row() >= self.rows || t.col() >= self.cols);
        match outside {
            Some(t) => Err(SpError::IndexOutOfBounds {
                row: t.row(),
                col: t.col(),
                rows: self.rows,
                cols: self.cols,
            }),
            None => Ok(()),
        }
    }

    fn recount(&mut self) {
        self.nz = self.images.iter().map(MatrixImage::non_zeros).sum();
    }

    fn ensure_initialized(&self) -> Result<(), SpError> {
        if self.initialized { Ok(()) } else { Err(SpError::Uninitialized) }
    }

    /// Runs `f` once per image, concurrently, and returns the results in
    /// processor order.
    ///
    /// This is the map half of a map/reduce: combining the per-image results is
    /// up to the caller.
    pub fn compute<R, F>(&self, f: F) -> Result<Vec<R>, SpError>
    where
        R: Send,
        F: Fn(&MatrixImage<T, S>) -> R + Sync,
    {
        self.ensure_initialized()?;
        Ok(self.dispatcher.map(&self.images, |_, image| f(image)))
    }

    /// Fallible variant of [`compute`](Self::compute).
    ///
    /// Every task runs to completion; if any of them failed the result is a
    /// single [`SpError::Dispatch`] listing each failing processor.
    pub fn try_compute<R, E, F>(&self, f: F) -> Result<Vec<R>, SpError>
    where
        R: Send,
        E: fmt::Display + Send,
        F: Fn(&MatrixImage<T, S>) -> Result<R, E> + Sync,
    {
        self.ensure_initialized()?;
        let outcomes = self.dispatcher.map(&self.images, |_, image| f(image));
        let mut results = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for (proc, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(r) => results.push(r),
                Err(e) => failures.push((proc, e.to_string())),
            }
        }
        if failures.is_empty() {
            Ok(results)
        } else {
            error!(failed = failures.len(), procs = self.procs, "image tasks failed");
            Err(SpError::Dispatch { failures })
        }
    }

    /// Runs `f(image, processor)` once per image, concurrently, and waits for all.
    pub fn compute_each<F>(&self, f: F) -> Result<(), SpError>
    where
        F: Fn(&MatrixImage<T, S>, usize) + Sync,
    {
        self.ensure_initialized()?;
        self.dispatcher.map(&self.images, |s, image| f(image, s));
        Ok(())
    }

    /// Like [`compute_each`](Self::compute_each), with each task owning its
    /// image exclusively for the duration of the call. The non-zero count is
    /// refreshed afterwards.
    ///
    /// If a task leaves an entry outside `rows x cols` behind, the partition
    /// is discarded: the matrix becomes uninitialized and the offending entry
    /// is reported as [`SpError::IndexOutOfBounds`].
    pub fn compute_each_mut<F>(&mut self, f: F) -> Result<(), SpError>
    where
        F: Fn(&mut MatrixImage<T, S>, usize) + Sync,
    {
        self.ensure_initialized()?;
        self.dispatcher.map_mut(&mut self.images, |s, image| f(image, s));
        if let Err(e) = self.check_bounds(&self.images) {
            error!(error = %e, procs = self.images.len(), "image mutation left the matrix shape, partition discarded");
            self.images.clear();
            self.nz = 0;
            self.initialized = false;
            return Err(e);
        }
        self.recount();
        Ok(())
    }

    /// Obtain the number of nonzeros in column `j`.
    pub fn column_weight(&self, j: usize) -> Result<usize, SpError> {
        let counts = self.compute(|image| image.iter().filter(|t| t.col() == j).count())?;
        Ok(counts.into_iter().sum())
    }

    /// Obtain the number of nonzeros in row `i`.
    pub fn row_weight(&self, i: usize) -> Result<usize, SpError> {
        let counts = self.compute(|image| image.iter().filter(|t| t.row() == i).count())?;
        Ok(counts.into_iter().sum())
    }

    /// All entries, image by image, tagged with their processor.
    pub fn entries(&self) -> impl Iterator<Item = (usize, Triplet<T>)> + '_ {
        self.images
            .iter()
            .enumerate()
            .flat_map(|(s, image)| image.iter().map(move |t| (s, t)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::{Backend, Dispatcher};

    fn diagonal(n: usize) -> Vec<Triplet<f64>> {
        (0..n).map(|i| Triplet::new(i, i, 1.0)).collect()
    }

    #[test]
    fn cyclic_build_places_rows() {
        let mut a = DistributedMatrix::<f64>::with_procs(4, 4, 2);
        a.set_from_triplets(diagonal(4)).unwrap();
        assert!(a.is_initialized());
        assert_eq!(a.images().len(), 2);
        let rows0: Vec<_> = a.images()[0].iter().map(|t| t.row()).collect();
        let rows1: Vec<_> = a.images()[1].iter().map(|t| t.row()).collect();
        assert_eq!(rows0, vec![0, 2]);
        assert_eq!(rows1, vec![1, 3]);
        assert_eq!(a.non_zeros(), 4);
    }

    #[test]
    fn rebuild_replaces_images() {
        let mut a = DistributedMatrix::<f64>::with_procs(4, 4, 2);
        a.set_from_triplets(diagonal(4)).unwrap();
        a.set_procs(3);
        a.set_from_triplets(diagonal(2)).unwrap();
        assert_eq!(a.images().len(), 3);
        assert_eq!(a.non_zeros(), 2);
        assert_eq!(a.images()[2].non_zeros(), 0);
    }

    #[test]
    fn failed_rebuild_keeps_previous_partition() {
        let mut a = DistributedMatrix::<f64>::with_procs(4, 4, 2);
        a.set_from_triplets(diagonal(4)).unwrap();
        a.set_partitioning(Partitioning::Custom(None));
        let err = a.set_from_triplets(diagonal(4)).unwrap_err();
        assert!(matches!(err, SpError::MissingDistributionFunction));
        assert!(a.is_initialized());
        assert_eq!(a.non_zeros(), 4);
        assert_eq!(a.images().len(), 2);
    }

    #[test]
    fn out_of_bounds_entry_rejected() {
        let mut a = DistributedMatrix::<f64>::with_procs(2, 2, 2);
        let err = a
            .set_from_triplets(vec![Triplet::new(0, 0, 1.0), Triplet::new(2, 0, 1.0)])
            .unwrap_err();
        assert!(matches!(err, SpError::IndexOutOfBounds { row: 2, .. }));
        assert!(!a.is_initialized());
    }

    #[test]
    fn zero_processors_rejected() {
        let mut a = DistributedMatrix::<f64>::with_procs(2, 2, 0);
        assert!(matches!(a.set_from_triplets(diagonal(2)), Err(SpError::ZeroProcessors)));
        assert!(!a.is_initialized());
        assert!(a.images().is_empty());
    }

    #[test]
    fn uninitialized_matrix_refuses_dispatch() {
        let a = DistributedMatrix::<f64>::new(3, 3);
        assert!(matches!(a.compute(|img| img.non_zeros()), Err(SpError::Uninitialized)));
        assert!(matches!(a.column_weight(0), Err(SpError::Uninitialized)));
    }

    #[test]
    fn weights_sum_over_images() {
        let mut a = DistributedMatrix::<f64>::with_procs(3, 3, 3);
        a.set_from_triplets(vec![
            Triplet::new(0, 1, 1.0),
            Triplet::new(1, 1, 1.0),
            Triplet::new(2, 1, 1.0),
            Triplet::new(2, 2, 1.0),
        ])
        .unwrap();
        assert_eq!(a.column_weight(1).unwrap(), 3);
        assert_eq!(a.column_weight(0).unwrap(), 0);
        assert_eq!(a.row_weight(2).unwrap(), 2);
    }

    #[test]
    fn try_compute_aggregates_failures() {
        let mut a = DistributedMatrix::<f64>::with_procs(4, 4, 4);
        a.set_dispatcher(Dispatcher::new(Backend::Threads, None).unwrap());
        a.set_from_triplets(diagonal(4)).unwrap();
        let err = a
            .try_compute(|img| {
                let row = img.element(0).row();
                if row % 2 == 1 { Err(format!("odd row {row}")) } else { Ok(row) }
            })
            .unwrap_err();
        match err {
            SpError::Dispatch { failures } => {
                assert_eq!(failures, vec![(1, "odd row 1".to_string()), (3, "odd row 3".to_string())]);
            }
            other => panic!("unexpected error {other:?}"),
        }
        let ok = a.try_compute(|img| Ok::<_, String>(img.non_zeros())).unwrap();
        assert_eq!(ok, vec![1, 1, 1, 1]);
    }

    #[test]
    fn compute_each_mut_recounts() {
        let mut a = DistributedMatrix::<f64>::with_procs(4, 4, 2);
        a.set_from_triplets(diagonal(4)).unwrap();
        a.compute_each_mut(|img, s| {
            if s == 0 {
                img.pop_element(0);
            }
        })
        .unwrap();
        assert_eq!(a.non_zeros(), 3);
        assert!(!a.images()[0].row_set().contains(0));
    }

    #[test]
    fn compute_each_mut_rejects_entries_outside_the_shape() {
        let mut a = DistributedMatrix::<f64>::with_procs(4, 4, 2);
        a.set_from_triplets(diagonal(4)).unwrap();
        let err = a
            .compute_each_mut(|img, s| {
                if s == 0 {
                    img.push_triplet(Triplet::new(100, 0, 1.0));
                }
            })
            .unwrap_err();
        assert!(matches!(err, SpError::IndexOutOfBounds { row: 100, col: 0, rows: 4, cols: 4 }));
        assert!(!a.is_initialized());
        assert!(a.images().is_empty());
        assert_eq!(a.non_zeros(), 0);
        assert!(matches!(a.column_weight(0), Err(SpError::Uninitialized)));

        // a fresh build recovers
        a.set_from_triplets(diagonal(4)).unwrap();
        assert_eq!(a.non_zeros(), 4);
    }

    #[test]
    fn set_procs_only_affects_the_next_build() {
        let mut a = DistributedMatrix::<f64>::with_procs(4, 4, 2);
        a.set_from_triplets(diagonal(4)).unwrap();
        a.set_procs(3);
        assert_eq!(a.procs(), 3);
        assert_eq!(a.images().len(), 2);
        a.set_from_triplets(diagonal(4)).unwrap();
        assert_eq!(a.images().len(), a.procs());
    }

    #[test]
    fn size_of_huge_shapes_does_not_overflow() {
        let a = DistributedMatrix::<f64>::new(usize::MAX, 4);
        assert_eq!(a.size(), usize::MAX as u128 * 4);
    }

    #[test]
    fn reset_images_adopts_processor_count() {
        let mut a = DistributedMatrix::<f64>::new(4, 4);
        let images: Vec<MatrixImage<f64>> = vec![
            diagonal(2).into_iter().collect(),
            MatrixImage::new(),
            vec![Triplet::new(3, 3, 2.0)].into_iter().collect(),
        ];
        a.reset_images(images).unwrap();
        assert!(a.is_initialized());
        assert_eq!(a.procs(), 3);
        assert_eq!(a.non_zeros(), 3);
        let owners: Vec<_> = a.entries().map(|(s, t)| (s, t.row())).collect();
        assert_eq!(owners, vec![(0, 0), (0, 1), (2, 3)]);

        let outside: Vec<MatrixImage<f64>> = vec![vec![Triplet::new(0, 9, 1.0)].into_iter().collect()];
        assert!(matches!(a.reset_images(outside), Err(SpError::IndexOutOfBounds { col: 9, .. })));
        assert!(matches!(a.reset_images(Vec::new()), Err(SpError::ZeroProcessors)));
        assert_eq!(a.procs(), 3);
    }
}
