//! One processor's share of a distributed matrix.

use std::marker::PhantomData;

use crate::matrix::counted_set::CountedSet;
use crate::matrix::storage::{Storage, TripletStorage};
use crate::matrix::triplet::Triplet;

/// A submatrix owned by a single processor. The global `DistributedMatrix` is
/// the sum of its images.
///
/// Besides the entries themselves, an image tracks which rows and columns it
/// touches. Those occupancy sets are what the communication volume is computed
/// from, so every mutation goes through [`push_triplet`](Self::push_triplet) or
/// [`pop_element`](Self::pop_element) to keep them exact.
#[derive(Debug, Clone)]
pub struct MatrixImage<T, S = TripletStorage<T>> {
    storage: S,
    row_set: CountedSet,
    col_set: CountedSet,
    _value: PhantomData<T>,
}

impl<T: Copy, S: Storage<T> + Default> Default for MatrixImage<T, S> {
    fn default() -> Self {
        Self::with_storage(S::default())
    }
}

impl<T: Copy, S: Storage<T>> MatrixImage<T, S> {
    pub fn new() -> Self
    where
        S: Default,
    {
        Self::default()
    }

    /// Wrap an existing storage, deriving the occupancy sets from its entries.
    pub fn with_storage(storage: S) -> Self {
        let mut row_set = CountedSet::new();
        let mut col_set = CountedSet::new();
        for t in storage.iter() {
            row_set.raise(t.row());
            col_set.raise(t.col());
        }
        Self { storage, row_set, col_set, _value: PhantomData }
    }

    pub fn push_triplet(&mut self, t: Triplet<T>) {
        self.row_set.raise(t.row());
        self.col_set.raise(t.col());
        self.storage.push(t);
    }

    /// Remove the entry at `position`, returning it.
    ///
    /// # Panics
    /// When `position >= self.non_zeros()`.
    pub fn pop_element(&mut self, position: usize) -> Triplet<T> {
        let t = self.storage.pop(position);
        self.row_set.lower(t.row());
        self.col_set.lower(t.col());
        t
    }

    /// The `position`-th entry of this image.
    pub fn element(&self, position: usize) -> Triplet<T> {
        self.storage.get(position)
    }

    /// Number of entries held by this image.
    pub fn non_zeros(&self) -> usize {
        self.storage.size()
    }

    /// Rows that hold at least one entry of this image.
    pub fn row_set(&self) -> &CountedSet {
        &self.row_set
    }

    /// Columns that hold at least one entry of this image.
    pub fn col_set(&self) -> &CountedSet {
        &self.col_set
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn iter(&self) -> S::Iter<'_> {
        self.storage.iter()
    }
}

impl<'a, T: Copy, S: Storage<T>> IntoIterator for &'a MatrixImage<T, S> {
    type Item = Triplet<T>;
    type IntoIter = S::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.storage.iter()
    }
}

impl<T: Copy, S: Storage<T> + Default> FromIterator<Triplet<T>> for MatrixImage<T, S> {
    fn from_iter<I: IntoIterator<Item = Triplet<T>>>(iter: I) -> Self {
        let mut image = Self::default();
        for t in iter {
            image.push_triplet(t);
        }
        image
    }
}
