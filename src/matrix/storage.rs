//! Storage backends for matrix images.
//!
//! An image delegates its entries to a [`Storage`]. The only backend shipped is
//! [`TripletStorage`], an ordered sequence of triplets in arrival order. Row or
//! column compressed layouts can implement the same trait and be selected as the
//! storage parameter of a `MatrixImage`/`DistributedMatrix`.

use crate::matrix::triplet::Triplet;

/// Positional container of matrix entries.
///
/// Positions run over `0..size()`. Passing a position outside that range to
/// [`pop`](Storage::pop) or [`get`](Storage::get) is a contract violation and
/// panics.
pub trait Storage<T: Copy>: Send + Sync {
    /// Forward iterator over the stored entries, in storage order.
    type Iter<'a>: Iterator<Item = Triplet<T>>
    where
        Self: 'a;

    /// Adds `t` to the storage.
    fn push(&mut self, t: Triplet<T>);
    /// Removes the entry at `position` and returns it. Later entries move down by one.
    fn pop(&mut self, position: usize) -> Triplet<T>;
    /// The entry at `position`.
    ///
    /// Complexity depends on the backend.
    fn get(&self, position: usize) -> Triplet<T>;
    /// The number of entries stored.
    fn size(&self) -> usize;
    fn iter(&self) -> Self::Iter<'_>;

    fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

/// Entries kept as a plain vector of triplets.
///
/// Appending is amortized O(1); positional removal is O(n).
#[derive(Debug, Clone)]
pub struct TripletStorage<T> {
    triplets: Vec<Triplet<T>>,
}

impl<T> Default for TripletStorage<T> {
    fn default() -> Self {
        Self { triplets: Vec::new() }
    }
}

impl<T: Copy> TripletStorage<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { triplets: Vec::with_capacity(capacity) }
    }

    pub fn as_slice(&self) -> &[Triplet<T>] {
        &self.triplets
    }

    fn check(&self, position: usize) {
        assert!(
            position < self.triplets.len(),
            "storage position {position} out of range for {} entries",
            self.triplets.len()
        );
    }
}

impl<T: Copy + Send + Sync> Storage<T> for TripletStorage<T> {
    type Iter<'a>
        = std::iter::Copied<std::slice::Iter<'a, Triplet<T>>>
    where
        Self: 'a;

    fn push(&mut self, t: Triplet<T>) {
        self.triplets.push(t);
    }

    fn pop(&mut self, position: usize) -> Triplet<T> {
        self.check(position);
        self.triplets.remove(position)
    }

    fn get(&self, position: usize) -> Triplet<T> {
        self.check(position);
        self.triplets[position]
    }

    fn size(&self) -> usize {
        self.triplets.len()
    }

    fn iter(&self) -> Self::Iter<'_> {
        self.triplets.iter().copied()
    }
}

impl<T: Copy> FromIterator<Triplet<T>> for TripletStorage<T> {
    fn from_iter<I: IntoIterator<Item = Triplet<T>>>(iter: I) -> Self {
        Self { triplets: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> TripletStorage<f64> {
        [(0, 0, 1.0), (1, 2, 2.0), (3, 1, 3.0)]
            .into_iter()
            .map(|(r, c, v)| Triplet::new(r, c, v))
            .collect()
    }

    #[test]
    fn push_keeps_arrival_order() {
        let mut s = TripletStorage::default();
        s.push(Triplet::new(2, 2, 1.0));
        s.push(Triplet::new(0, 1, 2.0));
        s.push(Triplet::new(2, 2, 3.0));
        assert_eq!(s.size(), 3);
        let rows: Vec<_> = s.iter().map(|t| t.row()).collect();
        assert_eq!(rows, vec![2, 0, 2]);
        // duplicates are not coalesced
        assert_eq!(s.get(2).value(), 3.0);
    }

    #[test]
    fn pop_shifts_later_entries() {
        let mut s = filled();
        let t = s.pop(1);
        assert_eq!((t.row(), t.col()), (1, 2));
        assert_eq!(s.size(), 2);
        assert_eq!(s.get(1).row(), 3);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn get_past_end_panics() {
        let s = filled();
        s.get(3);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn pop_on_empty_panics() {
        let mut s = TripletStorage::<f64>::default();
        s.pop(0);
    }
}
