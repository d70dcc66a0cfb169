//! Occupancy sets with multiplicities.

use std::collections::HashMap;
use std::collections::hash_map;

/// A set of indices where each member carries the number of times it was raised.
///
/// An image keeps one for its rows and one for its columns; an index is a
/// member exactly while some entry of the image lies in that row (column).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountedSet {
    counts: HashMap<usize, usize>,
}

impl CountedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the count of `i`, inserting it when absent.
    pub fn raise(&mut self, i: usize) {
        *self.counts.entry(i).or_insert(0) += 1;
    }

    /// Decrement the count of `i`. Indices that reach zero leave the set;
    /// lowering an absent index is a no-op.
    pub fn lower(&mut self, i: usize) {
        if let hash_map::Entry::Occupied(mut e) = self.counts.entry(i) {
            if *e.get() <= 1 {
                e.remove();
            } else {
                *e.get_mut() -= 1;
            }
        }
    }

    pub fn count(&self, i: usize) -> usize {
        self.counts.get(&i).copied().unwrap_or(0)
    }

    pub fn contains(&self, i: usize) -> bool {
        self.counts.contains_key(&i)
    }

    /// Number of distinct members.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }

    /// Members in unspecified order.
    pub fn keys(&self) -> impl Iterator<Item = usize> + '_ {
        self.counts.keys().copied()
    }

    /// `(index, count)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.counts.iter().map(|(&i, &c)| (i, c))
    }
}
