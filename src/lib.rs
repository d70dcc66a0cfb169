//! spartan: distributed sparse matrices over in-process processors
//!
//! A sparse matrix is given as an unordered stream of `(row, col, value)` triplets and split
//! over `p` logical processors by a partitioning strategy (cyclic, block, random or a custom
//! function). Each processor owns an image of the matrix; kernels run once per image through a
//! fork/join dispatcher backed by Rayon or scoped threads. The quality of a partitioning is
//! measured by its load imbalance and its communication volume.

pub mod parallel;

pub mod config;
pub mod core;
pub mod error;
pub mod io;
pub mod matrix;
pub mod metrics;
pub mod ops;
pub mod partition;

// Re-exports for convenience
pub use config::*;
pub use crate::core::*;
pub use error::*;
pub use matrix::*;
pub use metrics::PartitionStats;
pub use ops::spmv;
pub use parallel::{Backend, Dispatcher, Executor};
pub use partition::{DistributionFn, Partitioning, SchemeKind};
