//! Numeric kernels over distributed matrices.

pub mod spmv;

pub use spmv::spmv;
