//! Configuration of distributed matrices.

pub mod options;
pub use options::MatrixOptions;
