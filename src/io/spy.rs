//! Partition "spy" output.
//!
//! A spy file is a Matrix Market integer stream in which the value of every
//! entry is the processor that owns it, preceded by comments with the
//! partition quality:
//!
//! ```text
//! %%MatrixMarket matrix coordinate integer general
//! % Matrix sparsity:      0.2500
//! % Load imbalance:       1.0000
//! % Communication Volume: 0
//! title
//! rows cols nz
//! row col proc
//! ...
//! ```
//!
//! Indices are written as stored, i.e. 0-based.

use std::io::Write;

use tracing::info;

use crate::error::SpError;
use crate::matrix::distributed::DistributedMatrix;
use crate::matrix::storage::Storage;

pub fn write_spy<T, S, W>(matrix: &DistributedMatrix<T, S>, title: &str, mut writer: W) -> Result<(), SpError>
where
    T: Copy + Send + Sync,
    S: Storage<T> + Default,
    W: Write,
{
    let stats = matrix.stats()?;
    let sparsity = if matrix.size() == 0 {
        0.0
    } else {
        matrix.non_zeros() as f64 / matrix.size() as f64
    };

    writeln!(writer, "%%MatrixMarket matrix coordinate integer general")?;
    writeln!(writer, "% Matrix sparsity:      {sparsity:.4}")?;
    writeln!(writer, "% Load imbalance:       {:.4}", stats.load_imbalance)?;
    writeln!(writer, "% Communication Volume: {}", stats.communication_volume())?;
    writeln!(writer, "{title}")?;
    writeln!(writer, "{} {} {}", matrix.rows(), matrix.cols(), matrix.non_zeros())?;
    for (proc, t) in matrix.entries() {
        writeln!(writer, "{} {} {}", t.row(), t.col(), proc)?;
    }
    writer.flush()?;

    info!(title, %stats, "spy written");
    Ok(())
}
