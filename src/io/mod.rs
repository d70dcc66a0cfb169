//! Reading and writing matrices as text streams. Opening files is left to the
//! caller; everything here works on `BufRead` / `Write`.

pub mod market;
pub mod spy;

pub use market::{MarketMatrix, read_triplets};
pub use spy::write_spy;
