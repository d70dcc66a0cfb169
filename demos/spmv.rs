//! Partition an identity and a random sparse matrix, print their spy streams and multiply.
//!
//! Run with `cargo run --example spmv`.

use std::io;

use spartan::io::write_spy;
use spartan::{SpError, eye, spmv, sprand};

fn main() -> Result<(), SpError> {
    let n = 30;
    let m = 30;
    let p = 4;
    let fill_in = 0.4;

    let identity = eye(n, p)?;
    let a = sprand(n, m, p, fill_in, None)?;

    let stdout = io::stdout();
    write_spy(&identity, "eye", stdout.lock())?;
    write_spy(&a, "rand", stdout.lock())?;

    let v: Vec<f64> = (0..m).map(|j| 1.0 / (j + 1) as f64).collect();
    let u = spmv(&a, &v)?;

    println!("{}", a.stats()?);
    println!("|u|_1 = {:.6}", u.iter().map(|x| x.abs()).sum::<f64>());
    Ok(())
}
