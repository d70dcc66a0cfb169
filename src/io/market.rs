//! Matrix Market coordinate reader.
//!
//! Supports `coordinate` matrices with `real`, `integer` or `pattern` values
//! and `general`, `symmetric` or `skew-symmetric` layout. Indices in the
//! stream are 1-based and are converted to 0-based triplets. Symmetric input
//! is expanded: every off-diagonal entry also appears mirrored.

use std::io::BufRead;

use tracing::{debug, warn};

use crate::error::SpError;
use crate::matrix::distributed::DistributedMatrix;
use crate::matrix::triplet::Triplet;

/// The contents of a Matrix Market stream.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketMatrix {
    pub rows: usize,
    pub cols: usize,
    pub triplets: Vec<Triplet<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Real,
    Integer,
    Pattern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Symmetry {
    General,
    Symmetric,
    SkewSymmetric,
}

fn parse_error(line: usize, message: impl Into<String>) -> SpError {
    SpError::Parse { line, message: message.into() }
}

fn parse_banner(line: usize, banner: &str) -> Result<(Field, Symmetry), SpError> {
    let tokens: Vec<String> = banner.split_whitespace().map(str::to_ascii_lowercase).collect();
    if tokens.len() != 5 || tokens[0] != "%%matrixmarket" {
        return Err(parse_error(line, "expected `%%MatrixMarket matrix coordinate <field> <symmetry>`"));
    }
    if tokens[1] != "matrix" {
        return Err(SpError::Unsupported("only `matrix` objects can be read"));
    }
    if tokens[2] != "coordinate" {
        return Err(SpError::Unsupported("only the coordinate format can be read"));
    }
    let field = match tokens[3].as_str() {
        "real" | "double" => Field::Real,
        "integer" => Field::Integer,
        "pattern" => Field::Pattern,
        _ => return Err(SpError::Unsupported("only real, integer and pattern values can be read")),
    };
    let symmetry = match tokens[4].as_str() {
        "general" => Symmetry::General,
        "symmetric" => Symmetry::Symmetric,
        "skew-symmetric" => Symmetry::SkewSymmetric,
        _ => return Err(SpError::Unsupported("hermitian matrices cannot be read")),
    };
    Ok((field, symmetry))
}

fn parse_num<N: std::str::FromStr>(line: usize, token: Option<&str>, what: &str) -> Result<N, SpError> {
    let token = token.ok_or_else(|| parse_error(line, format!("missing {what}")))?;
    token
        .parse()
        .map_err(|_| parse_error(line, format!("invalid {what} `{token}`")))
}

/// 1-based file index to 0-based, checked against `extent`.
fn to_zero_based(line: usize, index: usize, extent: usize, what: &str) -> Result<usize, SpError> {
    if index == 0 || index > extent {
        return Err(parse_error(line, format!("{what} index {index} outside 1..={extent}")));
    }
    Ok(index - 1)
}

/// Reads a Matrix Market coordinate stream.
pub fn read_triplets<R: BufRead>(reader: R) -> Result<MarketMatrix, SpError> {
    let mut lines = reader.lines().enumerate().map(|(k, l)| (k + 1, l));

    let (field, symmetry) = match lines.next() {
        Some((n, line)) => parse_banner(n, &line?)?,
        None => return Err(parse_error(1, "empty input")),
    };

    let mut size: Option<(usize, usize, usize)> = None;
    let mut triplets = Vec::new();
    let mut entries = 0;
    // the banner is line 1
    let mut last = 1;

    for (n, line) in lines {
        last = n;
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') {
            continue;
        }
        let mut tokens = line.split_whitespace();

        let Some((rows, cols, nz)) = size else {
            let dims = (
                parse_num(n, tokens.next(), "row count")?,
                parse_num(n, tokens.next(), "column count")?,
                parse_num(n, tokens.next(), "entry count")?,
            );
            triplets.reserve(match symmetry {
                Symmetry::General => dims.2,
                _ => 2 * dims.2,
            });
            size = Some(dims);
            continue;
        };

        if entries == nz {
            return Err(parse_error(n, format!("more than the announced {nz} entries")));
        }
        let i = to_zero_based(n, parse_num(n, tokens.next(), "row")?, rows, "row")?;
        let j = to_zero_based(n, parse_num(n, tokens.next(), "column")?, cols, "column")?;
        let value = match field {
            Field::Pattern => 1.0,
            Field::Integer => parse_num::<i64>(n, tokens.next(), "value")? as f64,
            Field::Real => parse_num(n, tokens.next(), "value")?,
        };
        triplets.push(Triplet::new(i, j, value));
        if i != j {
            match symmetry {
                Symmetry::General => {}
                Symmetry::Symmetric => triplets.push(Triplet::new(j, i, value)),
                Symmetry::SkewSymmetric => triplets.push(Triplet::new(j, i, -value)),
            }
        }
        entries += 1;
    }

    let Some((rows, cols, nz)) = size else {
        return Err(parse_error(last, "missing size line"));
    };
    if entries < nz {
        warn!(announced = nz, found = entries, "matrix market stream ended early");
        return Err(parse_error(last, format!("expected {nz} entries, found {entries}")));
    }
    debug!(rows, cols, entries, triplets = triplets.len(), ?field, ?symmetry, "read matrix market stream");
    Ok(MarketMatrix { rows, cols, triplets })
}

impl DistributedMatrix<f64> {
    /// Reads a Matrix Market stream and partitions it cyclically over `procs`
    /// processors.
    pub fn from_market<R: BufRead>(reader: R, procs: usize) -> Result<Self, SpError> {
        let MarketMatrix { rows, cols, triplets } = read_triplets(reader)?;
        let mut a = Self::with_procs(rows, cols, procs);
        a.set_from_triplets(triplets)?;
        Ok(a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(text: &str) -> Result<MarketMatrix, SpError> {
        read_triplets(text.as_bytes())
    }

    fn positions(m: &MarketMatrix) -> Vec<(usize, usize, f64)> {
        m.triplets.iter().map(|t| (t.row(), t.col(), t.value())).collect()
    }

    #[test]
    fn general_real() {
        let m = read(
            "%%MatrixMarket matrix coordinate real general\n\
             % a comment\n\
             \n\
             3 4 2\n\
             1 1 2.5\n\
             3 4 -1e2\n",
        )
        .unwrap();
        assert_eq!((m.rows, m.cols), (3, 4));
        assert_eq!(positions(&m), vec![(0, 0, 2.5), (2, 3, -100.0)]);
    }

    #[test]
    fn symmetric_pattern_is_mirrored() {
        let m = read(
            "%%MatrixMarket matrix coordinate pattern symmetric\n\
             3 3 2\n\
             2 2\n\
             3 1\n",
        )
        .unwrap();
        assert_eq!(positions(&m), vec![(1, 1, 1.0), (2, 0, 1.0), (0, 2, 1.0)]);
    }

    #[test]
    fn skew_symmetric_negates_mirror() {
        let m = read("%%MatrixMarket matrix coordinate integer skew-symmetric\n2 2 1\n2 1 3\n").unwrap();
        assert_eq!(positions(&m), vec![(1, 0, 3.0), (0, 1, -3.0)]);
    }

    #[test]
    fn banner_is_case_insensitive() {
        assert!(read("%%MatrixMarket MATRIX Coordinate Real General\n1 1 0\n").is_ok());
    }

    #[test]
    fn malformed_input() {
        assert!(matches!(read(""), Err(SpError::Parse { line: 1, .. })));
        assert!(matches!(
            read("%%MatrixMarket matrix array real general\n1 1\n1.0\n"),
            Err(SpError::Unsupported(_))
        ));
        let bad_value = read("%%MatrixMarket matrix coordinate real general\n2 2 1\n1 1 x\n");
        assert!(matches!(bad_value, Err(SpError::Parse { line: 3, .. })));
        let zero_index = read("%%MatrixMarket matrix coordinate real general\n2 2 1\n0 1 1.0\n");
        assert!(matches!(zero_index, Err(SpError::Parse { line: 3, .. })));
        let too_many = read("%%MatrixMarket matrix coordinate real general\n2 2 1\n1 1 1\n2 2 1\n");
        assert!(matches!(too_many, Err(SpError::Parse { line: 4, .. })));
        let too_few = read("%%MatrixMarket matrix coordinate real general\n2 2 2\n1 1 1\n");
        assert!(matches!(too_few, Err(SpError::Parse { line: 3, .. })));
    }

    #[test]
    fn truncated_input_points_at_the_last_line() {
        let banner_only = read("%%MatrixMarket matrix coordinate real general\n");
        assert!(matches!(banner_only, Err(SpError::Parse { line: 1, .. })));
        let comments_only = read("%%MatrixMarket matrix coordinate real general\n% one\n% two\n");
        match comments_only {
            Err(SpError::Parse { line, message }) => {
                assert_eq!(line, 3);
                assert_eq!(message, "missing size line");
            }
            other => panic!("unexpected {other:?}"),
        }
        let short = read("%%MatrixMarket matrix coordinate pattern general\n3 3 3\n1 1\n\n2 2\n");
        assert!(matches!(short, Err(SpError::Parse { line: 5, .. })));
    }

    #[test]
    fn from_market_builds_cyclically() {
        let text = "%%MatrixMarket matrix coordinate real general\n4 4 4\n1 1 1\n2 2 1\n3 3 1\n4 4 1\n";
        let a = DistributedMatrix::<f64>::from_market(text.as_bytes(), 2).unwrap();
        assert_eq!(a.non_zeros(), 4);
        let rows0: Vec<_> = a.images()[0].iter().map(|t| t.row()).collect();
        assert_eq!(rows0, vec![0, 2]);
    }
}
