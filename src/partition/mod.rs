//! Initial partitioning schemes.
//!
//! A partitioning assigns every matrix entry to one of `p` processors. Three
//! schemes are built in, and a fourth runs a caller-supplied function:
//!
//! - Cyclic: row `i` goes to processor `i mod p`.
//! - Block: row `i` goes to processor `floor(p * i / m)` for an `m`-row matrix.
//! - Random: every entry goes to a uniformly drawn processor.
//! - Custom: a function `f(row, col) -> processor` supplied by the caller.
//!
//! # Example
//!
//! ```rust
//! use spartan::partition::Partitioning;
//! let custom = Partitioning::custom(|row, col| (row + col) % 4);
//! assert_eq!(custom.kind().name(), "custom");
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rand::Rng;
use rand::distributions::{Distribution, Uniform};

use crate::error::SpError;

/// Caller-supplied distribution function `(row, col) -> processor`.
pub type DistributionFn = Arc<dyn Fn(usize, usize) -> usize + Send + Sync>;

/// The active partitioning of a distributed matrix.
#[derive(Clone, Default)]
pub enum Partitioning {
    /// 1D cyclic over rows.
    #[default]
    Cyclic,
    /// 1D block over rows.
    Block,
    /// Uniformly random processor per entry. Not a function of the position:
    /// rebuilding without a fixed seed yields a different partition.
    Random,
    /// User-defined. `None` until a distribution function is set, and building
    /// in that state fails.
    Custom(Option<DistributionFn>),
}

impl Partitioning {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(usize, usize) -> usize + Send + Sync + 'static,
    {
        Partitioning::Custom(Some(Arc::new(f)))
    }

    pub fn kind(&self) -> SchemeKind {
        match self {
            Partitioning::Cyclic => SchemeKind::Cyclic,
            Partitioning::Block => SchemeKind::Block,
            Partitioning::Random => SchemeKind::Random,
            Partitioning::Custom(_) => SchemeKind::Custom,
        }
    }

    /// Whether the same entry always lands on the same processor.
    pub fn is_deterministic(&self) -> bool {
        !matches!(self, Partitioning::Random)
    }

    /// Checks that the scheme can be applied over `procs` processors.
    pub fn validate(&self, procs: usize) -> Result<(), SpError> {
        if procs == 0 {
            return Err(SpError::ZeroProcessors);
        }
        if let Partitioning::Custom(None) = self {
            return Err(SpError::MissingDistributionFunction);
        }
        Ok(())
    }

    /// Builds the per-build assigner. Call [`validate`](Self::validate) first.
    pub(crate) fn assigner<R: Rng>(&self, rows: usize, procs: usize, rng: R) -> Assigner<'_, R> {
        Assigner {
            scheme: self,
            rows,
            procs,
            rng,
            uniform: Uniform::new(0, procs.max(1)),
        }
    }
}

impl fmt::Debug for Partitioning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Partitioning::Custom(Some(_)) => write!(f, "Custom(<fn>)"),
            Partitioning::Custom(None) => write!(f, "Custom(unset)"),
            other => write!(f, "{}", other.kind().name()),
        }
    }
}

/// Row `row` under 1D cyclic partitioning.
pub fn cyclic(row: usize, procs: usize) -> usize {
    row % procs
}

/// Row `row` of a `rows`-row matrix under 1D block partitioning.
pub fn block(row: usize, rows: usize, procs: usize) -> usize {
    // u128 keeps `procs * row` from overflowing on large matrices
    ((procs as u128 * row as u128) / rows as u128) as usize
}

/// Assigns entries for the duration of one build.
pub(crate) struct Assigner<'a, R> {
    scheme: &'a Partitioning,
    rows: usize,
    procs: usize,
    rng: R,
    uniform: Uniform<usize>,
}

impl<R: Rng> Assigner<'_, R> {
    pub(crate) fn target(&mut self, row: usize, col: usize) -> Result<usize, SpError> {
        let proc = match self.scheme {
            Partitioning::Cyclic => cyclic(row, self.procs),
            Partitioning::Block => block(row, self.rows, self.procs),
            Partitioning::Random => self.uniform.sample(&mut self.rng),
            Partitioning::Custom(Some(f)) => f(row, col),
            Partitioning::Custom(None) => return Err(SpError::MissingDistributionFunction),
        };
        if proc >= self.procs {
            return Err(SpError::ProcessorOutOfRange { proc, procs: self.procs });
        }
        Ok(proc)
    }
}

/// Name-level choice of scheme, as found in options and on command lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemeKind {
    #[default]
    Cyclic,
    Block,
    Random,
    Custom,
}

impl SchemeKind {
    pub fn name(self) -> &'static str {
        match self {
            SchemeKind::Cyclic => "cyclic",
            SchemeKind::Block => "block",
            SchemeKind::Random => "random",
            SchemeKind::Custom => "custom",
        }
    }

    /// The partitioning for this kind. `Custom` comes without a function.
    pub fn partitioning(self) -> Partitioning {
        match self {
            SchemeKind::Cyclic => Partitioning::Cyclic,
            SchemeKind::Block => Partitioning::Block,
            SchemeKind::Random => Partitioning::Random,
            SchemeKind::Custom => Partitioning::Custom(None),
        }
    }
}

impl FromStr for SchemeKind {
    type Err = SpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cyclic" => Ok(SchemeKind::Cyclic),
            "block" => Ok(SchemeKind::Block),
            "random" => Ok(SchemeKind::Random),
            "custom" => Ok(SchemeKind::Custom),
            _ => Err(SpError::Unsupported("unknown partitioning scheme")),
        }
    }
}
