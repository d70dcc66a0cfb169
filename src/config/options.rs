//! Command-line or API options for distributed matrices.
//!
//! This module provides the `MatrixOptions` struct, which gathers everything a
//! `DistributedMatrix` needs besides its shape: the number of processors, the
//! initial partitioning scheme, an optional seed for random partitioning, and
//! how compute dispatches are executed. Options can be filled in directly or
//! parsed from `key=value` pairs such as `procs=4 scheme=block seed=7`.

use std::str::FromStr;

use crate::error::SpError;
use crate::parallel::{Backend, Dispatcher};
use crate::partition::SchemeKind;

/// Partitioning & execution parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixOptions {
    /// Number of logical processors the matrix is split over
    pub procs: usize,

    /// Initial partitioning scheme (cyclic, block, random, custom)
    pub scheme: SchemeKind,

    /// Seed for random partitioning; `None` draws a fresh seed per build
    pub seed: Option<u64>,

    /// Execution backend for compute dispatches
    pub backend: Backend,

    /// Worker threads for a dedicated rayon pool; `None` shares the global pool
    pub threads: Option<usize>,
}

impl Default for MatrixOptions {
    fn default() -> Self {
        Self {
            procs: 1,
            scheme: SchemeKind::Cyclic,
            seed: None,
            backend: Backend::default(),
            threads: None,
        }
    }
}

impl MatrixOptions {
    pub fn dispatcher(&self) -> Result<Dispatcher, SpError> {
        Dispatcher::new(self.backend, self.threads)
    }

    /// Applies one `key=value` setting.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SpError> {
        match key {
            "procs" | "p" => self.procs = parse_num(key, value)?,
            "scheme" | "partitioning" => self.scheme = value.parse()?,
            "seed" => self.seed = Some(parse_num(key, value)?),
            "threads" => self.threads = Some(parse_num(key, value)?),
            "backend" => {
                self.backend = match value {
                    "rayon" => Backend::Rayon,
                    "threads" => Backend::Threads,
                    _ => return Err(SpError::Unsupported("unknown backend")),
                }
            }
            _ => return Err(SpError::Unsupported("unknown matrix option")),
        }
        Ok(())
    }
}

impl FromStr for MatrixOptions {
    type Err = SpError;

    /// Parses whitespace separated `key=value` pairs on top of the defaults.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut opts = MatrixOptions::default();
        for pair in s.split_whitespace() {
            let (key, value) = pair
                .split_once('=')
                .ok_or(SpError::Unsupported("options must be key=value pairs"))?;
            opts.set(key, value)?;
        }
        Ok(opts)
    }
}

fn parse_num<N: FromStr>(key: &str, value: &str) -> Result<N, SpError> {
    value.parse().map_err(|_| SpError::Parse {
        line: 0,
        message: format!("option `{key}` expects a number, got `{value}`"),
    })
}
