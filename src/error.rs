use thiserror::Error;

// Unified error type for spartan

#[derive(Error, Debug)]
pub enum SpError {
    #[error("a distributed matrix needs at least one processor")]
    ZeroProcessors,
    #[error("custom partitioning selected but no distribution function was set")]
    MissingDistributionFunction,
    #[error("distribution function sent an entry to processor {proc}, but only {procs} exist")]
    ProcessorOutOfRange { proc: usize, procs: usize },
    #[error("entry ({row}, {col}) lies outside the {rows}x{cols} matrix")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    #[error("dimension mismatch: expected length {expected}, got {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("matrix has not been partitioned yet")]
    Uninitialized,
    #[error("{} image task(s) failed: {}", .failures.len(), describe(.failures))]
    Dispatch { failures: Vec<(usize, String)> },
    #[error("could not build thread pool: {0}")]
    ThreadPool(String),
    #[error("matrix market parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}

impl SpError {
    /// True for the errors a build reports before touching the matrix.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SpError::ZeroProcessors
                | SpError::MissingDistributionFunction
                | SpError::ProcessorOutOfRange { .. }
                | SpError::IndexOutOfBounds { .. }
        )
    }
}

fn describe(failures: &[(usize, String)]) -> String {
    failures
        .iter()
        .map(|(proc, msg)| format!("[{proc}] {msg}"))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_message_lists_every_failure() {
        let err = SpError::Dispatch {
            failures: vec![(0, "boom".into()), (2, "bust".into())],
        };
        assert_eq!(err.to_string(), "2 image task(s) failed: [0] boom; [2] bust");
    }

    #[test]
    fn configuration_kinds() {
        assert!(SpError::ZeroProcessors.is_configuration());
        assert!(SpError::MissingDistributionFunction.is_configuration());
        assert!(!SpError::Uninitialized.is_configuration());
    }
}
