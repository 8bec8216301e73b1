//! Common error types for the NTCIR density estimator

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for estimator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the estimator crates
///
/// None of these are retried. Every variant is a hard stop for the unit of
/// work that produced it (a dataset, a judgement file, or the whole fit).
#[derive(Error, Debug)]
pub enum Error {
    /// Paragraph identifier has no usable `_<N>` ordinal suffix
    #[error("Malformed paragraph identifier {identifier:?} in {}: {reason}", .document.display())]
    MalformedIdentifier {
        identifier: String,
        document: PathBuf,
        reason: String,
    },

    /// Judgement line does not have four fields or a numeric score
    #[error("Malformed judgement at {source_name}:{line_number}: {reason} (line: {line:?})")]
    MalformedJudgement {
        source_name: String,
        line_number: usize,
        line: String,
        reason: String,
    },

    /// Internal consistency check failed
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// A sample pool required for fitting is empty
    #[error("Empty sample pool: {0}")]
    EmptySample(String),

    /// I/O operation error, tagged with the path involved
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Estimator bundle could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Wrap an `std::io::Error` with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
