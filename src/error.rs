use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while loading ratings, reading sweep configuration or
/// writing experiment logs. The evaluation core itself never fails.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The ratings source is empty.
    #[error("ratings file has no `N M` header line")]
    MissingHeader,
    /// The first line does not start with two non-negative integers.
    #[error("invalid `N M` header: {0:?}")]
    InvalidHeader(String),
    /// Fewer data rows than the header announced.
    #[error("expected {expected} rating rows, found {found}")]
    MissingRows { expected: usize, found: usize },
    /// A data row does not have exactly M cells.
    #[error("row {row} has {found} ratings, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// A cell could not be parsed as a number.
    #[error("row {row}, column {column}: {value:?} is not a number")]
    InvalidRating {
        row: usize,
        column: usize,
        value: String,
    },
    /// Sweep configuration could not be parsed.
    #[error("invalid sweep configuration {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// Sweep configuration parsed but describes an unusable sweep.
    #[error("invalid sweep: {0}")]
    InvalidSweep(String),
    /// Generator density is not a probability.
    #[error("density {0} is outside 0..=1")]
    InvalidDensity(f64),
    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for loading and reporting.
pub type Result<T> = std::result::Result<T, EvalError>;

impl EvalError {
    pub(crate) fn config(path: impl AsRef<Path>, source: toml::de::Error) -> Self {
        EvalError::Config {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
