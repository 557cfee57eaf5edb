use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a comparison run.
///
/// Differences between files are never errors; they are reported through
/// [`Verdict`](crate::artifacts::diff::verdict::Verdict).
#[derive(Debug, Error)]
pub enum DiffError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("memory exhausted while allocating {what}")]
    OutOfMemory { what: &'static str },

    #[error("{0}")]
    InvalidOption(String),

    #[error("invalid regular expression '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("unparsable value for --palette: {0}")]
    InvalidPalette(String),
}

impl DiffError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DiffError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Grow `vec` so it can hold `additional` more items, reporting allocation
/// failure instead of aborting.
pub fn reserve<T>(vec: &mut Vec<T>, additional: usize, what: &'static str) -> Result<(), DiffError> {
    vec.try_reserve_exact(additional)
        .map_err(|_| DiffError::OutOfMemory { what })
}
