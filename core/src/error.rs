use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the corpus pipeline.
///
/// Row-level anomalies (missing text, keyword or topics) are never errors;
/// they are coerced to empty values where they are read.
#[derive(Debug, Error)]
pub enum Error {
    #[error("column '{column}' not found in dataset")]
    MissingColumn { column: String },
    #[error("column '{column}' already exists in dataset")]
    DuplicateColumn { column: String },
    #[error("invalid word length range ({min}, {max}): bounds must be positive and min <= max")]
    InvalidWordLength { min: usize, max: usize },
    #[error("top_n must be a positive integer")]
    InvalidTopN,
    #[error("similarity threshold {0} must be in (0, 1]")]
    InvalidThreshold(f64),
    #[error("row has {found} cells but dataset has {expected} columns")]
    RowWidth { expected: usize, found: usize },
    #[error("failed to load segmentation dictionary {}: {message}", path.display())]
    Dictionary { path: PathBuf, message: String },
    #[error("no input: {0}")]
    NoInput(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for errors caused by caller-supplied configuration rather than
    /// by I/O or data files.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::MissingColumn { .. }
                | Error::DuplicateColumn { .. }
                | Error::InvalidWordLength { .. }
                | Error::InvalidTopN
                | Error::InvalidThreshold(_)
        )
    }
}
