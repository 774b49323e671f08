use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimilarityError>;

#[derive(Debug, Error)]
pub enum SimilarityError {
    /// Bad position list, weights, or a weight naming a statistic the table lacks.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Structural problem with the player table or a bucket.
    #[error("data error: {0}")]
    Data(String),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error in {}: {source}", .path.display())]
    Csv { path: PathBuf, source: csv::Error },

    /// CSV failure from a reader with no backing file.
    #[error("CSV error: {0}")]
    CsvRead(#[from] csv::Error),
}

impl SimilarityError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data(_))
    }
}
