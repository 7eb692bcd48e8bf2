//! Error types for spectral estimation and ingestion.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The input is not a single one-dimensional series.
    #[error("shape error: {0}")]
    Shape(String),

    /// An invalid option, or a combination of options that cannot be met.
    #[error("configuration error: {0}")]
    Config(String),

    /// The input is too short for the requested analysis.
    #[error("size error: {0}")]
    Size(String),

    /// A numerical routine failed while processing a segment.
    #[error("numerical error: {0}")]
    Numerical(String),

    #[error("could not build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A malformed record in a line-delimited stream.
    #[error("invalid record on line {line}: {source}")]
    Record {
        line: usize,
        source: serde_json::Error,
    },
}

impl From<realfft::FftError> for Error {
    fn from(e: realfft::FftError) -> Self {
        Self::Numerical(format!("FFT failed: {e}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
