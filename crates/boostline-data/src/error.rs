use thiserror::Error;

pub type DataResult<T> = std::result::Result<T, DataError>;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to parse {what} at line {line}: {message}")]
    Parse { what: String, line: usize, message: String },

    #[error("dataset shape error: {0}")]
    Shape(String),

    #[error("split error: {0}")]
    Split(String),

    #[error("predictions do not line up with labels: {predictions} predictions for {labels} labels")]
    Alignment { predictions: usize, labels: usize },

    #[error("failed to download dataset from {url}: {message}")]
    Download { url: String, message: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
