use thiserror::Error;

pub type JobResult<T> = std::result::Result<T, JobError>;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("invalid job descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("invalid object location: {0}")]
    InvalidUri(String),

    #[error("run manifest error: {0}")]
    Manifest(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
