use boostline_jobs::{JobError, JobStatus};
use thiserror::Error;

pub type PlatformResult<T> = std::result::Result<T, PlatformError>;

/// Errors from talking to the platform, split by where the problem was found.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Rejected locally before anything was sent.
    #[error("validation error: {0}")]
    Validation(String),

    /// The request never got a response (connection, DNS, TLS).
    #[error("request error: {0}")]
    Request(String),

    /// The platform answered with an error status.
    #[error("API error ({status}){}: {message}", code.as_ref().map(|c| format!(" {c}")).unwrap_or_default())]
    Api { status: u16, code: Option<String>, message: String },

    /// Account quota or request rate exhausted.
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// An object or resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The job reached a terminal state other than `Completed`.
    #[error("job {job_name} ended {status}{}", reason.as_ref().map(|r| format!(": {r}")).unwrap_or_default())]
    JobFailed { job_name: String, status: JobStatus, reason: Option<String> },

    /// The job has not reached a terminal state yet.
    #[error("job {job_name} is still running ({status})")]
    StillRunning { job_name: String, status: JobStatus },

    /// A response was well-formed but missing something the pipeline needs.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<JobError> for PlatformError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::Io(e) => Self::Io(e),
            JobError::Json(e) => Self::Serialization(e.to_string()),
            other => Self::Validation(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_reason_and_code() {
        let err = PlatformError::JobFailed {
            job_name: "j".to_string(),
            status: JobStatus::Failed,
            reason: Some("AlgorithmError".to_string()),
        };
        assert_eq!(err.to_string(), "job j ended Failed: AlgorithmError");

        let err = PlatformError::Api {
            status: 400,
            code: Some("ValidationException".to_string()),
            message: "bad".to_string(),
        };
        assert_eq!(err.to_string(), "API error (400) ValidationException: bad");
    }

    #[test]
    fn test_invalid_descriptor_maps_to_validation() {
        let err: PlatformError = JobError::InvalidDescriptor("x".to_string()).into();
        assert!(matches!(err, PlatformError::Validation(_)));
    }
}
