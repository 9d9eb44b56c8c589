use crate::transform::TransformOutput;
use crate::uri::S3Uri;
use serde::{Deserialize, Serialize};

/// Primary status reported by `DescribeTrainingJob` / `DescribeTransformJob`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    InProgress,
    Completed,
    Failed,
    Stopping,
    Stopped,
}

impl JobStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Stopped)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::InProgress => "InProgress",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Stopping => "Stopping",
            Self::Stopped => "Stopped",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecondaryStatusTransition {
    pub status: String,
    #[serde(default)]
    pub status_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModelArtifacts {
    pub s3_model_artifacts: S3Uri,
}

/// Subset of the `DescribeTrainingJob` response the pipeline reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrainingJobDescription {
    pub training_job_name: String,
    #[serde(default)]
    pub training_job_arn: Option<String>,
    pub training_job_status: JobStatus,
    #[serde(default)]
    pub secondary_status: Option<String>,
    #[serde(default)]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub model_artifacts: Option<ModelArtifacts>,
    #[serde(default)]
    pub secondary_status_transitions: Vec<SecondaryStatusTransition>,
}

/// Subset of the `DescribeTransformJob` response the pipeline reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransformJobDescription {
    pub transform_job_name: String,
    #[serde(default)]
    pub transform_job_arn: Option<String>,
    pub transform_job_status: JobStatus,
    #[serde(default)]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub transform_output: Option<TransformOutput>,
}

/// Common view over job descriptions so one waiter can follow either kind.
pub trait TrackedJob {
    fn name(&self) -> &str;
    fn status(&self) -> JobStatus;
    fn failure_reason(&self) -> Option<&str>;
    fn transitions(&self) -> &[SecondaryStatusTransition] {
        &[]
    }
}

impl TrackedJob for TrainingJobDescription {
    fn name(&self) -> &str {
        &self.training_job_name
    }

    fn status(&self) -> JobStatus {
        self.training_job_status
    }

    fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    fn transitions(&self) -> &[SecondaryStatusTransition] {
        &self.secondary_status_transitions
    }
}

impl TrackedJob for TransformJobDescription {
    fn name(&self) -> &str {
        &self.transform_job_name
    }

    fn status(&self) -> JobStatus {
        self.transform_job_status
    }

    fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }
}
