use crate::error::{JobError, JobResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MAX_NAME_LEN: usize = 63;

/// Name of a remote job or model. Names share one namespace on the platform
/// and must not repeat.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobName(String);

impl JobName {
    pub fn new(name: impl Into<String>) -> JobResult<Self> {
        let name = name.into();
        Self::check(&name)?;
        Ok(Self(name))
    }

    /// `<prefix>-YYYY-MM-DD-HH-MM-SS` in UTC. Two calls within the same second
    /// produce the same name.
    pub fn timestamped(prefix: &str, at: DateTime<Utc>) -> JobResult<Self> {
        Self::new(format!("{prefix}-{}", at.format("%Y-%m-%d-%H-%M-%S")))
    }

    pub fn now(prefix: &str) -> JobResult<Self> {
        Self::timestamped(prefix, Utc::now())
    }

    /// Derives a related name, e.g. the model registered from a training job.
    pub fn with_suffix(&self, suffix: &str) -> JobResult<Self> {
        Self::new(format!("{}-{suffix}", self.0))
    }

    /// Alphanumerics and single hyphens, 1 to 63 characters, no leading or
    /// trailing hyphen.
    pub fn check(name: &str) -> JobResult<()> {
        if name.is_empty() || name.len() > MAX_NAME_LEN {
            return Err(JobError::InvalidDescriptor(format!(
                "name '{name}' must be 1-{MAX_NAME_LEN} characters"
            )));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            || name.starts_with('-')
            || name.ends_with('-')
        {
            return Err(JobError::InvalidDescriptor(format!(
                "name '{name}' may only contain alphanumerics and inner hyphens"
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Training,
    Transform,
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Training => f.write_str("training"),
            Self::Transform => f.write_str("transform"),
        }
    }
}

/// What a create call hands back: the name we chose and the ARN the platform assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub kind: JobKind,
    pub name: JobName,
    pub arn: String,
}
