use crate::error::{JobError, JobResult};
use serde::{Deserialize, Serialize};

/// An object-store location of the form `s3://<bucket>/<key>`.
///
/// The key may be empty (bucket root) and may end in `/` when it names a prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct S3Uri {
    bucket: String,
    key: String,
}

impl S3Uri {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> JobResult<Self> {
        let bucket = bucket.into();
        let key: String = key.into();
        if bucket.trim().is_empty() || bucket.contains('/') || bucket == "." || bucket == ".." {
            return Err(JobError::InvalidUri(format!("invalid bucket name: '{bucket}'")));
        }
        Ok(Self { bucket, key: key.trim_start_matches('/').to_string() })
    }

    pub fn parse(value: &str) -> JobResult<Self> {
        let rest = value
            .strip_prefix("s3://")
            .ok_or_else(|| JobError::InvalidUri(format!("expected s3://bucket/key, got '{value}'")))?;
        let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
        Self::new(bucket, key)
    }

    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Appends a path segment, inserting exactly one `/` between the parts.
    #[must_use]
    pub fn join(&self, segment: &str) -> Self {
        let segment = segment.trim_start_matches('/');
        let key = if self.key.is_empty() {
            segment.to_string()
        } else {
            format!("{}/{}", self.key.trim_end_matches('/'), segment)
        };
        Self { bucket: self.bucket.clone(), key }
    }

    /// Same location with a trailing `/`, marking it as a prefix.
    #[must_use]
    pub fn as_prefix(&self) -> Self {
        if self.key.is_empty() || self.key.ends_with('/') {
            return self.clone();
        }
        Self { bucket: self.bucket.clone(), key: format!("{}/", self.key) }
    }

    /// Last non-empty key segment.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.key.trim_end_matches('/').rsplit('/').next().filter(|s| !s.is_empty())
    }
}

impl std::fmt::Display for S3Uri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

impl std::str::FromStr for S3Uri {
    type Err = JobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for S3Uri {
    type Error = JobError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<S3Uri> for String {
    fn from(value: S3Uri) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let uri = S3Uri::parse("s3://my-bucket/boston-xgboost-LL/train.csv").unwrap();
        assert_eq!(uri.bucket(), "my-bucket");
        assert_eq!(uri.key(), "boston-xgboost-LL/train.csv");
        assert_eq!(uri.to_string(), "s3://my-bucket/boston-xgboost-LL/train.csv");
        assert_eq!(uri.file_name(), Some("train.csv"));
    }

    #[test]
    fn test_parse_rejects_other_schemes() {
        assert!(S3Uri::parse("https://my-bucket/key").is_err());
        assert!(S3Uri::parse("s3:///key").is_err());
    }

    #[test]
    fn test_rejects_dot_bucket_names() {
        assert!(S3Uri::new("..", "x").is_err());
        assert!(S3Uri::new(".", "x").is_err());
        assert!(S3Uri::parse("s3://../escape").is_err());
        assert!(S3Uri::new("..bucket", "x").is_ok());
    }

    #[test]
    fn test_join_normalizes_slashes() {
        let base = S3Uri::parse("s3://b/prefix/").unwrap();
        assert_eq!(base.join("/output").to_string(), "s3://b/prefix/output");
        let root = S3Uri::parse("s3://b").unwrap();
        assert_eq!(root.join("x").to_string(), "s3://b/x");
    }

    #[test]
    fn test_serde_as_string() {
        let uri = S3Uri::parse("s3://b/k").unwrap();
        assert_eq!(serde_json::to_string(&uri).unwrap(), "\"s3://b/k\"");
        let back: S3Uri = serde_json::from_str("\"s3://b/k\"").unwrap();
        assert_eq!(back, uri);
        assert!(serde_json::from_str::<S3Uri>("\"b/k\"").is_err());
    }
}
