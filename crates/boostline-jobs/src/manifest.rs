use crate::error::{JobError, JobResult};
use crate::job::{JobHandle, JobName};
use crate::status::JobStatus;
use crate::uri::S3Uri;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// A local file staged for upload, with its content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedFile {
    pub name: String,
    pub path: PathBuf,
    pub sha256: String,
    #[serde(default)]
    pub uri: Option<S3Uri>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitSummary {
    pub train: usize,
    pub validation: usize,
    pub test: usize,
    pub feature_count: usize,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub handle: JobHandle,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub last_status: Option<JobStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub name: JobName,
    pub arn: String,
    pub image: String,
    pub artifacts: S3Uri,
}

/// What each pipeline stage produced, so the next stage can pick it up.
///
/// Stages overwrite their own section; a re-run starts new remote resources
/// rather than reusing the recorded ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunManifest {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub split: Option<SplitSummary>,
    #[serde(default)]
    pub staged_files: Vec<StagedFile>,
    #[serde(default)]
    pub upload_prefix: Option<S3Uri>,
    #[serde(default)]
    pub training: Option<JobRecord>,
    #[serde(default)]
    pub model_artifacts: Option<S3Uri>,
    #[serde(default)]
    pub model: Option<ModelRecord>,
    #[serde(default)]
    pub transform: Option<JobRecord>,
    #[serde(default)]
    pub transform_output: Option<S3Uri>,
    #[serde(default)]
    pub predictions_path: Option<PathBuf>,
}

impl Default for RunManifest {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
            split: None,
            staged_files: Vec::new(),
            upload_prefix: None,
            training: None,
            model_artifacts: None,
            model: None,
            transform: None,
            transform_output: None,
            predictions_path: None,
        }
    }
}

impl RunManifest {
    pub fn load(path: &Path) -> JobResult<Self> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// A missing manifest is an empty run; a corrupt one is an error.
    pub fn load_or_default(path: &Path) -> JobResult<Self> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&mut self, path: &Path) -> JobResult<()> {
        self.updated_at = Utc::now();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    pub fn staged_uri(&self, name: &str) -> JobResult<&S3Uri> {
        self.staged_files
            .iter()
            .find(|f| f.name == name)
            .and_then(|f| f.uri.as_ref())
            .ok_or_else(|| JobError::Manifest(format!("'{name}' has not been uploaded yet")))
    }

    pub fn training_job(&self) -> JobResult<&JobRecord> {
        self.training
            .as_ref()
            .ok_or_else(|| JobError::Manifest("no training job has been submitted".to_string()))
    }

    pub fn registered_model(&self) -> JobResult<&ModelRecord> {
        self.model
            .as_ref()
            .ok_or_else(|| JobError::Manifest("no model has been registered".to_string()))
    }

    pub fn transform_job(&self) -> JobResult<&JobRecord> {
        self.transform
            .as_ref()
            .ok_or_else(|| JobError::Manifest("no transform job has been submitted".to_string()))
    }
}

pub fn sha256_file(path: &Path) -> JobResult<String> {
    let bytes = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

pub fn stage_file(path: PathBuf) -> JobResult<StagedFile> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| JobError::Manifest(format!("not a file path: {}", path.display())))?;
    let sha256 = sha256_file(&path)?;
    Ok(StagedFile { name, path, sha256, uri: None })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_manifest_is_empty_run() {
        let temp = TempDir::new().unwrap();
        let manifest = RunManifest::load_or_default(&temp.path().join("run_manifest.json")).unwrap();
        assert!(manifest.training.is_none());
        assert!(manifest.training_job().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("run_manifest.json");
        std::fs::write(temp.path().join("train.csv"), "24,1,2\n").unwrap();

        let mut staged = stage_file(temp.path().join("train.csv")).unwrap();
        staged.uri = Some(S3Uri::parse("s3://b/p/train.csv").unwrap());

        let mut manifest = RunManifest { staged_files: vec![staged], ..Default::default() };
        manifest.save(&path).unwrap();

        let back = RunManifest::load(&path).unwrap();
        assert_eq!(back.staged_uri("train.csv").unwrap().to_string(), "s3://b/p/train.csv");
        assert!(back.staged_uri("test.csv").is_err());
        assert_eq!(back.staged_files[0].sha256.len(), 64);
    }

    #[test]
    fn test_corrupt_manifest_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("run_manifest.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(RunManifest::load_or_default(&path).is_err());
    }
}
