use crate::error::JobResult;
use std::path::{Path, PathBuf};

/// Filesystem layout of the local data directory.
///
/// Partition files, the held-out labels, downloaded `<input>.out` predictions and
/// `run_manifest.json` all live side by side under one root.
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn file(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join("run_manifest.json")
    }

    /// Where the batch-transform output for `input_name` lands after download.
    #[must_use]
    pub fn predictions_path(&self, input_name: &str) -> PathBuf {
        self.root.join(format!("{input_name}.out"))
    }

    pub fn ensure(&self) -> JobResult<()> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }
}
