//! Command implementations for the boostline CLI.

pub mod analyze;
pub mod prepare;
pub mod register;
pub mod run;
pub mod status;
pub mod train;
pub mod transform;
pub mod upload;

use crate::config::PipelineConfig;
use anyhow::{Context, Result};
use boostline_jobs::{
    DataLayout, JobKind, JobName, JobStatus, ProgressEvent, ProgressSink, RunManifest, StdoutProgressSink,
};
use boostline_platform::PlatformError;
use tracing::info;

/// Configuration plus the local data directory every stage reads and writes.
pub struct Pipeline {
    pub config: PipelineConfig,
    pub layout: DataLayout,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let layout = DataLayout::new(config.dataset.data_dir.clone());
        Self { config, layout }
    }

    pub fn load_manifest(&self) -> Result<RunManifest> {
        let path = self.layout.manifest_path();
        RunManifest::load_or_default(&path).with_context(|| format!("Failed to read {}", path.display()))
    }

    pub fn save_manifest(&self, manifest: &mut RunManifest) -> Result<()> {
        let path = self.layout.manifest_path();
        manifest.save(&path).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Human progress goes to stdout; with `--json` it is logged instead so
    /// stdout carries only the final document.
    pub fn progress_sink(json: bool) -> Box<dyn ProgressSink> {
        if json { Box::new(LogProgressSink) } else { Box::new(StdoutProgressSink) }
    }
}

struct LogProgressSink;

impl ProgressSink for LogProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Submitted { kind, job_name, arn } => info!(%kind, job = %job_name, %arn, "Submitted"),
            ProgressEvent::Message { kind, job_name, message } => info!(%kind, job = %job_name, "{message}"),
            ProgressEvent::Status { kind, job_name, status } => info!(%kind, job = %job_name, %status, "Status"),
            ProgressEvent::Finished { kind, job_name, status } => {
                info!(%kind, job = %job_name, %status, "Finished");
            }
        }
    }
}

/// Terminal status carried by a wait error, so the manifest can record it
/// before the error propagates.
pub(crate) fn status_of(error: &PlatformError) -> Option<JobStatus> {
    match error {
        PlatformError::JobFailed { status, .. } | PlatformError::StillRunning { status, .. } => Some(*status),
        _ => None,
    }
}

pub(crate) fn job_context(kind: JobKind, name: &JobName) -> String {
    format!("{kind} job {name} did not complete")
}
