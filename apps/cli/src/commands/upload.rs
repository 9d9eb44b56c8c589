//! `boostline upload`: push the prepared partitions to object storage.

use super::Pipeline;
use anyhow::{bail, Context, Result};
use boostline_data::PartitionKind;
use boostline_jobs::sha256_file;
use boostline_platform::upload_files;
use colored::Colorize;
use tracing::info;

/// Only the three partitions are uploaded; the held-out labels stay local.
const UPLOADED: [PartitionKind; 3] = [PartitionKind::Train, PartitionKind::Validation, PartitionKind::Test];

pub async fn execute(pipeline: &Pipeline) -> Result<()> {
    let mut manifest = pipeline.load_manifest()?;
    if manifest.split.is_none() {
        bail!("No prepared dataset in {}. Run 'boostline prepare' first.", pipeline.layout.root().display());
    }

    let mut paths = Vec::with_capacity(UPLOADED.len());
    for kind in UPLOADED {
        let staged = manifest
            .staged_files
            .iter()
            .find(|f| f.name == kind.file_name())
            .with_context(|| format!("{} is missing from the run manifest", kind.file_name()))?;
        let current = sha256_file(&staged.path)
            .with_context(|| format!("Failed to read {}", staged.path.display()))?;
        if current != staged.sha256 {
            bail!("{} changed since it was prepared. Run 'boostline prepare' again.", staged.path.display());
        }
        paths.push(staged.path.clone());
    }

    let prefix = pipeline.config.platform.upload_prefix()?;
    let store = pipeline.config.platform.object_store();
    let uris = upload_files(store.as_ref(), &paths, &prefix)
        .await
        .with_context(|| format!("Failed to upload partitions to {prefix}"))?;

    for (path, uri) in paths.iter().zip(&uris) {
        if let Some(staged) = manifest.staged_files.iter_mut().find(|f| &f.path == path) {
            staged.uri = Some(uri.clone());
        }
        println!("{} {} -> {}", "✓".green(), path.display(), uri.to_string().cyan());
    }
    manifest.upload_prefix = Some(prefix.clone());
    pipeline.save_manifest(&mut manifest)?;

    info!(prefix = %prefix, files = uris.len(), "Upload complete");
    Ok(())
}
