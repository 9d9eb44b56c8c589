//! `boostline prepare`: load, split and serialize the dataset.

use super::Pipeline;
use anyhow::{Context, Result};
use boostline_data::{load_dataset, split_dataset, DatasetSource, PartitionFiles};
use boostline_jobs::{stage_file, RunManifest, SplitSummary};
use colored::Colorize;
use tracing::info;

#[derive(Debug, Default, Clone)]
pub struct PrepareOptions {
    /// Overrides `[dataset] source`.
    pub source: Option<String>,
    /// Overrides `[dataset] seed`.
    pub seed: Option<u64>,
}

/// Writes the partition files and starts a fresh run manifest.
pub async fn execute(pipeline: &Pipeline, options: &PrepareOptions) -> Result<SplitSummary> {
    let dataset_config = &pipeline.config.dataset;
    let source = match options.source.as_deref() {
        Some(value) => DatasetSource::parse(value),
        None => dataset_config.source()?,
    };
    let mut split_options = dataset_config.split_options();
    if options.seed.is_some() {
        split_options.seed = options.seed;
    }

    info!(source = %source, target = %dataset_config.target_column, "Loading dataset");
    let dataset = load_dataset(&source, &dataset_config.target_column)
        .await
        .with_context(|| format!("Failed to load dataset from {source}"))?;

    let split = split_dataset(&dataset, &split_options).context("Failed to split dataset")?;

    let root = pipeline.layout.root();
    let files = PartitionFiles::write_all(root, &split)
        .with_context(|| format!("Failed to write partitions to {}", root.display()))?;

    let summary = SplitSummary {
        train: split.train.len(),
        validation: split.validation.len(),
        test: split.test.len(),
        feature_count: dataset.feature_count(),
        seed: split_options.seed,
    };

    // A new split invalidates every upload and job of the previous run.
    let mut manifest = RunManifest { split: Some(summary.clone()), ..RunManifest::default() };
    for path in [files.train, files.validation, files.test, files.test_labels] {
        manifest.staged_files.push(stage_file(path)?);
    }
    pipeline.save_manifest(&mut manifest)?;

    info!(
        train = summary.train,
        validation = summary.validation,
        test = summary.test,
        features = summary.feature_count,
        "Dataset prepared"
    );
    println!(
        "{} {} rows -> train {}, validation {}, test {} ({} features) in {}",
        "✓".green(),
        dataset.len(),
        summary.train.to_string().bold(),
        summary.validation.to_string().bold(),
        summary.test.to_string().bold(),
        summary.feature_count,
        root.display()
    );
    Ok(summary)
}
