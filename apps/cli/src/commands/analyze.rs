//! `boostline analyze`: compare batch predictions with the held-out labels.

use super::Pipeline;
use crate::plot::{render_scatter, CHART_TITLE};
use anyhow::{Context, Result};
use boostline_data::{
    align_predictions, parse_predictions, read_labels, AlignedPair, PartitionKind, RegressionMetrics,
    TEST_LABELS_FILE,
};
use boostline_platform::download_prefix;
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

const CHART_WIDTH: u16 = 72;
const CHART_HEIGHT: u16 = 24;

#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub title: &'static str,
    pub predictions_path: PathBuf,
    pub metrics: Option<RegressionMetrics>,
    pub pairs: Vec<AlignedPair>,
}

pub async fn execute(pipeline: &Pipeline, predictions: Option<&Path>, json: bool) -> Result<AnalysisReport> {
    let labels_path = pipeline.layout.file(TEST_LABELS_FILE);
    let labels = read_labels(&labels_path)
        .with_context(|| format!("Failed to read {}. Run 'boostline prepare' first.", labels_path.display()))?;

    let predictions_path = match predictions {
        Some(path) => path.to_path_buf(),
        None => fetch_predictions(pipeline).await?,
    };
    let text = std::fs::read_to_string(&predictions_path)
        .with_context(|| format!("Failed to read {}", predictions_path.display()))?;
    let values = parse_predictions(&text)?;
    let pairs = align_predictions(&labels, &values)
        .with_context(|| format!("{} does not line up with {}", predictions_path.display(), labels_path.display()))?;
    let metrics = RegressionMetrics::from_pairs(&pairs);

    info!(rows = pairs.len(), path = %predictions_path.display(), "Predictions aligned");
    let report = AnalysisReport { title: CHART_TITLE, predictions_path, metrics, pairs };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(report)
}

/// Downloads the transform output recorded in the manifest into the data directory.
async fn fetch_predictions(pipeline: &Pipeline) -> Result<PathBuf> {
    let mut manifest = pipeline.load_manifest()?;
    let output = manifest
        .transform_output
        .clone()
        .context("No transform output recorded. Run 'boostline transform' or pass --predictions.")?;

    let store = pipeline.config.platform.object_store();
    let root = pipeline.layout.root();
    download_prefix(store.as_ref(), &output, root)
        .await
        .with_context(|| format!("Failed to download {output}"))?;

    let path = pipeline.layout.predictions_path(PartitionKind::Test.file_name());
    manifest.predictions_path = Some(path.clone());
    pipeline.save_manifest(&mut manifest)?;
    Ok(path)
}

fn print_report(report: &AnalysisReport) {
    println!("{}", report.title.bold());
    println!("  Predictions: {}", report.predictions_path.display());
    match &report.metrics {
        Some(m) => {
            println!("  Rows: {}", m.count);
            println!("  MAE:  {:.4}", m.mae);
            println!("  RMSE: {:.4}", m.rmse);
            match m.r2 {
                Some(r2) => println!("  R²:   {:.4}", r2),
                None => println!("  R²:   {}", "n/a (constant labels)".dimmed()),
            }
        }
        None => println!("  {}", "No rows to compare".yellow()),
    }
    println!();
    for line in render_scatter(&report.pairs, CHART_WIDTH, CHART_HEIGHT) {
        println!("{line}");
    }
}
