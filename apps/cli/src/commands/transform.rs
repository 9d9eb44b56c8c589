//! `boostline transform`: score the test partition with a batch transform job.

use super::{job_context, status_of, Pipeline};
use anyhow::{Context, Result};
use boostline_data::PartitionKind;
use boostline_jobs::{JobName, JobRecord, JobStatus, TransformInputs, TransformJobDescription};
use boostline_platform::{submit_transform_job, wait_for_transform_job};
use chrono::Utc;
use colored::Colorize;
use tracing::info;

pub async fn execute(pipeline: &Pipeline, no_wait: bool, json: bool) -> Result<Option<TransformJobDescription>> {
    let config = &pipeline.config;
    let mut manifest = pipeline.load_manifest()?;

    let model = manifest.registered_model()?.name.clone();
    let input = manifest.staged_uri(PartitionKind::Test.file_name())?.clone();
    let prefix = config.platform.upload_prefix()?;

    let descriptor = config.transform.descriptor(TransformInputs {
        job_name: JobName::now(&config.transform.job_prefix)?,
        model_name: model,
        input: input.clone(),
        output: prefix.join("batch-transform"),
    })?;

    let service = config.platform.job_service();
    let progress = Pipeline::progress_sink(json);
    let handle = submit_transform_job(service.as_ref(), &descriptor, progress.as_ref())
        .await
        .context("Failed to submit transform job")?;

    manifest.transform = Some(JobRecord {
        handle: handle.clone(),
        submitted_at: Utc::now(),
        last_status: Some(JobStatus::InProgress),
    });
    manifest.transform_output = descriptor.output_for(&input);
    manifest.predictions_path = None;
    pipeline.save_manifest(&mut manifest)?;

    if no_wait {
        if json {
            println!("{}", serde_json::to_string_pretty(&handle)?);
        } else {
            println!("{} Submitted {} (not waiting)", "→".cyan(), handle.name.to_string().bold());
        }
        return Ok(None);
    }

    let options = config.polling.wait_options();
    let outcome = wait_for_transform_job(service.as_ref(), &handle.name, &options, progress.as_ref()).await;

    let status = match &outcome {
        Ok(description) => Some(description.transform_job_status),
        Err(e) => status_of(e),
    };
    if let Some(record) = manifest.transform.as_mut() {
        record.last_status = status.or(record.last_status);
    }
    pipeline.save_manifest(&mut manifest)?;

    let description = outcome.with_context(|| job_context(handle.kind, &handle.name))?;
    info!(job = %handle.name, output = ?manifest.transform_output, "Transform finished");

    if json {
        println!("{}", serde_json::to_string_pretty(&description)?);
    } else {
        println!("{} Transform job {} completed", "✓".green(), handle.name.to_string().bold());
        if let Some(output) = &manifest.transform_output {
            println!("  Predictions: {}", output.to_string().cyan());
        }
    }
    Ok(Some(description))
}
