//! `boostline train`: submit the training job and follow it to completion.

use super::{job_context, status_of, Pipeline};
use anyhow::{Context, Result};
use boostline_data::PartitionKind;
use boostline_jobs::{JobName, JobRecord, JobStatus, TrainingInputs, TrainingJobDescription};
use boostline_platform::{submit_training_job, wait_for_training_job};
use chrono::Utc;
use colored::Colorize;
use tracing::info;

/// Returns the final description, or `None` with `--no-wait`.
pub async fn execute(pipeline: &Pipeline, no_wait: bool, json: bool) -> Result<Option<TrainingJobDescription>> {
    let config = &pipeline.config;
    let mut manifest = pipeline.load_manifest()?;

    let train = manifest.staged_uri(PartitionKind::Train.file_name())?.clone();
    let validation = manifest.staged_uri(PartitionKind::Validation.file_name())?.clone();
    let prefix = config.platform.upload_prefix()?;

    let descriptor = config.training.descriptor(TrainingInputs {
        job_name: JobName::now(&config.training.job_prefix)?,
        role_arn: config.platform.role_arn()?.to_string(),
        image: config.training_image()?,
        train,
        validation,
        output: prefix.join("output"),
    })?;

    let service = config.platform.job_service();
    let progress = Pipeline::progress_sink(json);
    let handle = submit_training_job(service.as_ref(), &descriptor, progress.as_ref())
        .await
        .context("Failed to submit training job")?;

    manifest.training = Some(JobRecord {
        handle: handle.clone(),
        submitted_at: Utc::now(),
        last_status: Some(JobStatus::InProgress),
    });
    manifest.model_artifacts = None;
    manifest.model = None;
    manifest.transform = None;
    manifest.transform_output = None;
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
    let outcome = wait_for_training_job(service.as_ref(), &handle.name, &options, progress.as_ref()).await;

    let status = match &outcome {
        Ok(description) => Some(description.training_job_status),
        Err(e) => status_of(e),
    };
    if let Some(record) = manifest.training.as_mut() {
        record.last_status = status.or(record.last_status);
    }
    if let Ok(description) = &outcome {
        manifest.model_artifacts = description.model_artifacts.as_ref().map(|a| a.s3_model_artifacts.clone());
    }
    pipeline.save_manifest(&mut manifest)?;

    let description = outcome.with_context(|| job_context(handle.kind, &handle.name))?;
    info!(job = %handle.name, artifacts = ?manifest.model_artifacts, "Training finished");

    if json {
        println!("{}", serde_json::to_string_pretty(&description)?);
    } else {
        println!("{} Training job {} completed", "✓".green(), handle.name.to_string().bold());
        if let Some(artifacts) = &manifest.model_artifacts {
            println!("  Model artifacts: {}", artifacts.to_string().cyan());
        }
    }
    Ok(Some(description))
}
