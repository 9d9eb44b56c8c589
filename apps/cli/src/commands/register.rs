//! `boostline register`: create a model from the last training job.

use super::Pipeline;
use anyhow::{Context, Result};
use boostline_jobs::ModelRecord;
use boostline_platform::register_model;
use colored::Colorize;

pub async fn execute(pipeline: &Pipeline) -> Result<ModelRecord> {
    let config = &pipeline.config;
    let mut manifest = pipeline.load_manifest()?;
    let job = manifest.training_job()?.handle.name.clone();

    let service = config.platform.job_service();
    let description = service
        .describe_training_job(&job)
        .await
        .with_context(|| format!("Failed to describe training job {job}"))?;

    let record = register_model(service.as_ref(), &description, config.platform.role_arn()?, &config.training_image()?)
        .await
        .with_context(|| format!("Failed to register a model for {job}"))?;

    if let Some(training) = manifest.training.as_mut() {
        training.last_status = Some(description.training_job_status);
    }
    manifest.model_artifacts = Some(record.artifacts.clone());
    manifest.model = Some(record.clone());
    pipeline.save_manifest(&mut manifest)?;

    println!("{} Registered model {} ({})", "✓".green(), record.name.to_string().bold(), record.arn);
    Ok(record)
}
