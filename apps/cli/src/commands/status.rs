//! `boostline status`: describe the jobs recorded in the run manifest.

use super::Pipeline;
use anyhow::{Context, Result};
use boostline_jobs::{JobStatus, RunManifest, TrainingJobDescription, TransformJobDescription};
use colored::Colorize;
use serde::Serialize;

#[derive(Debug, Default, Serialize)]
pub struct StatusReport {
    pub training: Option<TrainingJobDescription>,
    pub model: Option<String>,
    pub transform: Option<TransformJobDescription>,
}

pub async fn execute(pipeline: &Pipeline, json: bool) -> Result<StatusReport> {
    let mut manifest = pipeline.load_manifest()?;
    let service = pipeline.config.platform.job_service();
    let mut report = StatusReport { model: manifest.model.as_ref().map(|m| m.name.to_string()), ..Default::default() };

    if let Some(record) = manifest.training.as_mut() {
        let description = service
            .describe_training_job(&record.handle.name)
            .await
            .with_context(|| format!("Failed to describe training job {}", record.handle.name))?;
        record.last_status = Some(description.training_job_status);
        report.training = Some(description);
    }
    if let Some(record) = manifest.transform.as_mut() {
        let description = service
            .describe_transform_job(&record.handle.name)
            .await
            .with_context(|| format!("Failed to describe transform job {}", record.handle.name))?;
        record.last_status = Some(description.transform_job_status);
        report.transform = Some(description);
    }
    if manifest.training.is_some() || manifest.transform.is_some() {
        pipeline.save_manifest(&mut manifest)?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&manifest, &report);
    }
    Ok(report)
}

fn colored_status(status: JobStatus) -> colored::ColoredString {
    match status {
        JobStatus::Completed => status.to_string().green(),
        JobStatus::Failed | JobStatus::Stopped => status.to_string().red(),
        JobStatus::InProgress | JobStatus::Stopping => status.to_string().yellow(),
    }
}

fn print_report(manifest: &RunManifest, report: &StatusReport) {
    if let Some(split) = &manifest.split {
        println!(
            "{:<10} train {}, validation {}, test {}",
            "Split".bold(),
            split.train,
            split.validation,
            split.test
        );
    }
    match &report.training {
        Some(job) => {
            println!("{:<10} {} {}", "Training".bold(), job.training_job_name, colored_status(job.training_job_status));
            if let Some(secondary) = &job.secondary_status {
                println!("{:<10} {}", "", secondary.dimmed());
            }
            if let Some(reason) = &job.failure_reason {
                println!("{:<10} {}", "", reason.red());
            }
        }
        None => println!("{:<10} {}", "Training".bold(), "not submitted".dimmed()),
    }
    match &report.model {
        Some(name) => println!("{:<10} {}", "Model".bold(), name),
        None => println!("{:<10} {}", "Model".bold(), "not registered".dimmed()),
    }
    match &report.transform {
        Some(job) => {
            println!(
                "{:<10} {} {}",
                "Transform".bold(),
                job.transform_job_name,
                colored_status(job.transform_job_status)
            );
            if let Some(reason) = &job.failure_reason {
                println!("{:<10} {}", "", reason.red());
            }
        }
        None => println!("{:<10} {}", "Transform".bold(), "not submitted".dimmed()),
    }
}
