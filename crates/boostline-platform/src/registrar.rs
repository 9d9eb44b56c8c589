use crate::error::{PlatformError, PlatformResult};
use crate::service::JobService;
use crate::waiter::ensure_completed;
use boostline_jobs::{JobName, ModelDescriptor, ModelRecord, TrainingJobDescription};
use tracing::info;

/// Registers the artifact of a completed training job as a model named
/// `<training-job>-model`.
///
/// Jobs that are still running or ended without success are rejected before
/// any remote call.
pub async fn register_model(
    service: &dyn JobService,
    training: &TrainingJobDescription,
    role_arn: &str,
    image: &str,
) -> PlatformResult<ModelRecord> {
    ensure_completed(training)?;

    let artifacts = training
        .model_artifacts
        .as_ref()
        .map(|a| a.s3_model_artifacts.clone())
        .ok_or_else(|| {
            PlatformError::UnexpectedResponse(format!(
                "training job {} completed without model artifacts",
                training.training_job_name
            ))
        })?;

    let job_name = JobName::new(training.training_job_name.clone())?;
    let descriptor = ModelDescriptor::for_training_job(&job_name, role_arn, image, artifacts.clone())?;
    let arn = service.create_model(&descriptor).await?;

    info!(model = %descriptor.model_name, arn = %arn, artifacts = %artifacts, "Model registered");
    Ok(ModelRecord { name: descriptor.model_name, arn, image: image.to_string(), artifacts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waiter::tests::{training, ScriptedService};
    use boostline_jobs::JobStatus;

    #[tokio::test]
    async fn test_registers_completed_job() {
        let service = ScriptedService::default();
        let record = register_model(&service, &training(JobStatus::Completed, &[]), "arn:role", "img:1")
            .await
            .unwrap();

        assert_eq!(record.name.as_str(), "job-1-model");
        assert_eq!(record.arn, "arn:model/job-1-model");
        assert!(record.artifacts.key().ends_with("model.tar.gz"));
    }

    #[tokio::test]
    async fn test_running_job_is_not_registered() {
        let service = ScriptedService::default();
        let err = register_model(&service, &training(JobStatus::InProgress, &[]), "arn:role", "img:1")
            .await
            .unwrap_err();

        assert!(matches!(err, PlatformError::StillRunning { .. }));
        assert!(service.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_completed_without_artifacts_is_unexpected() {
        let service = ScriptedService::default();
        let mut desc = training(JobStatus::Completed, &[]);
        desc.model_artifacts = None;

        let err = register_model(&service, &desc, "arn:role", "img:1").await.unwrap_err();
        assert!(matches!(err, PlatformError::UnexpectedResponse(_)));
    }
}
