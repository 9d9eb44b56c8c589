use crate::error::PlatformResult;
use crate::service::JobService;
use boostline_jobs::{
    JobHandle, JobKind, ProgressEvent, ProgressSink, TrainingJobDescriptor, TransformJobDescriptor,
};
use tracing::info;

/// Validates locally, then calls `CreateTrainingJob`. The job runs remotely
/// regardless of what happens to this process afterwards.
pub async fn submit_training_job(
    service: &dyn JobService,
    descriptor: &TrainingJobDescriptor,
    progress: &dyn ProgressSink,
) -> PlatformResult<JobHandle> {
    descriptor.validate()?;

    let arn = service.create_training_job(descriptor).await?;
    let handle = JobHandle { kind: JobKind::Training, name: descriptor.training_job_name.clone(), arn };
    info!(
        job = %handle.name,
        arn = %handle.arn,
        instance_type = %descriptor.resource_config.instance_type,
        instance_count = descriptor.resource_config.instance_count,
        "Training job submitted"
    );
    progress.on_event(ProgressEvent::Submitted {
        kind: handle.kind,
        job_name: handle.name.clone(),
        arn: handle.arn.clone(),
    });
    Ok(handle)
}

/// Validates locally, then calls `CreateTransformJob`.
pub async fn submit_transform_job(
    service: &dyn JobService,
    descriptor: &TransformJobDescriptor,
    progress: &dyn ProgressSink,
) -> PlatformResult<JobHandle> {
    descriptor.validate()?;

    let arn = service.create_transform_job(descriptor).await?;
    let handle = JobHandle { kind: JobKind::Transform, name: descriptor.transform_job_name.clone(), arn };
    info!(
        job = %handle.name,
        arn = %handle.arn,
        model = %descriptor.model_name,
        max_concurrent = descriptor.max_concurrent_transforms,
        max_payload_mb = descriptor.max_payload_in_mb,
        "Transform job submitted"
    );
    progress.on_event(ProgressEvent::Submitted {
        kind: handle.kind,
        job_name: handle.name.clone(),
        arn: handle.arn.clone(),
    });
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlatformError;
    use crate::waiter::tests::{CollectingSink, ScriptedService};
    use boostline_jobs::{JobName, S3Uri, TrainingInputs, TrainingSettings};

    fn descriptor() -> TrainingJobDescriptor {
        TrainingSettings::default()
            .descriptor(TrainingInputs {
                job_name: JobName::new("job-1").unwrap(),
                role_arn: "arn:role".to_string(),
                image: "img:1".to_string(),
                train: S3Uri::parse("s3://b/p/train.csv").unwrap(),
                validation: S3Uri::parse("s3://b/p/validation.csv").unwrap(),
                output: S3Uri::parse("s3://b/p/output").unwrap(),
            })
            .unwrap()
    }

    #[tokio::test]
    async fn test_submit_returns_handle_and_reports() {
        let service = ScriptedService::default();
        let sink = CollectingSink::default();

        let handle = submit_training_job(&service, &descriptor(), &sink).await.unwrap();
        assert_eq!(handle.arn, "arn:training/job-1");
        assert_eq!(handle.kind, JobKind::Training);
        assert!(matches!(sink.0.lock().unwrap()[0], ProgressEvent::Submitted { .. }));
    }

    #[tokio::test]
    async fn test_invalid_descriptor_never_reaches_the_platform() {
        let service = ScriptedService::default();
        let mut bad = descriptor();
        bad.input_data_config.clear();

        let err = submit_training_job(&service, &bad, &CollectingSink::default()).await.unwrap_err();
        assert!(matches!(err, PlatformError::Validation(_)));
        assert!(service.created.lock().unwrap().is_empty());
    }
}
