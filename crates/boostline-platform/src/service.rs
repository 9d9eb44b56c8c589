use crate::error::PlatformResult;
use async_trait::async_trait;
use boostline_jobs::{
    JobName, ModelDescriptor, TrainingJobDescription, TrainingJobDescriptor, TransformJobDescription,
    TransformJobDescriptor,
};

/// The platform's job-submission API.
///
/// Create calls return the ARN the platform assigns. Implementations do no
/// validation of their own; callers validate descriptors first.
#[async_trait]
pub trait JobService: Send + Sync {
    async fn create_training_job(&self, descriptor: &TrainingJobDescriptor) -> PlatformResult<String>;

    async fn describe_training_job(&self, name: &JobName) -> PlatformResult<TrainingJobDescription>;

    async fn create_model(&self, descriptor: &ModelDescriptor) -> PlatformResult<String>;

    async fn create_transform_job(&self, descriptor: &TransformJobDescriptor) -> PlatformResult<String>;

    async fn describe_transform_job(&self, name: &JobName) -> PlatformResult<TransformJobDescription>;
}
