use crate::error::{JobError, JobResult};
use crate::job::JobName;
use crate::uri::S3Uri;
use serde::{Deserialize, Serialize};

/// Request body for `CreateModel`: binds an inference image to trained weights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModelDescriptor {
    pub model_name: JobName,
    pub execution_role_arn: String,
    pub primary_container: ContainerDefinition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerDefinition {
    pub image: String,
    pub model_data_url: S3Uri,
}

impl ModelDescriptor {
    /// The model is named after the training job that produced it.
    pub fn for_training_job(
        training_job: &JobName,
        role_arn: &str,
        image: &str,
        artifacts: S3Uri,
    ) -> JobResult<Self> {
        let descriptor = Self {
            model_name: training_job.with_suffix("model")?,
            execution_role_arn: role_arn.to_string(),
            primary_container: ContainerDefinition { image: image.to_string(), model_data_url: artifacts },
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    pub fn validate(&self) -> JobResult<()> {
        JobName::check(self.model_name.as_str())?;
        if self.execution_role_arn.trim().is_empty() {
            return Err(JobError::InvalidDescriptor("execution_role_arn is required".to_string()));
        }
        if self.primary_container.image.trim().is_empty() {
            return Err(JobError::InvalidDescriptor("container image is required".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_named_after_training_job() {
        let job = JobName::new("boston-xgboost-2019-03-07-14-05-09").unwrap();
        let artifacts =
            S3Uri::parse("s3://b/boston-xgboost-LL/output/boston-xgboost-2019-03-07-14-05-09/output/model.tar.gz")
                .unwrap();
        let model = ModelDescriptor::for_training_job(&job, "arn:role", "img:1", artifacts).unwrap();

        let value = serde_json::to_value(&model).unwrap();
        assert_eq!(value["ModelName"], "boston-xgboost-2019-03-07-14-05-09-model");
        assert_eq!(value["ExecutionRoleArn"], "arn:role");
        assert_eq!(value["PrimaryContainer"]["Image"], "img:1");
        assert!(value["PrimaryContainer"]["ModelDataUrl"].as_str().unwrap().ends_with("model.tar.gz"));
    }
}
