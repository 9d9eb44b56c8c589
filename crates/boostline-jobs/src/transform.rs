use crate::error::{JobError, JobResult};
use crate::job::JobName;
use crate::training::{CompressionType, DataSource};
use crate::uri::S3Uri;
use serde::{Deserialize, Serialize};

/// Request body for `CreateTransformJob`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransformJobDescriptor {
    pub transform_job_name: JobName,
    pub model_name: JobName,
    pub max_concurrent_transforms: u32,
    #[serde(rename = "MaxPayloadInMB")]
    pub max_payload_in_mb: u32,
    pub batch_strategy: BatchStrategy,
    pub transform_input: TransformInput,
    pub transform_output: TransformOutput,
    pub transform_resources: TransformResources,
}

/// How many input records go into one inference request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchStrategy {
    MultiRecord,
    SingleRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransformInput {
    pub data_source: DataSource,
    pub content_type: String,
    pub split_type: SplitType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression_type: Option<CompressionType>,
}

/// Record boundaries inside an input object. `Line` makes every line one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitType {
    None,
    Line,
    #[serde(rename = "RecordIO")]
    RecordIo,
    #[serde(rename = "TFRecord")]
    TfRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransformOutput {
    pub s3_output_path: S3Uri,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assemble_with: Option<AssembleWith>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssembleWith {
    None,
    Line,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransformResources {
    pub instance_type: String,
    pub instance_count: u32,
}

impl TransformJobDescriptor {
    pub fn validate(&self) -> JobResult<()> {
        JobName::check(self.transform_job_name.as_str())?;
        JobName::check(self.model_name.as_str())?;
        if self.max_concurrent_transforms == 0 {
            return Err(JobError::InvalidDescriptor("max_concurrent_transforms must be >= 1".to_string()));
        }
        if self.max_payload_in_mb == 0 {
            return Err(JobError::InvalidDescriptor("max_payload_mb must be >= 1".to_string()));
        }
        if self.transform_resources.instance_count == 0 {
            return Err(JobError::InvalidDescriptor("instance_count must be >= 1".to_string()));
        }
        if self.transform_resources.instance_type.trim().is_empty() {
            return Err(JobError::InvalidDescriptor("instance_type is required".to_string()));
        }
        if self.transform_input.content_type.trim().is_empty() {
            return Err(JobError::InvalidDescriptor("input content_type is required".to_string()));
        }
        Ok(())
    }

    /// Where the platform writes `<input-name>.out` for the given input object.
    #[must_use]
    pub fn output_for(&self, input: &S3Uri) -> Option<S3Uri> {
        input
            .file_name()
            .map(|name| self.transform_output.s3_output_path.join(&format!("{name}.out")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformSettings {
    pub job_prefix: String,
    pub instance_type: String,
    pub instance_count: u32,
    pub max_concurrent_transforms: u32,
    pub max_payload_mb: u32,
    pub batch_strategy: BatchStrategy,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            job_prefix: "boston-xgboost-batch-transform".to_string(),
            instance_type: "ml.m4.xlarge".to_string(),
            instance_count: 1,
            max_concurrent_transforms: 1,
            max_payload_mb: 6,
            batch_strategy: BatchStrategy::MultiRecord,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransformInputs {
    pub job_name: JobName,
    pub model_name: JobName,
    pub input: S3Uri,
    pub output: S3Uri,
}

impl TransformSettings {
    /// CSV input split on lines, so every test row is scored independently.
    pub fn descriptor(&self, inputs: TransformInputs) -> JobResult<TransformJobDescriptor> {
        let descriptor = TransformJobDescriptor {
            transform_job_name: inputs.job_name,
            model_name: inputs.model_name,
            max_concurrent_transforms: self.max_concurrent_transforms,
            max_payload_in_mb: self.max_payload_mb,
            batch_strategy: self.batch_strategy,
            transform_input: TransformInput {
                data_source: DataSource::s3_prefix(inputs.input, None),
                content_type: "text/csv".to_string(),
                split_type: SplitType::Line,
                compression_type: None,
            },
            transform_output: TransformOutput {
                s3_output_path: inputs.output.as_prefix(),
                accept: None,
                assemble_with: None,
            },
            transform_resources: TransformResources {
                instance_type: self.instance_type.clone(),
                instance_count: self.instance_count,
            },
        };
        descriptor.validate()?;
        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn inputs() -> TransformInputs {
        TransformInputs {
            job_name: JobName::new("boston-xgboost-batch-transform-2019-03-07-14-30-00").unwrap(),
            model_name: JobName::new("boston-xgboost-2019-03-07-14-05-09-model").unwrap(),
            input: S3Uri::parse("s3://bucket/boston-xgboost-LL/test.csv").unwrap(),
            output: S3Uri::parse("s3://bucket/boston-xgboost-LL/batch-transform").unwrap(),
        }
    }

    #[test]
    fn test_descriptor_wire_shape() {
        let descriptor = TransformSettings::default().descriptor(inputs()).unwrap();
        let value = serde_json::to_value(&descriptor).unwrap();

        assert_eq!(value["MaxConcurrentTransforms"], 1);
        assert_eq!(value["MaxPayloadInMB"], 6);
        assert_eq!(value["BatchStrategy"], "MultiRecord");
        assert_eq!(
            value["TransformInput"],
            json!({
                "DataSource": {"S3DataSource": {
                    "S3DataType": "S3Prefix",
                    "S3Uri": "s3://bucket/boston-xgboost-LL/test.csv"
                }},
                "ContentType": "text/csv",
                "SplitType": "Line"
            })
        );
        assert_eq!(
            value["TransformOutput"]["S3OutputPath"],
            "s3://bucket/boston-xgboost-LL/batch-transform/"
        );
        assert_eq!(value["TransformResources"]["InstanceCount"], 1);
    }

    #[test]
    fn test_output_for_input_object() {
        let descriptor = TransformSettings::default().descriptor(inputs()).unwrap();
        let input = S3Uri::parse("s3://bucket/boston-xgboost-LL/test.csv").unwrap();
        assert_eq!(
            descriptor.output_for(&input).unwrap().to_string(),
            "s3://bucket/boston-xgboost-LL/batch-transform/test.csv.out"
        );
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let settings = TransformSettings { max_payload_mb: 0, ..Default::default() };
        assert!(settings.descriptor(inputs()).is_err());
    }
}
