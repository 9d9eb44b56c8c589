use crate::error::{JobError, JobResult};
use crate::job::JobName;
use crate::uri::S3Uri;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Request body for `CreateTrainingJob`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrainingJobDescriptor {
    pub training_job_name: JobName,
    pub role_arn: String,
    pub algorithm_specification: AlgorithmSpecification,
    pub input_data_config: Vec<Channel>,
    pub output_data_config: OutputDataConfig,
    pub resource_config: ResourceConfig,
    pub stopping_condition: StoppingCondition,
    /// The platform only accepts string values.
    pub hyper_parameters: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AlgorithmSpecification {
    pub training_image: String,
    pub training_input_mode: TrainingInputMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingInputMode {
    File,
    Pipe,
}

/// A named input channel, e.g. `train` or `validation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Channel {
    pub channel_name: String,
    pub data_source: DataSource,
    pub content_type: String,
    pub compression_type: CompressionType,
}

impl Channel {
    /// Uncompressed CSV under an object prefix, replicated to every instance.
    #[must_use]
    pub fn csv(name: &str, uri: S3Uri) -> Self {
        Self {
            channel_name: name.to_string(),
            data_source: DataSource::s3_prefix(uri, Some(S3DataDistribution::FullyReplicated)),
            content_type: "csv".to_string(),
            compression_type: CompressionType::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DataSource {
    pub s3_data_source: S3DataSource,
}

impl DataSource {
    #[must_use]
    pub fn s3_prefix(uri: S3Uri, distribution: Option<S3DataDistribution>) -> Self {
        Self {
            s3_data_source: S3DataSource {
                s3_data_type: S3DataType::S3Prefix,
                s3_uri: uri,
                s3_data_distribution_type: distribution,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct S3DataSource {
    pub s3_data_type: S3DataType,
    pub s3_uri: S3Uri,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_data_distribution_type: Option<S3DataDistribution>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum S3DataType {
    S3Prefix,
    ManifestFile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum S3DataDistribution {
    FullyReplicated,
    ShardedByS3Key,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionType {
    None,
    Gzip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutputDataConfig {
    pub s3_output_path: S3Uri,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceConfig {
    pub instance_count: u32,
    pub instance_type: String,
    #[serde(rename = "VolumeSizeInGB")]
    pub volume_size_in_gb: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StoppingCondition {
    pub max_runtime_in_seconds: u64,
}

impl TrainingJobDescriptor {
    /// Local checks run before submission. Anything that depends on remote
    /// state (quota, image reachability, existing objects) is left to the platform.
    pub fn validate(&self) -> JobResult<()> {
        JobName::check(self.training_job_name.as_str())?;
        if self.role_arn.trim().is_empty() {
            return Err(JobError::InvalidDescriptor("role_arn is required".to_string()));
        }
        if self.algorithm_specification.training_image.trim().is_empty() {
            return Err(JobError::InvalidDescriptor("training image is required".to_string()));
        }
        if self.input_data_config.is_empty() {
            return Err(JobError::InvalidDescriptor("at least one input channel is required".to_string()));
        }
        let mut names: Vec<&str> =
            self.input_data_config.iter().map(|c| c.channel_name.as_str()).collect();
        names.sort_unstable();
        if names.windows(2).any(|w| w[0] == w[1]) {
            return Err(JobError::InvalidDescriptor("channel names must be unique".to_string()));
        }
        if names.iter().any(|n| n.trim().is_empty()) {
            return Err(JobError::InvalidDescriptor("channel names must not be empty".to_string()));
        }
        if self.resource_config.instance_count == 0 {
            return Err(JobError::InvalidDescriptor("instance_count must be >= 1".to_string()));
        }
        if self.resource_config.volume_size_in_gb == 0 {
            return Err(JobError::InvalidDescriptor("volume_size_gb must be >= 1".to_string()));
        }
        if self.resource_config.instance_type.trim().is_empty() {
            return Err(JobError::InvalidDescriptor("instance_type is required".to_string()));
        }
        if self.stopping_condition.max_runtime_in_seconds == 0 {
            return Err(JobError::InvalidDescriptor("max_runtime_seconds must be > 0".to_string()));
        }
        if self.hyper_parameters.keys().any(|k| k.trim().is_empty()) {
            return Err(JobError::InvalidDescriptor("hyperparameter names must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Tunable parts of the training job, loaded from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingSettings {
    pub job_prefix: String,
    /// Overrides the built-in image lookup by region.
    pub training_image: Option<String>,
    pub instance_type: String,
    pub instance_count: u32,
    pub volume_size_gb: u32,
    pub max_runtime_seconds: u64,
    /// Overlaid on the built-in defaults key by key.
    #[serde(deserialize_with = "over_default_hyperparameters")]
    pub hyperparameters: BTreeMap<String, String>,
}

fn default_hyperparameters() -> BTreeMap<String, String> {
    [
        ("max_depth", "5"),
        ("eta", "0.2"),
        ("gamma", "4"),
        ("min_child_weight", "6"),
        ("subsample", "0.8"),
        ("objective", "reg:linear"),
        ("early_stopping_rounds", "10"),
        ("num_round", "200"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn over_default_hyperparameters<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = BTreeMap::<String, String>::deserialize(deserializer)?;
    let mut merged = default_hyperparameters();
    merged.extend(overrides);
    Ok(merged)
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            job_prefix: "boston-xgboost".to_string(),
            training_image: None,
            instance_type: "ml.m4.xlarge".to_string(),
            instance_count: 1,
            volume_size_gb: 5,
            max_runtime_seconds: 86_400,
            hyperparameters: default_hyperparameters(),
        }
    }
}

/// Run-specific values that complete a `TrainingSettings` into a descriptor.
#[derive(Debug, Clone)]
pub struct TrainingInputs {
    pub job_name: JobName,
    pub role_arn: String,
    pub image: String,
    pub train: S3Uri,
    pub validation: S3Uri,
    pub output: S3Uri,
}

impl TrainingSettings {
    pub fn descriptor(&self, inputs: TrainingInputs) -> JobResult<TrainingJobDescriptor> {
        let descriptor = TrainingJobDescriptor {
            training_job_name: inputs.job_name,
            role_arn: inputs.role_arn,
            algorithm_specification: AlgorithmSpecification {
                training_image: inputs.image,
                training_input_mode: TrainingInputMode::File,
            },
            input_data_config: vec![
                Channel::csv("train", inputs.train),
                Channel::csv("validation", inputs.validation),
            ],
            output_data_config: OutputDataConfig { s3_output_path: inputs.output },
            resource_config: ResourceConfig {
                instance_count: self.instance_count,
                instance_type: self.instance_type.clone(),
                volume_size_in_gb: self.volume_size_gb,
            },
            stopping_condition: StoppingCondition { max_runtime_in_seconds: self.max_runtime_seconds },
            hyper_parameters: self.hyperparameters.clone(),
        };
        descriptor.validate()?;
        Ok(descriptor)
    }
}
