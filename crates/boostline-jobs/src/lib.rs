//! Boostline Jobs
//!
//! Typed descriptions of the remote work the pipeline submits:
//! - Training, model and batch-transform descriptors in the platform's wire shape
//! - Timestamped job names and object-store locations
//! - Job status snapshots and progress reporting
//! - The run manifest that carries results from one stage to the next

pub mod error;
pub mod image;
pub mod job;
pub mod layout;
pub mod manifest;
pub mod model;
pub mod progress;
pub mod status;
pub mod training;
pub mod transform;
pub mod uri;

pub use error::{JobError, JobResult};
pub use image::builtin_image_uri;
pub use job::{JobHandle, JobKind, JobName};
pub use layout::DataLayout;
pub use manifest::{sha256_file, stage_file, JobRecord, ModelRecord, RunManifest, SplitSummary, StagedFile};
pub use model::{ContainerDefinition, ModelDescriptor};
pub use progress::{ProgressEvent, ProgressSink, StdoutProgressSink};
pub use status::{
    JobStatus, ModelArtifacts, SecondaryStatusTransition, TrackedJob, TrainingJobDescription,
    TransformJobDescription,
};
pub use training::{
    AlgorithmSpecification, Channel, CompressionType, DataSource, OutputDataConfig, ResourceConfig,
    S3DataDistribution, S3DataSource, S3DataType, StoppingCondition, TrainingInputMode,
    TrainingInputs, TrainingJobDescriptor, TrainingSettings,
};
pub use transform::{
    AssembleWith, BatchStrategy, SplitType, TransformInput, TransformInputs, TransformJobDescriptor,
    TransformOutput, TransformResources, TransformSettings,
};
pub use uri::S3Uri;
