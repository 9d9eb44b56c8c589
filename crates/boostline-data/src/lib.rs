//! Boostline Data
//!
//! Local data handling for the tabular training pipeline:
//! - Loading a labelled tabular dataset (`Dataset`, `Record`)
//! - Splitting it into train/validation/test partitions
//! - Serializing partitions in the delimited layout the training container expects
//! - Aligning downloaded predictions with held-out labels

pub mod analysis;
pub mod dataset;
pub mod error;
pub mod serialize;
pub mod split;

pub use analysis::{align_predictions, parse_predictions, AlignedPair, RegressionMetrics};
pub use dataset::{load_dataset, parse_dataset, Dataset, DatasetSource, Record};
pub use error::{DataError, DataResult};
pub use serialize::{
    format_line, read_labelled, read_labels, read_unlabelled, write_labels, write_partition,
    PartitionFiles, TEST_LABELS_FILE,
};
pub use split::{split_dataset, Partition, PartitionKind, SplitDataset, SplitOptions};
