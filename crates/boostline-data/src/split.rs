use crate::dataset::{Dataset, Record};
use crate::error::{DataError, DataResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionKind {
    Train,
    Validation,
    Test,
}

impl PartitionKind {
    /// Train and validation lines carry the target; test lines do not.
    #[must_use]
    pub fn is_labelled(self) -> bool {
        !matches!(self, Self::Test)
    }

    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Train => "train.csv",
            Self::Validation => "validation.csv",
            Self::Test => "test.csv",
        }
    }
}

impl std::fmt::Display for PartitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Train => f.write_str("train"),
            Self::Validation => f.write_str("validation"),
            Self::Test => f.write_str("test"),
        }
    }
}

/// An ordered, disjoint subset of the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub kind: PartitionKind,
    pub records: Vec<Record>,
    /// Position of each record in the source dataset.
    pub row_indices: Vec<usize>,
}

impl Partition {
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn targets(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.target).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitOptions {
    /// Fraction of the whole dataset held out for testing.
    pub test_fraction: f64,
    /// Fraction of the remaining rows held out for validation.
    pub validation_fraction: f64,
    /// `None` draws a fresh seed from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self { test_fraction: 0.33, validation_fraction: 0.33, seed: None }
    }
}

impl SplitOptions {
    pub fn validate(&self) -> DataResult<()> {
        for (name, value) in
            [("test_fraction", self.test_fraction), ("validation_fraction", self.validation_fraction)]
        {
            if !value.is_finite() || !(0.0..1.0).contains(&value) {
                return Err(DataError::Split(format!("{name} must be in [0, 1), got {value}")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SplitDataset {
    pub train: Partition,
    pub validation: Partition,
    pub test: Partition,
}

impl SplitDataset {
    #[must_use]
    pub fn partitions(&self) -> [&Partition; 3] {
        [&self.train, &self.validation, &self.test]
    }
}

/// Number of rows a held-out fraction takes from `n`, rounding up.
fn holdout_count(n: usize, fraction: f64) -> usize {
    // Tolerance keeps products like 100 * 0.3 from rounding up an extra row.
    let raw = (n as f64).mul_add(fraction, -1e-9).ceil();
    (raw.max(0.0) as usize).min(n)
}

/// Carves `test_fraction` off the whole dataset, then `validation_fraction` off
/// what remains. Every source row lands in exactly one partition.
pub fn split_dataset(dataset: &Dataset, options: &SplitOptions) -> DataResult<SplitDataset> {
    options.validate()?;

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let total = dataset.len();
    let mut order: Vec<usize> = (0..total).collect();
    order.shuffle(&mut rng);

    let n_test = holdout_count(total, options.test_fraction);
    let mut remaining = order.split_off(n_test);
    let test_idx = order;

    remaining.shuffle(&mut rng);
    let n_val = holdout_count(remaining.len(), options.validation_fraction);
    let train_idx = remaining.split_off(n_val);
    let val_idx = remaining;

    if train_idx.is_empty() {
        return Err(DataError::Split(format!(
            "{total} rows leave no training rows at test_fraction={} validation_fraction={}",
            options.test_fraction, options.validation_fraction
        )));
    }

    let take = |kind: PartitionKind, indices: Vec<usize>| Partition {
        kind,
        records: indices.iter().map(|&i| dataset.records[i].clone()).collect(),
        row_indices: indices,
    };

    let split = SplitDataset {
        train: take(PartitionKind::Train, train_idx),
        validation: take(PartitionKind::Validation, val_idx),
        test: take(PartitionKind::Test, test_idx),
    };

    debug!(
        train = split.train.len(),
        validation = split.validation.len(),
        test = split.test.len(),
        seeded = options.seed.is_some(),
        "Dataset split"
    );

    Ok(split)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(rows: usize, features: usize) -> Dataset {
        Dataset {
            feature_names: (0..features).map(|i| format!("f{i}")).collect(),
            target_name: "y".to_string(),
            records: (0..rows)
                .map(|r| Record {
                    features: (0..features).map(|c| (r * features + c) as f64).collect(),
                    target: r as f64,
                })
                .collect(),
        }
    }

    #[test]
    fn test_split_sizes_match_reference_run() {
        let ds = dataset(506, 13);
        let split = split_dataset(&ds, &SplitOptions::default()).unwrap();
        assert_eq!(split.test.len(), 167);
        assert_eq!(split.validation.len(), 112);
        assert_eq!(split.train.len(), 227);
    }

    #[test]
    fn test_every_row_lands_in_exactly_one_partition() {
        let ds = dataset(97, 3);
        let split = split_dataset(&ds, &SplitOptions { seed: Some(7), ..Default::default() }).unwrap();

        let mut seen: Vec<usize> =
            split.partitions().iter().flat_map(|p| p.row_indices.iter().copied()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..97).collect::<Vec<_>>());

        for partition in split.partitions() {
            for (record, &idx) in partition.records.iter().zip(&partition.row_indices) {
                assert_eq!(record, &ds.records[idx]);
            }
        }
    }

    #[test]
    fn test_same_seed_gives_same_partitions() {
        let ds = dataset(50, 2);
        let options = SplitOptions { seed: Some(42), ..Default::default() };
        let a = split_dataset(&ds, &options).unwrap();
        let b = split_dataset(&ds, &options).unwrap();
        assert_eq!(a.train.row_indices, b.train.row_indices);
        assert_eq!(a.validation.row_indices, b.validation.row_indices);
        assert_eq!(a.test.row_indices, b.test.row_indices);
    }

    #[test]
    fn test_holdout_count_rounds_up() {
        assert_eq!(holdout_count(506, 0.33), 167);
        assert_eq!(holdout_count(339, 0.33), 112);
        assert_eq!(holdout_count(100, 0.3), 30);
        assert_eq!(holdout_count(10, 0.0), 0);
    }

    #[test]
    fn test_rejects_out_of_range_fraction() {
        let ds = dataset(10, 1);
        let options = SplitOptions { test_fraction: 1.5, ..Default::default() };
        assert!(matches!(split_dataset(&ds, &options), Err(DataError::Split(_))));
    }

    #[test]
    fn test_rejects_dataset_too_small_for_training_rows() {
        let ds = dataset(1, 1);
        let err = split_dataset(&ds, &SplitOptions::default()).unwrap_err();
        assert!(matches!(err, DataError::Split(_)));
    }
}
