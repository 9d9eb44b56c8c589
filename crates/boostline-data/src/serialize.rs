//! Headerless delimited text in the layout the training container reads:
//! `target,f1,...,fn` for supervised channels and `f1,...,fn` for inference input.

use crate::dataset::Record;
use crate::error::{DataError, DataResult};
use crate::split::{Partition, PartitionKind, SplitDataset};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File holding the held-out test targets, one per line, in test-file order.
pub const TEST_LABELS_FILE: &str = "test_labels.csv";

/// Local paths written for one split.
#[derive(Debug, Clone)]
pub struct PartitionFiles {
    pub train: PathBuf,
    pub validation: PathBuf,
    pub test: PathBuf,
    pub test_labels: PathBuf,
}

impl PartitionFiles {
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            train: dir.join(PartitionKind::Train.file_name()),
            validation: dir.join(PartitionKind::Validation.file_name()),
            test: dir.join(PartitionKind::Test.file_name()),
            test_labels: dir.join(TEST_LABELS_FILE),
        }
    }

    /// Writes all three partitions plus the held-out labels into `dir`.
    pub fn write_all(dir: &Path, split: &SplitDataset) -> DataResult<Self> {
        std::fs::create_dir_all(dir)?;
        let files = Self::in_dir(dir);
        write_partition(&files.test, &split.test)?;
        write_partition(&files.validation, &split.validation)?;
        write_partition(&files.train, &split.train)?;
        write_labels(&files.test_labels, &split.test.targets())?;
        Ok(files)
    }
}

fn fields(record: &Record, kind: PartitionKind) -> Vec<String> {
    let mut out = Vec::with_capacity(record.features.len() + 1);
    if kind.is_labelled() {
        out.push(record.target.to_string());
    }
    // Display for f64 is the shortest text that parses back to the same value.
    out.extend(record.features.iter().map(f64::to_string));
    out
}

/// Renders one record as it appears in a partition file, without the newline.
#[must_use]
pub fn format_line(record: &Record, kind: PartitionKind) -> String {
    fields(record, kind).join(",")
}

pub fn write_partition(path: &Path, partition: &Partition) -> DataResult<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    for record in &partition.records {
        writer.write_record(fields(record, partition.kind))?;
    }
    writer.flush()?;

    debug!(path = %path.display(), kind = %partition.kind, rows = partition.len(), "Wrote partition");
    Ok(())
}

fn read_rows(path: &Path) -> DataResult<Vec<Vec<f64>>> {
    let mut reader = csv::ReaderBuilder::new().has_headers(false).from_path(path)?;
    let mut rows = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        let row = row?;
        let values = row
            .iter()
            .map(|field| {
                field.trim().parse::<f64>().map_err(|e| DataError::Parse {
                    what: path.display().to_string(),
                    line: idx + 1,
                    message: e.to_string(),
                })
            })
            .collect::<DataResult<Vec<f64>>>()?;
        rows.push(values);
    }
    Ok(rows)
}

/// Reads a train or validation file back into records (target first).
pub fn read_labelled(path: &Path) -> DataResult<Vec<Record>> {
    read_rows(path)?
        .into_iter()
        .enumerate()
        .map(|(idx, mut values)| {
            if values.is_empty() {
                return Err(DataError::Shape(format!("{} line {} is empty", path.display(), idx + 1)));
            }
            let target = values.remove(0);
            Ok(Record { features: values, target })
        })
        .collect()
}

/// Reads a test file back into bare feature vectors.
pub fn read_unlabelled(path: &Path) -> DataResult<Vec<Vec<f64>>> {
    read_rows(path)
}

pub fn write_labels(path: &Path, labels: &[f64]) -> DataResult<()> {
    let mut out = String::with_capacity(labels.len() * 8);
    for label in labels {
        out.push_str(&label.to_string());
        out.push('\n');
    }
    std::fs::write(path, out)?;
    Ok(())
}

pub fn read_labels(path: &Path) -> DataResult<Vec<f64>> {
    let text = std::fs::read_to_string(path)?;
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            line.trim().parse::<f64>().map_err(|e| DataError::Parse {
                what: path.display().to_string(),
                line: idx + 1,
                message: e.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::split::{split_dataset, SplitOptions};
    use tempfile::TempDir;

    fn record() -> Record {
        Record { features: vec![0.00632, 18.0, 2.31, 0.1 + 0.2, 1e-7], target: 24.0 }
    }

    #[test]
    fn test_labelled_lines_put_target_first() {
        let line = format_line(&record(), PartitionKind::Train);
        let parts: Vec<&str> = line.split(',').collect();
        assert_eq!(parts.len(), 6);
        assert_eq!(parts[0], "24");
        assert_eq!(parts[1], "0.00632");
    }

    #[test]
    fn test_test_lines_omit_target() {
        let line = format_line(&record(), PartitionKind::Test);
        assert_eq!(line.split(',').count(), 5);
        assert!(line.starts_with("0.00632,"));
    }

    #[test]
    fn test_features_survive_write_and_reparse_exactly() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("train.csv");
        let partition = Partition {
            kind: PartitionKind::Train,
            records: vec![record()],
            row_indices: vec![0],
        };
        write_partition(&path, &partition).unwrap();

        let back = read_labelled(&path).unwrap();
        assert_eq!(back, partition.records);
    }

    #[test]
    fn test_write_all_keeps_test_and_label_order_aligned() {
        let temp = TempDir::new().unwrap();
        let ds = Dataset {
            feature_names: vec!["a".to_string(), "b".to_string()],
            target_name: "y".to_string(),
            records: (0..30)
                .map(|i| Record { features: vec![i as f64, (i * 2) as f64], target: i as f64 })
                .collect(),
        };
        let split = split_dataset(&ds, &SplitOptions { seed: Some(3), ..Default::default() }).unwrap();
        let files = PartitionFiles::write_all(temp.path(), &split).unwrap();

        let test_rows = read_unlabelled(&files.test).unwrap();
        let labels = read_labels(&files.test_labels).unwrap();
        assert_eq!(test_rows.len(), labels.len());
        for (row, label) in test_rows.iter().zip(&labels) {
            assert_eq!(row.len(), 2);
            // Fixture targets equal their first feature.
            assert_eq!(row[0], *label);
        }

        let train = read_labelled(&files.train).unwrap();
        assert!(train.iter().all(|r| r.features.len() == 2));
    }
}
